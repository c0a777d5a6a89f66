//! Compile options, loadable from YAML.
//!
//! ```yaml
//! geometry:
//!   viewport-height: 1280
//!   base-tile-height: 320
//! tracker:
//!   lookback: 0.25
//! ```
//!
//! Every field is optional; missing ones keep their defaults.

use crate::consume::TrackerOptions;
use crate::error::ScoreError;
use crate::indicator::Geometry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompileOptions {
    pub geometry: Geometry,
    pub tracker: TrackerOptions,
}

impl CompileOptions {
    /// Parse options from YAML. An empty document yields the defaults.
    ///
    /// # Example
    /// ```
    /// use tilescore::options::CompileOptions;
    ///
    /// let options = CompileOptions::from_yaml("tracker:\n  retention: 8\n").unwrap();
    /// assert_eq!(options.tracker.retention, 8.0);
    /// assert_eq!(options.geometry, Default::default());
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, ScoreError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| ScoreError::Structural(format!("invalid options: {}", e)))
    }
}
