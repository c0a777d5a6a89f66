pub mod consume;
pub mod error;
pub mod indicator;
pub mod layout;
pub mod level;
pub mod loader;
pub mod notation;
pub mod options;
pub mod tables;
pub mod timeline;

pub use consume::{ConsumptionTracker, TrackerOptions};
pub use error::*;
pub use indicator::{place_indicators, stack_rows, Geometry, Indicator, PlacedRow};
pub use layout::{generate_rows, MusicSectionInfo, RowLayout, RowTypeResult, TileKind};
pub use level::Level;
pub use loader::LevelSlot;
pub use options::CompileOptions;
pub use timeline::{build_timeline, Timeline};

use serde::Serialize;
use serde_json::Value;

/// Everything a level load produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledLevel {
    pub rows: Vec<RowTypeResult>,
    pub sections: Vec<MusicSectionInfo>,
    pub placed_rows: Vec<PlacedRow>,
    pub indicators: Vec<Indicator>,
    pub timeline: Timeline,
    /// Set when the timeline could not be built; rows stay playable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audition: Option<Value>,
}

/// Compile a level JSON document.
/// This is the main entry point for the library.
///
/// Structural errors fail the whole load. Notation, overflow and alignment
/// errors only cost the audio timeline: the result then carries an empty
/// timeline, no indicators and `timeline_error`.
pub fn compile_level(json: &str, options: &CompileOptions) -> Result<CompiledLevel, ScoreError> {
    let level = Level::from_json(json)?;
    let RowLayout { rows, sections } = generate_rows(&level);

    let (timeline, timeline_error) = match build_timeline(&level) {
        Ok(timeline) => (timeline, None),
        Err(e) => {
            log::warn!("timeline unavailable: {}", e);
            (Timeline::empty(), Some(e.to_string()))
        }
    };

    let placed_rows = stack_rows(&rows, &options.geometry);
    let indicators = place_indicators(&placed_rows, &sections, &timeline, &options.geometry);

    Ok(CompiledLevel {
        rows,
        sections,
        placed_rows,
        indicators,
        timeline,
        timeline_error,
        audition: level.audition,
    })
}

/// Compile only the timeline, surfacing every error.
pub fn compile_timeline(json: &str) -> Result<Timeline, ScoreError> {
    let level = Level::from_json(json)?;
    build_timeline(&level)
}
