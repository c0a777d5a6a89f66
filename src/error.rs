//! # Error Types
//!
//! This module defines all error types for the score compiler.
//!
//! Every failure aborts the whole compilation; there is no partial output. Errors
//! raised while reading a score carry the character position inside that score and
//! the section/track it belongs to, so level authors can find the offending text.
//!
//! ## Error Types
//! - `Structural` - The level JSON is malformed (missing or mistyped fields)
//! - `NotationSyntax` - Unexpected character, incomplete unit, bad operator mix
//! - `Overflow` - An accumulated tick count exceeds [`MAX_TICKS`]
//! - `Alignment` - A track could not be shrunk to its part's reference length
//!
//! ## Usage
//! ```rust
//! use tilescore::{compile_timeline, ScoreError};
//!
//! let json = r#"{"baseBpm": 120, "musics": [{"id": 0, "baseBeats": 1, "scores": ["(c)["]}]}"#;
//! match compile_timeline(json) {
//!     Ok(timeline) => println!("{} tracks", timeline.tracks.len()),
//!     Err(ScoreError::NotationSyntax { section, track, position, message }) => {
//!         eprintln!("section {} track {} at {}: {}", section, track, position, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Largest tick count any single length, rest or track total may reach.
pub const MAX_TICKS: u64 = 0xFF_FFFF;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// Malformed level document.
    ///
    /// Raised before any score is read.
    ///
    /// # Example
    /// ```
    /// # use tilescore::ScoreError;
    /// let err = ScoreError::Structural("musics[0].scores must be an array".to_string());
    /// assert_eq!(err.to_string(), "Invalid level: musics[0].scores must be an array");
    /// ```
    #[error("Invalid level: {0}")]
    Structural(String),

    /// Notation error with location information.
    ///
    /// `position` is the character offset inside the score string.
    ///
    /// # Example
    /// ```
    /// # use tilescore::ScoreError;
    /// let err = ScoreError::NotationSyntax {
    ///     section: 2,
    ///     track: 0,
    ///     position: 7,
    ///     message: "Unexpected character 'x'".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Notation error in section 2, track 0, at character 7: Unexpected character 'x'"
    /// );
    /// ```
    #[error("Notation error in section {section}, track {track}, at character {position}: {message}")]
    NotationSyntax {
        section: usize,
        track: usize,
        position: usize,
        message: String,
    },

    /// Accumulated ticks exceeded [`MAX_TICKS`].
    #[error("Tick overflow in section {section}, track {track}: {ticks} ticks exceeds the limit")]
    Overflow {
        section: usize,
        track: usize,
        ticks: u64,
    },

    /// A track could not be trimmed to the length of the first track of its part.
    #[error("Alignment error in section {section}, track {track}: {message}")]
    Alignment {
        section: usize,
        track: usize,
        message: String,
    },
}

impl ScoreError {
    /// Shorthand for a notation error whose section/track are filled in later
    /// by [`ScoreError::in_track`].
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        ScoreError::NotationSyntax {
            section: 0,
            track: 0,
            position,
            message: message.into(),
        }
    }

    /// Re-tag a per-score error with the section and track it came from.
    pub(crate) fn in_track(self, section_index: usize, track_index: usize) -> Self {
        match self {
            ScoreError::NotationSyntax { position, message, .. } => ScoreError::NotationSyntax {
                section: section_index,
                track: track_index,
                position,
                message,
            },
            ScoreError::Overflow { ticks, .. } => ScoreError::Overflow {
                section: section_index,
                track: track_index,
                ticks,
            },
            ScoreError::Alignment { message, .. } => ScoreError::Alignment {
                section: section_index,
                track: track_index,
                message,
            },
            other => other,
        }
    }
}

/// Fail with [`ScoreError::Overflow`] when `ticks` exceeds [`MAX_TICKS`].
pub(crate) fn check_ticks(ticks: u64) -> Result<u64, ScoreError> {
    if ticks > MAX_TICKS {
        Err(ScoreError::Overflow {
            section: 0,
            track: 0,
            ticks,
        })
    } else {
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_track_retags_location() {
        let err = ScoreError::syntax(3, "Unexpected character ')'").in_track(4, 1);
        assert_eq!(
            err,
            ScoreError::NotationSyntax {
                section: 4,
                track: 1,
                position: 3,
                message: "Unexpected character ')'".to_string(),
            }
        );
    }

    #[test]
    fn test_check_ticks_limit() {
        assert_eq!(check_ticks(MAX_TICKS), Ok(MAX_TICKS));
        assert!(matches!(
            check_ticks(MAX_TICKS + 1),
            Err(ScoreError::Overflow { ticks, .. }) if ticks == MAX_TICKS + 1
        ));
    }
}
