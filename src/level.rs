//! # Level Input
//!
//! The level document is JSON:
//!
//! ```text
//! {
//!   "baseBpm": 120,
//!   "musics": [
//!     { "id": 0, "bpm": 90, "baseBeats": "0.5", "scores": ["...", "..."] }
//!   ],
//!   "audition": { ... }          // optional, carried through untouched
//! }
//! ```
//!
//! The document is first deserialized into loosely typed [`RawLevel`] /
//! [`RawMusic`] values, then every field is checked and converted into a
//! [`Level`]. Any violation is a [`ScoreError::Structural`] raised before a
//! single score is read.

use crate::error::ScoreError;
use serde::Deserialize;
use serde_json::Value;

/// Raw level for JSON deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawLevel {
    pub base_bpm: Option<Value>,
    pub musics: Option<Value>,
    pub audition: Option<Value>,
}

/// Raw music section for JSON deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawMusic {
    pub id: Option<Value>,
    pub bpm: Option<Value>,
    pub base_beats: Option<Value>,
    pub scores: Option<Value>,
}

/// A validated level.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub base_bpm: f64,
    pub musics: Vec<MusicSource>,
    pub audition: Option<Value>,
}

/// One music section: a tempo, a base-beats multiplier and parallel scores.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicSource {
    pub id: i64,
    /// Section bpm, or `None` to inherit the level's `baseBpm`.
    pub bpm: Option<f64>,
    pub base_beats: f64,
    pub scores: Vec<String>,
}

impl MusicSource {
    /// Raw bpm of this section.
    pub fn bpm_or(&self, base_bpm: f64) -> f64 {
        self.bpm.unwrap_or(base_bpm)
    }

    /// Tiles per second: `bpm / baseBeats / 60`.
    pub fn tps(&self, base_bpm: f64) -> f64 {
        self.bpm_or(base_bpm) / self.base_beats / 60.0
    }
}

impl Level {
    /// Parse and validate a level document.
    ///
    /// # Example
    /// ```
    /// use tilescore::level::Level;
    ///
    /// let level = Level::from_json(
    ///     r#"{"baseBpm": 120, "musics": [{"id": 1, "baseBeats": "0.5", "scores": ["(c)[L]"]}]}"#,
    /// ).unwrap();
    /// assert_eq!(level.musics[0].base_beats, 0.5);
    /// assert_eq!(level.musics[0].bpm_or(level.base_bpm), 120.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let raw: RawLevel =
            serde_json::from_str(json).map_err(|e| ScoreError::Structural(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawLevel) -> Result<Self, ScoreError> {
        let base_bpm = match raw.base_bpm {
            Some(value) => positive_number(&value, "baseBpm")?,
            None => return Err(ScoreError::Structural("baseBpm is required".to_string())),
        };

        let entries = match raw.musics {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(ScoreError::Structural("musics must be an array".to_string())),
            None => return Err(ScoreError::Structural("musics is required".to_string())),
        };

        let musics = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| parse_music(i, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Level {
            base_bpm,
            musics,
            audition: raw.audition,
        })
    }
}

fn parse_music(index: usize, entry: Value) -> Result<MusicSource, ScoreError> {
    if !entry.is_object() {
        return Err(ScoreError::Structural(format!(
            "musics[{}] must be an object",
            index
        )));
    }
    let raw: RawMusic = serde_json::from_value(entry)
        .map_err(|e| ScoreError::Structural(format!("musics[{}]: {}", index, e)))?;

    let id = match raw.id.as_ref().and_then(Value::as_f64) {
        Some(id) if id.fract() == 0.0 => id as i64,
        Some(id) => {
            return Err(ScoreError::Structural(format!(
                "musics[{}].id must be an integer, got {}",
                index, id
            )))
        }
        None => {
            return Err(ScoreError::Structural(format!(
                "musics[{}].id must be a number",
                index
            )))
        }
    };

    let bpm = match raw.bpm {
        Some(Value::Null) | None => None,
        Some(value) => Some(positive_number(&value, &format!("musics[{}].bpm", index))?),
    };

    let base_beats = match raw.base_beats {
        Some(value) => positive_number(&value, &format!("musics[{}].baseBeats", index))?,
        None => {
            return Err(ScoreError::Structural(format!(
                "musics[{}].baseBeats is required",
                index
            )))
        }
    };

    let scores = match raw.scores {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(j, item)| match item {
                Value::String(score) => Ok(score),
                _ => Err(ScoreError::Structural(format!(
                    "musics[{}].scores[{}] must be a string",
                    index, j
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(ScoreError::Structural(format!(
                "musics[{}].scores must be an array",
                index
            )))
        }
    };

    Ok(MusicSource {
        id,
        bpm,
        base_beats,
        scores,
    })
}

/// Accept a JSON number or a string holding one; it must be finite and positive.
fn positive_number(value: &Value, field: &str) -> Result<f64, ScoreError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => Ok(n),
        Some(n) => Err(ScoreError::Structural(format!(
            "{} must be positive, got {}",
            field, n
        ))),
        None => Err(ScoreError::Structural(format!(
            "{} must be a number, got {}",
            field, value
        ))),
    }
}
