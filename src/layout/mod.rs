//! # Row Layout
//!
//! Turns each music section's scores into the ordered row sequence the tile
//! generator consumes, plus per-section metadata for the scroll-speed
//! controller.
//!
//! ## Pipeline
//! 1. Split the primary score (the section's first score) into components
//! 2. Blend: secondary scores upgrade overlapped primary rests to SINGLE
//! 3. Emit one [`RowTypeResult`] per component
//! 4. Record the section's row range and tiles-per-second
//!
//! This reading of a score is independent of the rich notation compiler
//! (`notation` module): both interpret the same text, neither consults the other.
//!
//! ## Example
//! ```rust
//! use tilescore::level::Level;
//! use tilescore::layout::{generate_rows, TileKind};
//!
//! let level = Level::from_json(
//!     r#"{"baseBpm": 120, "musics": [{"id": 0, "baseBeats": 1, "scores": ["(c)[K],T,(e)[J]"]}]}"#,
//! ).unwrap();
//! let layout = generate_rows(&level);
//!
//! assert_eq!(layout.rows.len(), 3);
//! assert_eq!(layout.rows[1].kind, TileKind::Empty);
//! assert_eq!(layout.rows[2].height_multiplier, 2);
//! assert_eq!(layout.sections[0].tps, 2.0);
//! ```

mod blend;
mod component;

pub use blend::{blended_rests, component_windows, TimelineEntry};
pub use component::{parse_component, parse_components, split_components, Component, TileKind};

use crate::level::{Level, MusicSource};
use serde::Serialize;

/// One generated tile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowTypeResult {
    pub kind: TileKind,
    /// Row height in base tiles, at least 1.
    pub height_multiplier: u32,
}

/// Row range and scroll speed of one music section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSectionInfo {
    pub id: i64,
    /// Tiles per second.
    pub tps: f64,
    pub start_row_index: usize,
    /// Exclusive.
    pub end_row_index: usize,
    pub row_count: usize,
}

impl MusicSectionInfo {
    pub fn contains_row(&self, row_index: usize) -> bool {
        (self.start_row_index..self.end_row_index).contains(&row_index)
    }
}

/// Rows for a whole level, partitioned by section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLayout {
    pub rows: Vec<RowTypeResult>,
    pub sections: Vec<MusicSectionInfo>,
}

/// Height in base tiles for a component duration: `duration / (32 × baseBeats)`, at least 1.
pub fn height_multiplier(duration: u64, base_beats: f64) -> u32 {
    let unit_divisor = 32.0 * base_beats;
    let height = (duration as f64 / unit_divisor).floor();
    if height.is_finite() && height >= 1.0 {
        height as u32
    } else {
        1
    }
}

/// Rows for one music section.
pub fn section_rows(music: &MusicSource) -> Vec<RowTypeResult> {
    let Some((primary_score, secondary)) = music.scores.split_first() else {
        return Vec::new();
    };

    let primary = parse_components(primary_score);
    let secondary: Vec<&str> = secondary.iter().map(String::as_str).collect();
    let blended = blended_rests(&primary, &secondary);

    log::debug!(
        "section {}: {} components, {} blended rests",
        music.id,
        primary.len(),
        blended.len()
    );

    primary
        .iter()
        .enumerate()
        .map(|(index, component)| {
            let kind = if component.is_rest() && blended.contains(&index) {
                TileKind::Single
            } else {
                component.kind
            };
            RowTypeResult {
                kind,
                height_multiplier: height_multiplier(component.duration, music.base_beats),
            }
        })
        .collect()
}

/// Rows and section metadata for a whole level.
pub fn generate_rows(level: &Level) -> RowLayout {
    let mut rows = Vec::new();
    let mut sections = Vec::with_capacity(level.musics.len());

    for music in &level.musics {
        let start_row_index = rows.len();
        rows.extend(section_rows(music));
        sections.push(MusicSectionInfo {
            id: music.id,
            tps: music.tps(level.base_bpm),
            start_row_index,
            end_row_index: rows.len(),
            row_count: rows.len() - start_row_index,
        });
    }

    RowLayout { rows, sections }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn music(id: i64, base_beats: f64, scores: &[&str]) -> MusicSource {
        MusicSource {
            id,
            bpm: None,
            base_beats,
            scores: scores.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_height_multiplier() {
        assert_eq!(height_multiplier(4, 1.0), 1);
        assert_eq!(height_multiplier(32, 1.0), 1);
        assert_eq!(height_multiplier(64, 1.0), 2);
        assert_eq!(height_multiplier(95, 1.0), 2);
        assert_eq!(height_multiplier(64, 0.5), 4);
        assert_eq!(height_multiplier(0, 1.0), 1);
    }

    #[test]
    fn test_blended_rest_becomes_single() {
        let rows = section_rows(&music(0, 1.0, &["(c)[K],S", "T,T,(e)[K],T"]));
        assert_eq!(
            rows,
            vec![
                RowTypeResult { kind: TileKind::Single, height_multiplier: 1 },
                RowTypeResult { kind: TileKind::Single, height_multiplier: 2 },
            ]
        );
    }

    #[test]
    fn test_unblended_rest_stays_empty() {
        let rows = section_rows(&music(0, 1.0, &["(c)[K],T", "(e)[K],T"]));
        assert_eq!(rows[1].kind, TileKind::Empty);
    }

    #[test]
    fn test_section_without_scores() {
        assert!(section_rows(&music(0, 1.0, &[])).is_empty());
    }

    #[test]
    fn test_sections_partition_rows() {
        let level = Level {
            base_bpm: 120.0,
            musics: vec![
                music(1, 1.0, &["(c)[K],(d)[K]"]),
                music(2, 0.5, &[]),
                music(3, 0.5, &["(e)[L],5<(f.a)[L]>,U"]),
            ],
            audition: None,
        };
        let layout = generate_rows(&level);

        assert_eq!(layout.rows.len(), 5);
        assert_eq!(layout.rows[3].kind, TileKind::Double);

        let ranges: Vec<_> = layout
            .sections
            .iter()
            .map(|s| (s.start_row_index, s.end_row_index, s.row_count))
            .collect();
        assert_eq!(ranges, vec![(0, 2, 2), (2, 2, 0), (2, 5, 3)]);
        for pair in layout.sections.windows(2) {
            assert_eq!(pair[0].end_row_index, pair[1].start_row_index);
        }
        assert_eq!(layout.sections[0].tps, 2.0);
        assert_eq!(layout.sections[2].tps, 4.0);
        assert!(layout.sections[2].contains_row(4));
        assert!(!layout.sections[2].contains_row(5));
    }
}
