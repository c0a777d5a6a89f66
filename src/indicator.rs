//! # Note Indicators
//!
//! Projects timeline notes back onto the scrolling tile grid so the renderer
//! can draw a marker where each note falls inside its row.
//!
//! ## Row Windows
//! Every non-start row owns a time window whose length is
//! `height_multiplier / tps`, with `tps` taken from the music section the row
//! belongs to. Windows are laid end to end from time 0.
//!
//! ## Placement
//! For a note at time `t` inside a row's window `[start, end)`:
//! - `fraction = (t − start) / (end − start)`
//! - `y = (row bottom − base tile height) − fraction × row height − indicator offset`
//! - `x` centres the indicator in the play area
//!
//! Notes outside the 88-key range, outside every window, or landing on the
//! start row or on a row without tiles get no indicator.

use crate::layout::{MusicSectionInfo, RowTypeResult, TileKind};
use crate::tables::{HIGHEST_PITCH, LOWEST_PITCH};
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pixel geometry of the play area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Geometry {
    pub viewport_height: f64,
    pub play_area_width: f64,
    /// Height of a row with `height_multiplier` 1.
    pub base_tile_height: f64,
    pub indicator_size: f64,
    /// Lift applied to every indicator above its computed position.
    pub indicator_offset: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            viewport_height: 1280.0,
            play_area_width: 720.0,
            base_tile_height: 320.0,
            indicator_size: 24.0,
            indicator_offset: 6.0,
        }
    }
}

/// A row positioned in pixel space. `y` grows downward; rows stack upward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedRow {
    pub row_index: usize,
    pub is_start: bool,
    /// Y of the row's lower edge.
    pub bottom: f64,
    pub height: f64,
    pub height_multiplier: u32,
    pub tile_count: u32,
}

/// Lay the row sequence above a start row.
///
/// The start row is one base tile high with its bottom on the viewport's
/// bottom edge; every following row sits directly on top of the previous one.
pub fn stack_rows(rows: &[RowTypeResult], geometry: &Geometry) -> Vec<PlacedRow> {
    let mut placed = Vec::with_capacity(rows.len() + 1);
    placed.push(PlacedRow {
        row_index: 0,
        is_start: true,
        bottom: geometry.viewport_height,
        height: geometry.base_tile_height,
        height_multiplier: 1,
        tile_count: 1,
    });

    let mut bottom = geometry.viewport_height - geometry.base_tile_height;
    for (i, row) in rows.iter().enumerate() {
        let height = f64::from(row.height_multiplier) * geometry.base_tile_height;
        placed.push(PlacedRow {
            row_index: i + 1,
            is_start: false,
            bottom,
            height,
            height_multiplier: row.height_multiplier,
            tile_count: match row.kind {
                TileKind::Empty => 0,
                TileKind::Single => 1,
                TileKind::Double => 2,
            },
        });
        bottom -= height;
    }
    placed
}

/// A marker drawn where a note falls inside its row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub note_id: String,
    pub row_index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub time: f64,
    /// Flipped to true once playback passes the note; never flipped back.
    pub consumed: bool,
}

/// Deterministic id for a note: rounded milliseconds, track index and pitch.
///
/// # Example
/// ```
/// use tilescore::indicator::note_id;
///
/// assert_eq!(note_id(1.2344, 2, 60), "1234-2-60");
/// ```
pub fn note_id(time: f64, track: usize, pitch: u8) -> String {
    format!("{}-{}-{}", (time * 1000.0).round() as i64, track, pitch)
}

/// Time window of one placed row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RowWindow {
    placed_index: usize,
    start: f64,
    end: f64,
}

/// Windows for every non-start row, using the tps of the section each row
/// belongs to. Rows past the last section get no window.
fn row_windows(placed: &[PlacedRow], sections: &[MusicSectionInfo]) -> Vec<RowWindow> {
    let mut windows = Vec::new();
    let mut cursor = 0.0;
    let mut sequence_index = 0;

    for (placed_index, row) in placed.iter().enumerate() {
        if row.is_start {
            continue;
        }
        let Some(section) = sections.iter().find(|s| s.contains_row(sequence_index)) else {
            break;
        };
        sequence_index += 1;
        if !(section.tps.is_finite() && section.tps > 0.0) {
            continue;
        }

        let length = f64::from(row.height_multiplier) / section.tps;
        windows.push(RowWindow {
            placed_index,
            start: cursor,
            end: cursor + length,
        });
        cursor += length;
    }
    windows
}

/// Place an indicator for every playable note.
pub fn place_indicators(
    placed: &[PlacedRow],
    sections: &[MusicSectionInfo],
    timeline: &Timeline,
    geometry: &Geometry,
) -> Vec<Indicator> {
    let windows = row_windows(placed, sections);
    let x = geometry.play_area_width / 2.0 - geometry.indicator_size / 2.0;

    let mut seen = HashSet::new();
    let mut indicators = Vec::new();
    let mut dropped = 0usize;

    for (track, note) in timeline.notes() {
        if !(LOWEST_PITCH..=HIGHEST_PITCH).contains(&note.pitch) {
            continue;
        }

        let slot = windows.partition_point(|w| w.end <= note.time);
        let Some(window) = windows.get(slot).filter(|w| w.start <= note.time) else {
            dropped += 1;
            continue;
        };
        let row = &placed[window.placed_index];
        if row.is_start || row.tile_count == 0 {
            continue;
        }

        let id = note_id(note.time, track, note.pitch);
        if !seen.insert(id.clone()) {
            continue;
        }

        let fraction = (note.time - window.start) / (window.end - window.start);
        let anchor = row.bottom - geometry.base_tile_height;
        indicators.push(Indicator {
            note_id: id,
            row_index: row.row_index,
            x,
            y: anchor - fraction * row.height - geometry.indicator_offset,
            width: geometry.indicator_size,
            height: geometry.indicator_size,
            time: note.time,
            consumed: false,
        });
    }

    if dropped > 0 {
        log::warn!("{} notes fall outside every row window", dropped);
    }
    indicators
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Note, TimelineTrack, PPQ};

    fn row(kind: TileKind, height_multiplier: u32) -> RowTypeResult {
        RowTypeResult { kind, height_multiplier }
    }

    fn section(tps: f64, start: usize, end: usize) -> MusicSectionInfo {
        MusicSectionInfo {
            id: 0,
            tps,
            start_row_index: start,
            end_row_index: end,
            row_count: end - start,
        }
    }

    fn note(pitch: u8, time: f64) -> Note {
        Note { pitch, start_ticks: 0, duration_ticks: 0, time, duration: 0.1 }
    }

    fn timeline(notes: Vec<Vec<Note>>) -> Timeline {
        Timeline {
            ppq: PPQ,
            tempos: Vec::new(),
            tracks: notes
                .into_iter()
                .enumerate()
                .map(|(channel, notes)| TimelineTrack { channel, notes })
                .collect(),
        }
    }

    fn geometry() -> Geometry {
        Geometry {
            viewport_height: 1000.0,
            play_area_width: 400.0,
            base_tile_height: 100.0,
            indicator_size: 20.0,
            indicator_offset: 5.0,
        }
    }

    #[test]
    fn test_stack_rows() {
        let placed = stack_rows(&[row(TileKind::Single, 1), row(TileKind::Double, 2)], &geometry());
        assert_eq!(placed.len(), 3);
        assert!(placed[0].is_start);
        assert_eq!(placed[0].bottom, 1000.0);
        assert_eq!(placed[1].bottom, 900.0);
        assert_eq!(placed[2].bottom, 800.0);
        assert_eq!(placed[2].height, 200.0);
        assert_eq!(placed[2].tile_count, 2);
    }

    #[test]
    fn test_indicator_inside_row() {
        let g = geometry();
        let placed = stack_rows(&[row(TileKind::Single, 1), row(TileKind::Single, 2)], &g);
        let sections = [section(2.0, 0, 2)];
        // row 1: [0, 0.5), row 2: [0.5, 1.5)
        let indicators = place_indicators(&placed, &sections, &timeline(vec![vec![note(60, 1.0)]]), &g);

        assert_eq!(indicators.len(), 1);
        let indicator = &indicators[0];
        assert_eq!(indicator.row_index, 2);
        assert_eq!(indicator.note_id, "1000-0-60");
        assert_eq!(indicator.x, 190.0);
        // anchor 800 − 100, half-way through a 200 px row, lifted by 5
        assert_eq!(indicator.y, 700.0 - 100.0 - 5.0);
        assert_eq!(indicator.width, 20.0);
        assert!(!indicator.consumed);
    }

    #[test]
    fn test_section_tps_switches() {
        let g = geometry();
        let placed = stack_rows(&[row(TileKind::Single, 1), row(TileKind::Single, 1)], &g);
        let sections = [section(2.0, 0, 1), section(4.0, 1, 2)];
        // row 1: [0, 0.5), row 2: [0.5, 0.75)
        let indicators = place_indicators(
            &placed,
            &sections,
            &timeline(vec![vec![note(60, 0.625), note(62, 0.75)]]),
            &g,
        );
        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators[0].row_index, 2);
        assert_eq!(indicators[0].y, 800.0 - 100.0 - 0.5 * 100.0 - 5.0);
    }

    #[test]
    fn test_skipped_notes() {
        let g = geometry();
        let placed = stack_rows(&[row(TileKind::Empty, 1), row(TileKind::Single, 1)], &g);
        let sections = [section(2.0, 0, 2)];
        let indicators = place_indicators(
            &placed,
            &sections,
            &timeline(vec![vec![
                note(60, 0.1),  // empty row
                note(10, 0.6),  // out of range pitch
                note(109, 0.6), // out of range pitch
                note(60, 5.0),  // past the last row
                note(21, 0.6),
            ]]),
            &g,
        );
        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators[0].note_id, "600-0-21");
    }

    #[test]
    fn test_placement_is_repeatable() {
        let g = geometry();
        let placed = stack_rows(&[row(TileKind::Double, 1)], &g);
        let sections = [section(2.0, 0, 1)];
        let notes = timeline(vec![vec![note(60, 0.25)], vec![note(60, 0.25), note(64, 0.25)]]);
        let first = place_indicators(&placed, &sections, &notes, &g);
        let second = place_indicators(&placed, &sections, &notes, &g);
        assert_eq!(first, second);
        let ids: Vec<_> = first.iter().map(|i| i.note_id.as_str()).collect();
        assert_eq!(ids, vec!["250-0-60", "250-1-60", "250-1-64"]);
    }
}
