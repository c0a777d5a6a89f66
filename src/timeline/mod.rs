//! # Timeline Module
//!
//! Generate the tempo-stamped note timeline that drives audio playback and
//! the on-screen note indicators.
//!
//! ## Purpose
//! The rich notation compiler produces one message stream per score. This
//! module turns those streams into wall-clock notes:
//! 1. **Align** - every track of a part is trimmed or padded to the first track's length
//! 2. **Pad** - parts with fewer tracks get silent copies of their last track
//! 3. **Assemble** - notes get absolute tick positions; each part adds a tempo breakpoint
//! 4. **Convert** - ticks become seconds through the tempo map
//!
//! ## Sub-modules
//! - `types` - Timeline, TimelineTrack, Note, TempoBreakpoint
//! - `align` - Track and part alignment
//! - `assemble` - Note collection and tick to seconds conversion
//!
//! ## Entry Point
//! [`build_timeline()`] - Convert a validated level into a timeline
//!
//! ## Example
//! ```rust
//! use tilescore::level::Level;
//! use tilescore::timeline::build_timeline;
//!
//! let level = Level::from_json(
//!     r#"{"baseBpm": 120, "musics": [{"id": 0, "baseBeats": 1, "scores": ["(c)[K],(e)[K]"]}]}"#,
//! ).unwrap();
//! let timeline = build_timeline(&level).unwrap();
//!
//! assert_eq!(timeline.tempos[0].bpm, 120.0);
//! assert_eq!(timeline.tracks[0].notes.len(), 2);
//! assert_eq!(timeline.tracks[0].notes[1].time, 0.5);
//! ```
//!
//! ## Two Tempo Paths
//! A part's real tempo is its effective bpm (`bpm × 30 / baseBeats`) divided
//! by 30, while the row layout's scroll speed is `bpm / baseBeats / 60` tiles
//! per second. Both come from the same raw pair through separate formulas.

mod align;
mod assemble;
mod types;


pub use align::{align_part, pad_parts, shrink, tick_difference};
pub use assemble::{assemble, ticks_to_seconds};
pub use types::{Note, TempoBreakpoint, Timeline, TimelineTrack, PPQ};

use crate::error::ScoreError;
use crate::level::Level;
use crate::notation::compile_parts;

/// Compile, align, pad and assemble a level's timeline.
pub fn build_timeline(level: &Level) -> Result<Timeline, ScoreError> {
    let mut parts = compile_parts(level)?;
    for (index, part) in parts.iter_mut().enumerate() {
        align_part(index, part)?;
    }
    pad_parts(&mut parts);

    let timeline = assemble(&parts);
    log::debug!(
        "timeline: {} tracks, {} notes, {} tempo changes",
        timeline.tracks.len(),
        timeline.note_count(),
        timeline.tempos.len()
    );
    Ok(timeline)
}
