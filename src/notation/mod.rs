//! # Rich Notation Compiler
//!
//! Compiles each score into a message stream (`NoteOn`, `NoteOff`, `Delay`,
//! `Ignore`) at 960 ticks per quarter note, and groups a section's tracks into
//! a [`Part`].
//!
//! ## Sub-modules
//! - `message` - Message, Track, Part and the operator/pending-entry types
//! - `scanner` - The character-mode state machine over one score
//! - `distribute` - Exact chord, divider, arpeggio and ornament timing
//!
//! ## Units
//! A unit `(notes)[letters]` lasts `letters × ticks_per_unit` ticks, where
//! `ticks_per_unit` comes from the section's `baseBeats` (see
//! [`crate::tables::ticks_per_unit`]). Inside the parentheses:
//!
//! | Glyph       | Meaning                                        |
//! |-------------|------------------------------------------------|
//! | `.`         | plain separator (notes sound together)         |
//! | `~` `$`     | divider: split the unit into equal sequential chords |
//! | `@`         | roll arpeggio                                  |
//! | `%`         | spread arpeggio                                |
//! | `!`         | quick arpeggio                                 |
//! | `^` `&`     | ornament alternating two notes                 |
//!
//! ## Example
//! ```rust
//! use tilescore::notation::{compile_score, Message};
//!
//! let messages = compile_score("(c.e)[K]", 1.0, 3600.0).unwrap();
//! assert_eq!(
//!     messages,
//!     vec![
//!         Message::NoteOn(60),
//!         Message::NoteOn(64),
//!         Message::Delay(960),
//!         Message::NoteOff(60),
//!         Message::NoteOff(64),
//!     ]
//! );
//! ```

mod distribute;
mod message;
mod scanner;

pub use distribute::{distribute, ExactDivider};
pub use message::{ArpeggioStyle, Message, Operator, Part, PendingEntry, Track};
pub use scanner::{transition, Action, CharClass, Mode, Scanner};

use crate::error::ScoreError;
use crate::level::{Level, MusicSource};
use crate::tables::ticks_per_unit;

/// Effective bpm of a section: `raw bpm × 30 / baseBeats`.
pub fn effective_bpm(raw_bpm: f64, base_beats: f64) -> f64 {
    raw_bpm * 30.0 / base_beats
}

/// Compile one score to its message stream.
///
/// `bpm` is the part's effective bpm (see [`effective_bpm`]); it only sets the
/// ornament step.
pub fn compile_score(score: &str, base_beats: f64, bpm: f64) -> Result<Vec<Message>, ScoreError> {
    let ticks = ticks_per_unit(base_beats).ok_or_else(|| {
        ScoreError::syntax(0, format!("Unknown baseBeats multiplier {}", base_beats))
    })?;
    let ornament_total = (bpm * 32.0).round().max(0.0) as u64;
    Scanner::new(u64::from(ticks), ornament_total).scan(score)
}

/// Compile every score of one music section into a part.
pub fn compile_part(
    section_index: usize,
    music: &MusicSource,
    base_bpm: f64,
) -> Result<Part, ScoreError> {
    let bpm = effective_bpm(music.bpm_or(base_bpm), music.base_beats);

    let tracks = music
        .scores
        .iter()
        .enumerate()
        .map(|(track_index, score)| {
            compile_score(score, music.base_beats, bpm)
                .map(|messages| Track {
                    base_beats: music.base_beats,
                    messages,
                })
                .map_err(|e| e.in_track(section_index, track_index))
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "section {} compiled: {} tracks at effective bpm {}",
        music.id,
        tracks.len(),
        bpm
    );

    Ok(Part {
        bpm,
        base_beats: music.base_beats,
        tracks,
    })
}

/// Compile every section of a level, in authored order.
pub fn compile_parts(level: &Level) -> Result<Vec<Part>, ScoreError> {
    level
        .musics
        .iter()
        .enumerate()
        .map(|(i, music)| compile_part(i, music, level.base_bpm))
        .collect()
}
