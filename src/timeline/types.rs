//! Timeline type definitions
//!
//! These are the audio-facing outputs of the compiler: notes in ticks and
//! seconds, and the tempo map used to convert between the two.

use serde::Serialize;

/// Ticks per quarter note.
pub const PPQ: u32 = 960;

/// Tempo change at a tick position.
///
/// # Fields
/// - `ticks`: Position of the change, ascending across the map; the first is 0
/// - `bpm`: Real quarter-note bpm from this position on
/// - `time`: Seconds at `ticks`, derived from every earlier segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoBreakpoint {
    pub ticks: u64,
    pub bpm: f64,
    pub time: f64,
}

/// A finished note.
///
/// `start_ticks`/`duration_ticks` are exact; `time`/`duration` are seconds
/// derived through the tempo map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub pitch: u8,
    pub start_ticks: u64,
    pub duration_ticks: u64,
    pub time: f64,
    pub duration: f64,
}

/// Notes of one track index across all parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineTrack {
    pub channel: usize,
    pub notes: Vec<Note>,
}

/// Complete tempo-stamped note timeline for a level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub ppq: u32,
    pub tempos: Vec<TempoBreakpoint>,
    pub tracks: Vec<TimelineTrack>,
}

impl Timeline {
    /// A timeline with nothing to play.
    pub fn empty() -> Self {
        Self {
            ppq: PPQ,
            tempos: Vec::new(),
            tracks: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(|track| track.notes.is_empty())
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|track| track.notes.len()).sum()
    }

    /// Every note with its track index, in track order.
    pub fn notes(&self) -> impl Iterator<Item = (usize, &Note)> {
        self.tracks
            .iter()
            .enumerate()
            .flat_map(|(index, track)| track.notes.iter().map(move |note| (index, note)))
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::empty()
    }
}
