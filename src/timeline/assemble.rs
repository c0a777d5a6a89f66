//! Timeline assembly: aligned parts to tick-stamped notes, then to seconds.

use super::types::{Note, TempoBreakpoint, Timeline, TimelineTrack, PPQ};
use crate::notation::{Message, Part, Track};
use std::collections::HashMap;

/// Seconds at `ticks` under a sorted tempo map.
///
/// Sums `(segment_ticks / ppq) × (60 / bpm)` over every segment before
/// `ticks`, ending with the partial segment that contains it.
///
/// # Example
/// ```
/// use tilescore::timeline::{ticks_to_seconds, TempoBreakpoint, PPQ};
///
/// let tempos = [TempoBreakpoint { ticks: 0, bpm: 120.0, time: 0.0 }];
/// assert_eq!(ticks_to_seconds(&tempos, 960, PPQ), 0.5);
/// ```
pub fn ticks_to_seconds(tempos: &[TempoBreakpoint], ticks: u64, ppq: u32) -> f64 {
    let mut seconds = 0.0;
    for (i, breakpoint) in tempos.iter().enumerate() {
        if breakpoint.ticks >= ticks {
            break;
        }
        let end = tempos
            .get(i + 1)
            .map_or(ticks, |next| next.ticks.min(ticks));
        seconds += (end - breakpoint.ticks) as f64 / ppq as f64 * 60.0 / breakpoint.bpm;
    }
    seconds
}

/// Walk one track, opening and closing notes. `offset` is the part's start tick.
fn collect_notes(track: &Track, offset: u64, out: &mut Vec<Note>) {
    let mut local = 0u64;
    let mut open: HashMap<u8, Vec<u64>> = HashMap::new();

    for message in &track.messages {
        match *message {
            Message::NoteOn(pitch) => open.entry(pitch).or_default().push(local),
            Message::NoteOff(pitch) => {
                if let Some(start) = open.get_mut(&pitch).and_then(Vec::pop) {
                    out.push(Note {
                        pitch,
                        start_ticks: offset + start,
                        duration_ticks: local - start,
                        time: 0.0,
                        duration: 0.0,
                    });
                }
            }
            Message::Delay(ticks) => local += ticks,
            Message::Ignore => {}
        }
    }

    debug_assert!(
        open.values().all(Vec::is_empty),
        "note opened without a matching NoteOff"
    );
}

/// Build the timeline for aligned, padded parts.
///
/// Each part contributes one tempo breakpoint at its start (`bpm / 30`) and
/// advances the cursor by its longest track.
pub fn assemble(parts: &[Part]) -> Timeline {
    let width = parts.iter().map(|part| part.tracks.len()).max().unwrap_or(0);
    let mut tracks: Vec<TimelineTrack> = (0..width)
        .map(|channel| TimelineTrack {
            channel,
            notes: Vec::new(),
        })
        .collect();
    let mut tempos = Vec::with_capacity(parts.len());
    let mut cursor = 0u64;

    for part in parts {
        tempos.push(TempoBreakpoint {
            ticks: cursor,
            bpm: part.bpm / 30.0,
            time: 0.0,
        });
        for (index, track) in part.tracks.iter().enumerate() {
            collect_notes(track, cursor, &mut tracks[index].notes);
        }
        cursor += part.duration_ticks();
    }

    tempos.sort_by_key(|breakpoint| breakpoint.ticks);

    let times: Vec<f64> = tempos
        .iter()
        .map(|breakpoint| ticks_to_seconds(&tempos, breakpoint.ticks, PPQ))
        .collect();
    for (breakpoint, time) in tempos.iter_mut().zip(times) {
        breakpoint.time = time;
    }

    for track in &mut tracks {
        track.notes.sort_by_key(|note| note.start_ticks);
        for note in &mut track.notes {
            note.time = ticks_to_seconds(&tempos, note.start_ticks, PPQ);
            let end = ticks_to_seconds(&tempos, note.start_ticks + note.duration_ticks, PPQ);
            note.duration = end - note.time;
        }
    }

    Timeline {
        ppq: PPQ,
        tempos,
        tracks,
    }
}
