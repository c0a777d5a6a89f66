//! Track and part alignment.
//!
//! Tracks of one part are authored independently and rarely add up to the
//! same length. Every track is brought to the first track's length: longer
//! tracks are trimmed from the end, shorter ones get a trailing rest. Parts
//! with fewer tracks than the widest part are padded with silent copies.
//!
//! After alignment no track of a part holds a zero-length note, whether it
//! was trimmed or authored that way.

use crate::error::ScoreError;
use crate::notation::{Message, Part, Track};
use std::cmp::Ordering;

/// Signed tick difference `track − reference`.
///
/// Walks both delay lists in lockstep, consuming matched ticks until one side
/// runs out; what is left over on the other side is the difference.
pub fn tick_difference(reference: &Track, track: &Track) -> i64 {
    let mut left = reference.messages.iter().map(Message::delay_ticks).filter(|&d| d > 0);
    let mut right = track.messages.iter().map(Message::delay_ticks).filter(|&d| d > 0);
    let mut l = left.next().unwrap_or(0);
    let mut r = right.next().unwrap_or(0);

    while l > 0 && r > 0 {
        let step = l.min(r);
        l -= step;
        r -= step;
        if l == 0 {
            l = left.next().unwrap_or(0);
        }
        if r == 0 {
            r = right.next().unwrap_or(0);
        }
    }

    let left_over = l + left.sum::<u64>();
    let right_over = r + right.sum::<u64>();
    right_over as i64 - left_over as i64
}

/// Remove `amount` ticks from the end of a track.
///
/// Delays are consumed back to front; notes left with no time between their
/// `NoteOn` and `NoteOff` are turned into `Ignore`.
pub fn shrink(track: &mut Track, amount: u64) -> Result<(), String> {
    let mut needed = amount;
    for message in track.messages.iter_mut().rev() {
        if needed == 0 {
            break;
        }
        if let Message::Delay(ticks) = message {
            let take = (*ticks).min(needed);
            *ticks -= take;
            needed -= take;
        }
    }

    if needed > 0 {
        return Err(format!(
            "cannot remove {} ticks, {} short",
            amount, needed
        ));
    }

    silence_empty_notes(&mut track.messages);
    Ok(())
}

/// Turn every NoteOn/NoteOff pair with zero ticks between them into `Ignore`.
fn silence_empty_notes(messages: &mut [Message]) {
    for i in 0..messages.len() {
        let Message::NoteOn(pitch) = messages[i] else {
            continue;
        };

        let mut elapsed = 0;
        let mut note_off = None;
        for (j, message) in messages.iter().enumerate().skip(i + 1) {
            match message {
                Message::Delay(ticks) => elapsed += ticks,
                Message::NoteOff(p) if *p == pitch => {
                    note_off = Some(j);
                    break;
                }
                _ => {}
            }
        }

        if let Some(j) = note_off {
            if elapsed == 0 {
                messages[i] = Message::Ignore;
                messages[j] = Message::Ignore;
            }
        }
    }
}

/// Bring every track of a part to the length of its first track, then
/// silence zero-length notes in all of them.
pub fn align_part(section_index: usize, part: &mut Part) -> Result<(), ScoreError> {
    let Some((reference, others)) = part.tracks.split_first_mut() else {
        return Ok(());
    };

    for (i, track) in others.iter_mut().enumerate() {
        let track_index = i + 1;
        let difference = tick_difference(reference, track);
        match difference.cmp(&0) {
            Ordering::Greater => {
                shrink(track, difference as u64).map_err(|message| ScoreError::Alignment {
                    section: section_index,
                    track: track_index,
                    message,
                })?;
                log::debug!(
                    "section {} track {}: trimmed {} ticks",
                    section_index,
                    track_index,
                    difference
                );
            }
            Ordering::Less => {
                track.messages.push(Message::Delay(difference.unsigned_abs()));
                log::debug!(
                    "section {} track {}: padded {} ticks",
                    section_index,
                    track_index,
                    difference.unsigned_abs()
                );
            }
            Ordering::Equal => {}
        }
    }

    for track in &mut part.tracks {
        silence_empty_notes(&mut track.messages);
    }
    Ok(())
}

/// Give every part as many tracks as the widest part, using silent copies of
/// each part's last track.
pub fn pad_parts(parts: &mut [Part]) {
    let widest = parts.iter().map(|part| part.tracks.len()).max().unwrap_or(0);

    for part in parts.iter_mut() {
        if part.tracks.len() >= widest {
            continue;
        }
        let filler = match part.tracks.last() {
            Some(last) => last.silenced(),
            None => Track {
                base_beats: part.base_beats,
                messages: Vec::new(),
            },
        };
        log::debug!(
            "padding part with {} silent tracks",
            widest - part.tracks.len()
        );
        part.tracks.resize(widest, filler);
    }
}
