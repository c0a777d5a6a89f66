//! Timing distribution: turn a chord's pending entries and a total length
//! into an exact message sequence.
//!
//! Every split goes through [`ExactDivider`], so the ticks handed out for one
//! unit always add up to the unit's length.

use super::message::{ArpeggioStyle, Message, Operator, PendingEntry};
use crate::error::ScoreError;
use crate::tables::PITCH_SENTINEL_FLOOR;

/// Divisor applied to `round(bpm × 32)` to get one ornament step.
const ORNAMENT_STEP_DIVISOR: u64 = 720;

/// Repeated integer division that carries the remainder forward.
///
/// Each call returns `total / divisor` and adds `total % divisor` to a running
/// remainder; once the remainder reaches the divisor the quotient gains one
/// tick. Splitting a total into `n` equal shares with `n` calls therefore
/// hands out exactly the total.
///
/// # Example
/// ```
/// use tilescore::notation::ExactDivider;
///
/// let mut divider = ExactDivider::new();
/// let shares: Vec<u64> = (0..3).map(|_| divider.divide(10, 3)).collect();
/// assert_eq!(shares.iter().sum::<u64>(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExactDivider {
    remainder: u64,
}

impl ExactDivider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn divide(&mut self, total: u64, divisor: u64) -> u64 {
        if divisor == 0 {
            return 0;
        }
        let mut quotient = total / divisor;
        self.remainder += total % divisor;
        if self.remainder >= divisor {
            quotient += 1;
            self.remainder -= divisor;
        }
        quotient
    }
}

/// Arrangement applied to one divider group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrangement {
    Chord,
    Arpeggio(ArpeggioStyle),
    Ornament,
}

/// Expand one unit's pending entries over `length` ticks.
///
/// `ornament_total` is `round(bpm × 32)`; each ornament step is
/// `ornament_total / 720` ticks through an exact divider.
///
/// Errors carry `position` (the character that closed the unit).
pub fn distribute(
    entries: &[PendingEntry],
    length: u64,
    ornament_total: u64,
    position: usize,
) -> Result<Vec<Message>, ScoreError> {
    validate_operators(entries, position)?;

    let groups: Vec<&[PendingEntry]> = entries
        .split(|entry| matches!(entry, PendingEntry::Marker(Operator::Divider)))
        .collect();
    let divisor = groups.len() as u64;

    let mut messages = Vec::new();
    let mut shares = ExactDivider::new();
    for group in groups {
        let share = shares.divide(length, divisor);
        match arrangement(group) {
            Arrangement::Chord => chord(group, share, &mut messages),
            Arrangement::Arpeggio(style) => arpeggio(group, share, style, &mut messages),
            Arrangement::Ornament => ornament(group, share, ornament_total, position, &mut messages)?,
        }
    }
    Ok(messages)
}

/// At most one non-divider operator kind per unit, and at most one ornament marker.
fn validate_operators(entries: &[PendingEntry], position: usize) -> Result<(), ScoreError> {
    let mut kind: Option<Arrangement> = None;
    let mut ornaments = 0;

    for entry in entries {
        let found = match entry {
            PendingEntry::Marker(Operator::Arpeggio(style)) => Arrangement::Arpeggio(*style),
            PendingEntry::Marker(Operator::Ornament) => {
                ornaments += 1;
                Arrangement::Ornament
            }
            _ => continue,
        };
        match kind {
            Some(existing) if existing != found => {
                return Err(ScoreError::syntax(
                    position,
                    "Cannot combine different arpeggio or ornament operators in one chord",
                ))
            }
            _ => kind = Some(found),
        }
    }

    if ornaments > 1 {
        return Err(ScoreError::syntax(
            position,
            "Only one ornament marker is allowed per chord",
        ));
    }
    Ok(())
}

fn arrangement(group: &[PendingEntry]) -> Arrangement {
    group
        .iter()
        .find_map(|entry| match entry {
            PendingEntry::Marker(Operator::Arpeggio(style)) => Some(Arrangement::Arpeggio(*style)),
            PendingEntry::Marker(Operator::Ornament) => Some(Arrangement::Ornament),
            _ => None,
        })
        .unwrap_or(Arrangement::Chord)
}

fn pitches(group: &[PendingEntry]) -> impl Iterator<Item = u8> + '_ {
    group.iter().filter_map(|entry| match entry {
        PendingEntry::Pitch(pitch) => Some(*pitch),
        PendingEntry::Marker(_) => None,
    })
}

/// All pitches on, hold for `length`, all pitches off.
fn chord(group: &[PendingEntry], length: u64, out: &mut Vec<Message>) {
    out.extend(pitches(group).map(Message::NoteOn));
    out.push(Message::Delay(length));
    out.extend(pitches(group).map(Message::NoteOff));
}

/// Stagger note starts: every marker spends one slice, the chord then rings
/// out for whatever is left and releases together.
fn arpeggio(group: &[PendingEntry], length: u64, style: ArpeggioStyle, out: &mut Vec<Message>) {
    let occurrences = group
        .iter()
        .filter(|entry| matches!(entry, PendingEntry::Marker(Operator::Arpeggio(_))))
        .count() as u64;

    let mut divider = ExactDivider::new();
    let mut remaining = length;
    let mut held = Vec::new();

    for entry in group {
        match entry {
            PendingEntry::Pitch(pitch) => {
                out.push(Message::NoteOn(*pitch));
                held.push(*pitch);
            }
            PendingEntry::Marker(Operator::Arpeggio(_)) => {
                let slice = style.slice(&mut divider, length, occurrences).min(remaining);
                remaining -= slice;
                out.push(Message::Delay(slice));
            }
            PendingEntry::Marker(_) => {}
        }
    }

    out.push(Message::Delay(remaining));
    out.extend(held.into_iter().map(Message::NoteOff));
}

impl ArpeggioStyle {
    /// One marker's share of `length`.
    fn slice(self, divider: &mut ExactDivider, length: u64, occurrences: u64) -> u64 {
        match self {
            ArpeggioStyle::Roll if occurrences <= 1 => divider.divide(length, 10),
            ArpeggioStyle::Roll => divider.divide(length, 10 * (occurrences - 1)),
            ArpeggioStyle::Spread => divider.divide(3 * length, 10 * occurrences),
            ArpeggioStyle::Quick => divider.divide(3 * length, 20 * occurrences),
        }
    }
}

/// Alternate two pitches at a fixed step until the length runs out.
fn ornament(
    group: &[PendingEntry],
    length: u64,
    ornament_total: u64,
    position: usize,
    out: &mut Vec<Message>,
) -> Result<(), ScoreError> {
    let (first, second) = match group {
        [PendingEntry::Pitch(a), PendingEntry::Marker(Operator::Ornament), PendingEntry::Pitch(b)] => {
            (*a, *b)
        }
        _ => {
            return Err(ScoreError::syntax(
                position,
                "Ornament must be written as <note>^<note>",
            ))
        }
    };
    if first < PITCH_SENTINEL_FLOOR || second < PITCH_SENTINEL_FLOOR {
        return Err(ScoreError::syntax(
            position,
            "Ornament notes must be real pitches",
        ));
    }

    let mut divider = ExactDivider::new();
    let mut remaining = length;
    let mut current = first;
    loop {
        let step = divider.divide(ornament_total, ORNAMENT_STEP_DIVISOR).max(1);
        out.push(Message::NoteOn(current));
        if remaining <= step {
            out.push(Message::Delay(remaining));
            out.push(Message::NoteOff(current));
            return Ok(());
        }
        out.push(Message::Delay(step));
        out.push(Message::NoteOff(current));
        remaining -= step;
        current = if current == first { second } else { first };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Message::*;
    use super::PendingEntry::{Marker, Pitch};

    fn total_delay(messages: &[Message]) -> u64 {
        messages.iter().map(Message::delay_ticks).sum()
    }

    #[test]
    fn test_exact_divider_ten_by_three() {
        let mut divider = ExactDivider::new();
        let shares = [divider.divide(10, 3), divider.divide(10, 3), divider.divide(10, 3)];
        assert_eq!(shares, [3, 3, 4]);
        assert_eq!(shares.iter().sum::<u64>(), 10);
    }

    #[test]
    fn test_exact_divider_never_drifts() {
        for divisor in 1..=17u64 {
            for total in [0u64, 1, 7, 100, 959, 960, 12345] {
                let mut divider = ExactDivider::new();
                let sum: u64 = (0..divisor).map(|_| divider.divide(total, divisor)).sum();
                assert_eq!(sum, total, "total {} divisor {}", total, divisor);
            }
        }
    }

    #[test]
    fn test_exact_divider_zero_divisor() {
        assert_eq!(ExactDivider::new().divide(10, 0), 0);
    }

    #[test]
    fn test_plain_chord() {
        let messages = distribute(&[Pitch(60), Marker(Operator::Separator), Pitch(64)], 480, 0, 0).unwrap();
        assert_eq!(
            messages,
            vec![NoteOn(60), NoteOn(64), Delay(480), NoteOff(60), NoteOff(64)]
        );
    }

    #[test]
    fn test_empty_chord_is_silence() {
        assert_eq!(distribute(&[], 120, 0, 0).unwrap(), vec![Delay(120)]);
    }

    #[test]
    fn test_divider_groups() {
        let entries = [
            Pitch(60),
            Marker(Operator::Divider),
            Pitch(62),
            Marker(Operator::Divider),
            Pitch(64),
        ];
        let messages = distribute(&entries, 100, 0, 0).unwrap();
        assert_eq!(
            messages,
            vec![
                NoteOn(60), Delay(33), NoteOff(60),
                NoteOn(62), Delay(33), NoteOff(62),
                NoteOn(64), Delay(34), NoteOff(64),
            ]
        );
    }

    #[test]
    fn test_divider_with_silent_group() {
        let entries = [Pitch(60), Marker(Operator::Divider)];
        let messages = distribute(&entries, 60, 0, 0).unwrap();
        assert_eq!(messages, vec![NoteOn(60), Delay(30), NoteOff(60), Delay(30)]);
    }

    #[test]
    fn test_roll_arpeggio_single_marker() {
        let entries = [Pitch(60), Marker(Operator::Arpeggio(ArpeggioStyle::Roll)), Pitch(64)];
        let messages = distribute(&entries, 480, 0, 0).unwrap();
        assert_eq!(
            messages,
            vec![NoteOn(60), Delay(48), NoteOn(64), Delay(432), NoteOff(60), NoteOff(64)]
        );
    }

    #[test]
    fn test_roll_arpeggio_many_markers() {
        let roll = Marker(Operator::Arpeggio(ArpeggioStyle::Roll));
        let entries = [Pitch(60), roll, Pitch(64), roll, Pitch(67)];
        let messages = distribute(&entries, 480, 0, 0).unwrap();
        // two markers: each slice is 480 / (10 × 1)
        assert_eq!(
            messages,
            vec![
                NoteOn(60), Delay(48), NoteOn(64), Delay(48), NoteOn(67), Delay(384),
                NoteOff(60), NoteOff(64), NoteOff(67),
            ]
        );
    }

    #[test]
    fn test_spread_and_quick_arpeggios() {
        let spread = Marker(Operator::Arpeggio(ArpeggioStyle::Spread));
        let messages = distribute(&[Pitch(60), spread, Pitch(64), spread, Pitch(67)], 1000, 0, 0).unwrap();
        // 3 × 1000 / 20 = 150 per marker
        assert_eq!(messages[1], Delay(150));
        assert_eq!(messages[3], Delay(150));
        assert_eq!(total_delay(&messages), 1000);

        let quick = Marker(Operator::Arpeggio(ArpeggioStyle::Quick));
        let messages = distribute(&[Pitch(60), quick, Pitch(64)], 1000, 0, 0).unwrap();
        assert_eq!(messages[1], Delay(150));
        assert_eq!(total_delay(&messages), 1000);
    }

    #[test]
    fn test_arpeggio_length_is_preserved_with_remainders() {
        let spread = Marker(Operator::Arpeggio(ArpeggioStyle::Spread));
        let entries = [Pitch(60), spread, Pitch(62), spread, Pitch(64), spread, Pitch(65)];
        for length in [1u64, 7, 31, 97, 959] {
            let messages = distribute(&entries, length, 0, 0).unwrap();
            assert_eq!(total_delay(&messages), length);
        }
    }

    #[test]
    fn test_ornament_alternates() {
        let entries = [Pitch(72), Marker(Operator::Ornament), Pitch(74)];
        // bpm 3600: step = 3600 × 32 / 720 = 160
        let messages = distribute(&entries, 400, 3600 * 32, 0).unwrap();
        assert_eq!(
            messages,
            vec![
                NoteOn(72), Delay(160), NoteOff(72),
                NoteOn(74), Delay(160), NoteOff(74),
                NoteOn(72), Delay(80), NoteOff(72),
            ]
        );
    }

    #[test]
    fn test_ornament_shorter_than_step() {
        let entries = [Pitch(72), Marker(Operator::Ornament), Pitch(74)];
        let messages = distribute(&entries, 100, 3600 * 32, 0).unwrap();
        assert_eq!(messages, vec![NoteOn(72), Delay(100), NoteOff(72)]);
    }

    #[test]
    fn test_ornament_exact_multiple_of_step() {
        let entries = [Pitch(72), Marker(Operator::Ornament), Pitch(74)];
        let messages = distribute(&entries, 320, 3600 * 32, 0).unwrap();
        assert_eq!(
            messages,
            vec![NoteOn(72), Delay(160), NoteOff(72), NoteOn(74), Delay(160), NoteOff(74)]
        );
    }

    #[test]
    fn test_malformed_ornaments() {
        let ornament = Marker(Operator::Ornament);
        assert!(distribute(&[Pitch(72), ornament], 100, 3600 * 32, 0).is_err());
        assert!(distribute(&[Pitch(72), ornament, Pitch(74), Pitch(76)], 100, 3600 * 32, 0).is_err());
        assert!(distribute(&[Pitch(10), ornament, Pitch(74)], 100, 3600 * 32, 0).is_err());
        assert!(distribute(&[Pitch(72), ornament, ornament, Pitch(74)], 100, 3600 * 32, 0).is_err());
    }

    #[test]
    fn test_conflicting_operators() {
        let entries = [
            Pitch(60),
            Marker(Operator::Arpeggio(ArpeggioStyle::Roll)),
            Pitch(64),
            Marker(Operator::Arpeggio(ArpeggioStyle::Spread)),
            Pitch(67),
        ];
        let err = distribute(&entries, 100, 0, 9).unwrap_err();
        assert!(matches!(err, ScoreError::NotationSyntax { position: 9, .. }));
    }

    #[test]
    fn test_divider_with_arpeggio_group() {
        let roll = Marker(Operator::Arpeggio(ArpeggioStyle::Roll));
        let entries = [Pitch(60), roll, Pitch(64), Marker(Operator::Divider), Pitch(67)];
        let messages = distribute(&entries, 200, 0, 0).unwrap();
        assert_eq!(
            messages,
            vec![
                NoteOn(60), Delay(10), NoteOn(64), Delay(90), NoteOff(60), NoteOff(64),
                NoteOn(67), Delay(100), NoteOff(67),
            ]
        );
    }
}
