//! # Decode Tables
//!
//! Static mappings shared by both notations:
//! - duration letters `H`..`P` and rest letters `Q`..`Y` to letter units
//! - note-name tokens to MIDI pitch numbers
//! - supported `baseBeats` multipliers to ticks per letter unit
//!
//! Pure lookups, no state.

/// Pseudo-pitch for `mute`/`empty`: a slot that sounds nothing.
pub const MUTE_PITCH: u8 = 1;

/// Ornament pitches must be at or above this floor (anything below is a sentinel).
pub const PITCH_SENTINEL_FLOOR: u8 = 20;

/// Lowest and highest playable pitch (88-key range).
pub const LOWEST_PITCH: u8 = 21;
pub const HIGHEST_PITCH: u8 = 108;

/// Units for a duration letter (`H`=256 halving down to `P`=1).
pub fn duration_letter(c: char) -> Option<u32> {
    match c {
        'H' => Some(256),
        'I' => Some(128),
        'J' => Some(64),
        'K' => Some(32),
        'L' => Some(16),
        'M' => Some(8),
        'N' => Some(4),
        'O' => Some(2),
        'P' => Some(1),
        _ => None,
    }
}

/// Units for a rest letter (`Q`=256 halving down to `Y`=1).
pub fn rest_letter(c: char) -> Option<u32> {
    match c {
        'Q' => Some(256),
        'R' => Some(128),
        'S' => Some(64),
        'T' => Some(32),
        'U' => Some(16),
        'V' => Some(8),
        'W' => Some(4),
        'X' => Some(2),
        'Y' => Some(1),
        _ => None,
    }
}

/// Sum of all duration letters in `s`; every other character is ignored.
///
/// # Example
/// ```
/// use tilescore::tables::extract_duration_letters;
///
/// assert_eq!(extract_duration_letters("c.LN"), 20);
/// assert_eq!(extract_duration_letters("NL"), 20);
/// ```
pub fn extract_duration_letters(s: &str) -> u64 {
    s.chars().filter_map(duration_letter).map(u64::from).sum()
}

/// Sum of all rest letters in `s`; every other character is ignored.
pub fn extract_rest_letters(s: &str) -> u64 {
    s.chars().filter_map(rest_letter).map(u64::from).sum()
}

/// True when `s` is non-empty and made only of rest letters.
pub fn is_only_rest_letters(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| rest_letter(c).is_some())
}

/// Resolve a note-name token to its pitch number.
///
/// - `c d e f g a b` start at MIDI 60; a digit suffix raises by octaves (`c1` = 72)
/// - `C D E F G A B` start at MIDI 48; a `-N` suffix lowers by octaves (`A-3` = 21)
/// - a leading `#` sharpens
/// - `mute` and `empty` resolve to [`MUTE_PITCH`]
///
/// Returns `None` for anything else, including names outside the 88-key range.
///
/// # Examples
/// ```
/// use tilescore::tables::pitch_for;
///
/// assert_eq!(pitch_for("c"), Some(60));
/// assert_eq!(pitch_for("#f1"), Some(78));
/// assert_eq!(pitch_for("A-3"), Some(21));
/// assert_eq!(pitch_for("c4"), Some(108));
/// assert_eq!(pitch_for("mute"), Some(1));
/// assert_eq!(pitch_for("d4"), None);
/// ```
pub fn pitch_for(token: &str) -> Option<u8> {
    if token == "mute" || token == "empty" {
        return Some(MUTE_PITCH);
    }

    let (sharp, rest) = match token.strip_prefix('#') {
        Some(rest) => (1, rest),
        None => (0, token),
    };

    let mut chars = rest.chars();
    let letter = chars.next()?;
    let suffix = chars.as_str();

    let step = match letter.to_ascii_lowercase() {
        'c' => 0,
        'd' => 2,
        'e' => 4,
        'f' => 5,
        'g' => 7,
        'a' => 9,
        'b' => 11,
        _ => return None,
    };

    let octave_base: i32 = if letter.is_ascii_lowercase() {
        let octaves_up = match suffix {
            "" => 0,
            "1" => 1,
            "2" => 2,
            "3" => 3,
            "4" => 4,
            _ => return None,
        };
        60 + 12 * octaves_up
    } else {
        let octaves_down = match suffix {
            "" => 0,
            "-1" => 1,
            "-2" => 2,
            "-3" => 3,
            _ => return None,
        };
        48 - 12 * octaves_down
    };

    let pitch = octave_base + step + sharp;
    if (LOWEST_PITCH as i32..=HIGHEST_PITCH as i32).contains(&pitch) {
        Some(pitch as u8)
    } else {
        None
    }
}

/// Supported `baseBeats` values with their ticks per letter unit.
///
/// Each entry satisfies `ticks_per_unit = 30 / baseBeats`, so one tile
/// (`32 × baseBeats` units) always spans one quarter note at 960 PPQ.
const BASE_BEATS_TABLE: &[(f64, u32)] = &[
    (0.125, 240),
    (0.25, 120),
    (0.3, 100),
    (0.375, 80),
    (0.5, 60),
    (0.6, 50),
    (0.75, 40),
    (1.0, 30),
    (1.2, 25),
    (1.25, 24),
    (1.5, 20),
    (2.0, 15),
    (2.5, 12),
    (3.0, 10),
    (5.0, 6),
    (6.0, 5),
    (7.5, 4),
    (10.0, 3),
    (15.0, 2),
    (30.0, 1),
];

/// Ticks per letter unit for a supported `baseBeats` value.
pub fn ticks_per_unit(base_beats: f64) -> Option<u32> {
    BASE_BEATS_TABLE
        .iter()
        .find(|(value, _)| (value - base_beats).abs() < 1e-9)
        .map(|&(_, ticks)| ticks)
}
