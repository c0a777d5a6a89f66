//! Single-pass character scanner for the rich notation.
//!
//! Grammar, informally:
//!
//! ```text
//! score  := (unit | rest | filler) { (',' | ';') (unit | rest | filler) }
//! unit   := '(' entry* ')' '[' letter+ ']'
//! entry  := note-name | operator
//! rest   := rest-letter+
//! filler := whitespace, digits, '<' '>' '{' '}'
//! ```
//!
//! The grammar lives in [`transition`], a pure function over `(Mode, CharClass)`.
//! [`Scanner`] only carries out the returned actions.

use super::distribute::distribute;
use super::message::{Message, Operator, PendingEntry};
use crate::error::{check_ticks, ScoreError};
use crate::tables::{duration_letter, pitch_for, rest_letter, MUTE_PITCH};

/// Scanner mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Between units.
    Idle,
    /// Reading a bare run of rest letters.
    Rest,
    /// Inside `( )`.
    Notes,
    /// After `)`, waiting for `[`.
    ChordClosed,
    /// Inside `[ ]`.
    Length,
    /// After `]`, waiting for a separator.
    Closed,
}

/// Character classes the grammar distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Digit(char),
    /// `<` `>` `{` `}`
    Filler,
    /// `,` `;`
    Separator,
    ChordOpen,
    ChordClose,
    LengthOpen,
    LengthClose,
    Operator(Operator),
    Letter(char),
    /// `#` and `-` inside note names
    NameMark(char),
    Other(char),
}

impl CharClass {
    pub fn of(c: char) -> Self {
        if let Some(op) = Operator::from_char(c) {
            return CharClass::Operator(op);
        }
        match c {
            c if c.is_whitespace() => CharClass::Whitespace,
            '0'..='9' => CharClass::Digit(c),
            '<' | '>' | '{' | '}' => CharClass::Filler,
            ',' | ';' => CharClass::Separator,
            '(' => CharClass::ChordOpen,
            ')' => CharClass::ChordClose,
            '[' => CharClass::LengthOpen,
            ']' => CharClass::LengthClose,
            '#' | '-' => CharClass::NameMark(c),
            c if c.is_ascii_alphabetic() => CharClass::Letter(c),
            c => CharClass::Other(c),
        }
    }
}

/// What the scanner does with the current character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Skip,
    BeginChord,
    NameChar(char),
    FlushName,
    PushOperator(Operator),
    AddLength(char),
    FinishUnit,
    AddRest(char),
    FinishRest,
}

/// The grammar. `None` means the character is not allowed in this mode.
pub fn transition(mode: Mode, class: CharClass) -> Option<(Mode, Action)> {
    use CharClass as C;

    let is_rest = |c: char| rest_letter(c).is_some();
    let is_length = |c: char| duration_letter(c).is_some() || rest_letter(c).is_some();

    match (mode, class) {
        (Mode::Idle, C::Whitespace | C::Digit(_) | C::Filler | C::Separator) => {
            Some((Mode::Idle, Action::Skip))
        }
        (Mode::Idle, C::ChordOpen) => Some((Mode::Notes, Action::BeginChord)),
        (Mode::Idle, C::Letter(c)) if is_rest(c) => Some((Mode::Rest, Action::AddRest(c))),

        (Mode::Rest, C::Letter(c)) if is_rest(c) => Some((Mode::Rest, Action::AddRest(c))),
        (Mode::Rest, C::Whitespace | C::Digit(_) | C::Filler | C::Separator) => {
            Some((Mode::Idle, Action::FinishRest))
        }

        (Mode::Notes, C::Letter(c) | C::Digit(c) | C::NameMark(c)) => {
            Some((Mode::Notes, Action::NameChar(c)))
        }
        (Mode::Notes, C::Whitespace) => Some((Mode::Notes, Action::FlushName)),
        (Mode::Notes, C::Operator(op)) => Some((Mode::Notes, Action::PushOperator(op))),
        (Mode::Notes, C::ChordClose) => Some((Mode::ChordClosed, Action::FlushName)),

        (Mode::ChordClosed, C::Whitespace) => Some((Mode::ChordClosed, Action::Skip)),
        (Mode::ChordClosed, C::LengthOpen) => Some((Mode::Length, Action::Skip)),

        (Mode::Length, C::Letter(c)) if is_length(c) => Some((Mode::Length, Action::AddLength(c))),
        (Mode::Length, C::Whitespace) => Some((Mode::Length, Action::Skip)),
        (Mode::Length, C::LengthClose) => Some((Mode::Closed, Action::FinishUnit)),

        (Mode::Closed, C::Separator) => Some((Mode::Idle, Action::Skip)),
        (Mode::Closed, C::Whitespace | C::Digit(_) | C::Filler) => Some((Mode::Closed, Action::Skip)),

        _ => None,
    }
}

/// Scanner state for one score.
pub struct Scanner {
    ticks_per_unit: u64,
    ornament_total: u64,
    mode: Mode,
    name: String,
    name_start: usize,
    pending: Vec<PendingEntry>,
    length_units: u64,
    rest_units: u64,
    messages: Vec<Message>,
    /// Ticks emitted so far.
    elapsed: u64,
}

impl Scanner {
    /// `ticks_per_unit` scales letter units to ticks; `ornament_total` is
    /// `round(bpm × 32)` for the part the score belongs to.
    pub fn new(ticks_per_unit: u64, ornament_total: u64) -> Self {
        Self {
            ticks_per_unit,
            ornament_total,
            mode: Mode::Idle,
            name: String::new(),
            name_start: 0,
            pending: Vec::new(),
            length_units: 0,
            rest_units: 0,
            messages: Vec::new(),
            elapsed: 0,
        }
    }

    /// Scan a whole score into its message stream.
    pub fn scan(mut self, score: &str) -> Result<Vec<Message>, ScoreError> {
        let mut position = 0;
        for (i, c) in score.chars().enumerate() {
            position = i;
            let (mode, action) = transition(self.mode, CharClass::of(c)).ok_or_else(|| {
                ScoreError::syntax(i, format!("Unexpected character '{}'", c))
            })?;
            self.apply(action, i)?;
            self.mode = mode;
        }

        match self.mode {
            Mode::Idle | Mode::Closed => {}
            Mode::Rest => self.apply(Action::FinishRest, position)?,
            _ => {
                return Err(ScoreError::syntax(
                    score.chars().count(),
                    "Incomplete unit at end of score",
                ))
            }
        }
        Ok(self.messages)
    }

    fn apply(&mut self, action: Action, position: usize) -> Result<(), ScoreError> {
        match action {
            Action::Skip => {}
            Action::BeginChord => {
                self.pending.clear();
                self.name.clear();
                self.length_units = 0;
            }
            Action::NameChar(c) => {
                if self.name.is_empty() {
                    self.name_start = position;
                }
                self.name.push(c);
            }
            Action::FlushName => self.flush_name()?,
            Action::PushOperator(op) => {
                self.flush_name()?;
                self.pending.push(PendingEntry::Marker(op));
            }
            Action::AddLength(c) => {
                let units = duration_letter(c).or_else(|| rest_letter(c)).unwrap_or(0);
                self.length_units += u64::from(units);
                check_ticks(self.length_units * self.ticks_per_unit)?;
            }
            Action::FinishUnit => {
                if self.length_units == 0 {
                    return Err(ScoreError::syntax(position, "Incomplete unit: empty length code"));
                }
                let length = check_ticks(self.length_units * self.ticks_per_unit)?;
                self.advance(length)?;
                let expanded = distribute(&self.pending, length, self.ornament_total, position)?;
                self.messages.extend(expanded);
                self.pending.clear();
                self.length_units = 0;
            }
            Action::AddRest(c) => {
                self.rest_units += u64::from(rest_letter(c).unwrap_or(0));
                check_ticks(self.rest_units * self.ticks_per_unit)?;
            }
            Action::FinishRest => {
                let ticks = check_ticks(self.rest_units * self.ticks_per_unit)?;
                self.advance(ticks)?;
                self.messages.push(Message::Delay(ticks));
                self.rest_units = 0;
            }
        }
        Ok(())
    }

    /// Add to the running track total, which shares the per-unit cap.
    fn advance(&mut self, ticks: u64) -> Result<(), ScoreError> {
        self.elapsed = check_ticks(self.elapsed + ticks)?;
        Ok(())
    }

    fn flush_name(&mut self) -> Result<(), ScoreError> {
        if self.name.is_empty() {
            return Ok(());
        }
        let pitch = pitch_for(&self.name).ok_or_else(|| {
            ScoreError::syntax(self.name_start, format!("Unknown note name '{}'", self.name))
        })?;
        if pitch != MUTE_PITCH {
            self.pending.push(PendingEntry::Pitch(pitch));
        }
        self.name.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Message::*;

    fn scan(score: &str) -> Result<Vec<Message>, ScoreError> {
        Scanner::new(1, 3600 * 32).scan(score)
    }

    fn position_of(err: ScoreError) -> usize {
        match err {
            ScoreError::NotationSyntax { position, .. } => position,
            other => panic!("expected notation error, got {:?}", other),
        }
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(
            transition(Mode::Idle, CharClass::of('(')),
            Some((Mode::Notes, Action::BeginChord))
        );
        assert_eq!(
            transition(Mode::Notes, CharClass::of('~')),
            Some((Mode::Notes, Action::PushOperator(Operator::Divider)))
        );
        assert_eq!(
            transition(Mode::Length, CharClass::of(']')),
            Some((Mode::Closed, Action::FinishUnit))
        );
        assert_eq!(transition(Mode::Idle, CharClass::of(')')), None);
        assert_eq!(transition(Mode::Closed, CharClass::of('(')), None);
        assert_eq!(transition(Mode::Length, CharClass::of('c')), None);
        assert_eq!(transition(Mode::ChordClosed, CharClass::of(',')), None);
    }

    #[test]
    fn test_single_note() {
        assert_eq!(scan("(c)[N]").unwrap(), vec![NoteOn(60), Delay(4), NoteOff(60)]);
    }

    #[test]
    fn test_units_and_separators() {
        let messages = scan("(c)[L], (e.g)[K];(a)[LL]").unwrap();
        assert_eq!(
            messages,
            vec![
                NoteOn(60), Delay(16), NoteOff(60),
                NoteOn(64), NoteOn(67), Delay(32), NoteOff(64), NoteOff(67),
                NoteOn(69), Delay(32), NoteOff(69),
            ]
        );
    }

    #[test]
    fn test_bare_rests() {
        let messages = scan("(c)[K],UV,(d)[K]").unwrap();
        assert_eq!(messages[3], Delay(24));
        assert_eq!(scan("T").unwrap(), vec![Delay(32)]);
    }

    #[test]
    fn test_mute_keeps_length_only() {
        assert_eq!(scan("(mute)[K]").unwrap(), vec![Delay(32)]);
        assert_eq!(
            scan("(c.empty)[K]").unwrap(),
            vec![NoteOn(60), Delay(32), NoteOff(60)]
        );
    }

    #[test]
    fn test_rest_letters_in_length() {
        assert_eq!(scan("(c)[KU]").unwrap(), vec![NoteOn(60), Delay(48), NoteOff(60)]);
    }

    #[test]
    fn test_filler_is_ignored() {
        let messages = scan("5<(c)[L],(e)[L]>, {2<(g)[K]>}").unwrap();
        assert_eq!(messages.iter().map(Message::delay_ticks).sum::<u64>(), 64);
    }

    #[test]
    fn test_ticks_per_unit_scaling() {
        let messages = Scanner::new(30, 0).scan("(c)[N]").unwrap();
        assert_eq!(messages, vec![NoteOn(60), Delay(120), NoteOff(60)]);
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(position_of(scan("(c)[L]x").unwrap_err()), 6);
        assert_eq!(position_of(scan("(c)(L)").unwrap_err()), 3);
        assert_eq!(position_of(scan("(c)[Lc]").unwrap_err()), 5);
        assert_eq!(position_of(scan("(c)[L](d)[L]").unwrap_err()), 6);
    }

    #[test]
    fn test_unknown_note_name() {
        let err = scan("(c.zz)[L]").unwrap_err();
        assert_eq!(position_of(err.clone()), 3);
        assert!(err.to_string().contains("zz"));
    }

    #[test]
    fn test_incomplete_unit() {
        for score in ["(c", "(c)", "(c)[L", "(c)["] {
            let err = scan(score).unwrap_err();
            assert!(err.to_string().contains("Incomplete"), "{}", score);
        }
    }

    #[test]
    fn test_length_overflow() {
        let long = format!("(c)[{}]", "H".repeat(70_000));
        assert!(matches!(scan(&long), Err(ScoreError::Overflow { .. })));
        let rest = "Q".repeat(70_000);
        assert!(matches!(scan(&rest), Err(ScoreError::Overflow { .. })));
    }

    #[test]
    fn test_track_total_overflow() {
        let fits = "(c)[HHHH],".repeat(500);
        assert!(Scanner::new(30, 0).scan(&fits).is_ok());

        let too_long = "(c)[HHHH],".repeat(600);
        assert!(matches!(
            Scanner::new(30, 0).scan(&too_long),
            Err(ScoreError::Overflow { .. })
        ));

        let rests = "QQQQ,".repeat(600);
        assert!(matches!(
            Scanner::new(30, 0).scan(&rests),
            Err(ScoreError::Overflow { .. })
        ));
    }

    #[test]
    fn test_empty_length_code() {
        let err = scan("(c)[],(d)[K]").unwrap_err();
        assert_eq!(position_of(err.clone()), 4);
        assert!(err.to_string().contains("empty length code"));
        assert!(scan("(c)[ ]").is_err());
    }

    #[test]
    fn test_empty_score() {
        assert!(scan("").unwrap().is_empty());
        assert!(scan("  ,; ").unwrap().is_empty());
    }
}
