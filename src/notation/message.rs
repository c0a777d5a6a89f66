//! Message stream types produced by the rich notation compiler.

/// One event in a track's message stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    NoteOn(u8),
    NoteOff(u8),
    /// Advance time by this many ticks.
    Delay(u64),
    /// Placeholder for an event that no longer sounds.
    Ignore,
}

impl Message {
    pub fn delay_ticks(&self) -> u64 {
        match self {
            Message::Delay(ticks) => *ticks,
            _ => 0,
        }
    }

    pub fn is_note_event(&self) -> bool {
        matches!(self, Message::NoteOn(_) | Message::NoteOff(_))
    }
}

/// Arpeggio flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpeggioStyle {
    /// `@`
    Roll,
    /// `%`
    Spread,
    /// `!`
    Quick,
}

/// Operator glyphs written between notes inside `( )`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `.`
    Separator,
    /// `~` or `$`
    Divider,
    Arpeggio(ArpeggioStyle),
    /// `^` or `&`
    Ornament,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Operator::Separator),
            '~' | '$' => Some(Operator::Divider),
            '@' => Some(Operator::Arpeggio(ArpeggioStyle::Roll)),
            '%' => Some(Operator::Arpeggio(ArpeggioStyle::Spread)),
            '!' => Some(Operator::Arpeggio(ArpeggioStyle::Quick)),
            '^' | '&' => Some(Operator::Ornament),
            _ => None,
        }
    }
}

/// An entry in a chord's pending list: a pitch or an operator marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingEntry {
    Pitch(u8),
    Marker(Operator),
}

/// One compiled score.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub base_beats: f64,
    pub messages: Vec<Message>,
}

impl Track {
    /// Sum of all delays.
    pub fn total_ticks(&self) -> u64 {
        self.messages.iter().map(Message::delay_ticks).sum()
    }

    /// Copy with every note event replaced by `Ignore`.
    pub fn silenced(&self) -> Track {
        Track {
            base_beats: self.base_beats,
            messages: self
                .messages
                .iter()
                .map(|m| if m.is_note_event() { Message::Ignore } else { *m })
                .collect(),
        }
    }
}

/// All tracks of one music section.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Effective bpm: raw bpm × 30 / baseBeats.
    pub bpm: f64,
    pub base_beats: f64,
    pub tracks: Vec<Track>,
}

impl Part {
    /// Length of the longest track.
    pub fn duration_ticks(&self) -> u64 {
        self.tracks.iter().map(Track::total_ticks).max().unwrap_or(0)
    }
}
