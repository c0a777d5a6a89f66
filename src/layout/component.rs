//! Row-layout reading of a score: split into components and classify each one.

use crate::tables::{extract_duration_letters, extract_rest_letters, is_only_rest_letters};
use serde::Serialize;

/// Tile shape of a component or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Single,
    Double,
    Empty,
}

/// One comma/semicolon separated piece of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Letter units.
    pub duration: u64,
    pub kind: TileKind,
}

impl Component {
    pub fn is_rest(&self) -> bool {
        self.kind == TileKind::Empty
    }
}

/// Split a score on `,`/`;` outside angle-bracket groups.
///
/// Empty pieces (doubled or trailing separators) are dropped. Nested `<`/`>`
/// are depth-tracked so a whole `5<...>` group stays one piece.
///
/// # Example
/// ```
/// use tilescore::layout::split_components;
///
/// assert_eq!(
///     split_components("(c)[L], 5<(e)[M],(g)[M]>;U"),
///     vec!["(c)[L]", "5<(e)[M],(g)[M]>", "U"]
/// );
/// ```
pub fn split_components(score: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in score.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' | ';' if depth == 0 => {
                pieces.push(&score[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&score[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Classify one component.
///
/// - `digit<content>`: duration = duration letters in `content`; `5` is DOUBLE, other digits SINGLE
/// - only rest letters: EMPTY with duration = rest letters
/// - anything else: SINGLE with duration = duration letters
///
/// # Example
/// ```
/// use tilescore::layout::{parse_component, TileKind};
///
/// let component = parse_component("5<c.N>");
/// assert_eq!(component.kind, TileKind::Double);
/// assert_eq!(component.duration, 4);
/// ```
pub fn parse_component(component: &str) -> Component {
    let trimmed = component.trim();

    if let Some((digit, content)) = chord_group(trimmed) {
        return Component {
            duration: extract_duration_letters(content),
            kind: if digit == '5' {
                TileKind::Double
            } else {
                TileKind::Single
            },
        };
    }

    if is_only_rest_letters(trimmed) {
        return Component {
            duration: extract_rest_letters(trimmed),
            kind: TileKind::Empty,
        };
    }

    Component {
        duration: extract_duration_letters(trimmed),
        kind: TileKind::Single,
    }
}

/// Match `digit<content>` and return the digit and the content.
fn chord_group(s: &str) -> Option<(char, &str)> {
    let mut chars = s.chars();
    let digit = chars.next().filter(char::is_ascii_digit)?;
    let inner = chars.as_str().strip_prefix('<')?.strip_suffix('>')?;
    Some((digit, inner))
}

/// Parse every component of a score.
pub fn parse_components(score: &str) -> Vec<Component> {
    split_components(score)
        .into_iter()
        .map(parse_component)
        .collect()
}
