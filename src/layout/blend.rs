//! Track blending: secondary scores promote primary rests into playable tiles.
//!
//! A primary rest component is "blended" when any non-rest component of a
//! secondary score overlaps it in time. Blended rests become SINGLE rows.

use super::component::{parse_components, Component};
use std::collections::BTreeSet;

/// Time window of one component, in letter units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub start: u64,
    pub end: u64,
    /// Position in the component list.
    pub index: usize,
    pub is_rest: bool,
}

impl TimelineEntry {
    /// Half-open interval overlap.
    pub fn overlaps(&self, other: &TimelineEntry) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Running windows for a component list.
pub fn component_windows(components: &[Component]) -> Vec<TimelineEntry> {
    let mut cursor = 0;
    components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            let start = cursor;
            cursor += component.duration;
            TimelineEntry {
                start,
                end: cursor,
                index,
                is_rest: component.is_rest(),
            }
        })
        .collect()
}

/// Indices of primary rest components that some secondary note overlaps.
///
/// `secondary` holds every score after the first in the same music section.
pub fn blended_rests(primary: &[Component], secondary: &[&str]) -> BTreeSet<usize> {
    let primary_windows = component_windows(primary);
    let rests: Vec<&TimelineEntry> = primary_windows.iter().filter(|e| e.is_rest).collect();

    let mut blended = BTreeSet::new();
    if rests.is_empty() {
        return blended;
    }

    for score in secondary {
        let components = parse_components(score);
        for entry in component_windows(&components).iter().filter(|e| !e.is_rest) {
            for rest in &rests {
                if entry.overlaps(rest) {
                    blended.insert(rest.index);
                }
            }
        }
    }

    blended
}
