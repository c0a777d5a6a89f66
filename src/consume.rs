//! Playback consumption of indicators and timeline notes.
//!
//! Each frame the renderer asks which events the playback clock has just
//! passed. An event is due when `now − lookback < time ≤ now` and it has not
//! been consumed yet. Consumed ids are remembered until they fall behind the
//! retention horizon, so a scan repeated at the same or a later time never
//! reports an event twice.
//!
//! Ids are shared between indicators and notes. Use one tracker per consumer.

use crate::indicator::{note_id, Indicator};
use crate::timeline::{Note, Timeline};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Window sizes in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrackerOptions {
    pub lookback: f64,
    /// How long a consumed id is remembered. Never shorter than `lookback`.
    pub retention: f64,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            lookback: 0.25,
            retention: 5.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsumptionTracker {
    lookback: f64,
    retention: f64,
    /// id -> event time
    consumed: HashMap<String, f64>,
    last_prune: Option<f64>,
}

impl ConsumptionTracker {
    pub fn new(options: &TrackerOptions) -> Self {
        let lookback = options.lookback.max(0.0);
        Self {
            lookback,
            retention: options.retention.max(lookback),
            consumed: HashMap::new(),
            last_prune: None,
        }
    }

    fn is_due(&self, time: f64, now: f64) -> bool {
        now - self.lookback < time && time <= now
    }

    /// Record `id` unless it is already consumed. Returns true if newly recorded.
    fn claim(&mut self, id: &str, time: f64) -> bool {
        if self.consumed.contains_key(id) {
            return false;
        }
        self.consumed.insert(id.to_string(), time);
        true
    }

    /// Flip due indicators to consumed and return the ids flipped by this scan.
    pub fn scan_indicators(&mut self, indicators: &mut [Indicator], now: f64) -> Vec<String> {
        let mut fired = Vec::new();
        for indicator in indicators.iter_mut() {
            if indicator.consumed || !self.is_due(indicator.time, now) {
                continue;
            }
            if self.claim(&indicator.note_id, indicator.time) {
                fired.push(indicator.note_id.clone());
            }
            indicator.consumed = true;
        }
        self.maybe_prune(now);
        fired
    }

    /// Timeline notes that became due since the previous scan, with their track index.
    pub fn scan_notes<'a>(&mut self, timeline: &'a Timeline, now: f64) -> Vec<(usize, &'a Note)> {
        let mut fired = Vec::new();
        for (track, note) in timeline.notes() {
            if !self.is_due(note.time, now) {
                continue;
            }
            if self.claim(&note_id(note.time, track, note.pitch), note.time) {
                fired.push((track, note));
            }
        }
        self.maybe_prune(now);
        fired
    }

    pub fn is_consumed(&self, id: &str) -> bool {
        self.consumed.contains_key(id)
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }

    /// Drop ids whose event time is older than `now − retention`.
    pub fn prune(&mut self, now: f64) {
        let horizon = now - self.retention;
        self.consumed.retain(|_, time| *time >= horizon);
        self.last_prune = Some(now);
    }

    fn maybe_prune(&mut self, now: f64) {
        let interval = self.retention / 2.0;
        if self.last_prune.map_or(true, |last| now - last >= interval) {
            self.prune(now);
        }
    }

    /// Forget everything, e.g. when playback restarts from zero.
    pub fn reset(&mut self) {
        self.consumed.clear();
        self.last_prune = None;
    }
}

impl Default for ConsumptionTracker {
    fn default() -> Self {
        Self::new(&TrackerOptions::default())
    }
}
