//! The currently loaded level.
//!
//! A load compiles into a fresh [`CompiledLevel`] and only replaces the
//! current one once compilation has fully succeeded.

use crate::consume::ConsumptionTracker;
use crate::error::ScoreError;
use crate::options::CompileOptions;
use crate::{compile_level, CompiledLevel};

#[derive(Debug, Clone, Default)]
pub struct LevelSlot {
    options: CompileOptions,
    current: Option<CompiledLevel>,
    tracker: ConsumptionTracker,
}

impl LevelSlot {
    pub fn new(options: CompileOptions) -> Self {
        let tracker = ConsumptionTracker::new(&options.tracker);
        Self {
            options,
            current: None,
            tracker,
        }
    }

    /// Compile `json` and make it the current level.
    ///
    /// On error the previous level and its consumption state stay untouched.
    pub fn load(&mut self, json: &str) -> Result<&CompiledLevel, ScoreError> {
        let compiled = match compile_level(json, &self.options) {
            Ok(compiled) => compiled,
            Err(e) => {
                log::info!("level load failed, keeping previous level: {}", e);
                return Err(e);
            }
        };

        log::info!(
            "level loaded: {} rows, {} sections, {} notes",
            compiled.rows.len(),
            compiled.sections.len(),
            compiled.timeline.note_count()
        );
        self.tracker.reset();
        Ok(&*self.current.insert(compiled))
    }

    pub fn current(&self) -> Option<&CompiledLevel> {
        self.current.as_ref()
    }

    /// Consume indicators of the current level up to `now`. Returns the ids
    /// consumed by this call.
    pub fn scan(&mut self, now: f64) -> Vec<String> {
        match self.current.as_mut() {
            Some(level) => self.tracker.scan_indicators(&mut level.indicators, now),
            None => Vec::new(),
        }
    }

    /// Drop the current level.
    pub fn unload(&mut self) -> Option<CompiledLevel> {
        self.tracker.reset();
        self.current.take()
    }
}
