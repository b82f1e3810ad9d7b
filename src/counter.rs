//! The counter: +50 / -50 adjustments, each recorded in the history table

use crate::contract;
use crate::history::HistoryRecord;
use crate::preferences::Preferences;
use crate::provider::HistoryProvider;
use crate::uri::ContentUri;
use crate::{Error, Result};

/// Size of one adjustment
pub const STEP: i64 = 50;

/// Sound played for an action. Playback itself happens outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Plus,
    Minus,
    /// A minus that hit the floor at zero
    Over,
}

impl SoundCue {
    /// Name of the audio asset for this cue
    pub fn asset(self) -> &'static str {
        match self {
            SoundCue::Plus => "plus",
            SoundCue::Minus => "minus",
            SoundCue::Over => "over",
        }
    }
}

/// Result of one button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub count: i64,
    pub change: i64,
    pub cue: SoundCue,
    /// URI of the history row written for this press
    pub record_uri: ContentUri,
}

pub struct Counter<'a> {
    provider: &'a HistoryProvider,
    prefs: Preferences,
    value: i64,
}

impl<'a> Counter<'a> {
    /// Load the saved value from `prefs`
    pub fn load(provider: &'a HistoryProvider, prefs: Preferences) -> Result<Self> {
        let value = prefs.saved_count()?;
        Ok(Self { provider, prefs, value })
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Add a step. Fails without recording anything if the saved value is
    /// too large to step up.
    pub fn plus(&mut self) -> Result<Adjustment> {
        let next = self.value.checked_add(STEP).ok_or_else(|| {
            Error::Preferences(format!("counter value {} cannot grow by {}", self.value, STEP))
        })?;
        self.apply(next, STEP, SoundCue::Plus)
    }

    /// Subtract a step. The counter never goes below zero; the record still
    /// carries the full `-50` change.
    pub fn minus(&mut self) -> Result<Adjustment> {
        match self.value.checked_sub(STEP) {
            Some(next) if next >= 0 => self.apply(next, -STEP, SoundCue::Minus),
            _ => self.apply(0, -STEP, SoundCue::Over),
        }
    }

    fn apply(&mut self, count: i64, change: i64, cue: SoundCue) -> Result<Adjustment> {
        let record = HistoryRecord::new(count, change, chrono::Utc::now().timestamp_millis());
        let record_uri = self.provider.insert(&contract::history_uri(), &record.to_values())?;

        self.value = count;
        self.prefs.save_count(count)?;
        tracing::info!("Counter {} ({:+}) cue={}", count, change, cue.asset());

        Ok(Adjustment { count, change, cue, record_uri })
    }
}
