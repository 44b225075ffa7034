use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, TrainerError};

/// Sustain length of a beat marker, as a fraction of the beat period: the
/// marker fades 30% of a period after the next beat would land. Inherited
/// from the reference behaviour; it has no documented musical rationale, so
/// it is kept as a named, configurable value rather than a magic number.
pub const FADE_SUSTAIN_RATIO: f64 = 1.3;

const NANOS_PER_MINUTE: f64 = 60.0 * 1_000_000_000.0;

/// Top-level configuration for the trainer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrainerConfig {
    pub tempo: TempoConfig,
    pub exercise: ExerciseConfig,
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        self.tempo.validate()?;
        self.exercise.validate()
    }
}

/// Tempo and staff geometry parameters. Immutable once handed to the
/// scheduler or layout; a change means building both anew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempoConfig {
    pub bpm: f64,
    pub beats_per_measure: u32,
    pub num_measures: u32,
    /// Blank columns between neighbouring staff elements.
    pub spacing: u16,
    /// See [`FADE_SUSTAIN_RATIO`].
    pub fade_sustain_ratio: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            bpm: 80.0,
            beats_per_measure: 4,
            num_measures: 4,
            spacing: 3,
            fade_sustain_ratio: FADE_SUSTAIN_RATIO,
        }
    }
}

impl TempoConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(TrainerError::InvalidConfig("bpm must be a positive number"));
        }
        if self.beats_per_measure == 0 {
            return Err(TrainerError::InvalidConfig(
                "beats_per_measure must be at least 1",
            ));
        }
        if self.num_measures == 0 {
            return Err(TrainerError::InvalidConfig("num_measures must be at least 1"));
        }
        if !self.fade_sustain_ratio.is_finite() || self.fade_sustain_ratio <= 1.0 {
            return Err(TrainerError::InvalidConfig(
                "fade_sustain_ratio must exceed 1.0",
            ));
        }
        Ok(())
    }

    /// Duration of one beat in nanoseconds.
    pub fn beat_period_ns(&self) -> u64 {
        (NANOS_PER_MINUTE / self.bpm).round() as u64
    }

    /// Offset from the preparation instant to the first marker fade. Each
    /// later fade follows one beat period after the previous one.
    pub fn fade_offset_ns(&self) -> u64 {
        (self.fade_sustain_ratio * NANOS_PER_MINUTE / self.bpm).round() as u64
    }

    /// Wall-clock length of a rest expressed in measures. The exercise flow
    /// uses this same conversion so combined display stays tempo-consistent
    /// with the beat engine.
    pub fn rest_duration(&self, measures: f64) -> Duration {
        Duration::from_secs_f64(measures * self.beats_per_measure as f64 * 60.0 / self.bpm)
    }
}

/// Parameters of the practice-prompt flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub notes_per_attempt: u32,
    pub attempts_per_exercise: u32,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            notes_per_attempt: 3,
            attempts_per_exercise: 3,
        }
    }
}

impl ExerciseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.notes_per_attempt == 0 {
            return Err(TrainerError::InvalidConfig(
                "notes_per_attempt must be at least 1",
            ));
        }
        if self.notes_per_attempt as usize > crate::exercise::NOTE_NAMES.len() {
            return Err(TrainerError::InvalidConfig(
                "notes_per_attempt exceeds the available note names",
            ));
        }
        if self.attempts_per_exercise == 0 {
            return Err(TrainerError::InvalidConfig(
                "attempts_per_exercise must be at least 1",
            ));
        }
        Ok(())
    }
}
