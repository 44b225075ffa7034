//! Core library for the Rhythm Trainer application.
//!
//! The crate owns the timing-sensitive half of the trainer: converting a
//! monotonic clock into drift-corrected beat and fade events, fanning those
//! events out to subscribers, and mapping abstract (measure, beat)
//! coordinates to terminal cells. Terminal I/O, argument handling and the
//! control loop live in the application crate; everything here is
//! deterministic and synchronous so it can be driven by tests at simulated
//! time.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod exercise;
pub mod render;
pub mod scheduler;
pub mod staff;

pub use clock::MonotonicClock;
pub use config::{ExerciseConfig, TempoConfig, TrainerConfig, FADE_SUSTAIN_RATIO};
pub use error::{Result, TrainerError};
pub use events::EventBus;
pub use exercise::{Exercise, ExerciseGenerator, MODE_LABELS, NOTE_NAMES};
pub use render::{StaffRenderer, Style, Surface};
pub use scheduler::{BeatPosition, BeatScheduler};
pub use staff::{CellPos, StaffGeometry, ABOVE_BEAT_ROW_OFFSET};
