use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::{config::ExerciseConfig, Result};

/// Note names available to the prompt generator, in natural order.
pub const NOTE_NAMES: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];

/// Chord modes cycled through for each shuffled note set.
pub const MODE_LABELS: [&str; 3] = ["Root", "1st", "2nd"];

/// One practice prompt: the notes to play and the mode to play them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub notes: Vec<&'static str>,
    pub mode: &'static str,
}

impl Exercise {
    /// Header line shown above the staff, e.g. `======= C A F =======`.
    pub fn header(&self) -> String {
        format!("======= {} =======", self.notes.join(" "))
    }
}

/// Produces randomized note/mode prompts, independent of beat timing.
///
/// The caller decides the cadence (rest intervals between prompts); the
/// generator only answers "what comes next".
pub struct ExerciseGenerator {
    config: ExerciseConfig,
    deck: Vec<&'static str>,
    next_mode: usize,
    rng: StdRng,
}

impl ExerciseGenerator {
    pub fn new(config: ExerciseConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic construction for tests and reproducible sessions.
    pub fn with_seed(config: ExerciseConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ExerciseConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            deck: NOTE_NAMES.to_vec(),
            next_mode: 0,
            rng,
        })
    }

    /// Next prompt. The note set is reshuffled each time the mode cycle
    /// wraps back to the first mode, so all modes of one exercise share a
    /// single shuffle.
    pub fn next_exercise(&mut self) -> Exercise {
        if self.next_mode == 0 {
            self.deck.shuffle(&mut self.rng);
        }
        let mode = MODE_LABELS[self.next_mode];
        self.next_mode = (self.next_mode + 1) % MODE_LABELS.len();
        Exercise {
            notes: self.deck[..self.config.notes_per_attempt as usize].to_vec(),
            mode,
        }
    }
}

impl fmt::Debug for ExerciseGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseGenerator")
            .field("config", &self.config)
            .field("deck", &self.deck)
            .field("next_mode", &self.next_mode)
            .finish()
    }
}
