//! Deadline-driven pacing of the practice prompts.
//!
//! The original exercise script slept between prompts; here each prompt
//! holds until its deadline passes so the control loop never blocks and the
//! beat staff keeps animating underneath. Deadlines advance additively,
//! like the beat scheduler's, so prompt cadence stays tempo-consistent.

use rhythm_trainer_core::{Exercise, ExerciseGenerator, TrainerConfig, MODE_LABELS};

const BREAK_BANNER: &str = "********************";

/// One prompt refresh: both lines redrawn above the staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub header: String,
    pub status: String,
}

struct Step {
    header: String,
    status: String,
    hold_measures: f64,
}

/// Walks one exercise cycle at a time: an opening rest, every mode of every
/// attempt, rests between attempts, and a closing break banner. A new cycle
/// (with a fresh shuffle) starts when the previous one is exhausted.
pub struct ExerciseFlow {
    config: TrainerConfig,
    generator: ExerciseGenerator,
    steps: Vec<Step>,
    current_step: usize,
    deadline_ns: u64,
    started: bool,
}

impl ExerciseFlow {
    pub fn new(config: TrainerConfig, generator: ExerciseGenerator) -> Self {
        Self {
            config,
            generator,
            steps: Vec::new(),
            current_step: 0,
            deadline_ns: 0,
            started: false,
        }
    }

    /// Shows the first prompt and arms its hold deadline.
    pub fn start(&mut self, now_ns: u64) -> Prompt {
        self.steps = self.build_cycle();
        self.current_step = 0;
        self.deadline_ns = now_ns + self.hold_ns(self.steps[0].hold_measures);
        self.started = true;
        self.prompt_at(0)
    }

    /// Advances past an expired hold deadline and returns the new prompt,
    /// or `None` while the current prompt still holds.
    pub fn tick(&mut self, now_ns: u64) -> Option<Prompt> {
        if !self.started || now_ns <= self.deadline_ns {
            return None;
        }
        self.current_step += 1;
        if self.current_step == self.steps.len() {
            self.steps = self.build_cycle();
            self.current_step = 0;
        }
        self.deadline_ns += self.hold_ns(self.steps[self.current_step].hold_measures);
        Some(self.prompt_at(self.current_step))
    }

    fn prompt_at(&self, index: usize) -> Prompt {
        let step = &self.steps[index];
        Prompt {
            header: step.header.clone(),
            status: step.status.clone(),
        }
    }

    fn hold_ns(&self, measures: f64) -> u64 {
        self.config.tempo.rest_duration(measures).as_nanos() as u64
    }

    fn build_cycle(&mut self) -> Vec<Step> {
        let rest_measures = self.config.tempo.num_measures;
        let hold = rest_measures as f64;
        let rest_status = format!("rest {rest_measures} measures");

        // One prompt per mode, all sharing the cycle's shuffle.
        let prompts: Vec<Exercise> = MODE_LABELS
            .iter()
            .map(|_| self.generator.next_exercise())
            .collect();
        let header = prompts[0].header();

        let mut steps = vec![Step {
            header: header.clone(),
            status: rest_status.clone(),
            hold_measures: hold,
        }];

        let attempts = self.config.exercise.attempts_per_exercise;
        for attempt in 0..attempts {
            for prompt in &prompts {
                steps.push(Step {
                    header: header.clone(),
                    status: format!("attempt {}: * {}", attempt + 1, prompt.mode),
                    hold_measures: hold,
                });
            }
            if attempt + 1 < attempts {
                steps.push(Step {
                    header: header.clone(),
                    status: rest_status.clone(),
                    hold_measures: hold,
                });
            }
        }

        steps.push(Step {
            header: BREAK_BANNER.to_string(),
            status: rest_status,
            hold_measures: hold,
        });
        steps
    }
}
