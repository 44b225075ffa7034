mod flow;
mod terminal;

use std::cell::RefCell;
use std::rc::Rc;

use clap::Parser;
use rhythm_trainer_core::{
    BeatPosition, BeatScheduler, CellPos, EventBus, ExerciseConfig, ExerciseGenerator,
    MonotonicClock, Result, StaffGeometry, StaffRenderer, Surface, TempoConfig, TrainerConfig,
    TrainerError,
};
use tracing_subscriber::EnvFilter;

use crate::flow::{ExerciseFlow, Prompt};
use crate::terminal::{TerminalGuard, TerminalSurface};

const QUIT_KEY: char = 'q';

// Prompt lines sit above the above-beat marker row.
const PROMPT_HEADER_ROW_OFFSET: u16 = 6;
const PROMPT_STATUS_ROW_OFFSET: u16 = 4;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.into_config();
    config.validate()?;

    tracing::info!(
        bpm = config.tempo.bpm,
        beats_per_measure = config.tempo.beats_per_measure,
        num_measures = config.tempo.num_measures,
        "starting trainer"
    );
    run(config)
}

fn run(config: TrainerConfig) -> Result<()> {
    let surface = Rc::new(RefCell::new(TerminalSurface::new()));
    let failure: Rc<RefCell<Option<TrainerError>>> = Rc::new(RefCell::new(None));

    let _guard = TerminalGuard::acquire()?;

    let (rows, cols) = surface.borrow().dimensions()?;
    let center = CellPos {
        row: rows / 2,
        col: cols / 2,
    };
    let geometry = StaffGeometry::new(&config.tempo, center)?;
    let renderer = StaffRenderer::new(geometry);

    let mut bus = EventBus::new();
    {
        // A landing beat replaces its own preview marker.
        let renderer = renderer.clone();
        let surface = surface.clone();
        let failure = failure.clone();
        bus.on_beat_start(move |position| {
            let mut surface = surface.borrow_mut();
            let outcome = renderer
                .erase_above_beat(&mut *surface, position)
                .and_then(|()| renderer.draw_beat(&mut *surface, position));
            park_failure(&failure, outcome);
        });
    }
    {
        // A fading beat is erased and the next position gets its preview.
        let renderer = renderer.clone();
        let surface = surface.clone();
        let failure = failure.clone();
        let tempo = config.tempo.clone();
        bus.on_beat_fade(move |position| {
            let mut surface = surface.borrow_mut();
            let outcome = renderer
                .erase_beat(&mut *surface, position)
                .and_then(|()| renderer.draw_above_beat(&mut *surface, position.next_in(&tempo)));
            park_failure(&failure, outcome);
        });
    }
    {
        let mut cycles_completed: u64 = 0;
        bus.on_measure_end(move || {
            cycles_completed += 1;
            tracing::debug!(cycles_completed, "staff cycle complete");
        });
    }

    {
        let mut surface = surface.borrow_mut();
        renderer.draw_measure_separators(&mut *surface)?;
        renderer.draw_above_beat(&mut *surface, BeatPosition::ORIGIN)?;
    }

    let clock = MonotonicClock::start();
    let mut scheduler = BeatScheduler::new(config.tempo.clone(), bus);
    scheduler.prepare(clock.now_ns())?;

    let generator = ExerciseGenerator::new(config.exercise.clone())?;
    let mut exercise_flow = ExerciseFlow::new(config.clone(), generator);
    let opening = exercise_flow.start(clock.now_ns());
    draw_prompt(&mut *surface.borrow_mut(), &renderer, &opening)?;

    loop {
        if let Some(pressed) = surface.borrow_mut().poll_key()? {
            if pressed == QUIT_KEY {
                tracing::info!("quit requested");
                break;
            }
        }

        let now_ns = clock.now_ns();
        scheduler.poll(now_ns)?;
        if let Some(error) = failure.borrow_mut().take() {
            return Err(error);
        }

        if let Some(prompt) = exercise_flow.tick(now_ns) {
            draw_prompt(&mut *surface.borrow_mut(), &renderer, &prompt)?;
        }
    }

    Ok(())
}

/// Redraws both prompt lines, centred and padded across the full width so
/// stale text is overwritten.
fn draw_prompt(
    surface: &mut impl Surface,
    renderer: &StaffRenderer,
    prompt: &Prompt,
) -> Result<()> {
    let staff_row = renderer.geometry().staff_row();
    draw_centered_line(
        surface,
        staff_row.saturating_sub(PROMPT_HEADER_ROW_OFFSET),
        &prompt.header,
    )?;
    draw_centered_line(
        surface,
        staff_row.saturating_sub(PROMPT_STATUS_ROW_OFFSET),
        &prompt.status,
    )
}

fn draw_centered_line(surface: &mut impl Surface, row: u16, text: &str) -> Result<()> {
    let (_, cols) = surface.dimensions()?;
    let width = cols as usize;
    let mut line = format!("{text:^width$}");
    line.truncate(width);

    surface.move_to(CellPos { row, col: 0 })?;
    surface.draw_text(&line)?;
    surface.refresh()
}

fn park_failure(slot: &RefCell<Option<TrainerError>>, outcome: Result<()>) {
    if let Err(error) = outcome {
        tracing::warn!(%error, "surface failure during event dispatch");
        if slot.borrow().is_none() {
            *slot.borrow_mut() = Some(error);
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal rhythm trainer", long_about = None)]
struct Cli {
    /// Beats per minute.
    #[arg(long, default_value_t = 80.0)]
    bpm: f64,

    /// Beats per measure.
    #[arg(long, default_value_t = 4)]
    beats_per_measure: u32,

    /// Measures on the staff.
    #[arg(long, default_value_t = 4)]
    num_measures: u32,

    /// Notes shown per practice attempt.
    #[arg(long, default_value_t = 3)]
    notes_per_attempt: u32,

    /// Attempts before an exercise break.
    #[arg(long, default_value_t = 3)]
    attempts_per_exercise: u32,

    /// Blank columns between staff elements.
    #[arg(long, default_value_t = 3)]
    spacing: u16,
}

impl Cli {
    fn into_config(self) -> TrainerConfig {
        TrainerConfig {
            tempo: TempoConfig {
                bpm: self.bpm,
                beats_per_measure: self.beats_per_measure,
                num_measures: self.num_measures,
                spacing: self.spacing,
                ..TempoConfig::default()
            },
            exercise: ExerciseConfig {
                notes_per_attempt: self.notes_per_attempt,
                attempts_per_exercise: self.attempts_per_exercise,
            },
        }
    }
}
