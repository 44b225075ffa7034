use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{config::TempoConfig, events::EventBus, Result, TrainerError};

/// Zero-based (measure, beat) coordinate of the cursor on the staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatPosition {
    pub measure: u32,
    pub beat: u32,
}

impl BeatPosition {
    /// First beat of the first measure.
    pub const ORIGIN: BeatPosition = BeatPosition { measure: 0, beat: 0 };

    /// Next position in the lexicographic cycle. The measure index moves
    /// only when the beat index wraps to zero.
    pub fn next_in(self, config: &TempoConfig) -> Self {
        let beat = (self.beat + 1) % config.beats_per_measure;
        let measure = if beat == 0 {
            (self.measure + 1) % config.num_measures
        } else {
            self.measure
        };
        Self { measure, beat }
    }
}

/// Converts monotonic time into discrete beat-start, beat-fade and
/// measure-end notifications on the owned [`EventBus`].
///
/// Rescheduling is additive: a deadline moves by exactly one beat period per
/// emitted event and is never reset from the poll instant, so the long-run
/// beat rate matches the configured bpm regardless of poll jitter. A single
/// event may lag by up to one poll interval, but the lag does not compound.
pub struct BeatScheduler {
    config: TempoConfig,
    bus: EventBus,
    position: BeatPosition,
    next_start_ns: u64,
    next_fade_ns: u64,
    prepared: bool,
}

impl BeatScheduler {
    /// Creates an inert scheduler. Nothing is emitted until [`prepare`]
    /// seeds the deadlines.
    ///
    /// [`prepare`]: BeatScheduler::prepare
    pub fn new(config: TempoConfig, bus: EventBus) -> Self {
        Self {
            config,
            bus,
            position: BeatPosition::ORIGIN,
            next_start_ns: 0,
            next_fade_ns: 0,
            prepared: false,
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> BeatPosition {
        self.position
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Seeds the deadlines from `now_ns` and resets the cursor: the first
    /// beat lands one period after this instant and its marker fades
    /// `fade_sustain_ratio` periods after it. Rejects configurations the
    /// timing arithmetic cannot operate on.
    pub fn prepare(&mut self, now_ns: u64) -> Result<()> {
        self.config.validate()?;
        self.next_start_ns = now_ns + self.config.beat_period_ns();
        self.next_fade_ns = now_ns + self.config.fade_offset_ns();
        self.position = BeatPosition::ORIGIN;
        self.prepared = true;
        Ok(())
    }

    /// Evaluates at most one deadline against `now_ns` and publishes the
    /// matching notification before returning.
    ///
    /// Beat-start wins over beat-fade when both deadlines have passed, and
    /// only one event category is ever emitted per call. A caller polling
    /// slower than the beat period will therefore skip intermediate
    /// positions; that catch-up behaviour is accepted rather than corrected.
    pub fn poll(&mut self, now_ns: u64) -> Result<()> {
        if !self.prepared {
            return Err(TrainerError::NotReady);
        }
        if now_ns > self.next_start_ns {
            self.bus.publish_beat_start(self.position);
            self.next_start_ns += self.config.beat_period_ns();
        } else if now_ns > self.next_fade_ns {
            self.bus.publish_beat_fade(self.position);
            self.position = self.position.next_in(&self.config);
            if self.position == BeatPosition::ORIGIN {
                self.bus.publish_measure_end();
            }
            self.next_fade_ns += self.config.beat_period_ns();
        }
        Ok(())
    }
}

impl fmt::Debug for BeatScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeatScheduler")
            .field("config", &self.config)
            .field("position", &self.position)
            .field("next_start_ns", &self.next_start_ns)
            .field("next_fade_ns", &self.next_fade_ns)
            .field("prepared", &self.prepared)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Emitted {
        Start(BeatPosition),
        Fade(BeatPosition),
        MeasureEnd,
    }

    // 600 bpm keeps the period at a round hundred million nanoseconds.
    const PERIOD_NS: u64 = 100_000_000;

    fn tempo(beats: u32, measures: u32) -> TempoConfig {
        TempoConfig {
            bpm: 600.0,
            beats_per_measure: beats,
            num_measures: measures,
            ..TempoConfig::default()
        }
    }

    fn recording_scheduler(config: TempoConfig) -> (BeatScheduler, Rc<RefCell<Vec<Emitted>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let sink = log.clone();
        bus.on_beat_start(move |position| sink.borrow_mut().push(Emitted::Start(position)));
        let sink = log.clone();
        bus.on_beat_fade(move |position| sink.borrow_mut().push(Emitted::Fade(position)));
        let sink = log.clone();
        bus.on_measure_end(move || sink.borrow_mut().push(Emitted::MeasureEnd));

        (BeatScheduler::new(config, bus), log)
    }

    fn drive(scheduler: &mut BeatScheduler, from_ns: u64, to_ns: u64, step_ns: u64) {
        let mut now_ns = from_ns;
        while now_ns <= to_ns {
            scheduler.poll(now_ns).unwrap();
            now_ns += step_ns;
        }
    }

    fn position(measure: u32, beat: u32) -> BeatPosition {
        BeatPosition { measure, beat }
    }

    #[test]
    fn poll_before_prepare_fails_without_mutation() {
        let (mut scheduler, log) = recording_scheduler(tempo(4, 2));

        let error = scheduler.poll(1_000).unwrap_err();
        assert!(matches!(error, TrainerError::NotReady));
        assert!(log.borrow().is_empty());
        assert!(!scheduler.is_prepared());
        assert_eq!(scheduler.position(), BeatPosition::ORIGIN);

        // The same scheduler works once prepared.
        scheduler.prepare(0).unwrap();
        scheduler.poll(PERIOD_NS + 1).unwrap();
        assert_eq!(*log.borrow(), [Emitted::Start(BeatPosition::ORIGIN)]);
    }

    #[test]
    fn prepare_rejects_invalid_config() {
        let (mut scheduler, _log) = recording_scheduler(TempoConfig {
            bpm: 0.0,
            ..TempoConfig::default()
        });
        assert!(matches!(
            scheduler.prepare(0).unwrap_err(),
            TrainerError::InvalidConfig(_)
        ));
        assert!(!scheduler.is_prepared());
    }

    #[test]
    fn first_beat_lands_one_period_after_prepare() {
        let (mut scheduler, log) = recording_scheduler(tempo(4, 2));
        scheduler.prepare(0).unwrap();

        // Deadlines are strict: exactly on the period emits nothing.
        scheduler.poll(PERIOD_NS).unwrap();
        assert!(log.borrow().is_empty());

        scheduler.poll(PERIOD_NS + 1).unwrap();
        assert_eq!(*log.borrow(), [Emitted::Start(BeatPosition::ORIGIN)]);
    }

    #[test]
    fn positions_cycle_lexicographically_with_measure_end_on_wrap() {
        let config = tempo(4, 2);
        let (mut scheduler, log) = recording_scheduler(config.clone());
        scheduler.prepare(0).unwrap();

        // Two full cycles: 16 beats, the last fade lands at 16.3 periods.
        drive(&mut scheduler, 0, 17 * PERIOD_NS, PERIOD_NS / 10);

        let mut expected = Vec::new();
        for _cycle in 0..2 {
            for measure in 0..2 {
                for beat in 0..4 {
                    expected.push(Emitted::Start(position(measure, beat)));
                    expected.push(Emitted::Fade(position(measure, beat)));
                    if measure == 1 && beat == 3 {
                        expected.push(Emitted::MeasureEnd);
                    }
                }
            }
        }

        let log = log.borrow();
        assert!(log.len() >= expected.len());
        assert_eq!(log[..expected.len()], expected[..]);

        let measure_ends = log
            .iter()
            .filter(|event| matches!(event, Emitted::MeasureEnd))
            .count();
        assert_eq!(measure_ends, 2);
    }

    #[test]
    fn fade_never_precedes_start_for_a_position() {
        let (mut scheduler, log) = recording_scheduler(tempo(3, 3));
        scheduler.prepare(0).unwrap();
        drive(&mut scheduler, 0, 30 * PERIOD_NS, PERIOD_NS / 20);

        let mut last_started = None;
        for event in log.borrow().iter() {
            match event {
                Emitted::Start(position) => last_started = Some(*position),
                Emitted::Fade(position) => assert_eq!(last_started, Some(*position)),
                Emitted::MeasureEnd => {}
            }
        }
    }

    #[test]
    fn additive_rescheduling_does_not_accumulate_drift() {
        let (mut scheduler, log) = recording_scheduler(tempo(4, 4));
        let prepare_ns = 5_000;
        scheduler.prepare(prepare_ns).unwrap();

        let step_ns = PERIOD_NS / 100;
        let mut now_ns = prepare_ns;
        let mut observed_start_times = Vec::new();
        let mut seen = 0;

        while observed_start_times.len() < 2_000 {
            now_ns += step_ns;
            scheduler.poll(now_ns).unwrap();
            let log = log.borrow();
            if log.len() > seen {
                if matches!(log[log.len() - 1], Emitted::Start(_)) {
                    observed_start_times.push(now_ns);
                }
                seen = log.len();
            }
        }

        // The n-th start must land within one poll interval of its schedule,
        // no matter how many beats have elapsed.
        for (n, &observed) in observed_start_times.iter().enumerate() {
            let scheduled = prepare_ns + (n as u64 + 1) * PERIOD_NS;
            assert!(observed > scheduled);
            assert!(
                observed - scheduled <= step_ns,
                "beat {n} drifted: observed {observed}, scheduled {scheduled}"
            );
        }
    }

    #[test]
    fn emits_at_most_one_event_category_per_poll() {
        let (mut scheduler, log) = recording_scheduler(tempo(4, 2));
        scheduler.prepare(0).unwrap();

        // Far past both deadlines: each poll still emits exactly one event,
        // and the start deadline keeps winning until it catches up.
        let late_ns = 10 * PERIOD_NS;
        scheduler.poll(late_ns).unwrap();
        assert_eq!(*log.borrow(), [Emitted::Start(BeatPosition::ORIGIN)]);

        scheduler.poll(late_ns).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Emitted::Start(BeatPosition::ORIGIN),
                Emitted::Start(BeatPosition::ORIGIN),
            ]
        );
    }

    #[test]
    fn start_subscribers_see_positions_in_order_without_gaps() {
        let config = tempo(3, 2);
        let (mut scheduler, log) = recording_scheduler(config.clone());
        scheduler.prepare(0).unwrap();
        drive(&mut scheduler, 0, 19 * PERIOD_NS, PERIOD_NS / 20);

        let starts: Vec<BeatPosition> = log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Emitted::Start(position) => Some(*position),
                _ => None,
            })
            .collect();

        assert!(starts.len() >= 12);
        let mut expected = BeatPosition::ORIGIN;
        for &start in &starts {
            assert_eq!(start, expected);
            expected = expected.next_in(&config);
        }
    }

    #[test]
    fn position_wraps_measure_only_when_beat_wraps() {
        let config = tempo(4, 2);
        assert_eq!(position(0, 2).next_in(&config), position(0, 3));
        assert_eq!(position(0, 3).next_in(&config), position(1, 0));
        assert_eq!(position(1, 3).next_in(&config), BeatPosition::ORIGIN);
    }
}
