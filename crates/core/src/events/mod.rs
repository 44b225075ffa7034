use std::fmt;

use crate::scheduler::BeatPosition;

/// Handler invoked with the position whose marker should appear or fade.
pub type BeatHandler = Box<dyn FnMut(BeatPosition)>;

/// Handler invoked when the beat cursor wraps back to the first position.
pub type MeasureEndHandler = Box<dyn FnMut()>;

/// Synchronous one-to-many dispatch for the three scheduler notifications.
///
/// The channels are independent: subscribing to one never observes another.
/// Delivery happens in registration order and completes before `publish_*`
/// returns. Handlers are expected to contain their own failures rather than
/// abort a dispatch mid-delivery.
#[derive(Default)]
pub struct EventBus {
    beat_start: Vec<BeatHandler>,
    beat_fade: Vec<BeatHandler>,
    measure_end: Vec<MeasureEndHandler>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a beat-start subscriber. Registration belongs in setup,
    /// before the control loop starts polling.
    pub fn on_beat_start(&mut self, handler: impl FnMut(BeatPosition) + 'static) {
        self.beat_start.push(Box::new(handler));
    }

    /// Registers a beat-fade subscriber.
    pub fn on_beat_fade(&mut self, handler: impl FnMut(BeatPosition) + 'static) {
        self.beat_fade.push(Box::new(handler));
    }

    /// Registers a measure-end subscriber. The channel carries no payload.
    pub fn on_measure_end(&mut self, handler: impl FnMut() + 'static) {
        self.measure_end.push(Box::new(handler));
    }

    pub fn publish_beat_start(&mut self, position: BeatPosition) {
        for handler in &mut self.beat_start {
            handler(position);
        }
    }

    pub fn publish_beat_fade(&mut self, position: BeatPosition) {
        for handler in &mut self.beat_fade {
            handler(position);
        }
    }

    pub fn publish_measure_end(&mut self) {
        for handler in &mut self.measure_end {
            handler();
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("beat_start", &self.beat_start.len())
            .field("beat_fade", &self.beat_fade.len())
            .field("measure_end", &self.measure_end.len())
            .finish()
    }
}
