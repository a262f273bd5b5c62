use crate::event::Event;
use std::time::{Duration, Instant};

/// Interval between progress ticks while a leg is running.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub const HIDDEN: f64 = 0.0;
pub const SHOWN: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
struct Leg {
    from: f64,
    target: f64,
    started: Instant,
    length: Duration,
    last_tick: Instant,
}

impl Leg {
    fn fraction_at(&self, now: Instant) -> f64 {
        if self.length.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.length.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn value_at(&self, now: Instant) -> f64 {
        self.from + (self.target - self.from) * self.fraction_at(now)
    }
}

/// Linear progress driver between [`HIDDEN`] and [`SHOWN`].
///
/// A full 0→1 sweep takes `duration`; a partial leg takes the proportional
/// share, so reversing mid-flight continues from the current value at the
/// same speed. Easing is left to the renderer.
#[derive(Debug)]
pub struct AnimationDriver {
    value: f64,
    duration: Duration,
    leg: Option<Leg>,
}

impl AnimationDriver {
    pub fn new(value: f64, duration: Duration) -> Self {
        Self {
            value: value.clamp(HIDDEN, SHOWN),
            duration,
            leg: None,
        }
    }

    /// Affects legs started after this call.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Last reported progress.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.leg.is_some()
    }

    pub fn target(&self) -> Option<f64> {
        self.leg.map(|leg| leg.target)
    }

    /// Settled at `target` with nothing in flight.
    pub fn is_at(&self, target: f64) -> bool {
        self.leg.is_none() && self.value == target
    }

    /// Head toward `target` from wherever the value is at `now`.
    ///
    /// Returns the events due immediately: an instant leg (zero duration or
    /// zero distance) yields exactly one progress and one completion.
    pub fn animate_to(&mut self, target: f64, now: Instant) -> Vec<Event> {
        if self.target() == Some(target) {
            return Vec::new();
        }
        let from = match self.leg {
            Some(leg) => leg.value_at(now),
            None => self.value,
        };
        let length = self.duration.mul_f64((target - from).abs());
        if length.is_zero() {
            self.leg = None;
            self.value = target;
            return vec![Event::AnimationProgress(target), Event::AnimationCompleted];
        }
        self.value = from;
        self.leg = Some(Leg {
            from,
            target,
            started: now,
            length,
            last_tick: now,
        });
        Vec::new()
    }

    /// Advance to `now`, reporting progress and, at the end, completion.
    pub fn tick(&mut self, now: Instant) -> Vec<Event> {
        let Some(leg) = self.leg.as_mut() else {
            return Vec::new();
        };
        leg.last_tick = now;
        let fraction = leg.fraction_at(now);
        self.value = leg.value_at(now);
        if fraction >= 1.0 {
            self.value = leg.target;
            self.leg = None;
            return vec![Event::AnimationProgress(self.value), Event::AnimationCompleted];
        }
        vec![Event::AnimationProgress(self.value)]
    }

    /// Jump to `value` without reporting anything.
    pub fn finish_at(&mut self, value: f64) {
        self.leg = None;
        self.value = value.clamp(HIDDEN, SHOWN);
    }

    /// When the next [`tick`](Self::tick) is due.
    pub fn next_frame(&self) -> Option<Instant> {
        self.leg
            .map(|leg| (leg.last_tick + FRAME_INTERVAL).min(leg.started + leg.length))
    }
}
