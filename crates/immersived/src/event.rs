/// Internal events the controller drains after every operation and poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The auto-hide timer elapsed.
    TimerFired,
    /// Animation moved to the given progress (0.0 hidden, 1.0 shown).
    AnimationProgress(f64),
    /// Animation reached its target.
    AnimationCompleted,
}

impl Event {
    pub fn is_animation(&self) -> bool {
        matches!(self, Event::AnimationProgress(_) | Event::AnimationCompleted)
    }
}
