use crate::animation::{AnimationDriver, HIDDEN, SHOWN};
use crate::binding::SurfaceBinding;
use crate::event::Event;
use crate::observer::{ImmersiveObserver, Notification, ObserverId, ObserverSet};
use crate::timer::AutoHideTimer;
use immersive_core::config::Config;
use immersive_core::surface::{Point, Rect};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Progress above which surfaces are commanded visible during a transition.
const VISIBLE_THRESHOLD: f64 = 0.5;

/// Immersive display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Not active; every managed surface is shown.
    Disabled,
    /// Active with surfaces hidden.
    Enabled,
    /// Active with surfaces temporarily shown.
    Revealed,
    /// Active with surfaces held shown until unpinned.
    Pinned,
}

impl Mode {
    pub fn shows_ui(self) -> bool {
        matches!(self, Mode::Revealed | Mode::Pinned)
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Disabled => "disabled",
            Mode::Enabled => "enabled",
            Mode::Revealed => "revealed",
            Mode::Pinned => "pinned",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of the transition in flight, orthogonal to [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Showing,
    Hiding,
}

/// Decides when the overlay surfaces of an immersive window are shown.
///
/// Everything runs on the caller's thread. Timer and animation callbacks
/// are queued as [`Event`]s and drained before each public call returns;
/// the host only has to call [`poll`](Self::poll) once
/// [`next_deadline`](Self::next_deadline) has passed.
pub struct Controller<B: SurfaceBinding> {
    binding: B,
    config: Config,
    mode: Mode,
    phase: AnimationPhase,
    /// Reasons to hold the UI shown. Only explicit leave/blur clears them.
    pointer_in_hover_zone: bool,
    input_surface_focused: bool,
    window_bounds: Option<Rect>,
    timer: AutoHideTimer,
    animation: AnimationDriver,
    observers: ObserverSet,
    queue: VecDeque<Event>,
    draining: bool,
    /// Last visibility sent to the binding.
    commanded: Option<bool>,
    last_poll: Option<Instant>,
    /// Host-pushed legacy always-show condition, kept across refreshes.
    legacy_always_show: Option<bool>,
    clock: Box<dyn Fn() -> Instant>,
    torn_down: bool,
}

impl<B: SurfaceBinding> Controller<B> {
    /// Starts disabled, with every managed surface commanded visible.
    pub fn new(binding: B, config: Config) -> Self {
        let config = config.sanitized();
        let mut controller = Self {
            binding,
            timer: AutoHideTimer::new(config.timing.auto_hide_delay()),
            animation: AnimationDriver::new(SHOWN, config.timing.animation_duration()),
            config,
            mode: Mode::Disabled,
            phase: AnimationPhase::Idle,
            pointer_in_hover_zone: false,
            input_surface_focused: false,
            window_bounds: None,
            observers: ObserverSet::new(),
            queue: VecDeque::new(),
            draining: false,
            commanded: None,
            last_poll: None,
            legacy_always_show: None,
            clock: Box::new(Instant::now),
            torn_down: false,
        };
        controller.command_surfaces(true, true);
        controller
    }

    // --- queries ---

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn animation_phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != Mode::Disabled
    }

    /// Whether immersive UI is revealed or pinned.
    pub fn is_ui_visible(&self) -> bool {
        self.mode.shows_ui()
    }

    pub fn is_hovering(&self) -> bool {
        self.pointer_in_hover_zone
    }

    pub fn is_focus_held(&self) -> bool {
        self.input_surface_focused
    }

    pub fn is_timer_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Visibility most recently commanded to the managed surfaces.
    pub fn surfaces_visible(&self) -> Option<bool> {
        self.commanded
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.timer.deadline(), self.animation.next_frame()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // --- observers ---

    pub fn add_observer(&mut self, observer: Box<dyn ImmersiveObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // --- configuration ---

    /// Swap in a new configuration snapshot. New durations apply to the next
    /// timer start or animation leg; anything in flight keeps its timing.
    ///
    /// A legacy always-show value pushed by the host outlives the refresh.
    /// Surfaces dropped from the managed list are handed back visible and
    /// newly managed ones catch up with the current command.
    pub fn refresh_config(&mut self, config: Config) {
        let mut config = config.sanitized();
        if let Some(active) = self.legacy_always_show {
            config.general.legacy_always_show = active;
        }
        for &surface in &self.config.surfaces.managed {
            if !config.surfaces.managed.contains(&surface) {
                debug!(%surface, "surface released");
                self.binding.set_visible(surface, true);
            }
        }
        if let Some(visible) = self.commanded {
            for &surface in &config.surfaces.managed {
                if !self.config.surfaces.managed.contains(&surface) {
                    debug!(%surface, visible, "surface adopted");
                    self.binding.set_visible(surface, visible);
                }
            }
        }
        self.timer.set_delay(config.timing.auto_hide_delay());
        self.animation.set_duration(config.timing.animation_duration());
        debug!(
            auto_hide_delay_ms = config.timing.auto_hide_delay_ms,
            animation_duration_ms = config.timing.animation_duration_ms,
            hover_zone_px = config.reveal.hover_zone_px,
            "configuration refreshed"
        );
        self.config = config;
    }

    /// Update the snapshot of the legacy "always show toolbar" condition.
    pub fn set_legacy_always_show(&mut self, active: bool) {
        self.legacy_always_show = Some(active);
        self.config.general.legacy_always_show = active;
    }

    /// Bounds the hover zone horizontally and anchors it to the window top.
    pub fn set_window_bounds(&mut self, bounds: Rect) {
        self.window_bounds = Some(bounds);
    }

    /// Test hook: replace the clock used to anchor timers and animation legs.
    pub fn set_clock(&mut self, clock: impl Fn() -> Instant + 'static) {
        self.clock = Box::new(clock);
    }

    /// Test hook: override the auto-hide delay.
    pub fn set_auto_hide_delay(&mut self, delay: Duration) {
        self.timer.set_delay(delay);
    }

    /// Test hook: override the animation duration.
    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.animation.set_duration(duration);
    }

    /// Test hook: fire the pending auto-hide timer now. Returns false if
    /// no timer was pending.
    pub fn fire_pending_timer(&mut self) -> bool {
        if !self.timer.fire_now() {
            return false;
        }
        self.queue.push_back(Event::TimerFired);
        self.settle();
        true
    }

    // --- operations ---

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.torn_down || enabled == self.is_enabled() {
            return;
        }

        if enabled {
            if self.config.legacy_suppresses() {
                debug!("enable refused: legacy always-show preference is active");
                return;
            }
            self.set_mode(Mode::Enabled);
            info!(enabled, "immersive mode toggled");
            self.observers.notify(Notification::ModeToggled(true));
            if self.holds_visible() {
                self.reveal();
            } else {
                // Start hidden instead of flashing the UI.
                self.start_hide();
            }
        } else {
            self.timer.cancel();
            self.queue.clear();
            self.animation.finish_at(SHOWN);
            self.phase = AnimationPhase::Idle;
            self.set_mode(Mode::Disabled);
            self.command_surfaces(true, true);
            info!(enabled, "immersive mode toggled");
            self.observers.notify(Notification::ModeToggled(false));
        }
        self.settle();
    }

    pub fn reveal(&mut self) {
        if self.mode == Mode::Disabled {
            return;
        }
        self.timer.cancel();
        if self.mode == Mode::Enabled {
            self.set_mode(Mode::Revealed);
        }
        self.start_show();
        self.settle();
    }

    /// (Re)schedule the auto-hide timer. Only a revealed UI with nothing
    /// holding it open is scheduled.
    pub fn hide_after_delay(&mut self) {
        if self.mode != Mode::Revealed || self.holds_visible() {
            return;
        }
        let now = self.now();
        self.timer.start(now);
        debug!(delay_ms = self.timer.delay().as_millis() as u64, "auto-hide scheduled");
    }

    pub fn hide_immediately(&mut self) {
        if matches!(self.mode, Mode::Disabled | Mode::Pinned) {
            return;
        }
        self.timer.cancel();
        self.set_mode(Mode::Enabled);
        self.start_hide();
        self.settle();
    }

    pub fn pin(&mut self) {
        if self.mode == Mode::Disabled {
            return;
        }
        self.timer.cancel();
        self.set_mode(Mode::Pinned);
        self.start_show();
        self.settle();
    }

    pub fn unpin(&mut self) {
        if self.mode != Mode::Pinned {
            return;
        }
        self.set_mode(Mode::Revealed);
        if !self.holds_visible() {
            self.hide_after_delay();
        }
    }

    pub fn on_pointer_moved(&mut self, point: Point) {
        if self.mode == Mode::Disabled {
            return;
        }
        let inside = self.in_hover_zone(point);
        if inside == self.pointer_in_hover_zone {
            return;
        }
        debug!(x = point.x, y = point.y, hovering = inside, "hover zone edge");
        self.observers.notify(Notification::HoverZoneChanged(inside));
        self.pointer_in_hover_zone = inside;
        if inside {
            self.reveal();
        } else if !self.input_surface_focused {
            self.hide_after_delay();
        }
    }

    pub fn on_focus_gained(&mut self) {
        self.input_surface_focused = true;
        // Focus is never interrupted by an auto-hide, whatever on_focus says.
        self.timer.cancel();
        if self.config.reveal.on_focus {
            self.reveal();
        }
    }

    pub fn on_focus_lost(&mut self) {
        self.input_surface_focused = false;
        if !self.pointer_in_hover_zone {
            self.hide_after_delay();
        }
    }

    pub fn on_key_activity(&mut self) {
        if self.config.reveal.on_key_activity {
            self.reveal();
        }
    }

    /// The umbrella host condition (e.g. fullscreen) changed.
    pub fn on_host_mode_changed(&mut self, active: bool) {
        if !active {
            self.set_enabled(false);
        } else if self.config.general.enabled {
            self.set_enabled(true);
        } else {
            debug!("host mode active but immersive preference is off");
        }
    }

    /// Flash the UI when the focused context (e.g. active tab) switches.
    pub fn on_focused_context_changed(&mut self) {
        if self.mode == Mode::Disabled {
            return;
        }
        self.reveal();
        if self.mode != Mode::Pinned {
            self.hide_after_delay();
        }
    }

    pub fn on_host_window_closed(&mut self) {
        self.teardown();
    }

    /// Disable, drop all observers and ignore every later request.
    /// Safe to call any number of times.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.set_enabled(false);
        self.observers.clear();
        self.torn_down = true;
        debug!("controller torn down");
    }

    /// Deliver timer and animation callbacks that are due at `now`.
    pub fn poll(&mut self, now: Instant) {
        self.last_poll = Some(self.last_poll.map_or(now, |last| last.max(now)));
        let ticks = self.animation.tick(now);
        self.queue.extend(ticks);
        if self.timer.poll(now) {
            self.queue.push_back(Event::TimerFired);
        }
        self.settle();
    }

    // --- internals ---

    fn now(&self) -> Instant {
        let current = (self.clock)();
        self.last_poll.map_or(current, |last| last.max(current))
    }

    fn holds_visible(&self) -> bool {
        self.pointer_in_hover_zone || self.input_surface_focused
    }

    fn in_hover_zone(&self, point: Point) -> bool {
        let depth = self.config.reveal.hover_zone_px;
        match self.window_bounds {
            Some(bounds) => bounds.top_strip_contains(point, depth),
            None => point.y >= 0 && point.y < depth,
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        let old = self.mode;
        if old == mode {
            return;
        }
        self.mode = mode;
        debug!(from = %old, to = %mode, "mode transition");
        // Toggling the mode itself is reported as ModeToggled only.
        if old != Mode::Disabled && mode != Mode::Disabled && old.shows_ui() != mode.shows_ui() {
            self.observers
                .notify(Notification::VisibilityChanged(mode.shows_ui()));
        }
    }

    fn start_show(&mut self) {
        if self.phase == AnimationPhase::Showing
            || (self.phase == AnimationPhase::Idle && self.animation.is_at(SHOWN))
        {
            return;
        }
        self.phase = AnimationPhase::Showing;
        self.start_leg(SHOWN);
    }

    fn start_hide(&mut self) {
        if self.phase == AnimationPhase::Hiding
            || (self.phase == AnimationPhase::Idle && self.animation.is_at(HIDDEN))
        {
            return;
        }
        self.phase = AnimationPhase::Hiding;
        self.start_leg(HIDDEN);
    }

    fn start_leg(&mut self, target: f64) {
        let now = self.now();
        debug!(from = self.animation.value(), target, "animation leg started");
        let events = self.animation.animate_to(target, now);
        // Callbacks of the superseded leg must not reach the new one.
        self.queue.retain(|event| !event.is_animation());
        self.queue.extend(events);
    }

    fn settle(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        while let Some(event) = self.queue.pop_front() {
            self.handle(event);
        }
        self.draining = false;
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::TimerFired => {
                debug!("auto-hide timer fired");
                self.hide_immediately();
            }
            Event::AnimationProgress(value) => {
                self.command_surfaces(value > VISIBLE_THRESHOLD, false);
            }
            Event::AnimationCompleted => {
                self.phase = AnimationPhase::Idle;
                // Decided by the mode now, not the one the leg started under.
                let visible = self.mode != Mode::Enabled;
                debug!(visible, mode = %self.mode, "animation completed");
                self.command_surfaces(visible, true);
            }
        }
    }

    fn command_surfaces(&mut self, visible: bool, force: bool) {
        if !force && self.commanded == Some(visible) {
            return;
        }
        self.commanded = Some(visible);
        for &surface in &self.config.surfaces.managed {
            self.binding.set_visible(surface, visible);
        }
    }
}

impl<B: SurfaceBinding> Drop for Controller<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<B: SurfaceBinding> fmt::Debug for Controller<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("hovering", &self.pointer_in_hover_zone)
            .field("focused", &self.input_surface_focused)
            .field("timer_pending", &self.timer.is_pending())
            .field("observers", &self.observers)
            .finish()
    }
}
