/// Listener for immersive-mode changes. All methods default to no-ops.
pub trait ImmersiveObserver {
    /// UI was revealed (`true`) or hidden (`false`) while immersive mode is on.
    fn on_visibility_changed(&mut self, _visible: bool) {}
    fn on_mode_toggled(&mut self, _enabled: bool) {}
    fn on_hover_zone_changed(&mut self, _hovering: bool) {}
}

/// One observer-facing change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    VisibilityChanged(bool),
    ModeToggled(bool),
    HoverZoneChanged(bool),
}

/// Token returned by [`ObserverSet::add`]; pass it back to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observers in registration order.
#[derive(Default)]
pub struct ObserverSet {
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn ImmersiveObserver>)>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Box<dyn ImmersiveObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Unknown or already-removed ids are ignored.
    pub fn remove(&mut self, id: ObserverId) -> Option<Box<dyn ImmersiveObserver>> {
        let idx = self.entries.iter().position(|(entry, _)| *entry == id)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn notify(&mut self, notification: Notification) {
        for (_, observer) in &mut self.entries {
            match notification {
                Notification::VisibilityChanged(visible) => observer.on_visibility_changed(visible),
                Notification::ModeToggled(enabled) => observer.on_mode_toggled(enabled),
                Notification::HoverZoneChanged(hovering) => observer.on_hover_zone_changed(hovering),
            }
        }
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.entries.len())
            .finish()
    }
}
