use immersive_core::surface::Surface;

/// Receives show/hide commands for the managed surfaces.
///
/// Implementations toggle the surface synchronously and must not block.
/// The controller never reads visibility back; it tracks what it commanded.
pub trait SurfaceBinding {
    fn set_visible(&mut self, surface: Surface, visible: bool);
}

impl<F> SurfaceBinding for F
where
    F: FnMut(Surface, bool),
{
    fn set_visible(&mut self, surface: Surface, visible: bool) {
        self(surface, visible)
    }
}

/// Binding that records every command it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingBinding {
    commands: Vec<(Surface, bool)>,
}

impl RecordingBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received, oldest first.
    pub fn commands(&self) -> &[(Surface, bool)] {
        &self.commands
    }

    pub fn last(&self, surface: Surface) -> Option<bool> {
        self.commands
            .iter()
            .rev()
            .find(|(s, _)| *s == surface)
            .map(|(_, visible)| *visible)
    }
}

impl SurfaceBinding for RecordingBinding {
    fn set_visible(&mut self, surface: Surface, visible: bool) {
        self.commands.push((surface, visible));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_bindings() {
        let mut seen = Vec::new();
        {
            let mut binding = |surface: Surface, visible: bool| seen.push((surface, visible));
            binding.set_visible(Surface::Toolbar, false);
        }
        assert_eq!(seen, vec![(Surface::Toolbar, false)]);
    }

    #[test]
    fn recording_binding_reports_last_command_per_surface() {
        let mut binding = RecordingBinding::new();
        binding.set_visible(Surface::Toolbar, true);
        binding.set_visible(Surface::TabStrip, true);
        binding.set_visible(Surface::Toolbar, false);
        assert_eq!(binding.last(Surface::Toolbar), Some(false));
        assert_eq!(binding.last(Surface::TabStrip), Some(true));
        assert_eq!(binding.last(Surface::BookmarksBar), None);
        assert_eq!(binding.commands().len(), 3);
    }
}
