use immersive_core::ipc::{self, DaemonMsg};
use immersive_core::surface::Surface;
use immersived::{ImmersiveObserver, SurfaceBinding};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc;

/// Connected clients that asked for surface commands and notifications.
/// Lives on the event-loop task only.
pub type Subscribers = Rc<RefCell<Vec<mpsc::UnboundedSender<String>>>>;

/// Send `msg` to every subscriber, dropping the ones that went away.
pub fn broadcast(subscribers: &Subscribers, msg: &DaemonMsg) {
    let line = ipc::encode(msg);
    subscribers
        .borrow_mut()
        .retain(|tx| tx.send(line.clone()).is_ok());
}

/// Forwards surface commands to subscribed surface hosts.
pub struct SocketBinding {
    subscribers: Subscribers,
}

impl SocketBinding {
    pub fn new(subscribers: Subscribers) -> Self {
        Self { subscribers }
    }
}

impl SurfaceBinding for SocketBinding {
    fn set_visible(&mut self, surface: Surface, visible: bool) {
        broadcast(&self.subscribers, &DaemonMsg::SetVisible { surface, visible });
    }
}

/// Forwards observer notifications to subscribers.
pub struct SocketObserver {
    subscribers: Subscribers,
}

impl SocketObserver {
    pub fn new(subscribers: Subscribers) -> Self {
        Self { subscribers }
    }
}

impl ImmersiveObserver for SocketObserver {
    fn on_visibility_changed(&mut self, visible: bool) {
        broadcast(&self.subscribers, &DaemonMsg::VisibilityChanged { visible });
    }

    fn on_mode_toggled(&mut self, enabled: bool) {
        broadcast(&self.subscribers, &DaemonMsg::ModeToggled { enabled });
    }

    fn on_hover_zone_changed(&mut self, hovering: bool) {
        broadcast(&self.subscribers, &DaemonMsg::HoverChanged { hovering });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<DaemonMsg> {
        let mut out = Vec::new();
        while let Ok(line) = rx.try_recv() {
            out.extend(ipc::decode_daemon(&line));
        }
        out
    }

    #[test]
    fn binding_broadcasts_set_visible() {
        let subscribers = Subscribers::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        subscribers.borrow_mut().push(tx);

        let mut binding = SocketBinding::new(Rc::clone(&subscribers));
        binding.set_visible(Surface::Toolbar, false);

        assert_eq!(
            drain(&mut rx),
            vec![DaemonMsg::SetVisible {
                surface: Surface::Toolbar,
                visible: false
            }]
        );
    }

    #[test]
    fn observer_broadcasts_notifications() {
        let subscribers = Subscribers::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        subscribers.borrow_mut().push(tx);

        let mut observer = SocketObserver::new(Rc::clone(&subscribers));
        observer.on_hover_zone_changed(true);
        observer.on_visibility_changed(true);
        observer.on_mode_toggled(false);

        assert_eq!(
            drain(&mut rx),
            vec![
                DaemonMsg::HoverChanged { hovering: true },
                DaemonMsg::VisibilityChanged { visible: true },
                DaemonMsg::ModeToggled { enabled: false },
            ]
        );
    }

    #[test]
    fn closed_subscribers_are_pruned() {
        let subscribers = Subscribers::default();
        let (tx_open, _rx_open) = mpsc::unbounded_channel();
        let (tx_closed, rx_closed) = mpsc::unbounded_channel::<String>();
        drop(rx_closed);
        subscribers.borrow_mut().push(tx_open);
        subscribers.borrow_mut().push(tx_closed);

        broadcast(&subscribers, &DaemonMsg::ModeToggled { enabled: true });
        assert_eq!(subscribers.borrow().len(), 1);
    }
}
