mod bridge;

use anyhow::{Context, Result};
use bridge::{SocketBinding, SocketObserver, Subscribers};
use immersive_core::config::{self, Config};
use immersive_core::ipc::{self, DaemonMsg, HostMsg};
use immersive_core::surface::Point;
use immersived::{Controller, SurfaceBinding};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// A decoded client line plus the channel to answer on.
struct Request {
    msg: HostMsg,
    reply: mpsc::UnboundedSender<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("immersived=info".parse()?),
        )
        .init();

    info!("immersived starting");

    let config = Config::load().context("loading config")?;
    info!(
        auto_hide_delay_ms = config.timing.auto_hide_delay_ms,
        animation_duration_ms = config.timing.animation_duration_ms,
        hover_zone_px = config.reveal.hover_zone_px,
        "config loaded"
    );

    let subscribers = Subscribers::default();
    let mut controller = Controller::new(SocketBinding::new(subscribers.clone()), config);
    controller.add_observer(Box::new(SocketObserver::new(subscribers.clone())));

    // Requests from every client funnel into this loop, which alone owns
    // the controller.
    let (req_tx, mut req_rx) = mpsc::unbounded_channel::<Request>();

    let socket_path = config::socket_path();
    // Remove stale socket
    let _ = std::fs::remove_file(&socket_path);
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("binding socket {}", socket_path.display()))?;
    info!(path = %socket_path.display(), "IPC socket listening");

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    tokio::spawn(handle_ipc_client(stream, req_tx.clone()));
                }
                Err(e) => {
                    warn!(error = %e, "IPC accept error");
                }
            }
        }
    });

    loop {
        let deadline = controller.next_deadline();
        let sleep_fut = match deadline {
            Some(dl) => tokio::time::sleep_until(tokio::time::Instant::from_std(dl)),
            None => tokio::time::sleep_until(
                tokio::time::Instant::now() + Duration::from_secs(86400),
            ),
        };
        let has_deadline = deadline.is_some();

        tokio::select! {
            Some(req) = req_rx.recv() => {
                handle_request(&mut controller, &subscribers, req.msg, &req.reply);
            }
            _ = sleep_fut, if has_deadline => {
                controller.poll(Instant::now());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                break;
            }
            else => break,
        }
    }

    info!("immersived shutting down");
    controller.on_host_window_closed();
    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}

fn handle_request<B: SurfaceBinding>(
    controller: &mut Controller<B>,
    subscribers: &Subscribers,
    msg: HostMsg,
    reply: &mpsc::UnboundedSender<String>,
) {
    let ack = |message: &str| {
        let _ = reply.send(ipc::encode(&DaemonMsg::Ack {
            ok: true,
            message: message.into(),
        }));
    };

    match msg {
        // High-frequency signal: no reply.
        HostMsg::PointerMoved { x, y } => controller.on_pointer_moved(Point::new(x, y)),
        HostMsg::FocusGained => {
            controller.on_focus_gained();
            ack("focus gained");
        }
        HostMsg::FocusLost => {
            controller.on_focus_lost();
            ack("focus lost");
        }
        HostMsg::KeyActivity => {
            controller.on_key_activity();
            ack("key activity");
        }
        HostMsg::HostMode { active } => {
            controller.on_host_mode_changed(active);
            ack(&format!("host mode: {}", active));
        }
        HostMsg::FocusedContextChanged => {
            controller.on_focused_context_changed();
            ack("context changed");
        }
        HostMsg::Pin => {
            controller.pin();
            ack("pinned");
        }
        HostMsg::Unpin => {
            controller.unpin();
            ack("unpinned");
        }
        HostMsg::Reveal => {
            controller.reveal();
            ack("revealed");
        }
        HostMsg::Hide => {
            controller.hide_immediately();
            ack("hidden");
        }
        HostMsg::Enable => {
            controller.set_enabled(true);
            ack(&format!("enabled: {}", controller.is_enabled()));
        }
        HostMsg::Disable => {
            controller.set_enabled(false);
            ack("disabled");
        }
        HostMsg::SetWindowBounds { bounds } => {
            controller.set_window_bounds(bounds);
            ack("window bounds set");
        }
        HostMsg::SetLegacyAlwaysShow { active } => {
            controller.set_legacy_always_show(active);
            ack(&format!("legacy always-show: {}", active));
        }
        HostMsg::ReloadConfig => match Config::load() {
            Ok(config) => {
                controller.refresh_config(config);
                info!("config reloaded");
                ack("config reloaded");
            }
            Err(e) => {
                warn!(error = %e, "config reload failed");
                let _ = reply.send(ipc::encode(&DaemonMsg::Ack {
                    ok: false,
                    message: format!("failed to reload config: {:#}", e),
                }));
            }
        },
        HostMsg::GetStatus => {
            let status = DaemonMsg::Status {
                mode: controller.mode().to_string(),
                visible: controller.is_ui_visible(),
                hovering: controller.is_hovering(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            };
            let _ = reply.send(ipc::encode(&status));
        }
        HostMsg::Subscribe => {
            ack("subscribed");
            // Bring the new surface host up to date.
            if let Some(visible) = controller.surfaces_visible() {
                for &surface in &controller.config().surfaces.managed {
                    let _ = reply.send(ipc::encode(&DaemonMsg::SetVisible { surface, visible }));
                }
            }
            subscribers.borrow_mut().push(reply.clone());
            info!(subscribers = subscribers.borrow().len(), "client subscribed");
        }
    }
}

async fn handle_ipc_client(stream: UnixStream, requests: mpsc::UnboundedSender<Request>) {
    info!("IPC client connected");
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    // Channel for sending messages back to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Writer task
    let write_handle = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(msg) = ipc::decode_host(&line) else {
            warn!(line = %line.trim(), "undecodable IPC line");
            continue;
        };
        let request = Request {
            msg,
            reply: tx.clone(),
        };
        if requests.send(request).is_err() {
            break;
        }
    }

    // Subscribers holding a clone of `tx` are pruned on their next failed send.
    drop(tx);
    write_handle.abort();
    info!("IPC client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use immersive_core::surface::{Rect, Surface};
    use immersived::binding::RecordingBinding;
    use immersived::Mode;

    fn make_controller() -> Controller<RecordingBinding> {
        let mut config = Config::default();
        config.timing.animation_duration_ms = 0;
        Controller::new(RecordingBinding::new(), config)
    }

    fn send(
        controller: &mut Controller<RecordingBinding>,
        subscribers: &Subscribers,
        msg: HostMsg,
    ) -> Vec<DaemonMsg> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle_request(controller, subscribers, msg, &tx);
        let mut replies = Vec::new();
        while let Ok(line) = rx.try_recv() {
            replies.extend(ipc::decode_daemon(&line));
        }
        replies
    }

    fn is_ok_ack(replies: &[DaemonMsg]) -> bool {
        matches!(replies.first(), Some(DaemonMsg::Ack { ok: true, .. }))
    }

    #[test]
    fn control_requests_are_acked() {
        let subscribers = Subscribers::default();
        let mut c = make_controller();
        assert!(is_ok_ack(&send(&mut c, &subscribers, HostMsg::Enable)));
        assert!(is_ok_ack(&send(&mut c, &subscribers, HostMsg::Pin)));
        assert_eq!(c.mode(), Mode::Pinned);
        assert!(is_ok_ack(&send(&mut c, &subscribers, HostMsg::Unpin)));
        assert!(c.is_timer_pending());
    }

    #[test]
    fn pointer_moves_get_no_reply() {
        let subscribers = Subscribers::default();
        let mut c = make_controller();
        send(&mut c, &subscribers, HostMsg::Enable);
        let replies = send(&mut c, &subscribers, HostMsg::PointerMoved { x: 10, y: 1 });
        assert!(replies.is_empty());
        assert!(c.is_hovering());
    }

    #[test]
    fn status_reports_mode() {
        let subscribers = Subscribers::default();
        let mut c = make_controller();
        send(&mut c, &subscribers, HostMsg::HostMode { active: true });
        send(&mut c, &subscribers, HostMsg::Reveal);
        let replies = send(&mut c, &subscribers, HostMsg::GetStatus);
        match replies.as_slice() {
            [DaemonMsg::Status { mode, visible, .. }] => {
                assert_eq!(mode, "revealed");
                assert!(*visible);
            }
            other => panic!("unexpected replies: {:?}", other),
        }
    }

    #[test]
    fn window_bounds_request_applies() {
        let subscribers = Subscribers::default();
        let mut c = make_controller();
        send(&mut c, &subscribers, HostMsg::Enable);
        send(
            &mut c,
            &subscribers,
            HostMsg::SetWindowBounds {
                bounds: Rect::new(100, 0, 200, 200),
            },
        );
        send(&mut c, &subscribers, HostMsg::PointerMoved { x: 10, y: 1 });
        assert!(!c.is_hovering());
    }

    #[test]
    fn legacy_request_blocks_enable() {
        let subscribers = Subscribers::default();
        let mut c = make_controller();
        send(&mut c, &subscribers, HostMsg::SetLegacyAlwaysShow { active: true });
        let replies = send(&mut c, &subscribers, HostMsg::Enable);
        assert!(!c.is_enabled());
        assert_eq!(
            replies,
            vec![DaemonMsg::Ack {
                ok: true,
                message: "enabled: false".into()
            }]
        );
    }

    #[test]
    fn subscribe_replays_current_surface_state() {
        let subscribers = Subscribers::default();
        let mut c = make_controller();
        send(&mut c, &subscribers, HostMsg::Enable);
        let replies = send(&mut c, &subscribers, HostMsg::Subscribe);
        assert!(is_ok_ack(&replies));
        assert!(replies.contains(&DaemonMsg::SetVisible {
            surface: Surface::Toolbar,
            visible: false
        }));
        assert_eq!(subscribers.borrow().len(), 1);
    }
}
