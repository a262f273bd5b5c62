use crate::surface::{Rect, Surface};
use serde::{Deserialize, Serialize};

/// Messages from daemon to surface hosts and clients (JSON-lines over Unix socket).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DaemonMsg {
    /// Show or hide one managed surface.
    SetVisible { surface: Surface, visible: bool },
    /// Immersive UI was revealed or hidden.
    VisibilityChanged { visible: bool },
    /// Immersive mode was turned on or off.
    ModeToggled { enabled: bool },
    /// Pointer entered or left the hover zone.
    HoverChanged { hovering: bool },
    /// Status response.
    Status {
        mode: String,
        visible: bool,
        hovering: bool,
        version: String,
    },
    /// Acknowledgement for commands.
    Ack { ok: bool, message: String },
}

/// Host signals and control requests sent to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMsg {
    PointerMoved { x: i32, y: i32 },
    /// The designated input surface (address bar) gained focus.
    FocusGained,
    FocusLost,
    KeyActivity,
    /// Umbrella host condition, e.g. fullscreen.
    HostMode { active: bool },
    /// Active tab or equivalent context switched.
    FocusedContextChanged,
    Pin,
    Unpin,
    Reveal,
    Hide,
    Enable,
    Disable,
    SetWindowBounds { bounds: Rect },
    SetLegacyAlwaysShow { active: bool },
    ReloadConfig,
    GetStatus,
    /// Client wants every surface command and notification pushed to it.
    Subscribe,
}

/// Serialize a message as a JSON line (with trailing newline).
pub fn encode(msg: &impl Serialize) -> String {
    let mut s = serde_json::to_string(msg).expect("serialize IPC message");
    s.push('\n');
    s
}

/// Deserialize a JSON line. Returns None on empty/whitespace input.
pub fn decode_daemon(line: &str) -> Option<DaemonMsg> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

pub fn decode_host(line: &str) -> Option<HostMsg> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- framing ---

    #[test]
    fn encode_produces_single_line_with_trailing_newline() {
        let msg = DaemonMsg::Status {
            mode: "revealed".into(),
            visible: true,
            hovering: false,
            version: "0.1.0".into(),
        };
        let encoded = encode(&msg);
        assert!(encoded.ends_with('\n'));
        assert_eq!(encoded.matches('\n').count(), 1);
    }

    // --- wire tags ---

    #[test]
    fn set_visible_uses_snake_case_tags() {
        let encoded = encode(&DaemonMsg::SetVisible {
            surface: Surface::TabStrip,
            visible: false,
        });
        assert!(encoded.contains("\"type\":\"set_visible\""));
        assert!(encoded.contains("\"surface\":\"tab_strip\""));
    }

    #[test]
    fn decode_pointer_moved_from_wire() {
        let msg = decode_host(r#"{"type":"pointer_moved","x":600,"y":2}"#);
        assert_eq!(msg, Some(HostMsg::PointerMoved { x: 600, y: 2 }));
    }

    #[test]
    fn decode_window_bounds_from_wire() {
        let msg = decode_host(
            r#"{"type":"set_window_bounds","bounds":{"x":0,"y":0,"width":1200,"height":800}}"#,
        );
        assert_eq!(
            msg,
            Some(HostMsg::SetWindowBounds {
                bounds: Rect::new(0, 0, 1200, 800)
            })
        );
    }

    #[test]
    fn decode_unit_variants_from_wire() {
        assert_eq!(decode_host(r#"{"type":"focus_gained"}"#), Some(HostMsg::FocusGained));
        assert_eq!(
            decode_host(r#"{"type":"focused_context_changed"}"#),
            Some(HostMsg::FocusedContextChanged)
        );
        assert_eq!(
            decode_host(r#"{"type":"host_mode","active":true}"#),
            Some(HostMsg::HostMode { active: true })
        );
    }

    #[test]
    fn daemon_notification_decodes() {
        let line = encode(&DaemonMsg::HoverChanged { hovering: true });
        assert_eq!(
            decode_daemon(&line),
            Some(DaemonMsg::HoverChanged { hovering: true })
        );
    }

    // --- empty/whitespace input → None ---

    #[test]
    fn decode_returns_none_for_empty() {
        assert!(decode_daemon("").is_none());
        assert!(decode_host("   ").is_none());
        assert!(decode_host("\n").is_none());
    }

    // --- invalid JSON → None (not panic) ---

    #[test]
    fn decode_returns_none_for_garbage() {
        assert!(decode_daemon("not json").is_none());
        assert!(decode_host("{\"type\":\"unknown_variant\"}").is_none());
        assert!(decode_host("{\"type\":\"pointer_moved\",\"x\":1}").is_none());
    }
}
