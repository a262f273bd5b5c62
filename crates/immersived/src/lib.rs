//! Reveal/auto-hide controller for immersive overlay surfaces.
//!
//! [`Controller`] reconciles pointer, focus, keyboard, pin and host-mode
//! signals into one visibility decision and drives surfaces through a
//! [`SurfaceBinding`]. The daemon binary hosts one controller behind a
//! Unix socket.

pub mod animation;
pub mod binding;
pub mod controller;
pub mod event;
pub mod observer;
pub mod timer;

pub use binding::SurfaceBinding;
pub use controller::{AnimationPhase, Controller, Mode};
pub use observer::{ImmersiveObserver, Notification, ObserverId};
