use crate::surface::Surface;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_AUTO_HIDE_DELAY_MS: i64 = 2000;
pub const DEFAULT_ANIMATION_DURATION_MS: i64 = 300;
pub const DEFAULT_HOVER_ZONE_PX: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub surfaces: SurfacesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Persisted preference: enter immersive mode when the host goes fullscreen.
    #[serde(default = "GeneralConfig::default_enabled")]
    pub enabled: bool,
    /// Refuse to enable while the legacy "always show toolbar" condition holds.
    #[serde(default = "GeneralConfig::default_suppress")]
    pub suppress_when_legacy_always_show: bool,
    /// Snapshot of the legacy "always show toolbar in fullscreen" condition.
    #[serde(default)]
    pub legacy_always_show: bool,
}

impl GeneralConfig {
    fn default_enabled() -> bool { true }
    fn default_suppress() -> bool { true }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            suppress_when_legacy_always_show: true,
            legacy_always_show: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_auto_hide_delay")]
    pub auto_hide_delay_ms: i64,
    #[serde(default = "TimingConfig::default_animation_duration")]
    pub animation_duration_ms: i64,
}

impl TimingConfig {
    fn default_auto_hide_delay() -> i64 { DEFAULT_AUTO_HIDE_DELAY_MS }
    fn default_animation_duration() -> i64 { DEFAULT_ANIMATION_DURATION_MS }

    pub fn auto_hide_delay(&self) -> Duration {
        Duration::from_millis(self.auto_hide_delay_ms.max(0) as u64)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms.max(0) as u64)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            auto_hide_delay_ms: DEFAULT_AUTO_HIDE_DELAY_MS,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Depth of the hover zone along the top edge of the window.
    #[serde(default = "RevealConfig::default_hover_zone")]
    pub hover_zone_px: i32,
    #[serde(default = "RevealConfig::default_on_focus")]
    pub on_focus: bool,
    #[serde(default)]
    pub on_key_activity: bool,
}

impl RevealConfig {
    fn default_hover_zone() -> i32 { DEFAULT_HOVER_ZONE_PX }
    fn default_on_focus() -> bool { true }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            hover_zone_px: DEFAULT_HOVER_ZONE_PX,
            on_focus: true,
            on_key_activity: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacesConfig {
    #[serde(default = "Surface::default_managed")]
    pub managed: Vec<Surface>,
}

impl Default for SurfacesConfig {
    fn default() -> Self {
        Self {
            managed: Surface::default_managed(),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("immersived")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: Config = toml::from_str(&contents).with_context(|| "parsing config TOML")?;
        Ok(config.sanitized())
    }

    /// Clamp out-of-range values to safe floors. Never fails: these are UI
    /// policy values, not errors a caller has to react to.
    pub fn sanitized(mut self) -> Self {
        if self.timing.auto_hide_delay_ms < 0 {
            warn!(value = self.timing.auto_hide_delay_ms, "negative auto_hide_delay_ms, using 0");
            self.timing.auto_hide_delay_ms = 0;
        }
        if self.timing.animation_duration_ms < 0 {
            warn!(value = self.timing.animation_duration_ms, "negative animation_duration_ms, using 0");
            self.timing.animation_duration_ms = 0;
        }
        if self.reveal.hover_zone_px <= 0 {
            // A zero-depth zone could never be entered.
            warn!(
                value = self.reveal.hover_zone_px,
                fallback = DEFAULT_HOVER_ZONE_PX,
                "non-positive hover_zone_px"
            );
            self.reveal.hover_zone_px = DEFAULT_HOVER_ZONE_PX;
        }
        let mut seen = Vec::with_capacity(self.surfaces.managed.len());
        self.surfaces.managed.retain(|s| {
            if seen.contains(s) {
                false
            } else {
                seen.push(*s);
                true
            }
        });
        self
    }

    /// Whether enabling must be refused because of the legacy preference.
    pub fn legacy_suppresses(&self) -> bool {
        self.general.suppress_when_legacy_always_show && self.general.legacy_always_show
    }
}

pub fn socket_path() -> PathBuf {
    // IMMERSIVED_SOCK overrides for testing.
    if let Ok(path) = std::env::var("IMMERSIVED_SOCK") {
        return PathBuf::from(path);
    }
    dirs::runtime_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("immersived.sock")
}
