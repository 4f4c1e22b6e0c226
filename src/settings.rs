//! Player settings and preferences
//!
//! Persisted in LocalStorage on the web; natively the defaults are used.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Caps particle counts and trail lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Trail length multiplier (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }
}

/// Player preferences; every field has a default so partial JSON loads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (sand, splashes, sparks...)
    pub particles: bool,
    /// Motion trails behind balls, ghosts and arrows
    pub trails: bool,

    // === Controls ===
    /// Vibrate on key/touch presses where supported
    pub haptics: bool,
    /// Free touches drive an analog stick instead of swipes
    pub touch_joystick: bool,
    /// Gamepad stick dead zone (0.1 - 0.3)
    pub gamepad_dead_zone: f32,

    // === Timing ===
    /// Frame rate the loop throttles to
    pub target_fps: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Start muted
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (freezes waves, palm sway, flame flicker)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            trails: true,

            haptics: true,
            touch_joystick: false,
            gamepad_dead_zone: 0.2,

            target_fps: crate::consts::TARGET_FPS,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse settings from JSON, clamping out-of-range values
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    fn sanitize(&mut self) {
        self.gamepad_dead_zone = self.gamepad_dead_zone.clamp(0.1, 0.3);
        self.target_fps = self.target_fps.clamp(15.0, 240.0);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Trail points to keep for a trail whose full length is `full`
    pub fn trail_len(&self, full: usize) -> usize {
        if !self.trails {
            0
        } else {
            ((full as f32) * self.quality.trail_quality()).ceil() as usize
        }
    }

    /// Whether purely cosmetic animation should run
    pub fn ambient_motion(&self) -> bool {
        !self.reduced_motion
    }

    /// Milliseconds between simulation steps
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps as f64
    }

    const STORAGE_KEY: &'static str = "retro_arcade_settings";

    /// Stored settings, or defaults if there are none or they don't parse
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = local_storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());
        match stored.as_deref().map(Self::from_json) {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                log::warn!("Stored settings unreadable, using defaults: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = local_storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) if storage.set_item(Self::STORAGE_KEY, &json).is_ok() => {
                log::info!("Settings saved")
            }
            Ok(_) => log::warn!("LocalStorage rejected settings"),
            Err(e) => log::warn!("Settings not serialisable: {}", e),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_particles_off_caps_to_zero() {
        let mut s = Settings::from_preset(QualityPreset::High);
        assert_eq!(s.max_particles(), 2000);
        s.particles = false;
        assert_eq!(s.max_particles(), 0);
    }

    #[test]
    fn test_from_json_fills_defaults_and_clamps() {
        let s = Settings::from_json(r#"{"gamepad_dead_zone": 0.9, "haptics": false}"#).unwrap();
        assert_eq!(s.gamepad_dead_zone, 0.3);
        assert!(!s.haptics);
        assert_eq!(s.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Settings::from_json("{ nope").is_err());
    }

    #[test]
    fn test_frame_interval() {
        let s = Settings::default();
        assert!((s.frame_interval_ms() - 1000.0 / 60.0).abs() < 1e-9);
    }
}
