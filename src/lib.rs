//! Retro Arcade - a handful of browser minigames on one 2D scaffold
//!
//! Core modules:
//! - `engine`: Level trait, frame throttle and the start/stop game loop
//! - `levels`: Volleyball, maze chase, archery and kart racing simulations
//! - `input`: Keyboard, touch and gamepad merged into logical actions
//! - `sim`: Collision predicates, bodies, status effects, particles
//! - `renderer`: Draw list primitives, colours and procedural sprites
//! - `platform`: Browser glue (canvas, listeners, animation frames)
//! - `tuning`: Data-driven per-level constants

pub mod audio;
pub mod engine;
pub mod error;
pub mod input;
pub mod levels;
pub mod math;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ArcadeError, Result};
pub use settings::{QualityPreset, Settings};

/// Scaffold-wide constants
pub mod consts {
    /// Canvas dimensions every level draws into
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Default frame rate the loop throttles to
    pub const TARGET_FPS: f32 = 60.0;
    /// Longest elapsed time handed to a single update (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert!(normalize_angle(PI) < PI);
    }
}
