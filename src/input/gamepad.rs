//! Gamepad polling with the standard button layout
//!
//! Gamepads are sampled on demand (once per tick), not event driven.

use super::{Action, Axis};

/// Standard-mapping button indices
pub mod buttons {
    pub const SOUTH: usize = 0;
    pub const EAST: usize = 1;
    pub const WEST: usize = 2;
    pub const NORTH: usize = 3;
    pub const LEFT_TRIGGER: usize = 6;
    pub const RIGHT_TRIGGER: usize = 7;
    pub const DPAD_UP: usize = 12;
    pub const DPAD_DOWN: usize = 13;
    pub const DPAD_LEFT: usize = 14;
    pub const DPAD_RIGHT: usize = 15;
}

/// Stick deflection that also counts as a digital direction
const STICK_DIGITAL: f32 = 0.5;
pub const DEFAULT_DEAD_ZONE: f32 = 0.2;

/// One sample of the first connected pad
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
}

impl GamepadSnapshot {
    fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }
}

pub trait GamepadSource {
    /// `None` when no pad is connected
    fn poll(&mut self) -> Option<GamepadSnapshot>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoGamepad;

impl GamepadSource for NoGamepad {
    fn poll(&mut self) -> Option<GamepadSnapshot> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct GamepadState {
    snapshot: Option<GamepadSnapshot>,
    dead_zone: f32,
}

impl Default for GamepadState {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_ZONE)
    }
}

impl GamepadState {
    pub fn new(dead_zone: f32) -> Self {
        Self {
            snapshot: None,
            dead_zone: dead_zone.clamp(0.1, 0.3),
        }
    }

    pub fn set_dead_zone(&mut self, dead_zone: f32) {
        self.dead_zone = dead_zone.clamp(0.1, 0.3);
    }

    pub fn update(&mut self, snapshot: Option<GamepadSnapshot>) {
        self.snapshot = snapshot;
    }

    pub fn connected(&self) -> bool {
        self.snapshot.is_some()
    }

    fn raw_axis(&self, index: usize) -> f32 {
        let value = self
            .snapshot
            .as_ref()
            .and_then(|s| s.axes.get(index).copied())
            .unwrap_or(0.0);
        if value.abs() < self.dead_zone {
            0.0
        } else {
            value.clamp(-1.0, 1.0)
        }
    }

    /// Left stick; zero inside the dead zone
    pub fn analog(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.raw_axis(0),
            Axis::Vertical => self.raw_axis(1),
        }
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        let Some(pad) = &self.snapshot else {
            return false;
        };
        use buttons::*;
        match action {
            Action::Jump => pad.button(SOUTH) || pad.button(NORTH),
            Action::Action => pad.button(EAST) || pad.button(WEST),
            Action::Boost => pad.button(RIGHT_TRIGGER),
            Action::Brake => pad.button(LEFT_TRIGGER),
            Action::Up => pad.button(DPAD_UP) || self.raw_axis(1) < -STICK_DIGITAL,
            Action::Down => pad.button(DPAD_DOWN) || self.raw_axis(1) > STICK_DIGITAL,
            Action::Left => pad.button(DPAD_LEFT) || self.raw_axis(0) < -STICK_DIGITAL,
            Action::Right => pad.button(DPAD_RIGHT) || self.raw_axis(0) > STICK_DIGITAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(axes: &[f32], pressed: &[usize]) -> GamepadSnapshot {
        let mut buttons = vec![false; 17];
        for &b in pressed {
            buttons[b] = true;
        }
        GamepadSnapshot {
            axes: axes.to_vec(),
            buttons,
        }
    }

    #[test]
    fn test_absent_pad_reads_neutral() {
        let state = GamepadState::default();
        assert!(!state.is_pressed(Action::Jump));
        assert_eq!(state.analog(Axis::Horizontal), 0.0);
    }

    #[test]
    fn test_dead_zone() {
        let mut state = GamepadState::new(0.2);
        state.update(Some(pad(&[0.15, -0.6], &[])));
        assert_eq!(state.analog(Axis::Horizontal), 0.0);
        assert_eq!(state.analog(Axis::Vertical), -0.6);
        assert!(state.is_pressed(Action::Up));
    }

    #[test]
    fn test_standard_mapping() {
        let mut state = GamepadState::default();
        state.update(Some(pad(&[0.0, 0.0], &[3, 7, 14])));
        assert!(state.is_pressed(Action::Jump));
        assert!(state.is_pressed(Action::Boost));
        assert!(state.is_pressed(Action::Left));
        assert!(!state.is_pressed(Action::Action));
        assert!(!state.is_pressed(Action::Brake));
    }

    #[test]
    fn test_dead_zone_clamped_to_range() {
        let mut state = GamepadState::new(0.9);
        state.update(Some(pad(&[0.35, 0.0], &[])));
        assert_eq!(state.analog(Axis::Horizontal), 0.35);
    }
}
