//! Touch input: virtual buttons, swipes and an emulated analog stick
//!
//! Every finger is tracked by its touch id, so holding two virtual buttons
//! with two fingers works and lifting one releases only its own button.

use std::collections::HashMap;

use glam::Vec2;

use super::{Action, Axis};

/// Movement (px) before a free touch counts as a swipe
pub const SWIPE_THRESHOLD: f32 = 15.0;
/// How long a swipe keeps its direction pressed
pub const SWIPE_PULSE_MS: f64 = 100.0;
/// Joystick travel radius in px
pub const JOYSTICK_RADIUS: f32 = 50.0;
/// Normalised magnitude below which the stick reads zero
pub const JOYSTICK_DEAD_ZONE: f32 = 0.15;
/// Response curve exponent applied above the dead zone
pub const JOYSTICK_CURVE: f32 = 0.8;
/// Stick magnitude that also presses the digital direction
const JOYSTICK_DIGITAL: f32 = 0.3;

#[derive(Debug, Clone, Copy)]
struct TouchPoint {
    /// Origin for the next swipe / stick centre
    anchor: Vec2,
    zone: Option<Action>,
}

#[derive(Debug, Clone, Default)]
pub struct TouchState {
    touches: HashMap<i32, TouchPoint>,
    /// Swipe directions with their expiry time
    pulses: Vec<(Action, f64)>,
    joystick_mode: bool,
    joystick_id: Option<i32>,
    stick: Vec2,
}

/// Map a raw finger offset to a shaped stick vector with length <= 1
pub fn shape_stick(offset: Vec2) -> Vec2 {
    let len = offset.length();
    if len <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let magnitude = (len / JOYSTICK_RADIUS).min(1.0);
    if magnitude < JOYSTICK_DEAD_ZONE {
        return Vec2::ZERO;
    }
    let scaled = ((magnitude - JOYSTICK_DEAD_ZONE) / (1.0 - JOYSTICK_DEAD_ZONE)).powf(JOYSTICK_CURVE);
    offset / len * scaled
}

impl TouchState {
    pub fn new(joystick_mode: bool) -> Self {
        Self {
            joystick_mode,
            ..Self::default()
        }
    }

    pub fn set_joystick_mode(&mut self, enabled: bool) {
        self.joystick_mode = enabled;
        if !enabled {
            self.joystick_id = None;
            self.stick = Vec2::ZERO;
        }
    }

    /// A finger landed, on a virtual control (`zone`) or on free space
    pub fn start(&mut self, id: i32, pos: Vec2, zone: Option<Action>) {
        self.touches.insert(id, TouchPoint { anchor: pos, zone });
        if zone.is_none() && self.joystick_mode && self.joystick_id.is_none() {
            self.joystick_id = Some(id);
            self.stick = Vec2::ZERO;
        }
    }

    pub fn moved(&mut self, id: i32, pos: Vec2, now_ms: f64) {
        let Some(point) = self.touches.get_mut(&id) else {
            return;
        };
        if point.zone.is_some() {
            return;
        }
        if self.joystick_id == Some(id) {
            self.stick = shape_stick(pos - point.anchor);
            return;
        }

        let delta = pos - point.anchor;
        if delta.length() <= SWIPE_THRESHOLD {
            return;
        }
        let direction = if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 { Action::Right } else { Action::Left }
        } else if delta.y > 0.0 {
            Action::Down
        } else {
            Action::Up
        };
        point.anchor = pos;
        self.pulses.retain(|(a, _)| *a != direction);
        self.pulses.push((direction, now_ms + SWIPE_PULSE_MS));
    }

    pub fn end(&mut self, id: i32) {
        self.touches.remove(&id);
        if self.joystick_id == Some(id) {
            self.joystick_id = None;
            self.stick = Vec2::ZERO;
        }
    }

    pub fn clear(&mut self) {
        self.touches.clear();
        self.pulses.clear();
        self.joystick_id = None;
        self.stick = Vec2::ZERO;
    }

    /// Drop swipe pulses that have run out
    pub fn expire(&mut self, now_ms: f64) {
        self.pulses.retain(|(_, until)| *until > now_ms);
    }

    pub fn is_pressed(&self, action: Action, now_ms: f64) -> bool {
        if self.touches.values().any(|t| t.zone == Some(action)) {
            return true;
        }
        if self
            .pulses
            .iter()
            .any(|(a, until)| *a == action && *until > now_ms)
        {
            return true;
        }
        match action {
            Action::Left => self.stick.x < -JOYSTICK_DIGITAL,
            Action::Right => self.stick.x > JOYSTICK_DIGITAL,
            Action::Up => self.stick.y < -JOYSTICK_DIGITAL,
            Action::Down => self.stick.y > JOYSTICK_DIGITAL,
            _ => false,
        }
    }

    pub fn analog(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.stick.x,
            Axis::Vertical => self.stick.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fingers_tracked_independently() {
        let mut touch = TouchState::new(false);
        touch.start(1, Vec2::ZERO, Some(Action::Left));
        touch.start(2, Vec2::ZERO, Some(Action::Jump));
        touch.end(1);
        assert!(!touch.is_pressed(Action::Left, 0.0));
        assert!(touch.is_pressed(Action::Jump, 0.0));
    }

    #[test]
    fn test_swipe_pulse_expires() {
        let mut touch = TouchState::new(false);
        touch.start(7, Vec2::new(100.0, 100.0), None);
        touch.moved(7, Vec2::new(100.0, 110.0), 0.0);
        assert!(!touch.is_pressed(Action::Down, 0.0));
        touch.moved(7, Vec2::new(100.0, 130.0), 10.0);
        assert!(touch.is_pressed(Action::Down, 50.0));
        assert!(!touch.is_pressed(Action::Down, 110.0));
        touch.expire(200.0);
        assert!(!touch.is_pressed(Action::Down, 50.0));
    }

    #[test]
    fn test_joystick_dead_zone_and_digital() {
        let mut touch = TouchState::new(true);
        touch.start(3, Vec2::new(200.0, 200.0), None);
        touch.moved(3, Vec2::new(205.0, 200.0), 0.0);
        assert_eq!(touch.analog(Axis::Horizontal), 0.0);
        touch.moved(3, Vec2::new(300.0, 200.0), 0.0);
        assert!((touch.analog(Axis::Horizontal) - 1.0).abs() < 1e-5);
        assert!(touch.is_pressed(Action::Right, 0.0));
        touch.end(3);
        assert_eq!(touch.analog(Axis::Horizontal), 0.0);
    }

    proptest! {
        #[test]
        fn prop_stick_magnitude_bounded(x in -500.0f32..500.0, y in -500.0f32..500.0) {
            let v = shape_stick(Vec2::new(x, y));
            prop_assert!(v.length() <= 1.0 + 1e-5);
        }
    }
}
