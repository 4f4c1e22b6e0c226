//! Input abstraction
//!
//! Keyboard, touch and gamepad are merged into a small set of logical
//! actions. Sources are consulted in order touch → keyboard → gamepad and
//! combined with a logical OR; for analog axes the first non-zero source
//! wins. Missing devices simply read as "not pressed".

pub mod gamepad;
pub mod haptics;
pub mod keyboard;
pub mod touch;

pub use gamepad::{GamepadSnapshot, GamepadSource, GamepadState, NoGamepad};
pub use haptics::{HapticStrength, Haptics, NoVibration, Vibrator};
pub use keyboard::{KeyMap, KeyboardState};
pub use touch::TouchState;

use glam::Vec2;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Action,
    Jump,
    Boost,
    Brake,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Action,
        Action::Jump,
        Action::Boost,
        Action::Brake,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Name used by `data-control` attributes on virtual buttons
    pub fn from_control_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Action::Up),
            "down" => Some(Action::Down),
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "action" => Some(Action::Action),
            "jump" => Some(Action::Jump),
            "boost" => Some(Action::Boost),
            "brake" => Some(Action::Brake),
            _ => None,
        }
    }
}

/// Analog axes; screen orientation, so positive vertical points down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Input frozen for one simulation step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pressed: [bool; 8],
    /// Merged stick, each component in [-1, 1]
    pub stick: Vec2,
    /// Restart requested since the previous snapshot
    pub restart: bool,
}

impl TickInput {
    /// Input with exactly these actions held
    pub fn with(actions: &[Action]) -> Self {
        let mut input = Self::default();
        for a in actions {
            input.pressed[a.index()] = true;
        }
        input
    }

    pub fn pressed(&self, action: Action) -> bool {
        self.pressed[action.index()]
    }

    /// -1 / 0 / +1 from a pair of opposing actions
    pub fn digital_axis(&self, negative: Action, positive: Action) -> f32 {
        (self.pressed(positive) as i32 - self.pressed(negative) as i32) as f32
    }
}

/// Merged controller state for the running level
pub struct Controls {
    keymap: KeyMap,
    keyboard: KeyboardState,
    touch: TouchState,
    gamepad: GamepadState,
    gamepad_source: Box<dyn GamepadSource>,
    haptics: Haptics,
    touch_capable: bool,
    restart_pending: bool,
    now_ms: f64,
}

impl Controls {
    pub fn new(
        settings: &Settings,
        touch_capable: bool,
        gamepad_source: Box<dyn GamepadSource>,
        vibrator: Box<dyn Vibrator>,
    ) -> Self {
        Self {
            keymap: KeyMap::default(),
            keyboard: KeyboardState::default(),
            touch: TouchState::new(settings.touch_joystick),
            gamepad: GamepadState::new(settings.gamepad_dead_zone),
            gamepad_source,
            haptics: Haptics::new(settings.haptics, vibrator),
            touch_capable,
            restart_pending: false,
            now_ms: 0.0,
        }
    }

    /// Keyboard only, no pad, no vibration
    pub fn headless(settings: &Settings) -> Self {
        Self::new(settings, false, Box::new(NoGamepad), Box::new(NoVibration))
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.touch.set_joystick_mode(settings.touch_joystick);
        self.gamepad.set_dead_zone(settings.gamepad_dead_zone);
        self.haptics.set_enabled(settings.haptics);
    }

    pub fn keymap_mut(&mut self) -> &mut KeyMap {
        &mut self.keymap
    }

    /// Advance the clock used for swipe expiry and haptic rate limiting
    pub fn advance_clock(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        self.touch.expire(now_ms);
    }

    // === Raw events ===

    /// Returns true if the key is bound (the caller should prevent the
    /// browser default, e.g. page scroll on arrows/space).
    pub fn key_down(&mut self, key: &str, code: &str) -> bool {
        let fresh = self.keyboard.key_down(key, code);
        if fresh {
            self.haptics.pulse(HapticStrength::Light, self.now_ms);
            if keyboard::is_restart_key(key, code) {
                self.restart_pending = true;
            }
        }
        self.keymap.is_bound(key) || self.keymap.is_bound(code)
    }

    pub fn key_up(&mut self, key: &str, code: &str) {
        self.keyboard.key_up(key, code);
    }

    pub fn touch_start(&mut self, id: i32, pos: Vec2, zone: Option<Action>) {
        self.touch_capable = true;
        self.touch.start(id, pos, zone);
        self.haptics.pulse(HapticStrength::Light, self.now_ms);
    }

    pub fn touch_move(&mut self, id: i32, pos: Vec2) {
        self.touch.moved(id, pos, self.now_ms);
    }

    pub fn touch_end(&mut self, id: i32) {
        self.touch.end(id);
    }

    /// Sample the gamepad; call once per tick
    pub fn poll_gamepad(&mut self) {
        let snapshot = self.gamepad_source.poll();
        self.gamepad.update(snapshot);
    }

    /// Drop everything held, e.g. when switching levels
    pub fn release_all(&mut self) {
        self.keyboard.clear();
        self.touch.clear();
        self.gamepad.update(None);
        self.restart_pending = false;
    }

    // === Queries ===

    pub fn is_pressed(&self, action: Action) -> bool {
        (self.touch_capable && self.touch.is_pressed(action, self.now_ms))
            || self.keyboard.is_pressed(&self.keymap, action)
            || self.gamepad.is_pressed(action)
    }

    pub fn analog(&self, axis: Axis) -> f32 {
        if self.touch_capable {
            let v = self.touch.analog(axis);
            if v != 0.0 {
                return v;
            }
        }
        let (neg, pos) = match axis {
            Axis::Horizontal => (Action::Left, Action::Right),
            Axis::Vertical => (Action::Up, Action::Down),
        };
        let keys = self.keyboard.is_pressed(&self.keymap, pos) as i32
            - self.keyboard.is_pressed(&self.keymap, neg) as i32;
        if keys != 0 {
            return keys as f32;
        }
        self.gamepad.analog(axis)
    }

    /// Freeze the current state for one update; consumes a pending restart
    pub fn snapshot(&mut self) -> TickInput {
        let mut input = TickInput::default();
        for action in Action::ALL {
            input.pressed[action.index()] = self.is_pressed(action);
        }
        input.stick = Vec2::new(self.analog(Axis::Horizontal), self.analog(Axis::Vertical));
        input.restart = std::mem::take(&mut self.restart_pending);
        input
    }

    pub fn haptic(&mut self, strength: HapticStrength) {
        self.haptics.pulse(strength, self.now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::haptics::tests::RecordingVibrator;

    struct FixedPad(GamepadSnapshot);

    impl GamepadSource for FixedPad {
        fn poll(&mut self) -> Option<GamepadSnapshot> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn test_sources_are_ored() {
        let settings = Settings::default();
        let mut buttons = vec![false; 17];
        buttons[0] = true;
        let pad = FixedPad(GamepadSnapshot {
            axes: vec![0.0, 0.0],
            buttons,
        });
        let mut controls =
            Controls::new(&settings, true, Box::new(pad), Box::new(NoVibration));
        controls.poll_gamepad();
        controls.key_down("ArrowLeft", "ArrowLeft");
        controls.touch_start(1, Vec2::ZERO, Some(Action::Boost));

        let input = controls.snapshot();
        assert!(input.pressed(Action::Jump));
        assert!(input.pressed(Action::Left));
        assert!(input.pressed(Action::Boost));
        assert!(!input.pressed(Action::Right));
        assert_eq!(input.stick.x, -1.0);
    }

    #[test]
    fn test_keyboard_beats_gamepad_for_analog() {
        let settings = Settings::default();
        let pad = FixedPad(GamepadSnapshot {
            axes: vec![0.8, 0.0],
            buttons: vec![],
        });
        let mut controls =
            Controls::new(&settings, false, Box::new(pad), Box::new(NoVibration));
        controls.poll_gamepad();
        assert!((controls.analog(Axis::Horizontal) - 0.8).abs() < 1e-6);
        controls.key_down("a", "KeyQ");
        assert_eq!(controls.analog(Axis::Horizontal), -1.0);
    }

    #[test]
    fn test_restart_is_edge_triggered() {
        let mut controls = Controls::headless(&Settings::default());
        controls.key_down("r", "KeyR");
        assert!(controls.snapshot().restart);
        assert!(!controls.snapshot().restart);
        // Held key repeating does not re-trigger
        controls.key_down("r", "KeyR");
        assert!(!controls.snapshot().restart);
    }

    #[test]
    fn test_key_down_haptics_only_on_fresh_press() {
        let rec = RecordingVibrator::default();
        let mut controls = Controls::new(
            &Settings::default(),
            false,
            Box::new(NoGamepad),
            Box::new(rec.clone()),
        );
        controls.advance_clock(0.0);
        controls.key_down("d", "KeyD");
        controls.advance_clock(100.0);
        controls.key_down("d", "KeyD");
        assert_eq!(rec.0.borrow().len(), 1);
    }

    #[test]
    fn test_bound_keys_reported() {
        let mut controls = Controls::headless(&Settings::default());
        assert!(controls.key_down(" ", "Space"));
        assert!(!controls.key_down("F5", "F5"));
    }

    #[test]
    fn test_release_all() {
        let mut controls = Controls::headless(&Settings::default());
        controls.key_down("s", "KeyS");
        controls.release_all();
        assert!(!controls.is_pressed(Action::Down));
    }
}
