//! Vibration feedback, rate-limited

/// Anything that can buzz the device. Failures are swallowed by callers.
pub trait Vibrator {
    /// Returns false if the platform refused
    fn vibrate(&mut self, duration_ms: u32) -> bool;
}

/// Devices without vibration
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVibration;

impl Vibrator for NoVibration {
    fn vibrate(&mut self, _duration_ms: u32) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticStrength {
    Light,
    Medium,
    Strong,
}

impl HapticStrength {
    pub fn duration_ms(&self) -> u32 {
        match self {
            HapticStrength::Light => 5,
            HapticStrength::Medium => 10,
            HapticStrength::Strong => 20,
        }
    }
}

/// Minimum gap between two pulses
pub const MIN_PULSE_INTERVAL_MS: f64 = 50.0;

pub struct Haptics {
    enabled: bool,
    last_pulse_ms: Option<f64>,
    device: Box<dyn Vibrator>,
}

impl Haptics {
    pub fn new(enabled: bool, device: Box<dyn Vibrator>) -> Self {
        Self {
            enabled,
            last_pulse_ms: None,
            device,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Pulse unless disabled or another pulse fired within the last 50ms.
    /// Returns whether a pulse was attempted.
    pub fn pulse(&mut self, strength: HapticStrength, now_ms: f64) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some(last) = self.last_pulse_ms {
            if now_ms - last < MIN_PULSE_INTERVAL_MS {
                return false;
            }
        }
        self.last_pulse_ms = Some(now_ms);
        // Unsupported or blocked vibration is not an error
        let _ = self.device.vibrate(strength.duration_ms());
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every requested pulse
    #[derive(Clone, Default)]
    pub(crate) struct RecordingVibrator(pub Rc<RefCell<Vec<u32>>>);

    impl Vibrator for RecordingVibrator {
        fn vibrate(&mut self, duration_ms: u32) -> bool {
            self.0.borrow_mut().push(duration_ms);
            true
        }
    }

    #[test]
    fn test_pulses_rate_limited() {
        let rec = RecordingVibrator::default();
        let mut haptics = Haptics::new(true, Box::new(rec.clone()));
        assert!(haptics.pulse(HapticStrength::Light, 0.0));
        assert!(!haptics.pulse(HapticStrength::Light, 30.0));
        assert!(haptics.pulse(HapticStrength::Strong, 60.0));
        assert_eq!(*rec.0.borrow(), vec![5, 20]);
    }

    #[test]
    fn test_disabled_never_pulses() {
        let rec = RecordingVibrator::default();
        let mut haptics = Haptics::new(false, Box::new(rec.clone()));
        assert!(!haptics.pulse(HapticStrength::Medium, 0.0));
        assert!(rec.0.borrow().is_empty());
    }
}
