//! Small numeric helpers shared by every level
//!
//! Randomness always goes through an explicitly owned [`Pcg32`]; there is no
//! global generator.

use std::f32::consts::PI;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::normalize_angle;

/// Seeded generator owned by a level
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * PI / 180.0
}

#[inline]
pub fn rad_to_deg(rad: f32) -> f32 {
    rad * 180.0 / PI
}

/// Uniform float in `[min, max)`. Returns `min` for an empty range.
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

/// Uniform integer in `[min, max]` (both inclusive).
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Either `1.0` or `-1.0`
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Unit vector pointing along `angle`
#[inline]
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Heading from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Signed shortest turn from `current` to `target`, in [-π, π)
#[inline]
pub fn angle_delta(current: f32, target: f32) -> f32 {
    normalize_angle(target - current)
}

/// Turn `current` toward `target` by at most `max_step` radians
pub fn rotate_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = angle_delta(current, target);
    if diff.abs() <= max_step {
        target
    } else {
        current + diff.signum() * max_step
    }
}

/// Step `pos` toward `target` by at most `max_step` on each axis
pub fn step_towards(pos: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let d = target - pos;
    pos + Vec2::new(
        d.x.clamp(-max_step, max_step),
        d.y.clamp(-max_step, max_step),
    )
}

/// Format milliseconds as `m:ss.cc`
pub fn format_race_time(ms: f64) -> String {
    let total = ms.max(0.0);
    let minutes = (total / 60_000.0).floor() as u64;
    let seconds = ((total % 60_000.0) / 1000.0).floor() as u64;
    let centis = ((total % 1000.0) / 10.0).floor() as u64;
    format!("{}:{:02}.{:02}", minutes, seconds, centis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_and_lerp() {
        assert_eq!(clamp(5.0, 0.0, 3.0), 3.0);
        assert_eq!(clamp(-1.0, 0.0, 3.0), 0.0);
        assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
    }

    #[test]
    fn test_degree_conversion() {
        assert!((deg_to_rad(180.0) - PI).abs() < 1e-6);
        assert!((rad_to_deg(PI / 2.0) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_random_int_is_inclusive() {
        let mut rng = seeded_rng(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let v = random_int(&mut rng, 1, 3);
            assert!((1..=3).contains(&v));
            seen[(v - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_rotate_towards_takes_short_way() {
        // From just below π to just above -π is a tiny step across the seam
        let next = rotate_towards(PI - 0.05, -PI + 0.05, 0.02);
        assert!(next > PI - 0.05);
        assert_eq!(rotate_towards(0.0, 0.01, 0.1), 0.01);
    }

    #[test]
    fn test_format_race_time() {
        assert_eq!(format_race_time(0.0), "0:00.00");
        assert_eq!(format_race_time(83_456.0), "1:23.45");
    }

    proptest! {
        #[test]
        fn prop_random_between_stays_in_range(seed in any::<u64>(), lo in -500.0f32..500.0, span in 0.0f32..500.0) {
            let mut rng = seeded_rng(seed);
            let v = random_between(&mut rng, lo, lo + span);
            prop_assert!(v >= lo && v <= lo + span);
        }

        #[test]
        fn prop_step_towards_never_overshoots(x in -100.0f32..100.0, y in -100.0f32..100.0, step in 0.0f32..10.0) {
            let next = step_towards(Vec2::ZERO, Vec2::new(x, y), step);
            prop_assert!(next.x.abs() <= x.abs() + 1e-4);
            prop_assert!(next.y.abs() <= y.abs() + 1e-4);
        }
    }
}
