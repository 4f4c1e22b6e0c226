//! Kinematic bodies and motion trails

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position and per-tick velocity of a movable actor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }

    pub fn at(pos: Vec2) -> Self {
        Self::new(pos, Vec2::ZERO)
    }

    /// Advance by `steps` whole ticks at the current velocity
    pub fn integrate(&mut self, steps: u32) {
        self.pos += self.vel * steps as f32;
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Clamp the position into `[min, max]`, zeroing velocity along any
    /// clamped axis.
    pub fn clamp_to(&mut self, min: Vec2, max: Vec2) {
        if self.pos.x < min.x || self.pos.x > max.x {
            self.pos.x = self.pos.x.clamp(min.x, max.x);
            self.vel.x = 0.0;
        }
        if self.pos.y < min.y || self.pos.y > max.y {
            self.pos.y = self.pos.y.clamp(min.y, max.y);
            self.vel.y = 0.0;
        }
    }
}

/// Recent positions, newest first, capped at `capacity`
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, pos: Vec2) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_front(pos);
        self.points.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with a fade factor (1.0 newest, towards 0.0 oldest)
    pub fn iter_faded(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        let n = self.capacity.max(1) as f32;
        self.points
            .iter()
            .enumerate()
            .map(move |(i, p)| (*p, 1.0 - i as f32 / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_round_trip_then_zero_step_keeps_position() {
        let body = Body::new(Vec2::new(12.5, -3.0), Vec2::new(4.0, 1.5));
        let json = serde_json::to_string(&body).unwrap();
        let mut restored: Body = serde_json::from_str(&json).unwrap();
        restored.integrate(0);
        assert_eq!(restored.pos, body.pos);
        assert_eq!(restored.vel, body.vel);
    }

    #[test]
    fn test_integrate_steps() {
        let mut body = Body::new(Vec2::ZERO, Vec2::new(1.0, -2.0));
        body.integrate(3);
        assert_eq!(body.pos, Vec2::new(3.0, -6.0));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let mut body = Body::at(Vec2::new(-10.0, 900.0));
        body.clamp_to(Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert_eq!(body.pos, Vec2::new(0.0, 600.0));
    }

    #[test]
    fn test_trail_keeps_newest() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(Vec2::splat(i as f32));
        }
        assert_eq!(trail.len(), 3);
        let first = trail.iter_faded().next().unwrap();
        assert_eq!(first.0, Vec2::splat(4.0));
        assert_eq!(first.1, 1.0);
    }
}
