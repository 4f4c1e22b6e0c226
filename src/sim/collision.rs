//! Collision predicates shared by all levels
//!
//! Everything here is pure: no allocation, no state. Levels decide what a
//! hit means. Hit boxes are deliberately forgiving in play, so most callers
//! inflate rectangles before testing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `size` centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    /// Grow on every side by `margin`
    pub fn inflate(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2.0,
            self.h + margin * 2.0,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Circle by centre and radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Rectangles overlap when all four strict half-plane tests pass.
/// Touching edges do not count.
#[inline]
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Circles overlap when their centres are closer than the sum of radii
#[inline]
pub fn circle_overlap(a: &Circle, b: &Circle) -> bool {
    distance(a.center, b.center) < a.radius + b.radius
}

/// Inclusive on every edge
#[inline]
pub fn point_in_rect(p: Vec2, r: &Rect) -> bool {
    p.x >= r.x && p.x <= r.right() && p.y >= r.y && p.y <= r.bottom()
}

/// Inclusive on the boundary
#[inline]
pub fn point_in_circle(p: Vec2, c: &Circle) -> bool {
    distance(p, c.center) <= c.radius
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!rect_overlap(&a, &touching));
        assert!(rect_overlap(&a, &overlapping));
        assert!(rect_overlap(&overlapping, &a));
    }

    #[test]
    fn test_circle_overlap() {
        let a = Circle::new(Vec2::ZERO, 5.0);
        assert!(circle_overlap(&a, &Circle::new(Vec2::new(9.0, 0.0), 5.0)));
        assert!(!circle_overlap(&a, &Circle::new(Vec2::new(10.0, 0.0), 5.0)));
    }

    #[test]
    fn test_point_tests_are_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_rect(Vec2::new(10.0, 10.0), &r));
        assert!(!point_in_rect(Vec2::new(10.1, 5.0), &r));

        let c = Circle::new(Vec2::ZERO, 3.0);
        assert!(point_in_circle(Vec2::new(3.0, 0.0), &c));
        assert!(!point_in_circle(Vec2::new(3.0, 0.1), &c));
    }

    #[test]
    fn test_inflate_makes_near_miss_a_hit() {
        let target = Rect::new(100.0, 100.0, 40.0, 40.0);
        let arrow = Rect::new(145.0, 110.0, 20.0, 3.0);
        assert!(!rect_overlap(&arrow, &target));
        assert!(rect_overlap(&arrow, &target.inflate(15.0)));
    }
}
