//! Short-lived cosmetic particles
//!
//! Lifetimes are counted in ticks. A particle is removed on exactly the
//! tick its life reaches zero, never before and never twice.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::math::random_between;
use crate::renderer::Color;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Color,
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    /// Remaining life as 0.0 - 1.0, used as draw alpha
    #[inline]
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// How initial velocities are drawn for a burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spread {
    /// Independent uniform ranges per axis
    Box { x: (f32, f32), y: (f32, f32) },
    /// Uniform direction, uniform speed
    Radial { speed: (f32, f32) },
}

/// Shape of a particle burst spawned for one gameplay event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub count: usize,
    pub life: u32,
    pub spread: Spread,
    pub size: (f32, f32),
}

impl Envelope {
    pub const fn boxed(count: usize, life: u32, x: (f32, f32), y: (f32, f32)) -> Self {
        Self {
            count,
            life,
            spread: Spread::Box { x, y },
            size: (2.0, 5.0),
        }
    }

    pub const fn radial(count: usize, life: u32, speed: (f32, f32)) -> Self {
        Self {
            count,
            life,
            spread: Spread::Radial { speed },
            size: (2.0, 5.0),
        }
    }

    pub const fn sized(mut self, min: f32, max: f32) -> Self {
        self.size = (min, max);
        self
    }
}

/// Particle pool with constant per-tick gravity and drag
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    gravity: f32,
    drag: f32,
    cap: usize,
}

impl ParticleSystem {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(256)),
            gravity: 0.0,
            drag: 1.0,
            cap,
        }
    }

    /// Downward acceleration added each tick
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Velocity multiplier applied each tick (1.0 = none)
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.particles.truncate(cap);
    }

    /// Add one particle; dropped silently when the pool is full
    pub fn emit(&mut self, particle: Particle) {
        if particle.life == 0 || self.particles.len() >= self.cap {
            return;
        }
        self.particles.push(particle);
    }

    /// Spawn a burst at `pos` following `envelope`
    pub fn burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        envelope: &Envelope,
        color: Color,
    ) {
        for _ in 0..envelope.count {
            let vel = match envelope.spread {
                Spread::Box { x, y } => Vec2::new(
                    random_between(rng, x.0, x.1),
                    random_between(rng, y.0, y.1),
                ),
                Spread::Radial { speed } => {
                    let angle = random_between(rng, 0.0, TAU);
                    let s = random_between(rng, speed.0, speed.1);
                    Vec2::new(angle.cos() * s, angle.sin() * s)
                }
            };
            self.emit(Particle {
                pos,
                vel,
                size: random_between(rng, envelope.size.0, envelope.size.1),
                color,
                life: envelope.life,
                max_life: envelope.life,
            });
        }
    }

    /// Advance one tick: gravity, drag, move, age, cull
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.vel.y += self.gravity;
            p.vel *= self.drag;
            p.pos += p.vel;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::seeded_rng;
    use proptest::prelude::*;

    #[test]
    fn test_particle_removed_exactly_at_zero() {
        let mut rng = seeded_rng(1);
        let mut ps = ParticleSystem::new(64);
        ps.burst(&mut rng, Vec2::ZERO, &Envelope::radial(4, 3, (1.0, 2.0)), Color::WHITE);
        ps.update();
        ps.update();
        assert_eq!(ps.len(), 4);
        assert!(ps.iter().all(|p| p.life == 1));
        ps.update();
        assert!(ps.is_empty());
    }

    #[test]
    fn test_cap_drops_extra() {
        let mut rng = seeded_rng(2);
        let mut ps = ParticleSystem::new(5);
        ps.burst(&mut rng, Vec2::ZERO, &Envelope::radial(20, 10, (1.0, 2.0)), Color::WHITE);
        assert_eq!(ps.len(), 5);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut ps = ParticleSystem::new(8).with_gravity(0.2);
        ps.emit(Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 2.0,
            color: Color::WHITE,
            life: 10,
            max_life: 10,
        });
        ps.update();
        ps.update();
        let p = ps.iter().next().unwrap();
        assert!(p.pos.y > 0.0);
        assert!((p.alpha() - 0.8).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_life_never_increases(seed in any::<u64>(), life in 1u32..60, ticks in 0usize..80) {
            let mut rng = seeded_rng(seed);
            let mut ps = ParticleSystem::new(32).with_drag(0.98);
            ps.burst(&mut rng, Vec2::ZERO, &Envelope::boxed(6, life, (-3.0, 3.0), (-5.0, -1.0)), Color::WHITE);
            let mut last = life;
            for _ in 0..ticks {
                ps.update();
                if let Some(p) = ps.iter().next() {
                    prop_assert!(p.life < last);
                    last = p.life;
                }
            }
            let expected = if ticks < life as usize { 6 } else { 0 };
            prop_assert_eq!(ps.len(), expected);
        }
    }
}
