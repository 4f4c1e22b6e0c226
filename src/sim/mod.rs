//! Simulation building blocks
//!
//! Pure, platform-free pieces every level is assembled from:
//! - Seeded RNG only (owned by each level)
//! - Per-tick constants, no wall-clock reads
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod particles;
pub mod status;

pub use body::{Body, Trail};
pub use collision::{
    Circle, Rect, circle_overlap, distance, point_in_circle, point_in_rect, rect_overlap,
};
pub use particles::{Envelope, Particle, ParticleSystem, Spread};
pub use status::{EffectKind, StatusEffects};
