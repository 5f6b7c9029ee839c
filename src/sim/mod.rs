//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (players by id, entities by sequence)
//! - No rendering, timer or platform dependencies

pub mod ai;
pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{circle_hit, resolve_collisions};
pub use state::{Asteroid, Bullet, EndReason, Explosion, Phase, Player, PlayerId, World};
pub use tick::{InputState, spawn_asteroid, step, tick_countdown};
