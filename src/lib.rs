//! Asteroid Arena - a vertical space shooter against an AI opponent
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, world state)
//! - `session`: Lifecycle of one game (timers, cancellation, standings)
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance
//! - `highscores`: Local leaderboard

pub mod error;
pub mod highscores;
pub mod platform;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use highscores::HighScores;
pub use session::{Epoch, Observer, Outcome, Session, Standings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants (reference 800x600 arena)
pub mod consts {
    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Players stay this far from every edge; asteroids are culled this far below the bottom
    pub const ARENA_MARGIN: f32 = 20.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_START_LIVES: u8 = 3;
    /// Players start this far above the bottom edge
    pub const PLAYER_START_OFFSET: f32 = 100.0;

    /// Bullets leave the ship this far above its center
    pub const BULLET_SPAWN_OFFSET: f32 = 20.0;
    pub const BULLET_SPEED: f32 = 10.0;
    /// Human fire cooldown in milliseconds
    pub const SHOOT_COOLDOWN_MS: f64 = 200.0;

    /// Asteroid defaults
    pub const ASTEROID_SPEED: f32 = 2.0;
    pub const ASTEROID_SPAWN_Y: f32 = -20.0;
    pub const ASTEROID_MIN_SIZE: f32 = 30.0;
    pub const ASTEROID_SIZE_RANGE: f32 = 20.0;
    /// Max rotation speed magnitude (degrees per tick)
    pub const ASTEROID_MAX_SPIN: f32 = 2.0;
    pub const ASTEROID_SPAWN_PERIOD_MS: f64 = 1000.0;

    /// Points for destroying an asteroid
    pub const ASTEROID_POINTS: u32 = 10;

    /// Number of explosion animation frames
    pub const EXPLOSION_FRAMES: u32 = 5;

    /// Round length in seconds
    pub const ROUND_SECONDS: u32 = 60;
    pub const COUNTDOWN_PERIOD_MS: f64 = 1000.0;

    /// AI policy
    pub const AI_AVOID_DISTANCE: f32 = 150.0;
    pub const AI_WANDER_CHANCE: f64 = 0.05;
    pub const AI_FIRE_CHANCE: f64 = 0.02;

    /// Maximum timer fires per poll to prevent spiral of death
    pub const MAX_TIMER_CATCH_UP: u32 = 8;

    /// Ship color palette
    pub const COLORS: [&str; 5] = ["#FF5733", "#33FF57", "#3357FF", "#F3FF33", "#FF33F3"];

    pub const DEFAULT_USERNAME: &str = "Player";
    pub const HUMAN_PLAYER_ID: &str = "player";
    pub const AI_PLAYER_ID: &str = "ai-player";
    pub const AI_PLAYER_NAME: &str = "AI Opponent";
}

/// Clamp a point into the rectangle `[margin, width - margin] x [margin, height - margin]`
#[inline]
pub fn clamp_to_arena(pos: Vec2, width: f32, height: f32, margin: f32) -> Vec2 {
    Vec2::new(
        pos.x.max(margin).min(width - margin),
        pos.y.max(margin).min(height - margin),
    )
}
