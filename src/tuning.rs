//! Data-driven game balance
//!
//! Every constant the simulation reads lives here so a host can rebalance or
//! resize the arena without touching the core. Defaults match the reference
//! 800x600 arena in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Game balance and arena geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub width: f32,
    pub height: f32,
    /// Edge margin for players, culling margin for asteroids
    pub margin: f32,

    // === Players ===
    /// Per-tick displacement for both entrants
    pub player_speed: f32,
    /// Body radius used in player/asteroid tests
    pub player_radius: f32,
    pub start_lives: u8,
    /// Spawn height above the bottom edge
    pub start_offset: f32,

    // === Bullets ===
    pub bullet_speed: f32,
    pub bullet_spawn_offset: f32,
    /// Human fire cooldown (ms); the AI ignores it
    pub shoot_cooldown_ms: f64,

    // === Asteroids ===
    /// Base fall speed, multiplied by U[0.5, 1.5) at spawn
    pub asteroid_speed: f32,
    pub asteroid_spawn_y: f32,
    pub asteroid_min_size: f32,
    pub asteroid_size_range: f32,
    /// Rotation speed is drawn from [-max_spin, max_spin)
    pub asteroid_max_spin: f32,
    pub asteroid_spawn_period_ms: f64,
    pub asteroid_points: u32,

    // === Effects ===
    pub explosion_frames: u32,

    // === Round ===
    pub round_seconds: u32,
    pub countdown_period_ms: f64,

    // === AI ===
    pub ai_avoid_distance: f32,
    /// Per-tick probability of a random sidestep when nothing is close
    pub ai_wander_chance: f64,
    /// Per-tick probability of firing
    pub ai_fire_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            margin: ARENA_MARGIN,

            player_speed: PLAYER_SPEED,
            player_radius: PLAYER_RADIUS,
            start_lives: PLAYER_START_LIVES,
            start_offset: PLAYER_START_OFFSET,

            bullet_speed: BULLET_SPEED,
            bullet_spawn_offset: BULLET_SPAWN_OFFSET,
            shoot_cooldown_ms: SHOOT_COOLDOWN_MS,

            asteroid_speed: ASTEROID_SPEED,
            asteroid_spawn_y: ASTEROID_SPAWN_Y,
            asteroid_min_size: ASTEROID_MIN_SIZE,
            asteroid_size_range: ASTEROID_SIZE_RANGE,
            asteroid_max_spin: ASTEROID_MAX_SPIN,
            asteroid_spawn_period_ms: ASTEROID_SPAWN_PERIOD_MS,
            asteroid_points: ASTEROID_POINTS,

            explosion_frames: EXPLOSION_FRAMES,

            round_seconds: ROUND_SECONDS,
            countdown_period_ms: COUNTDOWN_PERIOD_MS,

            ai_avoid_distance: AI_AVOID_DISTANCE,
            ai_wander_chance: AI_WANDER_CHANCE,
            ai_fire_chance: AI_FIRE_CHANCE,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a tuning file from disk (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Rescale every length and speed for a different arena size.
    ///
    /// The factor is the smaller of the two axis ratios, so the layout never
    /// overflows the new rectangle.
    pub fn scaled_to(&self, width: f32, height: f32) -> Self {
        let factor = (width / self.width).min(height / self.height);
        Self {
            width,
            height,
            margin: self.margin * factor,
            player_speed: self.player_speed * factor,
            player_radius: self.player_radius * factor,
            start_offset: self.start_offset * factor,
            bullet_speed: self.bullet_speed * factor,
            bullet_spawn_offset: self.bullet_spawn_offset * factor,
            asteroid_speed: self.asteroid_speed * factor,
            asteroid_spawn_y: self.asteroid_spawn_y * factor,
            asteroid_min_size: self.asteroid_min_size * factor,
            asteroid_size_range: self.asteroid_size_range * factor,
            ai_avoid_distance: self.ai_avoid_distance * factor,
            ..self.clone()
        }
    }

    /// Reject values that would make the arena degenerate or the RNG draws panic
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: &str) -> Error {
            Error::InvalidTuning {
                field,
                reason: reason.to_string(),
            }
        }

        if !(self.margin >= 0.0) {
            return Err(invalid("margin", "must be non-negative"));
        }
        if !(self.width > 2.0 * self.margin) {
            return Err(invalid("width", "must exceed twice the margin"));
        }
        if !(self.height > 2.0 * self.margin) {
            return Err(invalid("height", "must exceed twice the margin"));
        }
        let positive = [
            ("player_speed", self.player_speed),
            ("bullet_speed", self.bullet_speed),
            ("asteroid_speed", self.asteroid_speed),
            ("asteroid_min_size", self.asteroid_min_size),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(field, "must be positive"));
            }
        }
        let non_negative = [
            ("player_radius", self.player_radius),
            ("asteroid_size_range", self.asteroid_size_range),
            ("asteroid_max_spin", self.asteroid_max_spin),
            ("ai_avoid_distance", self.ai_avoid_distance),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(invalid(field, "must be non-negative"));
            }
        }
        if !(self.asteroid_spawn_period_ms > 0.0) {
            return Err(invalid("asteroid_spawn_period_ms", "must be positive"));
        }
        if !(self.countdown_period_ms > 0.0) {
            return Err(invalid("countdown_period_ms", "must be positive"));
        }
        if !(self.shoot_cooldown_ms >= 0.0) {
            return Err(invalid("shoot_cooldown_ms", "must be non-negative"));
        }
        for (field, p) in [
            ("ai_wander_chance", self.ai_wander_chance),
            ("ai_fire_chance", self.ai_fire_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, "must be a probability in [0, 1]"));
            }
        }
        if self.explosion_frames == 0 {
            return Err(invalid("explosion_frames", "must be at least 1"));
        }
        if self.start_lives == 0 {
            return Err(invalid("start_lives", "must be at least 1"));
        }
        Ok(())
    }
}
