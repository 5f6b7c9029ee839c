//! World state and core simulation types
//!
//! Everything a renderer needs to draw a frame lives in [`World`].

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{AI_PLAYER_ID, AI_PLAYER_NAME, COLORS, DEFAULT_USERNAME, HUMAN_PLAYER_ID};
use crate::tuning::Tuning;

/// Unique player identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Why a world stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The human ran out of lives
    HumanDestroyed,
    /// The countdown reached zero
    TimeExpired,
}

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Active,
    Over { reason: EndReason },
}

/// A ship, human or automated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub pos: Vec2,
    /// Palette tag, e.g. `#FF5733`
    pub color: String,
    pub score: u32,
    pub lives: u8,
    pub automated: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, pos: Vec2, color: &str, lives: u8) -> Self {
        Self {
            id,
            name: name.into(),
            pos,
            color: color.to_string(),
            score: 0,
            lives,
            automated: false,
        }
    }

    pub fn automated(mut self) -> Self {
        self.automated = true;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

/// A point bullet travelling vertically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    /// -1 is up the screen, +1 is down
    pub direction: f32,
    /// Shooter, credited on a hit. Not kept alive by the bullet.
    pub owner: PlayerId,
}

/// A falling, spinning rock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    /// Degrees
    pub rotation: f32,
    /// Degrees per tick
    pub rotation_speed: f32,
    /// Diameter; the collision circle has radius `size / 2`
    pub size: f32,
}

impl Asteroid {
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

/// Explosion animation left where an asteroid died
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub frame: u32,
}

impl Explosion {
    pub fn at(pos: Vec2) -> Self {
        Self { pos, frame: 0 }
    }
}

/// Complete simulation state for one round (deterministic for a given seed and input)
#[derive(Debug, Clone, Serialize)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Players sorted by id for deterministic iteration
    pub players: BTreeMap<PlayerId, Player>,
    pub bullets: Vec<Bullet>,
    pub asteroids: Vec<Asteroid>,
    pub explosions: Vec<Explosion>,
    /// Seconds left on the countdown
    pub time_remaining: u32,
    pub phase: Phase,
    /// The human entrant; never inferred from names or flags
    pub human_id: PlayerId,
    /// Simulated milliseconds accumulated from step deltas
    pub clock_ms: f64,
    /// Number of steps taken
    pub tick_count: u64,
    /// Clock time of the human's last shot
    pub last_shot_ms: Option<f64>,
    /// Next entity ID
    next_id: u32,
    /// Balance this world was built with
    #[serde(skip)]
    pub tuning: Tuning,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
}

impl World {
    /// Fresh round: the human and the AI opponent side by side near the bottom edge
    pub fn new(human_name: &str, seed: u64, tuning: &Tuning) -> Self {
        let name = human_name.trim();
        let name = if name.is_empty() { DEFAULT_USERNAME } else { name };
        let start = Vec2::new(tuning.width / 2.0, tuning.height - tuning.start_offset);

        let mut world = Self::empty(PlayerId::new(HUMAN_PLAYER_ID), seed, tuning);
        world.push_player(Player::new(
            world.human_id.clone(),
            name,
            start,
            COLORS[0],
            tuning.start_lives,
        ));
        world.push_player(
            Player::new(
                PlayerId::new(AI_PLAYER_ID),
                AI_PLAYER_NAME,
                start,
                COLORS[1],
                tuning.start_lives,
            )
            .automated(),
        );
        world
    }

    /// A world with no entities; the caller adds players.
    pub fn empty(human_id: PlayerId, seed: u64, tuning: &Tuning) -> Self {
        Self {
            seed,
            players: BTreeMap::new(),
            bullets: Vec::new(),
            asteroids: Vec::new(),
            explosions: Vec::new(),
            time_remaining: tuning.round_seconds,
            phase: Phase::Active,
            human_id,
            clock_ms: 0.0,
            tick_count: 0,
            last_shot_ms: None,
            next_id: 1,
            tuning: tuning.clone(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Insert or replace a player
    pub fn push_player(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a still asteroid (scripted scenes and tests); returns it for tweaking
    pub fn add_asteroid(&mut self, pos: Vec2, size: f32) -> &mut Asteroid {
        let id = self.next_entity_id();
        self.asteroids.push(Asteroid {
            id,
            pos,
            speed: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            size,
        });
        let last = self.asteroids.len() - 1;
        &mut self.asteroids[last]
    }

    /// Add a bullet with the tuned speed; returns it for tweaking
    pub fn add_bullet(&mut self, pos: Vec2, direction: f32, owner: PlayerId) -> &mut Bullet {
        let id = self.next_entity_id();
        self.bullets.push(Bullet {
            id,
            pos,
            speed: self.tuning.bullet_speed,
            direction,
            owner,
        });
        let last = self.bullets.len() - 1;
        &mut self.bullets[last]
    }

    pub fn human(&self) -> Option<&Player> {
        self.players.get(&self.human_id)
    }

    /// The first automated entrant, if any is still in play
    pub fn automated(&self) -> Option<&Player> {
        self.players.values().find(|p| p.automated)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Over { .. })
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.phase {
            Phase::Active => None,
            Phase::Over { reason } => Some(reason),
        }
    }

    /// Mark the round over; the first reason wins
    pub(crate) fn finish(&mut self, reason: EndReason) {
        if !self.is_terminal() {
            log::info!("Round over: {:?} at tick {}", reason, self.tick_count);
            self.phase = Phase::Over { reason };
        }
    }
}
