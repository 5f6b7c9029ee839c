//! Per-frame simulation step
//!
//! Core game loop that advances the world one tick. The phase order is fixed:
//! movement, then bullet/asteroid/explosion advancement, then collisions.
//! Later phases assume positions already advanced for this tick.

use glam::Vec2;
use rand::Rng;

use super::ai;
use super::collision::resolve_collisions;
use super::state::{Asteroid, EndReason, PlayerId, World};
use crate::clamp_to_arena;

/// Controls held during a tick (read-only snapshot from the host)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire held; gated by the human cooldown
    pub fire: bool,
}

/// Advance the world by one tick. `elapsed_ms` is wall time since the previous
/// frame and only feeds the fire cooldown clock; movement is per tick.
pub fn step(world: &mut World, input: &InputState, elapsed_ms: f64) {
    if world.is_terminal() {
        return;
    }

    world.clock_ms += elapsed_ms.max(0.0);
    world.tick_count += 1;

    move_human(world, input);
    ai::update(world);

    advance_bullets(world);
    advance_asteroids(world);
    advance_explosions(world);

    resolve_collisions(world);
}

/// Append a freshly randomized asteroid just above the top edge
pub fn spawn_asteroid(world: &mut World) {
    if world.is_terminal() {
        return;
    }

    let t = &world.tuning;
    let (width, base_speed, spawn_y) = (t.width, t.asteroid_speed, t.asteroid_spawn_y);
    let (min_size, size_range, max_spin) =
        (t.asteroid_min_size, t.asteroid_size_range, t.asteroid_max_spin);

    let rng = &mut world.rng;
    let x = uniform(rng, 0.0, width);
    let speed = base_speed * uniform(rng, 0.5, 1.5);
    let rotation = uniform(rng, 0.0, 360.0);
    let rotation_speed = uniform(rng, -max_spin, max_spin);
    let size = uniform(rng, min_size, min_size + size_range);

    let id = world.next_entity_id();
    log::debug!("Spawned asteroid {id} at x={x:.1} speed={speed:.2} size={size:.1}");
    world.asteroids.push(Asteroid {
        id,
        pos: Vec2::new(x, spawn_y),
        speed,
        rotation,
        rotation_speed,
        size,
    });
}

/// Half-open draw from `[low, high)`; a zero-width range yields `low`
pub(crate) fn uniform(rng: &mut impl Rng, low: f32, high: f32) -> f32 {
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

/// One second of countdown; reaching zero ends the round
pub fn tick_countdown(world: &mut World) {
    if world.is_terminal() {
        return;
    }

    world.time_remaining = world.time_remaining.saturating_sub(1);
    if world.time_remaining == 0 {
        world.finish(EndReason::TimeExpired);
    }
}

/// Spawn an upward bullet just above a ship
pub(crate) fn fire_from(world: &mut World, owner_pos: Vec2, owner: &PlayerId) {
    let muzzle = Vec2::new(owner_pos.x, owner_pos.y - world.tuning.bullet_spawn_offset);
    world.add_bullet(muzzle, -1.0, owner.clone());
}

fn move_human(world: &mut World, input: &InputState) {
    let (width, height, margin, speed) = (
        world.tuning.width,
        world.tuning.height,
        world.tuning.margin,
        world.tuning.player_speed,
    );
    let human_id = world.human_id.clone();
    let Some(human) = world.players.get_mut(&human_id) else {
        return;
    };

    let mut delta = Vec2::ZERO;
    if input.up {
        delta.y -= speed;
    }
    if input.down {
        delta.y += speed;
    }
    if input.left {
        delta.x -= speed;
    }
    if input.right {
        delta.x += speed;
    }
    human.pos = clamp_to_arena(human.pos + delta, width, height, margin);
    let pos = human.pos;

    if input.fire && human_can_fire(world) {
        fire_from(world, pos, &human_id);
        world.last_shot_ms = Some(world.clock_ms);
    }
}

/// Strictly more than the cooldown must have elapsed since the last shot
fn human_can_fire(world: &World) -> bool {
    match world.last_shot_ms {
        None => true,
        Some(last) => world.clock_ms - last > world.tuning.shoot_cooldown_ms,
    }
}

/// Bullets inside the closed range [0, height] survive
fn advance_bullets(world: &mut World) {
    let height = world.tuning.height;
    for bullet in &mut world.bullets {
        bullet.pos.y += bullet.speed * bullet.direction;
    }
    world.bullets.retain(|b| b.pos.y >= 0.0 && b.pos.y <= height);
}

fn advance_asteroids(world: &mut World) {
    let floor = world.tuning.height + world.tuning.margin;
    for asteroid in &mut world.asteroids {
        asteroid.pos.y += asteroid.speed;
        asteroid.rotation += asteroid.rotation_speed;
    }
    world.asteroids.retain(|a| a.pos.y <= floor);
}

/// Explosions are dropped once their frame index runs past the animation.
/// Index `frames` has nothing left to draw, so it is dropped rather than kept
/// until it exceeds the count.
fn advance_explosions(world: &mut World) {
    let frames = world.tuning.explosion_frames;
    for explosion in &mut world.explosions {
        explosion.frame += 1;
    }
    world.explosions.retain(|e| e.frame < frames);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{Explosion, Phase, Player};
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// A human-only world (no AI randomness), human at the given position
    fn solo_world(pos: Vec2) -> World {
        let mut world = World::empty(PlayerId::new("p1"), 1, &Tuning::default());
        world.push_player(Player::new(PlayerId::new("p1"), "p1", pos, COLORS[0], 3));
        world
    }

    #[test]
    fn test_human_moves_and_clamps() {
        let mut world = solo_world(Vec2::new(22.0, 300.0));
        let input = InputState {
            left: true,
            up: true,
            ..Default::default()
        };
        step(&mut world, &input, 16.0);
        let pos = world.human().map(|p| p.pos);
        assert_eq!(pos, Some(Vec2::new(ARENA_MARGIN, 295.0)));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut world = solo_world(Vec2::new(400.0, 300.0));
        let input = InputState {
            left: true,
            right: true,
            ..Default::default()
        };
        step(&mut world, &input, 16.0);
        assert_eq!(world.human().map(|p| p.pos), Some(Vec2::new(400.0, 300.0)));
    }

    #[test]
    fn test_human_fire_respects_cooldown() {
        let mut world = solo_world(Vec2::new(400.0, 300.0));
        let fire = InputState {
            fire: true,
            ..Default::default()
        };

        step(&mut world, &fire, 16.0);
        assert_eq!(world.bullets.len(), 1);
        // Spawned 20 above the ship, then advanced once
        assert_eq!(world.bullets[0].pos, Vec2::new(400.0, 270.0));

        // Still within cooldown
        for _ in 0..6 {
            step(&mut world, &fire, 16.0);
        }
        assert_eq!(world.bullets.len(), 1);

        // Exactly 200ms after the shot is not enough
        step(&mut world, &fire, 200.0 - 6.0 * 16.0);
        assert_eq!(world.bullets.len(), 1);

        step(&mut world, &fire, 1.0);
        assert_eq!(world.bullets.len(), 2);
    }

    #[test]
    fn test_bullet_at_top_edge_removed_next_advance() {
        let mut world = solo_world(Vec2::new(400.0, 300.0));
        world.add_bullet(Vec2::new(100.0, 0.0), -1.0, PlayerId::new("p1"));
        step(&mut world, &InputState::default(), 16.0);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_bullet_at_bottom_edge_removed_next_advance() {
        let mut world = solo_world(Vec2::new(400.0, 300.0));
        world.add_bullet(Vec2::new(100.0, ARENA_HEIGHT), 1.0, PlayerId::new("p1"));
        step(&mut world, &InputState::default(), 16.0);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_bullet_landing_on_bound_survives_one_tick() {
        let mut world = solo_world(Vec2::new(400.0, 300.0));
        world.add_bullet(Vec2::new(100.0, BULLET_SPEED), -1.0, PlayerId::new("p1"));
        step(&mut world, &InputState::default(), 16.0);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].pos.y, 0.0);

        step(&mut world, &InputState::default(), 16.0);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_asteroid_advances_and_culls_below_margin() {
        let mut world = solo_world(Vec2::new(50.0, 50.0));
        let falling = world.add_asteroid(Vec2::new(700.0, ARENA_HEIGHT + ARENA_MARGIN - 1.0), 30.0);
        falling.speed = 1.0;
        falling.rotation_speed = 1.5;

        step(&mut world, &InputState::default(), 16.0);
        assert_eq!(world.asteroids.len(), 1);
        assert_eq!(world.asteroids[0].rotation, 1.5);

        step(&mut world, &InputState::default(), 16.0);
        assert!(world.asteroids.is_empty());
    }

    #[test]
    fn test_explosion_lives_for_its_frames() {
        let mut world = solo_world(Vec2::new(50.0, 50.0));
        world.explosions.push(Explosion::at(Vec2::new(300.0, 300.0)));
        for expected in 1..EXPLOSION_FRAMES {
            step(&mut world, &InputState::default(), 16.0);
            assert_eq!(world.explosions[0].frame, expected);
        }
        step(&mut world, &InputState::default(), 16.0);
        assert!(world.explosions.is_empty());
    }

    #[test]
    fn test_collisions_see_advanced_positions() {
        // Out of reach before the advance, dead center after it
        let mut world = solo_world(Vec2::new(400.0, 100.0));
        world.add_asteroid(Vec2::new(100.0, 590.0), 16.0);
        world.add_bullet(Vec2::new(100.0, 590.0 + BULLET_SPEED), -1.0, PlayerId::new("p1"));

        step(&mut world, &InputState::default(), 16.0);

        assert!(world.asteroids.is_empty());
        assert!(world.bullets.is_empty());
        assert_eq!(world.explosions, vec![Explosion::at(Vec2::new(100.0, 590.0))]);
        assert_eq!(world.human().map(|p| p.score), Some(ASTEROID_POINTS));
    }

    #[test]
    fn test_countdown_expiry_ends_round() {
        let mut world = World::new("p1", 1, &Tuning::default());
        world.time_remaining = 1;
        tick_countdown(&mut world);
        assert_eq!(world.time_remaining, 0);
        assert!(world.is_terminal());
        assert_eq!(
            world.phase,
            Phase::Over {
                reason: EndReason::TimeExpired
            }
        );
    }

    #[test]
    fn test_terminal_world_is_frozen() {
        let mut world = World::new("p1", 1, &Tuning::default());
        world.finish(EndReason::HumanDestroyed);
        let ticks = world.tick_count;
        step(&mut world, &InputState::default(), 16.0);
        spawn_asteroid(&mut world);
        tick_countdown(&mut world);
        assert_eq!(world.tick_count, ticks);
        assert!(world.asteroids.is_empty());
        assert_eq!(world.time_remaining, ROUND_SECONDS);
    }

    #[test]
    fn test_spawn_asteroid_ranges() {
        let mut world = World::new("p1", 42, &Tuning::default());
        for _ in 0..200 {
            spawn_asteroid(&mut world);
        }
        for a in &world.asteroids {
            assert!((0.0..ARENA_WIDTH).contains(&a.pos.x));
            assert_eq!(a.pos.y, ASTEROID_SPAWN_Y);
            assert!(a.speed >= ASTEROID_SPEED * 0.5 && a.speed < ASTEROID_SPEED * 1.5);
            assert!((0.0..360.0).contains(&a.rotation));
            assert!(a.rotation_speed.abs() <= ASTEROID_MAX_SPIN);
            assert!(
                a.size >= ASTEROID_MIN_SIZE && a.size < ASTEROID_MIN_SIZE + ASTEROID_SIZE_RANGE
            );
        }
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed and inputs produce identical snapshots
        let tuning = Tuning::default();
        let mut world1 = World::new("p1", 99999, &tuning);
        let mut world2 = World::new("p1", 99999, &tuning);

        let inputs = [
            InputState {
                left: true,
                fire: true,
                ..Default::default()
            },
            InputState::default(),
            InputState {
                up: true,
                right: true,
                ..Default::default()
            },
        ];

        for i in 0..600 {
            if i % 60 == 0 {
                spawn_asteroid(&mut world1);
                spawn_asteroid(&mut world2);
            }
            let input = &inputs[i % inputs.len()];
            step(&mut world1, input, 16.0);
            step(&mut world2, input, 16.0);
            let a = serde_json::to_string(&world1).expect("serializable");
            let b = serde_json::to_string(&world2).expect("serializable");
            assert_eq!(a, b, "diverged at tick {i}");
        }
    }

    fn arb_input() -> impl Strategy<Value = InputState> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(up, down, left, right, fire)| InputState {
                up,
                down,
                left,
                right,
                fire,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_players_stay_in_bounds(
            seed in any::<u64>(),
            inputs in prop::collection::vec(arb_input(), 1..300),
        ) {
            let tuning = Tuning::default();
            let mut world = World::new("p1", seed, &tuning);
            for (i, input) in inputs.iter().enumerate() {
                if i % 20 == 0 {
                    spawn_asteroid(&mut world);
                }
                step(&mut world, input, 16.0);
                for p in world.players.values() {
                    let (x, y) = (p.pos.x, p.pos.y);
                    prop_assert!(x >= tuning.margin && x <= tuning.width - tuning.margin);
                    prop_assert!(y >= tuning.margin && y <= tuning.height - tuning.margin);
                }
                for b in &world.bullets {
                    prop_assert!(b.pos.y >= 0.0 && b.pos.y <= tuning.height);
                }
                for a in &world.asteroids {
                    prop_assert!(a.pos.y <= tuning.height + tuning.margin);
                }
            }
        }

        #[test]
        fn prop_removed_entities_never_reappear(
            seed in any::<u64>(),
            inputs in prop::collection::vec(arb_input(), 1..300),
        ) {
            let mut world = World::new("p1", seed, &Tuning::default());
            let mut gone_bullets: HashSet<u32> = HashSet::new();
            let mut gone_asteroids: HashSet<u32> = HashSet::new();
            for (i, input) in inputs.iter().enumerate() {
                if i % 15 == 0 {
                    spawn_asteroid(&mut world);
                }
                let bullets_before: Vec<u32> = world.bullets.iter().map(|b| b.id).collect();
                let asteroids_before: Vec<u32> = world.asteroids.iter().map(|a| a.id).collect();
                step(&mut world, input, 16.0);

                for b in &world.bullets {
                    prop_assert!(!gone_bullets.contains(&b.id));
                }
                for a in &world.asteroids {
                    prop_assert!(!gone_asteroids.contains(&a.id));
                }
                gone_bullets.extend(
                    bullets_before
                        .into_iter()
                        .filter(|id| !world.bullets.iter().any(|b| b.id == *id)),
                );
                gone_asteroids.extend(
                    asteroids_before
                        .into_iter()
                        .filter(|id| !world.asteroids.iter().any(|a| a.id == *id)),
                );
            }
        }
    }
}
