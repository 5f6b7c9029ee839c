//! Collision detection and resolution
//!
//! Both passes scan in sequence order, record what was hit, and only then
//! rebuild the sequences by filtering. Nothing is removed mid-scan.
//!
//! Tie-break rule: the first match wins. A bullet destroys at most one
//! asteroid per tick, and a player loses at most one life per tick.

use std::collections::HashSet;

use glam::Vec2;

use super::state::{EndReason, Explosion, PlayerId, World};

/// Point-in-circle test (strict: touching the rim is a miss)
#[inline]
pub fn circle_hit(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) < radius
}

/// Run both collision passes: bullets first, then ships
pub fn resolve_collisions(world: &mut World) {
    resolve_bullet_hits(world);
    resolve_ship_hits(world);
}

/// Bullet vs asteroid. Each hit removes both, leaves an explosion, and credits the shooter.
pub fn resolve_bullet_hits(world: &mut World) {
    let points = world.tuning.asteroid_points;
    let mut spent_bullets: HashSet<u32> = HashSet::new();
    let mut destroyed: HashSet<u32> = HashSet::new();
    let mut credits: Vec<PlayerId> = Vec::new();

    for bullet in &world.bullets {
        let hit = world
            .asteroids
            .iter()
            .filter(|a| !destroyed.contains(&a.id))
            .find(|a| circle_hit(bullet.pos, a.pos, a.radius()));

        if let Some(asteroid) = hit {
            spent_bullets.insert(bullet.id);
            destroyed.insert(asteroid.id);
            world.explosions.push(Explosion::at(asteroid.pos));
            credits.push(bullet.owner.clone());
        }
    }

    if destroyed.is_empty() {
        return;
    }

    for owner in credits {
        // Owner may have left the world (eliminated AI)
        if let Some(player) = world.players.get_mut(&owner) {
            player.score = player.score.saturating_add(points);
        }
    }

    log::debug!("{} asteroid(s) shot down", destroyed.len());
    world.bullets.retain(|b| !spent_bullets.contains(&b.id));
    world.asteroids.retain(|a| !destroyed.contains(&a.id));
}

/// Ship vs asteroid. Each hit removes the asteroid, leaves an explosion, and
/// costs the colliding player a life.
pub fn resolve_ship_hits(world: &mut World) {
    let body = world.tuning.player_radius;
    let mut destroyed: HashSet<u32> = HashSet::new();
    let mut casualties: Vec<PlayerId> = Vec::new();

    for player in world.players.values() {
        let hit = world
            .asteroids
            .iter()
            .filter(|a| !destroyed.contains(&a.id))
            .find(|a| circle_hit(player.pos, a.pos, a.radius() + body));

        if let Some(asteroid) = hit {
            destroyed.insert(asteroid.id);
            world.explosions.push(Explosion::at(asteroid.pos));
            casualties.push(player.id.clone());
        }
    }

    if destroyed.is_empty() {
        return;
    }
    world.asteroids.retain(|a| !destroyed.contains(&a.id));

    let mut eliminated: Vec<PlayerId> = Vec::new();
    for id in casualties {
        let Some(player) = world.players.get_mut(&id) else {
            continue;
        };
        player.lives = player.lives.saturating_sub(1);
        log::debug!("{} hit by asteroid, {} lives left", player.name, player.lives);
        let (lives, automated) = (player.lives, player.automated);

        if lives > 0 {
            continue;
        }
        if id == world.human_id {
            world.finish(EndReason::HumanDestroyed);
        } else if automated {
            eliminated.push(id);
        }
    }

    for id in eliminated {
        log::debug!("Automated player {id} eliminated");
        world.players.remove(&id);
    }
}
