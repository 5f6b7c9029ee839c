//! Automated opponent policy
//!
//! Dodge the nearest asteroid when it comes close, otherwise drift at random.
//! Fires on a per-tick coin flip with no cooldown, unlike the human.

use rand::Rng;

use super::state::{PlayerId, World};
use super::tick::fire_from;
use crate::clamp_to_arena;

/// Move and maybe fire for every automated player (in id order)
pub fn update(world: &mut World) {
    let ids: Vec<PlayerId> = world
        .players
        .values()
        .filter(|p| p.automated)
        .map(|p| p.id.clone())
        .collect();

    for id in ids {
        update_one(world, &id);
    }
}

fn update_one(world: &mut World, id: &PlayerId) {
    let t = &world.tuning;
    let (width, height, margin, speed) = (t.width, t.height, t.margin, t.player_speed);
    let (avoid, wander_chance, fire_chance) =
        (t.ai_avoid_distance, t.ai_wander_chance, t.ai_fire_chance);

    let Some(pos) = world.players.get(id).map(|p| p.pos) else {
        return;
    };

    // Closest asteroid by Euclidean distance
    let threat = world
        .asteroids
        .iter()
        .map(|a| (a.pos, a.pos.distance(pos)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut next = pos;
    match threat {
        Some((threat_pos, dist)) if dist < avoid => {
            // Sidestep away from it
            if threat_pos.x < pos.x {
                next.x += speed;
            } else {
                next.x -= speed;
            }
        }
        _ => {
            if world.rng.random_bool(wander_chance) {
                next.x += (world.rng.random::<f32>() - 0.5) * speed * 2.0;
            }
        }
    }
    let next = clamp_to_arena(next, width, height, margin);

    if let Some(player) = world.players.get_mut(id) {
        player.pos = next;
    }

    if world.rng.random_bool(fire_chance) {
        fire_from(world, next, id);
    }
}
