//! Cleanup and respawn: finishes off anything left dead, brings the
//! player back after going down and tops the enemy population back up.

use glam::Vec3;
use hecs::Entity;
use rand_chacha::ChaCha8Rng;

use fracture_core::components::{BodyParts, Enemy};
use fracture_core::constants::{PLAYER_MAX_HEALTH, PLAYER_SPAWN};
use fracture_core::events::{Notice, SimEvent};

use crate::store::EntityStore;
use crate::systems::{damage, TickContext};
use crate::world_setup;

pub fn run(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    // Every kill path removes the enemy at once; this only catches a body
    // whose torso was emptied without going through one.
    despawn_buffer.clear();
    for (entity, (_enemy, parts)) in store.world.query_mut::<(&Enemy, &BodyParts)>() {
        if parts.is_dead() {
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        damage::kill_enemy(store, ctx, rng, events, entity);
    }

    respawn_player(store, ctx, events);

    let due = store
        .pending_spawns
        .iter()
        .filter(|at| ctx.now >= **at)
        .count();
    if due > 0 {
        store.pending_spawns.retain(|at| ctx.now < *at);
        for _ in 0..due {
            world_setup::spawn_enemy(store, ctx.arena, ctx.config, rng, ctx.now);
        }
        log::debug!("{due} replacement enemies spawned");
        events.push(SimEvent::EnemyCountChanged {
            live: store.live_enemy_count(),
        });
    }
}

/// Bring a downed player back once the respawn delay has run out.
fn respawn_player(store: &mut EntityStore, ctx: &TickContext, events: &mut Vec<SimEvent>) {
    let player = &mut store.player;
    let Some(at) = player.respawn_at else {
        return;
    };
    if ctx.now < at {
        return;
    }
    player.respawn_at = None;
    player.health = PLAYER_MAX_HEALTH;
    player.position = Vec3::from(PLAYER_SPAWN);
    player.velocity = Vec3::ZERO;
    log::info!("player respawned at t={:.2}", ctx.now);
    events.push(SimEvent::Message {
        notice: Notice::Respawned,
    });
    events.push(SimEvent::PlayerHealthChanged {
        health: player.health,
    });
}
