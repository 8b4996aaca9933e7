//! Debris and particle integration.
//!
//! Purely cosmetic: nothing here feeds back into combat or AI.

use hecs::Entity;

use fracture_core::components::{Debris, Particle, Position, Velocity};
use fracture_core::constants::*;

use crate::store::EntityStore;
use crate::systems::TickContext;

pub fn run(store: &mut EntityStore, ctx: &TickContext, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    update_debris(store, ctx, despawn_buffer);
    update_particles(store, ctx, despawn_buffer);
    for entity in despawn_buffer.drain(..) {
        let _ = store.world.despawn(entity);
    }
    enforce_debris_cap(store);
}

/// Fall, spin and bounce off the top of whatever is below.
fn update_debris(store: &mut EntityStore, ctx: &TickContext, expired: &mut Vec<Entity>) {
    let dt = ctx.dt;
    for (entity, (pos, vel, debris)) in store
        .world
        .query_mut::<(&mut Position, &mut Velocity, &mut Debris)>()
    {
        vel.0.y -= GRAVITY * dt;
        pos.0 += vel.0 * dt;
        debris.rotation += debris.spin * dt;

        let half = debris.size.y * 0.5;
        let reach = half + vel.0.y.abs() * dt;
        if let Some(ground) = ctx.arena.ground_height(pos.0.x, pos.0.z, pos.0.y, reach) {
            if pos.0.y < ground + half {
                pos.0.y = ground + half;
                vel.0.y *= -DEBRIS_BOUNCE;
                vel.0.x *= DEBRIS_FRICTION;
                vel.0.z *= DEBRIS_FRICTION;
                debris.spin *= DEBRIS_FRICTION;
            }
        }

        if let Some(life) = debris.life.as_mut() {
            *life -= dt;
        }
        let out_of_bounds = pos.0.y < DEBRIS_CULL_ALTITUDE
            || pos.0.x.hypot(pos.0.z) > DEBRIS_CULL_RADIUS;
        let expired_life = debris.life.is_some_and(|life| life <= 0.0);
        if out_of_bounds || expired_life {
            expired.push(entity);
        }
    }
}

fn update_particles(store: &mut EntityStore, ctx: &TickContext, expired: &mut Vec<Entity>) {
    let dt = ctx.dt;
    for (entity, (pos, vel, particle)) in store
        .world
        .query_mut::<(&mut Position, &Velocity, &mut Particle)>()
    {
        particle.life -= dt;
        pos.0 += vel.0 * dt;
        if particle.life <= 0.0 {
            expired.push(entity);
        }
    }
}

/// Drop the oldest pieces once there are more than `DEBRIS_CAP`.
fn enforce_debris_cap(store: &mut EntityStore) {
    let mut pieces: Vec<(u64, Entity)> = store
        .world
        .query::<&Debris>()
        .iter()
        .map(|(entity, debris)| (debris.order, entity))
        .collect();
    if pieces.len() <= DEBRIS_CAP {
        return;
    }
    pieces.sort_unstable_by_key(|(order, _)| *order);
    let excess = pieces.len() - DEBRIS_CAP;
    for (_, entity) in pieces.into_iter().take(excess) {
        let _ = store.world.despawn(entity);
    }
}
