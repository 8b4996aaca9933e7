//! Movement and collision against static geometry.
//!
//! Every moving body is an AABB hull resolved one axis at a time: Y
//! first, then X, then Z. A blocked axis keeps its previous coordinate
//! and zeroes that velocity component, so bodies slide along walls and
//! come to rest on floors.

use glam::Vec3;
use rand_chacha::ChaCha8Rng;

use fracture_arena::{Aabb, StaticWorld};
use fracture_core::commands::InputSnapshot;
use fracture_core::components::{Enemy, EnemyBrain, Position, Velocity};
use fracture_core::constants::*;
use fracture_core::enums::AiState;
use fracture_core::events::{SimEvent, SoundCue};

use crate::store::EntityStore;
use crate::systems::{damage, TickContext};
use crate::world_setup;

/// A collision body: size plus the offset from the tracked point to its centre.
#[derive(Debug, Clone, Copy)]
pub struct Hull {
    pub size: Vec3,
    pub center_offset: Vec3,
}

impl Hull {
    pub fn player() -> Self {
        Self {
            size: Vec3::from(PLAYER_BODY_SIZE),
            center_offset: Vec3::new(0.0, -PLAYER_BODY_DROP, 0.0),
        }
    }

    pub fn enemy() -> Self {
        let size = Vec3::from(ENEMY_HULL_SIZE);
        Self {
            size,
            center_offset: Vec3::new(0.0, size.y * 0.5, 0.0),
        }
    }

    pub fn at(&self, point: Vec3) -> Aabb {
        Aabb::from_center_size(point + self.center_offset, self.size)
    }
}

/// What the solver ran into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contact {
    /// Blocked while moving down.
    pub landed: bool,
    pub blocked_y: bool,
    pub blocked_x: bool,
    pub blocked_z: bool,
}

/// Move `position` by `displacement`, one axis at a time.
pub fn resolve(
    arena: &StaticWorld,
    hull: &Hull,
    position: &mut Vec3,
    velocity: &mut Vec3,
    displacement: Vec3,
) -> Contact {
    let mut contact = Contact::default();

    let candidate = Vec3::new(position.x, position.y + displacement.y, position.z);
    if arena.intersects(&hull.at(candidate)) {
        contact.landed = velocity.y < 0.0;
        contact.blocked_y = true;
        velocity.y = 0.0;
    } else {
        position.y = candidate.y;
    }

    let candidate = Vec3::new(position.x + displacement.x, position.y, position.z);
    if arena.intersects(&hull.at(candidate)) {
        contact.blocked_x = true;
        velocity.x = 0.0;
    } else {
        position.x = candidate.x;
    }

    let candidate = Vec3::new(position.x, position.y, position.z + displacement.z);
    if arena.intersects(&hull.at(candidate)) {
        contact.blocked_z = true;
        velocity.z = 0.0;
    } else {
        position.z = candidate.z;
    }

    contact
}

pub fn run(
    store: &mut EntityStore,
    ctx: &TickContext,
    input: &InputSnapshot,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
) {
    move_player(store, ctx, input, events);
    move_enemies(store, ctx, rng);
}

/// Walk, jump and updraft launch for the player.
pub fn move_player(
    store: &mut EntityStore,
    ctx: &TickContext,
    input: &InputSnapshot,
    events: &mut Vec<SimEvent>,
) {
    let dt = ctx.dt;
    let player = &mut store.player;
    let down = player.respawn_at.is_some();
    let updraft = ctx.arena.updraft_at(player.position).copied();

    player.velocity.y -= GRAVITY * dt;

    let focus = if player.aiming || player.shielding {
        PLAYER_FOCUS_SLOWDOWN
    } else {
        1.0
    };
    let base = if input.forward && !input.back {
        PLAYER_RUN_SPEED
    } else {
        PLAYER_WALK_SPEED
    };
    let speed = base * focus;

    let wish = if down {
        Vec3::ZERO
    } else {
        Vec3::new(
            axis(input.right, input.left),
            0.0,
            axis(input.forward, input.back),
        )
        .normalize_or_zero()
    };

    if wish != Vec3::ZERO {
        let forward = Vec3::new(player.view.x, 0.0, player.view.z).normalize_or_zero();
        let right = Vec3::new(-forward.z, 0.0, forward.x);
        let heading = forward * wish.z + right * wish.x;
        let target = heading * speed * PLAYER_ACCEL_SCALE;
        player.velocity.x += (target.x - player.velocity.x) * PLAYER_VELOCITY_RESPONSE * dt;
        player.velocity.z += (target.z - player.velocity.z) * PLAYER_VELOCITY_RESPONSE * dt;
    } else {
        player.velocity.x -= player.velocity.x * PLAYER_VELOCITY_RESPONSE * dt;
        player.velocity.z -= player.velocity.z * PLAYER_VELOCITY_RESPONSE * dt;
    }

    if input.jump && !down {
        match updraft {
            Some(column) if !player.updraft_spent => {
                player.velocity.y = column.force;
                player.updraft_spent = true;
                events.push(SimEvent::Sound {
                    cue: SoundCue::JumpPad,
                });
            }
            _ if player.grounded => {
                player.velocity.y = PLAYER_JUMP_VELOCITY;
                player.grounded = false;
            }
            _ => {}
        }
    }

    let displacement = player.velocity * dt;
    let contact = resolve(
        ctx.arena,
        &Hull::player(),
        &mut player.position,
        &mut player.velocity,
        displacement,
    );
    player.grounded = contact.landed || (contact.blocked_y && player.grounded);
    if contact.landed {
        player.updraft_spent = false;
    }

    if player.position.y < FALL_THRESHOLD {
        log::debug!("player fell out of the arena");
        player.position = Vec3::from(PLAYER_SPAWN);
        player.velocity = Vec3::ZERO;
        damage::damage_player(store, ctx, events, FALL_DAMAGE);
    }
}

/// Gravity, steering, updraft climbs and knockback for every enemy.
pub fn move_enemies(store: &mut EntityStore, ctx: &TickContext, rng: &mut ChaCha8Rng) {
    let dt = ctx.dt;
    let hull = Hull::enemy();
    let player_eye = store.player.position;
    let mut fallen = Vec::new();

    for (entity, (enemy, pos, vel, brain)) in store
        .world
        .query_mut::<(&mut Enemy, &mut Position, &mut Velocity, &EnemyBrain)>()
    {
        vel.0.y -= GRAVITY * dt;
        let mut displacement = brain.steering * enemy.speed * dt;

        if brain.state == AiState::SeekUpdraft && !enemy.updraft_spent {
            let riding = ctx
                .arena
                .nearest_updraft(pos.0)
                .is_some_and(|column| column.contains(pos.0));
            if riding {
                vel.0.y += UPDRAFT_CLIMB_ACCEL * dt;
                let drift = Vec3::new(player_eye.x - pos.0.x, 0.0, player_eye.z - pos.0.z)
                    .normalize_or_zero();
                displacement += drift * enemy.speed * AI_UPDRAFT_DRIFT_FACTOR * dt;
            }
        }

        displacement += vel.0 * dt;
        let contact = resolve(ctx.arena, &hull, &mut pos.0, &mut vel.0, displacement);
        enemy.grounded = contact.landed || (contact.blocked_y && enemy.grounded);
        if contact.landed {
            enemy.updraft_spent = false;
        }

        vel.0.x *= ENEMY_DAMPING;
        vel.0.z *= ENEMY_DAMPING;
        pos.0.x = pos.0.x.clamp(-ARENA_CLAMP, ARENA_CLAMP);
        pos.0.z = pos.0.z.clamp(-ARENA_CLAMP, ARENA_CLAMP);

        if pos.0.y < FALL_THRESHOLD {
            fallen.push(entity);
        }
    }

    for entity in fallen {
        let point = world_setup::find_spawn_point(ctx.arena, rng);
        if let Ok((pos, vel)) = store
            .world
            .query_one_mut::<(&mut Position, &mut Velocity)>(entity)
        {
            log::debug!("enemy fell out of the arena, moved to {point:?}");
            pos.0 = point;
            vel.0 = Vec3::ZERO;
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}
