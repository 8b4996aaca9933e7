//! Projectile flight: homing, static collision, shield deflection and
//! hits on the player or enemy parts.

use glam::Vec3;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use fracture_core::components::*;
use fracture_core::constants::*;
use fracture_core::enums::{Faction, ParticleKind, PartKind};
use fracture_core::events::{SimEvent, SoundCue};

use crate::body::{aim_point, part_volume};
use crate::store::EntityStore;
use crate::systems::damage::{self, Hit};
use crate::systems::TickContext;

/// Where a projectile's flight ended this tick.
#[derive(Debug, Clone, Copy)]
enum Impact {
    /// Still flying.
    None,
    /// Static geometry, or the end of its life.
    Spent { at: Option<Vec3> },
    Player { at: Vec3 },
    Enemy { enemy: Entity, part: PartKind, at: Vec3 },
    Deflected,
}

/// An enemy part struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartHit {
    pub enemy: Entity,
    pub part: PartKind,
    pub point: Vec3,
    pub distance: f32,
}

pub fn run(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
) {
    let flying: Vec<Entity> = store
        .world
        .query::<&Projectile>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    for entity in flying {
        let Some((position, velocity, projectile)) = read(&store.world, entity) else {
            continue;
        };
        match fly(store, ctx, entity, position, velocity, projectile.clone(), events) {
            Impact::None | Impact::Deflected => {}
            Impact::Spent { at } => {
                let _ = store.world.despawn(entity);
                if let Some(at) = at {
                    store.spawn_particle(rng, ParticleKind::Spark, at);
                }
            }
            Impact::Player { at } => {
                let damage = projectile.damage;
                let _ = store.world.despawn(entity);
                store.spawn_particle(rng, ParticleKind::Spark, at);
                damage::damage_player(store, ctx, events, damage);
            }
            Impact::Enemy { enemy, part, at } => {
                let _ = store.world.despawn(entity);
                match projectile.blast {
                    Some(blast) => {
                        damage::apply_blast(store, ctx, rng, events, at, blast, projectile.damage)
                    }
                    None => {
                        store.spawn_particle(rng, ParticleKind::Spark, at);
                        damage::apply_hit(
                            store,
                            ctx,
                            rng,
                            events,
                            Hit {
                                enemy,
                                part,
                                damage: projectile.damage,
                                velocity,
                            },
                        );
                    }
                }
            }
        }
    }
}

fn read(world: &World, entity: Entity) -> Option<(Vec3, Vec3, Projectile)> {
    let mut query = world
        .query_one::<(&Position, &Velocity, &Projectile)>(entity)
        .ok()?;
    query
        .get()
        .map(|(pos, vel, projectile)| (pos.0, vel.0, projectile.clone()))
}

/// Advance one projectile and report what it ran into. A projectile
/// still in flight has its new state written back.
///
/// Static geometry and bodies are tested on the same segment; whichever
/// is reached first along it ends the flight.
fn fly(
    store: &mut EntityStore,
    ctx: &TickContext,
    entity: Entity,
    mut position: Vec3,
    mut velocity: Vec3,
    mut projectile: Projectile,
    events: &mut Vec<SimEvent>,
) -> Impact {
    let dt = ctx.dt;
    projectile.life -= dt;

    if let Some(lock) = projectile.homing {
        if let Some(target) = aim_point(&store.world, lock) {
            velocity = home(position, velocity, target);
        }
    }

    let next = position + velocity * dt;
    let wall = ctx.arena.sweep(position, next, projectile.radius);

    if projectile.faction == Faction::Enemy
        && wall.is_none()
        && shield_blocks(&store.player, position, velocity)
    {
        deflect(store, &mut velocity, &mut projectile);
        events.push(SimEvent::Sound {
            cue: SoundCue::ShieldHit,
        });
        position += velocity * dt;
        write_back(&mut store.world, entity, position, velocity, projectile);
        return Impact::Deflected;
    }

    let contact = match projectile.faction {
        Faction::Enemy => strike_player(&store.player, position, next),
        Faction::Player => strike_enemy(&store.world, position, next, projectile.homing),
    };

    match (wall, contact) {
        (Some(hit), Some((_, along))) if hit.distance < along => {
            return Impact::Spent { at: Some(hit.point) };
        }
        (Some(hit), None) => return Impact::Spent { at: Some(hit.point) },
        (_, Some((impact, _))) => return impact,
        (None, None) => {}
    }

    if projectile.life <= 0.0 {
        return Impact::Spent { at: None };
    }
    write_back(&mut store.world, entity, next, velocity, projectile);
    Impact::None
}

fn write_back(
    world: &mut World,
    entity: Entity,
    position: Vec3,
    velocity: Vec3,
    projectile: Projectile,
) {
    if let Ok((pos, vel, stored)) =
        world.query_one_mut::<(&mut Position, &mut Velocity, &mut Projectile)>(entity)
    {
        pos.0 = position;
        vel.0 = velocity;
        *stored = projectile;
    }
}

fn shield_blocks(player: &Player, position: Vec3, velocity: Vec3) -> bool {
    player.shielding
        && position.distance(player.position) < SHIELD_DEFLECT_RANGE
        && player.view.dot(velocity.normalize_or_zero()) < SHIELD_DEFLECT_DOT
}

/// Closest point of the segment `from -> to` to `point`, and how far
/// along the segment it lies.
fn closest_approach(from: Vec3, to: Vec3, point: Vec3) -> (Vec3, f32) {
    let delta = to - from;
    let length_sq = delta.length_squared();
    if length_sq <= f32::EPSILON {
        return (from, 0.0);
    }
    let t = ((point - from).dot(delta) / length_sq).clamp(0.0, 1.0);
    (from + delta * t, t * length_sq.sqrt())
}

/// Hit test for an enemy-owned projectile against the player's eye.
fn strike_player(player: &Player, from: Vec3, to: Vec3) -> Option<(Impact, f32)> {
    let (closest, along) = closest_approach(from, to, player.position);
    (closest.distance(player.position) < PLAYER_HIT_RADIUS)
        .then_some((Impact::Player { at: closest }, along))
}

/// Turn halfway toward `target`, keeping speed.
pub fn home(position: Vec3, velocity: Vec3, target: Vec3) -> Vec3 {
    let speed = velocity.length();
    let desired = (target - position).normalize_or_zero();
    let current = velocity.normalize_or_zero();
    let turned = current.lerp(desired, HOMING_BLEND).normalize_or_zero();
    if turned == Vec3::ZERO {
        velocity
    } else {
        turned * speed
    }
}

/// Send an enemy shot back at whoever fired it, now on the player's side.
fn deflect(store: &EntityStore, velocity: &mut Vec3, projectile: &mut Projectile) {
    *velocity = -*velocity * DEFLECT_SPEED_FACTOR;
    projectile.faction = Faction::Player;
    projectile.life = DEFLECT_LIFETIME;
    projectile.tag = DEFLECT_TAG;
    projectile.homing = projectile
        .source
        .filter(|source| store.world.contains(*source))
        .map(|enemy| PartLock {
            enemy,
            part: PartKind::Torso,
        });
}

/// Hit test for a player-owned projectile moving `from` to `to`.
///
/// A locked shot connects once it is within reach of its part and can
/// only hit that part. Otherwise the segment is traced against every
/// intact part.
fn strike_enemy(
    world: &World,
    from: Vec3,
    to: Vec3,
    lock: Option<PartLock>,
) -> Option<(Impact, f32)> {
    if let Some(lock) = lock {
        if let Some(target) = aim_point(world, lock) {
            if to.distance(target) < LOCKED_HIT_RADIUS {
                let (_, along) = closest_approach(from, to, target);
                let impact = Impact::Enemy {
                    enemy: lock.enemy,
                    part: lock.part,
                    at: target,
                };
                return Some((impact, along));
            }
        }
    }

    trace_parts(world, from, to, lock).map(|hit| {
        let impact = Impact::Enemy {
            enemy: hit.enemy,
            part: hit.part,
            at: hit.point,
        };
        (impact, hit.distance)
    })
}

/// Nearest intact enemy part crossed by the segment `from -> to`,
/// optionally restricted to one locked part.
pub fn trace_parts(
    world: &World,
    from: Vec3,
    to: Vec3,
    lock: Option<PartLock>,
) -> Option<PartHit> {
    let length = from.distance(to);
    let dir = (to - from).normalize_or_zero();
    if dir == Vec3::ZERO {
        return None;
    }

    let mut best: Option<PartHit> = None;
    for (entity, (enemy, pos, parts)) in world
        .query::<(&Enemy, &Position, &BodyParts)>()
        .iter()
    {
        if lock.is_some_and(|l| l.enemy != entity) {
            continue;
        }
        if (pos.0 + Vec3::Y).distance(from) > length + 3.0 {
            continue;
        }
        for part in parts.iter().filter(|p| !p.broken) {
            if lock.is_some_and(|l| l.part != part.kind) {
                continue;
            }
            let volume = part_volume(pos.0, enemy.yaw, enemy.crawling, part);
            let Some(hit) = volume.ray_intersection(from, dir) else {
                continue;
            };
            if hit.distance <= length && best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(PartHit {
                    enemy: entity,
                    part: part.kind,
                    point: hit.point,
                    distance: hit.distance,
                });
            }
        }
    }
    best
}
