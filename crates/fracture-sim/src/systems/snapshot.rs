//! Snapshot system: reads the store and builds a complete GameStateSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use fracture_core::components::*;
use fracture_core::constants::PLAYER_MAX_HEALTH;
use fracture_core::enums::GamePhase;
use fracture_core::events::SimEvent;
use fracture_core::state::*;
use fracture_core::types::SimTime;

use crate::body::part_center;
use crate::store::EntityStore;

/// Build a complete GameStateSnapshot from the current store.
pub fn build_snapshot(
    store: &EntityStore,
    time: &SimTime,
    phase: GamePhase,
    pointer_locked: bool,
    events: Vec<SimEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        score: store.score,
        pointer_locked,
        player: build_player(store),
        enemies: build_enemies(&store.world),
        projectiles: build_projectiles(&store.world),
        debris: build_debris(&store.world),
        particles: build_particles(&store.world),
        events,
    }
}

fn build_player(store: &EntityStore) -> PlayerView {
    let player = &store.player;
    let magazine = player.magazine();
    PlayerView {
        position: player.position,
        velocity: player.velocity,
        view: player.view,
        grounded: player.grounded,
        health: player.health,
        max_health: PLAYER_MAX_HEALTH,
        weapon: player.weapon,
        ammo: AmmoView {
            current: magazine.rounds,
            max: magazine.capacity,
            reloading: magazine.is_reloading(),
        },
        aiming: player.aiming,
        shielding: player.shielding,
        lock: player
            .lock
            .and_then(|lock| store.serial_of(lock.enemy).map(|serial| (serial, lock.part))),
        down: player.respawn_at.is_some(),
    }
}

/// Enemies in spawn order, so snapshots compare equal across runs.
fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<(&Enemy, &Position, &Velocity, &BodyParts, &EnemyBrain, &EnemyArmament)>()
        .iter()
        .map(|(_entity, (enemy, pos, vel, parts, brain, armament))| EnemyView {
            serial: enemy.serial,
            position: pos.0,
            yaw: enemy.yaw,
            velocity: vel.0,
            state: brain.state,
            weapon: armament.weapon,
            crawling: enemy.crawling,
            health_fraction: parts.torso_fraction(),
            parts: parts
                .iter()
                .map(|part| PartView {
                    kind: part.kind,
                    hp: part.hp,
                    max_hp: part.max_hp,
                    broken: part.broken,
                    position: part_center(pos.0, enemy.yaw, enemy.crawling, part),
                    size: part.size,
                })
                .collect(),
        })
        .collect();
    enemies.sort_by_key(|e| e.serial);
    enemies
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    world
        .query::<(&Position, &Velocity, &Projectile)>()
        .iter()
        .map(|(_entity, (pos, vel, projectile))| ProjectileView {
            position: pos.0,
            velocity: vel.0,
            faction: projectile.faction,
            weapon: projectile.weapon,
            radius: projectile.radius,
            tag: projectile.tag,
            homing: projectile.homing.is_some(),
        })
        .collect()
}

fn build_debris(world: &World) -> Vec<DebrisView> {
    let mut pieces: Vec<(u64, DebrisView)> = world
        .query::<(&Position, &Debris)>()
        .iter()
        .map(|(_entity, (pos, debris))| {
            (
                debris.order,
                DebrisView {
                    kind: debris.kind,
                    position: pos.0,
                    rotation: debris.rotation,
                    size: debris.size,
                    tag: debris.tag,
                },
            )
        })
        .collect();
    pieces.sort_by_key(|(order, _)| *order);
    pieces.into_iter().map(|(_, view)| view).collect()
}

fn build_particles(world: &World) -> Vec<ParticleView> {
    world
        .query::<(&Position, &Particle)>()
        .iter()
        .map(|(_entity, (pos, particle))| ParticleView {
            kind: particle.kind,
            position: pos.0,
            life: particle.life,
        })
        .collect()
}
