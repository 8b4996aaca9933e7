//! Entity spawn factories for populating the arena.
//!
//! Creates enemies with their full component bundle: identity, body
//! parts, brain and armament.

use std::f32::consts::TAU;

use glam::Vec3;
use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use fracture_arena::{Aabb, StaticWorld};
use fracture_core::components::*;
use fracture_core::config::GameConfig;
use fracture_core::constants::*;
use fracture_core::enums::{AiState, EnemyWeaponType, PartKind};
use fracture_core::types::Magazine;

use crate::store::EntityStore;

/// Build a fresh, undamaged body.
pub fn build_body_parts() -> BodyParts {
    let part = |kind, size: [f32; 3], offset: [f32; 3], max_hp, multiplier| EnemyPart {
        kind,
        max_hp,
        hp: max_hp,
        broken: false,
        multiplier,
        size: Vec3::from(size),
        offset: Vec3::from(offset),
    };
    BodyParts([
        part(PartKind::Head, [0.3, 0.35, 0.3], [0.0, 2.05, 0.0], 100.0, 2.5),
        part(PartKind::Torso, [0.6, 0.9, 0.35], [0.0, 1.35, 0.0], 600.0, 1.0),
        part(PartKind::LArm, [0.2, 0.9, 0.2], [-0.45, 1.4, 0.0], 30.0, 0.6),
        part(PartKind::RArm, [0.2, 0.9, 0.2], [0.45, 1.4, 0.0], 30.0, 0.6),
        part(PartKind::LLeg, [0.22, 1.0, 0.25], [-0.2, 0.45, 0.0], 40.0, 0.7),
        part(PartKind::RLeg, [0.22, 1.0, 0.25], [0.2, 0.45, 0.0], 40.0, 0.7),
    ])
}

/// Collision hull of an enemy standing at `feet`.
pub fn enemy_hull(feet: Vec3) -> Aabb {
    let size = Vec3::from(ENEMY_HULL_SIZE);
    Aabb::from_center_size(feet + Vec3::Y * (size.y * 0.5), size)
}

/// Candidate spawn point: half the time on a ring around the centre,
/// otherwise in the strip in front of the upper deck.
pub fn random_spawn_point(rng: &mut ChaCha8Rng) -> Vec3 {
    if rng.gen::<f32>() > 0.5 {
        let angle = rng.gen::<f32>() * TAU;
        let dist = 20.0 + rng.gen::<f32>() * 20.0;
        Vec3::new(angle.cos() * dist, 5.0, angle.sin() * dist)
    } else {
        Vec3::new(
            (rng.gen::<f32>() - 0.5) * 50.0,
            6.0,
            35.0 + (rng.gen::<f32>() - 0.5) * 10.0,
        )
    }
}

/// Pick a spawn point whose hull is clear of static geometry.
pub fn find_spawn_point(arena: &StaticWorld, rng: &mut ChaCha8Rng) -> Vec3 {
    let mut candidate = random_spawn_point(rng);
    for _ in 1..SPAWN_ATTEMPTS {
        if !arena.intersects(&enemy_hull(candidate)) {
            return candidate;
        }
        candidate = random_spawn_point(rng);
    }
    if arena.intersects(&enemy_hull(candidate)) {
        log::warn!(
            "no clear spawn point after {SPAWN_ATTEMPTS} attempts, using {:?}",
            candidate
        );
    }
    candidate
}

/// Spawn one enemy at a random clear point.
pub fn spawn_enemy(
    store: &mut EntityStore,
    arena: &StaticWorld,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    now: f64,
) -> Entity {
    let position = find_spawn_point(arena, rng);
    let yaw = rng.gen::<f32>() * TAU;
    let speed = ENEMY_MIN_SPEED + rng.gen::<f32>() * ENEMY_SPEED_SPREAD;
    let weapon = EnemyWeaponType::ALL[rng.gen_range(0..EnemyWeaponType::ALL.len())];
    spawn_enemy_at(store, config, position, yaw, speed, weapon, now)
}

/// Spawn an enemy with explicit placement and loadout.
pub fn spawn_enemy_at(
    store: &mut EntityStore,
    config: &GameConfig,
    position: Vec3,
    yaw: f32,
    speed: f32,
    weapon: EnemyWeaponType,
    now: f64,
) -> Entity {
    let serial = store.next_serial();
    let enemy = Enemy {
        serial,
        yaw,
        speed,
        crawling: false,
        grounded: false,
        updraft_spent: false,
    };
    let brain = EnemyBrain {
        state: AiState::Chase,
        next_decision_at: now,
        target_position: None,
        steering: Vec3::ZERO,
        next_attack_at: now,
        next_melee_at: now,
    };
    let armament = EnemyArmament {
        weapon,
        magazine: Magazine::full(config.enemy_weapons.get(weapon).magazine_size),
    };
    store.world.spawn((
        enemy,
        Position(position),
        Velocity(Vec3::ZERO),
        build_body_parts(),
        brain,
        armament,
    ))
}

/// Fill the arena with the configured starting population.
pub fn populate(
    store: &mut EntityStore,
    arena: &StaticWorld,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    now: f64,
) {
    for _ in 0..config.tuning.enemy_population {
        spawn_enemy(store, arena, config, rng, now);
    }
}
