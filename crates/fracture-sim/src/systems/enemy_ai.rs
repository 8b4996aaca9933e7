//! Enemy decisions, steering, facing and attacks.
//!
//! The state machine and steering rules live in `fracture-ai`; this
//! system gathers each enemy's situation from the world, applies the
//! result and carries out the chosen attack.

use glam::Vec3;
use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use fracture_ai::fsm::{self, TacticalContext};
use fracture_ai::profiles::{get_profile, shot_directions};
use fracture_ai::steering::{select_attack, steer, AttackAction, AttackContext, SteeringContext};
use fracture_arena::{find_cover_point, has_line_of_sight};
use fracture_core::components::*;
use fracture_core::constants::*;
use fracture_core::enums::{Faction, PartKind, ShotWeapon};
use fracture_core::events::{Notice, SimEvent, SoundCue};
use fracture_core::types::{yaw_rotate, yaw_toward};

use crate::store::EntityStore;
use crate::systems::{damage, TickContext};

/// Everything the AI needs to know about one enemy, copied out of the world.
struct Situation {
    serial: u32,
    position: Vec3,
    velocity: Vec3,
    crawling: bool,
    torso_fraction: f32,
    melee_capable: bool,
    ranged_capable: bool,
    brain: EnemyBrain,
}

pub fn run(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
) {
    let enemies: Vec<Entity> = store
        .world
        .query::<&Enemy>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    for entity in enemies {
        let Some(situation) = observe(store, entity) else {
            continue;
        };
        let action = think(store, ctx, rng, entity, &situation);
        match action {
            AttackAction::Melee => melee(store, ctx, events, entity, situation.position),
            AttackAction::Fire => fire(store, ctx, rng, events, entity),
            AttackAction::Hold => {}
        }
    }
}

fn observe(store: &mut EntityStore, entity: Entity) -> Option<Situation> {
    let (enemy, pos, vel, parts, brain) = store
        .world
        .query_one_mut::<(&Enemy, &Position, &Velocity, &BodyParts, &EnemyBrain)>(entity)
        .ok()?;
    Some(Situation {
        serial: enemy.serial,
        position: pos.0,
        velocity: vel.0,
        crawling: enemy.crawling,
        torso_fraction: parts.torso_fraction(),
        melee_capable: !parts.is_broken(PartKind::LArm),
        ranged_capable: !parts.is_broken(PartKind::RArm),
        brain: brain.clone(),
    })
}

/// Update state, steering and facing for one enemy and pick its attack.
fn think(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    entity: Entity,
    situation: &Situation,
) -> AttackAction {
    let now = ctx.now;
    let eye = store.player.position;
    let position = situation.position;
    let enemy_eye = position + Vec3::Y * ENEMY_EYE_HEIGHT;
    let distance = position.distance(eye);
    let sight = has_line_of_sight(ctx.arena, enemy_eye, eye);

    let nearest = ctx.arena.nearest_updraft(position).copied();
    let in_updraft = nearest.is_some_and(|column| column.contains(position));
    let mut brain = situation.brain.clone();
    let decision_due = now >= brain.next_decision_at;
    let roll = if decision_due { rng.gen::<f32>() } else { 0.0 };
    if decision_due {
        brain.next_decision_at = now + DECISION_INTERVAL;
    }

    let update = fsm::evaluate(&TacticalContext {
        state: brain.state,
        decision_due,
        position,
        player_position: eye,
        distance_to_player: distance,
        torso_fraction: situation.torso_fraction,
        has_line_of_sight: sight,
        in_updraft,
        roll,
    });
    if update.state_changed {
        log::debug!(
            "enemy #{}: {:?} -> {:?}",
            situation.serial,
            brain.state,
            update.new_state
        );
    }
    brain.state = update.new_state;
    if update.seek_cover {
        let cover = find_cover_point(ctx.arena, position, eye).unwrap_or(position);
        brain.target_position = Some(cover);
    }

    brain.steering = steer(&SteeringContext {
        state: brain.state,
        position,
        velocity: situation.velocity,
        player_position: eye,
        cover_target: brain.target_position,
        nearest_updraft: nearest.map(|column| column.anchor(position.y)),
        serial: situation.serial,
        now,
        has_line_of_sight: sight,
        melee_capable: situation.melee_capable,
    });

    let weapon = match store.world.get::<&EnemyArmament>(entity) {
        Ok(armament) => armament.weapon,
        Err(_) => return AttackAction::Hold,
    };
    let stats = ctx.config.enemy_weapons.get(weapon);
    let action = select_attack(
        &AttackContext {
            distance_to_player: distance,
            melee_capable: situation.melee_capable,
            ranged_capable: situation.ranged_capable,
            weapon_range: stats.range,
            melee_ready: now >= brain.next_melee_at,
            fire_ready: now >= brain.next_attack_at,
        },
        || has_line_of_sight(ctx.arena, enemy_eye, eye - Vec3::Y * PLAYER_CHEST_DROP),
    );
    match action {
        AttackAction::Melee => brain.next_melee_at = now + MELEE_COOLDOWN,
        AttackAction::Fire => brain.next_attack_at = now + stats.fire_interval,
        AttackAction::Hold => {}
    }

    if let Ok((enemy, stored)) = store
        .world
        .query_one_mut::<(&mut Enemy, &mut EnemyBrain)>(entity)
    {
        enemy.yaw = yaw_toward(position, eye);
        if update.left_updraft {
            enemy.updraft_spent = true;
        }
        *stored = brain;
    }
    action
}

/// Knife attack. A shield facing the attacker blocks it.
fn melee(
    store: &mut EntityStore,
    ctx: &TickContext,
    events: &mut Vec<SimEvent>,
    entity: Entity,
    position: Vec3,
) {
    let player = &store.player;
    let toward_attacker = (position - player.position).normalize_or_zero();
    if player.shielding && player.view.dot(toward_attacker) > SHIELD_BLOCK_DOT {
        events.push(SimEvent::Sound {
            cue: SoundCue::Block,
        });
        events.push(SimEvent::Message {
            notice: Notice::Blocked,
        });
        return;
    }
    if let Some(serial) = store.serial_of(entity) {
        log::debug!("enemy #{serial} knifed the player");
    }
    events.push(SimEvent::Sound {
        cue: SoundCue::KnifeHit,
    });
    events.push(SimEvent::Message {
        notice: Notice::KnifeHit,
    });
    damage::damage_player(store, ctx, events, MELEE_DAMAGE);
}

/// Ranged attack following the weapon's fire profile. A dry magazine
/// starts a reload instead.
fn fire(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    entity: Entity,
) {
    let eye = store.player.position;
    let Ok((enemy, pos, armament)) = store
        .world
        .query_one_mut::<(&Enemy, &Position, &mut EnemyArmament)>(entity)
    else {
        return;
    };
    let stats = ctx.config.enemy_weapons.get(armament.weapon);
    let magazine = &mut armament.magazine;
    if magazine.is_reloading() {
        return;
    }
    if magazine.is_empty() {
        magazine.begin_reload(ctx.now, stats.reload_time);
        log::debug!("enemy #{} reloading", enemy.serial);
        return;
    }
    if !magazine.try_consume() {
        return;
    }

    let muzzle = if enemy.crawling {
        ENEMY_CRAWL_MUZZLE
    } else {
        ENEMY_MUZZLE
    };
    let origin = pos.0 + yaw_rotate(Vec3::from(muzzle), enemy.yaw);
    let aim = (eye - origin).normalize_or_zero();
    let weapon = armament.weapon;

    let profile = get_profile(weapon, stats);
    for dir in shot_directions(profile.pattern, aim, stats.spread, rng) {
        store.spawn_projectile(
            origin,
            dir * stats.projectile_speed,
            Projectile {
                faction: Faction::Enemy,
                weapon: ShotWeapon::Enemy(weapon),
                radius: stats.projectile_radius,
                damage: stats.damage,
                life: PROJECTILE_LIFETIME,
                source: Some(entity),
                homing: None,
                blast: None,
                tag: stats.tag,
            },
        );
    }
    if profile.audible {
        events.push(SimEvent::Sound {
            cue: SoundCue::Shoot,
        });
    }
}
