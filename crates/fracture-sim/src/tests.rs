//! Tests for the simulation engine, movement, combat and AI wiring.

use std::sync::{Arc, Mutex};

use glam::Vec3;
use hecs::Entity;

use fracture_core::commands::{InputSnapshot, PlayerCommand};
use fracture_core::components::*;
use fracture_core::config::GameConfig;
use fracture_core::constants::*;
use fracture_core::enums::*;
use fracture_core::events::{Notice, SimEvent, SoundCue};

use crate::engine::{SimConfig, SimulationEngine};
use crate::store::DebrisSpawn;
use crate::systems::damage::{self, Hit, HitOutcome};
use crate::systems::{cosmetics, enemy_ai, projectiles};

fn make_engine(seed: u64) -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    })
    .unwrap()
}

/// Active match with no enemies.
fn sandbox() -> SimulationEngine {
    let mut engine = make_engine(42);
    engine.start_sandbox();
    engine
}

fn torso_hp(engine: &SimulationEngine, enemy: Entity) -> f32 {
    engine.world().get::<&BodyParts>(enemy).unwrap().torso().hp
}

fn part(engine: &SimulationEngine, enemy: Entity, kind: PartKind) -> EnemyPart {
    engine.world().get::<&BodyParts>(enemy).unwrap()[kind]
}

fn has_notice(events: &[SimEvent], notice: Notice) -> bool {
    events.contains(&SimEvent::Message { notice })
}

fn has_cue(events: &[SimEvent], cue: SoundCue) -> bool {
    events.contains(&SimEvent::Sound { cue })
}

fn count<T: hecs::Component>(engine: &SimulationEngine) -> usize {
    engine.world().query::<&T>().iter().count()
}

fn enemy_shot(source: Option<Entity>) -> Projectile {
    Projectile {
        faction: Faction::Enemy,
        weapon: ShotWeapon::Enemy(EnemyWeaponType::Rifle),
        radius: 0.15,
        damage: 10.0,
        life: PROJECTILE_LIFETIME,
        source,
        homing: None,
        blast: None,
        tag: 0xff0000,
    }
}

fn player_shot(damage: f32, homing: Option<PartLock>) -> Projectile {
    Projectile {
        faction: Faction::Player,
        weapon: ShotWeapon::Player(WeaponType::Rifle),
        radius: 0.1,
        damage,
        life: PROJECTILE_LIFETIME,
        source: None,
        homing,
        blast: None,
        tag: 0xffaa00,
    }
}

fn hit(engine: &mut SimulationEngine, enemy: Entity, kind: PartKind, damage: f32) -> HitOutcome {
    engine.with_systems(|store, ctx, rng, events| {
        damage::apply_hit(
            store,
            ctx,
            rng,
            events,
            Hit {
                enemy,
                part: kind,
                damage,
                velocity: Vec3::NEG_Z,
            },
        )
    })
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = make_engine(12345);
    let mut engine_b = make_engine(12345);
    let input = InputSnapshot {
        forward: true,
        fire: true,
        aim: true,
        look_yaw: 0.4,
        ..Default::default()
    };

    for engine in [&mut engine_a, &mut engine_b] {
        engine.queue_command(PlayerCommand::StartMatch);
        engine.set_input(input);
    }

    for _ in 0..300 {
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = make_engine(111);
    let mut engine_b = make_engine(222);
    engine_a.queue_command(PlayerCommand::StartMatch);
    engine_b.queue_command(PlayerCommand::StartMatch);

    let snap_a = engine_a.tick();
    let snap_b = engine_b.tick();
    assert_ne!(
        serde_json::to_string(&snap_a.enemies).unwrap(),
        serde_json::to_string(&snap_b.enemies).unwrap(),
        "Different seeds should spawn enemies differently"
    );
}

#[test]
fn test_sim_config_from_json_fills_defaults() {
    let config: SimConfig = serde_json::from_str(r#"{"seed": 9}"#).unwrap();
    assert_eq!(config.seed, 9);
    assert_eq!(config.game, GameConfig::default());
    assert!(SimulationEngine::new(config).is_ok());
}

// ---- Match lifecycle ----

#[test]
fn test_start_match_populates_and_announces() {
    let mut engine = make_engine(7);
    assert_eq!(engine.phase(), GamePhase::MainMenu);

    engine.queue_command(PlayerCommand::StartMatch);
    let snap = engine.tick();

    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.enemies.len(), ENEMY_POPULATION);
    assert!(has_notice(&snap.events, Notice::MatchStarted));
    assert!(snap.events.contains(&SimEvent::EnemyCountChanged {
        live: ENEMY_POPULATION as u32
    }));
    assert!(snap.events.contains(&SimEvent::PlayerHealthChanged {
        health: PLAYER_MAX_HEALTH
    }));

    let serials: Vec<u32> = snap.enemies.iter().map(|e| e.serial).collect();
    assert_eq!(serials, (1..=ENEMY_POPULATION as u32).collect::<Vec<_>>());
}

#[test]
fn test_start_match_phase_gating() {
    let mut engine = make_engine(7);
    engine.queue_command(PlayerCommand::StartMatch);
    engine.tick();
    engine.queue_command(PlayerCommand::StartMatch);
    let snap = engine.tick();
    assert_eq!(snap.enemies.len(), ENEMY_POPULATION, "restart ignored mid-match");
    assert_eq!(snap.time.tick, 2);
}

#[test]
fn test_main_menu_does_not_advance() {
    let mut engine = make_engine(7);
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 0);
    assert_eq!(engine.live_enemy_count(), 0);
}

#[test]
fn test_tick_timing_60_ticks_one_second() {
    let mut engine = sandbox();
    for _ in 0..TICK_RATE {
        engine.tick();
    }
    assert_eq!(engine.time().tick, TICK_RATE as u64);
    assert!((engine.time().elapsed_secs - 1.0).abs() < 1e-9);
}

// ---- Pause/Resume ----

#[test]
fn test_pause_stops_simulation() {
    let mut engine = make_engine(9);
    engine.queue_command(PlayerCommand::StartMatch);
    for _ in 0..10 {
        engine.tick();
    }

    engine.queue_command(PlayerCommand::Pause);
    let paused = engine.tick();
    assert_eq!(paused.phase, GamePhase::Paused);
    let frozen = serde_json::to_string(&paused.enemies).unwrap();
    let tick = engine.time().tick;

    for _ in 0..30 {
        let snap = engine.tick();
        assert_eq!(serde_json::to_string(&snap.enemies).unwrap(), frozen);
    }
    assert_eq!(engine.time().tick, tick);

    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.time().tick, tick + 1);
}

#[test]
fn test_pointer_lock_is_reported() {
    let mut engine = make_engine(1);
    engine.queue_command(PlayerCommand::SetPointerLock { locked: true });
    let snap = engine.tick();
    assert!(snap.pointer_locked);
    assert!(snap
        .events
        .contains(&SimEvent::PointerLockChanged { locked: true }));

    engine.queue_command(PlayerCommand::SetPointerLock { locked: true });
    assert!(engine.tick().events.is_empty(), "no event without a change");
}

#[test]
fn test_event_sink_sees_snapshot_events() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink_log = Arc::clone(&received);

    let mut engine = make_engine(3);
    engine.subscribe(Box::new(move |event: &SimEvent| {
        sink_log.lock().unwrap().push(event.clone());
    }));
    engine.queue_command(PlayerCommand::StartMatch);
    let snap = engine.tick();

    assert!(!snap.events.is_empty());
    assert_eq!(*received.lock().unwrap(), snap.events);
}

// ---- Movement ----

#[test]
fn test_player_settles_on_floor() {
    let mut engine = sandbox();
    for _ in 0..60 {
        engine.tick();
    }
    let player = engine.player();
    assert!(player.grounded);
    let feet = player.position.y - PLAYER_BODY_DROP - PLAYER_BODY_SIZE[1] * 0.5;
    assert!((0.0..0.02).contains(&feet), "feet at {feet}");
}

#[test]
fn test_player_walks_along_view() {
    let mut engine = sandbox();
    engine.set_input(InputSnapshot {
        forward: true,
        ..Default::default()
    });
    for _ in 0..60 {
        engine.tick();
    }
    let player = engine.player();
    assert!(player.position.z < 0.0, "walked toward -Z: {:?}", player.position);
    assert!(player.position.x.abs() < 1e-3);
}

#[test]
fn test_jump_leaves_ground() {
    let mut engine = sandbox();
    for _ in 0..30 {
        engine.tick();
    }
    let before = engine.player().position.y;
    engine.set_input(InputSnapshot {
        jump: true,
        ..Default::default()
    });
    engine.tick();

    let player = engine.player();
    assert!(!player.grounded);
    assert_eq!(player.velocity.y, PLAYER_JUMP_VELOCITY);
    assert!(player.position.y > before);
}

#[test]
fn test_updraft_launch_once_per_landing() {
    let mut engine = sandbox();
    {
        let player = &mut engine.store_mut().player;
        player.position = Vec3::new(-25.0, 1.65, 25.0);
        player.grounded = true;
    }
    engine.set_input(InputSnapshot {
        jump: true,
        ..Default::default()
    });

    let snap = engine.tick();
    assert!(has_cue(&snap.events, SoundCue::JumpPad));
    assert_eq!(engine.player().velocity.y, 45.0);
    assert!(engine.player().updraft_spent);

    let snap = engine.tick();
    assert!(!has_cue(&snap.events, SoundCue::JumpPad));
    assert!(engine.player().velocity.y < 45.0);
}

#[test]
fn test_fall_out_costs_health_and_respawns() {
    let mut engine = sandbox();
    engine.store_mut().player.position = Vec3::new(70.0, FALL_THRESHOLD + 0.001, 70.0);

    let snap = engine.tick();
    assert_eq!(engine.player().position, Vec3::from(PLAYER_SPAWN));
    assert_eq!(engine.player().health, 0.0);
    assert!(snap.player.down);
    assert!(has_notice(&snap.events, Notice::PlayerDown));

    let mut respawned = false;
    for _ in 0..130 {
        let snap = engine.tick();
        respawned |= has_notice(&snap.events, Notice::Respawned);
    }
    assert!(respawned);
    assert_eq!(engine.player().health, PLAYER_MAX_HEALTH);
    assert!(engine.player().respawn_at.is_none());
}

#[test]
fn test_enemy_lands_on_floor() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 5.0, -30.0), EnemyWeaponType::Rifle);
    for _ in 0..120 {
        engine.tick();
    }
    let pos = engine.world().get::<&Position>(enemy).unwrap().0;
    assert!((0.0..0.05).contains(&pos.y), "feet at {}", pos.y);
    assert!(engine.world().get::<&Enemy>(enemy).unwrap().grounded);
}

// ---- Weapons and reload ----

#[test]
fn test_fire_is_rate_limited() {
    let mut engine = sandbox();
    engine.set_input(InputSnapshot {
        fire: true,
        ..Default::default()
    });

    let mut fired = 0;
    for _ in 0..5 {
        let snap = engine.tick();
        fired += snap
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::WeaponFired { .. }))
            .count();
    }
    assert_eq!(fired, 1, "rifle interval spans five ticks");
    assert_eq!(engine.player().magazine().rounds, 29);
}

#[test]
fn test_fired_round_follows_view_within_spread() {
    let mut engine = sandbox();
    engine.set_input(InputSnapshot {
        fire: true,
        ..Default::default()
    });
    engine.tick();

    let vel = {
        let mut q = engine.world().query::<(&Velocity, &Projectile)>();
        let (_, (vel, _)) = q.iter().next().unwrap();
        vel.0
    };
    let speed = engine.config().weapons.rifle.projectile_speed;
    assert!((vel.length() - speed).abs() < 1e-2, "vel {vel:?}");
    assert!(vel.normalize().dot(Vec3::NEG_Z) > 0.999, "vel {vel:?}");
}

#[test]
fn test_shield_blocks_firing() {
    let mut engine = sandbox();
    engine.set_input(InputSnapshot {
        fire: true,
        shield: true,
        ..Default::default()
    });
    let snap = engine.tick();
    assert_eq!(count::<Projectile>(&engine), 0);
    assert!(!has_cue(&snap.events, SoundCue::Shoot));
    assert_eq!(engine.player().magazine().rounds, 30);
}

#[test]
fn test_dry_fire_starts_reload() {
    let mut engine = sandbox();
    engine.store_mut().player.magazine_mut().rounds = 0;
    engine.set_input(InputSnapshot {
        fire: true,
        ..Default::default()
    });

    let snap = engine.tick();
    assert_eq!(count::<Projectile>(&engine), 0);
    assert!(has_cue(&snap.events, SoundCue::Empty));
    assert!(has_cue(&snap.events, SoundCue::Reload));
    assert!(snap.player.ammo.reloading);
    assert!(snap.events.contains(&SimEvent::AmmoChanged {
        current: 0,
        max: 30,
        reloading: true
    }));
}

#[test]
fn test_reload_completes_at_deadline() {
    let mut engine = sandbox();
    let duration = engine.config().weapons.rifle.reload_time;
    {
        let magazine = engine.store_mut().player.magazine_mut();
        magazine.rounds = 0;
        assert!(magazine.begin_reload(0.0, duration));
    }

    while engine.time().elapsed_secs < duration {
        let snap = engine.tick();
        assert!(snap.player.ammo.reloading);
        assert_eq!(snap.player.ammo.current, 0);
    }
    let snap = engine.tick();
    assert!(!snap.player.ammo.reloading);
    assert_eq!(snap.player.ammo.current, 30);
}

#[test]
fn test_manual_reload_is_idempotent() {
    let mut engine = sandbox();
    engine.set_input(InputSnapshot {
        reload: true,
        ..Default::default()
    });
    let snap = engine.tick();
    assert!(!snap.player.ammo.reloading, "full magazine does not reload");

    engine.store_mut().player.magazine_mut().rounds = 10;
    let snap = engine.tick();
    assert!(has_cue(&snap.events, SoundCue::Reload));
    let deadline = engine.player().magazine().reload_deadline;

    let snap = engine.tick();
    assert!(!has_cue(&snap.events, SoundCue::Reload));
    assert_eq!(engine.player().magazine().reload_deadline, deadline);
}

#[test]
fn test_weapon_switch_cancels_reload() {
    let mut engine = sandbox();
    {
        let magazine = engine.store_mut().player.magazine_mut();
        magazine.rounds = 3;
        magazine.begin_reload(0.0, 2.2);
    }

    engine.queue_command(PlayerCommand::SelectWeapon {
        weapon: WeaponType::Sniper,
    });
    let snap = engine.tick();
    assert!(has_notice(&snap.events, Notice::ReloadInterrupted));
    assert!(snap.events.contains(&SimEvent::WeaponChanged {
        weapon: WeaponType::Sniper
    }));
    assert_eq!(snap.player.ammo.current, 5);

    engine.queue_command(PlayerCommand::SelectWeapon {
        weapon: WeaponType::Rifle,
    });
    for _ in 0..200 {
        engine.tick();
    }
    let rifle = engine.player().magazine();
    assert!(!rifle.is_reloading());
    assert_eq!(rifle.rounds, 3, "cancelled reload restores nothing");
}

// ---- Aim assist and homing ----

#[test]
fn test_aim_locks_nearest_part() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    let serial = engine.world().get::<&Enemy>(enemy).unwrap().serial;

    // Eye (0, 1.7, 5) to torso centre (0, 1.4, -10).
    engine.set_input(InputSnapshot {
        aim: true,
        look_pitch: (-0.3f32).atan2(15.0),
        ..Default::default()
    });
    let snap = engine.tick();
    assert_eq!(snap.player.lock, Some((serial, PartKind::Torso)));
    assert!(snap.events.contains(&SimEvent::TargetLockChanged {
        target: Some((serial, PartKind::Torso))
    }));

    engine.set_input(InputSnapshot::default());
    let snap = engine.tick();
    assert_eq!(snap.player.lock, None);
}

#[test]
fn test_homing_turns_halfway() {
    let turned = projectiles::home(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5.0));
    let expected = Vec3::new(1.0, 0.0, 1.0).normalize() * 10.0;
    assert!((turned - expected).length() < 1e-4, "turned {turned:?}");
}

#[test]
fn test_locked_shot_hits_its_part() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    let lock = PartLock {
        enemy,
        part: PartKind::Head,
    };
    engine.with_systems(|store, ctx, rng, events| {
        store.spawn_projectile(
            Vec3::new(0.0, 2.1, -8.5),
            Vec3::new(0.0, 0.0, -60.0),
            player_shot(20.0, Some(lock)),
        );
        projectiles::run(store, ctx, rng, events);
    });

    assert_eq!(count::<Projectile>(&engine), 0);
    assert_eq!(part(&engine, enemy, PartKind::Head).hp, 50.0);
    assert_eq!(torso_hp(&engine, enemy), 550.0);
}

#[test]
fn test_unlocked_shot_traces_parts() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    engine.with_systems(|store, ctx, rng, events| {
        store.spawn_projectile(
            Vec3::new(0.2, 0.5, -8.0),
            Vec3::new(0.0, 0.0, -120.0),
            player_shot(20.0, None),
        );
        projectiles::run(store, ctx, rng, events);
    });

    assert_eq!(part(&engine, enemy, PartKind::RLeg).hp, 26.0);
    assert_eq!(part(&engine, enemy, PartKind::LLeg).hp, 40.0);
    assert_eq!(torso_hp(&engine, enemy), 586.0);
    let vel = engine.world().get::<&Velocity>(enemy).unwrap().0;
    assert!((vel - Vec3::new(0.0, 0.0, -HIT_IMPULSE)).length() < 1e-5);
}

/// One tick of a fast round down the x=15 lane toward the ground cover
/// wall at z in [-16, -14].
fn fire_at_cover(enemy_z: f32) -> (SimulationEngine, Entity) {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(15.0, 0.05, enemy_z), EnemyWeaponType::Rifle);
    engine.with_systems(|store, ctx, rng, events| {
        store.spawn_projectile(
            Vec3::new(15.0, 1.35, -4.0),
            Vec3::new(0.0, 0.0, -750.0),
            player_shot(20.0, None),
        );
        projectiles::run(store, ctx, rng, events);
    });
    (engine, enemy)
}

#[test]
fn test_round_hits_enemy_standing_in_front_of_wall() {
    let (engine, enemy) = fire_at_cover(-12.0);
    assert_eq!(count::<Projectile>(&engine), 0);
    assert_eq!(torso_hp(&engine, enemy), 560.0);
}

#[test]
fn test_wall_shields_enemy_behind_it() {
    let (engine, enemy) = fire_at_cover(-17.5);
    assert_eq!(count::<Projectile>(&engine), 0);
    assert_eq!(torso_hp(&engine, enemy), 600.0);
    assert_eq!(count::<Particle>(&engine), 1, "a single spark on the wall");
}

#[test]
fn test_projectile_expires() {
    let mut engine = sandbox();
    engine.with_systems(|store, ctx, rng, events| {
        let mut shot = player_shot(20.0, None);
        shot.life = 0.01;
        store.spawn_projectile(Vec3::new(0.0, 40.0, 0.0), Vec3::X, shot);
        projectiles::run(store, ctx, rng, events);
    });
    assert_eq!(count::<Projectile>(&engine), 0);
}

// ---- Shield and player damage ----

#[test]
fn test_shield_deflects_incoming_shot() {
    let mut engine = sandbox();
    let shooter = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -20.0), EnemyWeaponType::Rifle);
    engine.store_mut().player.shielding = true;

    let events = engine.with_systems(|store, ctx, rng, events| {
        store.spawn_projectile(
            Vec3::new(0.0, 1.7, 3.0),
            Vec3::new(0.0, 0.0, 20.0),
            enemy_shot(Some(shooter)),
        );
        projectiles::run(store, ctx, rng, events);
        events.clone()
    });

    assert!(has_cue(&events, SoundCue::ShieldHit));
    assert_eq!(engine.player().health, PLAYER_MAX_HEALTH);
    let (vel, shot) = {
        let mut q = engine.world().query::<(&Velocity, &Projectile)>();
        let (_, (vel, shot)) = q.iter().next().unwrap();
        (vel.0, shot.clone())
    };
    assert_eq!(shot.faction, Faction::Player);
    assert_eq!(shot.life, DEFLECT_LIFETIME);
    assert_eq!(shot.tag, DEFLECT_TAG);
    assert_eq!(vel, Vec3::new(0.0, 0.0, -40.0));
    assert_eq!(
        shot.homing,
        Some(PartLock {
            enemy: shooter,
            part: PartKind::Torso
        })
    );
}

#[test]
fn test_enemy_shot_hits_player() {
    let mut engine = sandbox();
    let events = engine.with_systems(|store, ctx, rng, events| {
        store.spawn_projectile(
            Vec3::new(0.0, 1.7, 4.0),
            Vec3::new(0.0, 0.0, 30.0),
            enemy_shot(None),
        );
        projectiles::run(store, ctx, rng, events);
        events.clone()
    });
    assert_eq!(engine.player().health, 90.0);
    assert!(has_cue(&events, SoundCue::PlayerHit));
    assert!(events.contains(&SimEvent::PlayerHealthChanged { health: 90.0 }));
    assert_eq!(count::<Projectile>(&engine), 0);
}

#[test]
fn test_slow_enemy_shot_cannot_skip_past_player() {
    let mut engine = sandbox();
    engine.with_systems(|store, ctx, rng, events| {
        // Both ends of this tick's segment are outside the hit radius,
        // but the segment runs straight through the eye.
        store.spawn_projectile(
            Vec3::new(0.0, 1.7, 4.1),
            Vec3::new(0.0, 0.0, 120.0),
            enemy_shot(None),
        );
        projectiles::run(store, ctx, rng, events);
    });
    assert_eq!(engine.player().health, 90.0);
    assert_eq!(count::<Projectile>(&engine), 0);
}

#[test]
fn test_melee_blocked_by_facing_shield() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, 3.5), EnemyWeaponType::Rifle);
    engine.store_mut().player.shielding = true;

    let events = engine.with_systems(|store, ctx, rng, events| {
        enemy_ai::run(store, ctx, rng, events);
        enemy_ai::run(store, ctx, rng, events);
        events.clone()
    });
    assert!(has_cue(&events, SoundCue::Block));
    assert!(has_notice(&events, Notice::Blocked));
    assert_eq!(engine.player().health, PLAYER_MAX_HEALTH);

    // A blocked swing still spends the cooldown.
    let blocks = events
        .iter()
        .filter(|e| **e == SimEvent::Sound { cue: SoundCue::Block })
        .count();
    assert_eq!(blocks, 1);
    let next_melee_at = engine.world().get::<&EnemyBrain>(enemy).unwrap().next_melee_at;
    assert_eq!(next_melee_at, engine.time().elapsed_secs + MELEE_COOLDOWN);
}

#[test]
fn test_melee_hits_and_cools_down() {
    let mut engine = sandbox();
    engine.spawn_test_enemy(Vec3::new(0.0, 0.05, 3.5), EnemyWeaponType::Rifle);

    let events = engine.with_systems(|store, ctx, rng, events| {
        enemy_ai::run(store, ctx, rng, events);
        enemy_ai::run(store, ctx, rng, events);
        events.clone()
    });
    assert!(has_cue(&events, SoundCue::KnifeHit));
    assert_eq!(engine.player().health, PLAYER_MAX_HEALTH - MELEE_DAMAGE);
}

// ---- Enemy fire ----

#[test]
fn test_enemy_rifle_fires_at_player() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -15.0), EnemyWeaponType::Rifle);
    let events = engine.with_systems(|store, ctx, rng, events| {
        enemy_ai::run(store, ctx, rng, events);
        events.clone()
    });

    assert!(has_cue(&events, SoundCue::Shoot));
    let shots: Vec<Projectile> = engine
        .world()
        .query::<&Projectile>()
        .iter()
        .map(|(_, p)| p.clone())
        .collect();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].faction, Faction::Enemy);
    assert_eq!(shots[0].source, Some(enemy));
    let armament = engine.world().get::<&EnemyArmament>(enemy).unwrap();
    assert_eq!(armament.magazine.rounds, 29);
}

#[test]
fn test_enemy_shotgun_fires_burst() {
    let mut engine = sandbox();
    engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Shotgun);
    engine.with_systems(|store, ctx, rng, events| enemy_ai::run(store, ctx, rng, events));
    assert_eq!(count::<Projectile>(&engine), 8);
}

#[test]
fn test_enemy_dry_magazine_reloads_instead() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -15.0), EnemyWeaponType::Rifle);
    engine
        .store_mut()
        .world
        .get::<&mut EnemyArmament>(enemy)
        .unwrap()
        .magazine
        .rounds = 0;
    engine.with_systems(|store, ctx, rng, events| enemy_ai::run(store, ctx, rng, events));

    assert_eq!(count::<Projectile>(&engine), 0);
    let armament = engine.world().get::<&EnemyArmament>(enemy).unwrap();
    assert!(armament.magazine.is_reloading());
}

// ---- Damage pipeline ----

#[test]
fn test_torso_hit_double_counts_by_default() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    assert_eq!(hit(&mut engine, enemy, PartKind::Torso, 20.0), HitOutcome::Damaged);
    assert_eq!(torso_hp(&engine, enemy), 560.0);
}

#[test]
fn test_torso_hit_single_count() {
    let mut game = GameConfig::default();
    game.tuning.double_count_torso_hits = false;
    let mut engine = SimulationEngine::new(SimConfig { seed: 1, game }).unwrap();
    engine.start_sandbox();

    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    hit(&mut engine, enemy, PartKind::Torso, 20.0);
    let torso = part(&engine, enemy, PartKind::Torso);
    assert_eq!(torso.hp, 580.0);
    assert!(!torso.broken);
    assert_eq!(engine.world().get::<&Enemy>(enemy).unwrap().speed, 3.0);
    assert_eq!(engine.live_enemy_count(), 1);
}

#[test]
fn test_legs_break_slow_then_immobilize() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);

    assert_eq!(hit(&mut engine, enemy, PartKind::LLeg, 60.0), HitOutcome::PartBroken);
    let events = engine.drain_events();
    assert!(has_notice(&events, Notice::LegBroken));
    assert!(part(&engine, enemy, PartKind::LLeg).broken);
    assert_eq!(engine.world().get::<&Enemy>(enemy).unwrap().speed, 1.5);

    assert_eq!(hit(&mut engine, enemy, PartKind::RLeg, 60.0), HitOutcome::PartBroken);
    let events = engine.drain_events();
    assert!(has_notice(&events, Notice::Immobilized));
    {
        let body = engine.world().get::<&Enemy>(enemy).unwrap();
        assert!(body.crawling);
        assert_eq!(body.speed, 0.0);
    }
    assert_eq!(torso_hp(&engine, enemy), 600.0 - 42.0 - 42.0);
    assert_eq!(count::<Debris>(&engine), 2);
}

#[test]
fn test_broken_part_takes_no_damage() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    hit(&mut engine, enemy, PartKind::LArm, 100.0);
    let torso = torso_hp(&engine, enemy);
    engine
        .store_mut()
        .world
        .get::<&mut EnemyBrain>(enemy)
        .unwrap()
        .state = AiState::Flank;

    assert_eq!(hit(&mut engine, enemy, PartKind::LArm, 100.0), HitOutcome::Ignored);
    assert_eq!(torso_hp(&engine, enemy), torso);
    let brain = engine.world().get::<&EnemyBrain>(enemy).unwrap();
    assert_eq!(brain.state, AiState::Chase, "any hit provokes a chase");
}

#[test]
fn test_arm_loss_drops_weapons() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    hit(&mut engine, enemy, PartKind::RArm, 100.0);
    let events = engine.drain_events();
    assert!(has_notice(&events, Notice::EnemyDisarmed));

    hit(&mut engine, enemy, PartKind::LArm, 100.0);
    let events = engine.drain_events();
    assert!(has_notice(&events, Notice::KnifeDropped));

    let weapons = engine
        .world()
        .query::<&Debris>()
        .iter()
        .filter(|(_, d)| d.kind == DebrisKind::Weapon)
        .count();
    assert_eq!(weapons, 2);
}

#[test]
fn test_dropped_weapons_carry_the_shot() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    for kind in [PartKind::RArm, PartKind::LArm] {
        engine.with_systems(|store, ctx, rng, events| {
            damage::apply_hit(
                store,
                ctx,
                rng,
                events,
                Hit {
                    enemy,
                    part: kind,
                    damage: 100.0,
                    velocity: Vec3::new(0.0, 0.0, -600.0),
                },
            )
        });
    }

    let drops: Vec<Vec3> = engine
        .world()
        .query::<(&Velocity, &Debris)>()
        .iter()
        .filter(|(_, (_, d))| d.kind == DebrisKind::Weapon)
        .map(|(_, (v, _))| v.0)
        .collect();
    assert_eq!(drops.len(), 2);
    for vel in drops {
        // A tenth of the shot plus the scatter kick
        assert!(vel.z < -55.0 && vel.z > -65.0, "vel {vel:?}");
    }
}

#[test]
fn test_headshot_notice() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    hit(&mut engine, enemy, PartKind::Head, 40.0);
    assert!(has_notice(&engine.drain_events(), Notice::Headshot));
    assert_eq!(torso_hp(&engine, enemy), 500.0);
}

#[test]
fn test_kill_clears_references_and_queues_respawn() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    let lock = PartLock {
        enemy,
        part: PartKind::Head,
    };
    engine.store_mut().player.lock = Some(lock);
    engine.with_systems(|store, _ctx, _rng, _events| {
        store.spawn_projectile(
            Vec3::new(0.0, 40.0, 0.0),
            Vec3::X,
            player_shot(20.0, Some(lock)),
        );
        store.spawn_projectile(Vec3::new(0.0, 40.0, 2.0), Vec3::X, enemy_shot(Some(enemy)));
    });

    assert_eq!(hit(&mut engine, enemy, PartKind::Torso, 1000.0), HitOutcome::Killed);
    let events = engine.drain_events();

    assert!(!engine.world().contains(enemy));
    assert_eq!(engine.player().lock, None);
    for (_, shot) in engine.world().query::<&Projectile>().iter() {
        assert!(shot.homing.is_none());
        assert!(shot.source.is_none());
    }
    assert_eq!(engine.score(), KILL_SCORE);
    assert!(events.contains(&SimEvent::ScoreChanged { score: KILL_SCORE }));
    assert!(events.contains(&SimEvent::TargetLockChanged { target: None }));
    assert!(events.contains(&SimEvent::EnemyCountChanged { live: 0 }));
    assert!(has_notice(&events, Notice::EnemyShattered));
    assert!(count::<Debris>(&engine) >= 6, "body shatters into debris");
    assert_eq!(engine.store_mut().pending_spawns, vec![ENEMY_RESPAWN_DELAY]);
}

#[test]
fn test_replacement_spawns_after_delay() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -10.0), EnemyWeaponType::Rifle);
    hit(&mut engine, enemy, PartKind::Torso, 1000.0);
    assert_eq!(engine.live_enemy_count(), 0);

    let due_tick = (ENEMY_RESPAWN_DELAY * TICK_RATE as f64) as usize;
    for _ in 0..due_tick {
        engine.tick();
    }
    assert_eq!(engine.live_enemy_count(), 0, "not before the delay");

    let snap = engine.tick();
    assert_eq!(engine.live_enemy_count(), 1);
    assert!(snap.events.contains(&SimEvent::EnemyCountChanged { live: 1 }));
    assert!(engine.store_mut().pending_spawns.is_empty());
}

// ---- Explosions ----

#[test]
fn test_blast_falloff_edges() {
    assert_eq!(damage::blast_falloff(0.0, 10.0), 1.0);
    assert_eq!(damage::blast_falloff(5.0, 10.0), 0.5);
    assert_eq!(damage::blast_falloff(10.0, 10.0), 0.0);
    assert_eq!(damage::blast_falloff(15.0, 10.0), 0.0);
}

#[test]
fn test_blast_damages_and_throws() {
    let mut engine = sandbox();
    let near = engine.spawn_test_enemy(Vec3::new(5.0, 0.05, 0.0), EnemyWeaponType::Rifle);
    let far = engine.spawn_test_enemy(Vec3::new(-12.0, 0.05, 0.0), EnemyWeaponType::Rifle);

    let events = engine.with_systems(|store, ctx, rng, events| {
        damage::apply_blast(
            store,
            ctx,
            rng,
            events,
            Vec3::new(0.0, 0.05, 0.0),
            Blast {
                radius: 10.0,
                force: 30.0,
            },
            300.0,
        );
        events.clone()
    });

    assert!(has_cue(&events, SoundCue::Explode));
    assert_eq!(torso_hp(&engine, near), 450.0);
    let vel = engine.world().get::<&Velocity>(near).unwrap().0;
    assert!((vel - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-4, "vel {vel:?}");
    assert_eq!(torso_hp(&engine, far), 600.0);
    assert!(!part(&engine, near, PartKind::LArm).broken, "blasts do not dismember");
    assert_eq!(
        count::<Particle>(&engine),
        BLAST_SMOKE_COUNT + BLAST_SPARK_COUNT
    );
}

#[test]
fn test_blast_throws_pieces_of_its_kills() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(-30.0, 0.05, -30.0), EnemyWeaponType::Rifle);
    engine
        .store_mut()
        .world
        .get::<&mut BodyParts>(enemy)
        .unwrap()[PartKind::Torso]
        .hp = 100.0;

    engine.with_systems(|store, ctx, rng, events| {
        damage::apply_blast(
            store,
            ctx,
            rng,
            events,
            Vec3::new(-34.0, 0.05, -30.0),
            Blast {
                radius: 10.0,
                force: 30.0,
            },
            300.0,
        );
    });

    assert!(!engine.world().contains(enemy));
    let pieces: Vec<Vec3> = engine
        .world()
        .query::<(&Velocity, &Debris)>()
        .iter()
        .map(|(_, (v, _))| v.0)
        .collect();
    assert_eq!(pieces.len(), 7, "six parts and the gun");
    for vel in pieces {
        // Carried body velocity (18) plus the blast's own push on debris
        assert!(vel.x > 30.0, "vel {vel:?}");
    }
}

#[test]
fn test_rocket_detonates_on_enemy() {
    let mut engine = sandbox();
    let enemy = engine.spawn_test_enemy(Vec3::new(0.0, 0.05, -8.2), EnemyWeaponType::Rifle);
    let rpg = engine.config().weapons.rpg.clone();

    let events = engine.with_systems(|store, ctx, rng, events| {
        let mut shot = player_shot(rpg.damage, None);
        shot.weapon = ShotWeapon::Player(WeaponType::Rpg);
        shot.blast = rpg.blast();
        store.spawn_projectile(Vec3::new(0.0, 1.4, -7.0), Vec3::new(0.0, 0.0, -80.0), shot);
        projectiles::run(store, ctx, rng, events);
        events.clone()
    });

    assert!(has_cue(&events, SoundCue::Explode));
    let torso = torso_hp(&engine, enemy);
    assert!(torso < 600.0 && torso > 0.0, "torso {torso}");
    assert_eq!(part(&engine, enemy, PartKind::Torso).max_hp, 600.0);
}

#[test]
fn test_rocket_on_floor_is_a_dud() {
    let mut engine = sandbox();
    let bystander = engine.spawn_test_enemy(Vec3::new(2.0, 0.05, 0.0), EnemyWeaponType::Rifle);
    let rpg = engine.config().weapons.rpg.clone();

    let events = engine.with_systems(|store, ctx, rng, events| {
        let mut shot = player_shot(rpg.damage, None);
        shot.radius = rpg.projectile_radius;
        shot.blast = rpg.blast();
        store.spawn_projectile(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -100.0, 0.0), shot);
        projectiles::run(store, ctx, rng, events);
        events.clone()
    });

    assert_eq!(count::<Projectile>(&engine), 0);
    assert!(!has_cue(&events, SoundCue::Explode));
    assert_eq!(torso_hp(&engine, bystander), 600.0);
    assert_eq!(count::<Particle>(&engine), 1, "a single spark");
}

// ---- Cosmetics ----

#[test]
fn test_debris_cap_drops_oldest() {
    let mut engine = sandbox();
    engine.with_systems(|store, ctx, rng, _events| {
        for _ in 0..DEBRIS_CAP + 44 {
            store.spawn_debris(
                rng,
                DebrisSpawn {
                    kind: DebrisKind::Limb,
                    position: Vec3::new(0.0, 30.0, 0.0),
                    velocity: Vec3::ZERO,
                    size: Vec3::splat(0.2),
                    tag: 0,
                    yaw: 0.0,
                    life: None,
                },
            );
        }
        cosmetics::run(store, ctx, &mut Vec::new());
    });

    assert_eq!(count::<Debris>(&engine), DEBRIS_CAP);
    let oldest = engine
        .world()
        .query::<&Debris>()
        .iter()
        .map(|(_, d)| d.order)
        .min()
        .unwrap();
    assert_eq!(oldest, 45);
}

#[test]
fn test_particles_fade_out() {
    let mut engine = sandbox();
    engine.with_systems(|store, _ctx, rng, _events| {
        store.spawn_particle(rng, ParticleKind::Blood, Vec3::new(0.0, 2.0, 0.0));
    });
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(count::<Particle>(&engine), 1);
    for _ in 0..35 {
        engine.tick();
    }
    assert_eq!(count::<Particle>(&engine), 0);
}

#[test]
fn test_debris_comes_to_rest_on_floor() {
    let mut engine = sandbox();
    let piece = engine.with_systems(|store, _ctx, rng, _events| {
        store.spawn_debris(
            rng,
            DebrisSpawn {
                kind: DebrisKind::Limb,
                position: Vec3::new(-30.0, 3.0, -30.0),
                velocity: Vec3::ZERO,
                size: Vec3::new(0.2, 0.4, 0.2),
                tag: 0,
                yaw: 0.0,
                life: None,
            },
        )
    });
    for _ in 0..600 {
        engine.tick();
    }
    let pos = engine.world().get::<&Position>(piece).unwrap().0;
    assert!(pos.y >= 0.2 - 1e-3 && pos.y < 0.5, "rests on the floor at {}", pos.y);
}
