//! Damage pipeline: part hits, dismemberment, blasts, kills and player
//! damage.
//!
//! All hp changes go through here so the torso-pool and one-way-break
//! rules hold no matter what dealt the damage.

use glam::Vec3;
use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use fracture_core::components::*;
use fracture_core::constants::*;
use fracture_core::enums::{AiState, DebrisKind, ParticleKind, PartKind};
use fracture_core::events::{Notice, SimEvent, SoundCue};

use crate::body::part_center;
use crate::store::{DebrisSpawn, EntityStore};
use crate::systems::TickContext;

const FLESH_TAG: u32 = 0xaa5555;
const ARMOUR_TAG: u32 = 0x333333;
const GUN_TAG: u32 = 0x222222;
const KNIFE_TAG: u32 = 0x444444;

/// A projectile striking one part of one enemy.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub enemy: Entity,
    pub part: PartKind,
    pub damage: f32,
    /// Velocity of whatever struck; sets the knockback direction.
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Enemy already gone, or the part was already broken.
    Ignored,
    Damaged,
    PartBroken,
    Killed,
}

/// What a hit did to a body, gathered while the enemy's components are
/// borrowed and applied to the world afterwards.
struct Wound {
    feet: Vec3,
    yaw: f32,
    crawling: bool,
    part: EnemyPart,
    broke: bool,
    dead: bool,
}

/// Apply a direct hit to one part.
///
/// Any hit, even one on a broken part, snaps the enemy back to chasing.
/// Damage is scaled by the part's multiplier and debited from the part;
/// the torso pool takes the same amount again for non-torso parts, and
/// for torso hits too when `double_count_torso_hits` is on.
pub fn apply_hit(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    hit: Hit,
) -> HitOutcome {
    let double_count = ctx.config.tuning.double_count_torso_hits;
    let wound = {
        let Ok((enemy, pos, vel, parts, brain)) = store.world.query_one_mut::<(
            &mut Enemy,
            &Position,
            &mut Velocity,
            &mut BodyParts,
            &mut EnemyBrain,
        )>(hit.enemy) else {
            return HitOutcome::Ignored;
        };

        brain.state = AiState::Chase;
        if parts[hit.part].broken {
            return HitOutcome::Ignored;
        }

        let amount = hit.damage * parts[hit.part].multiplier;
        let before = parts[hit.part].hp;
        let part = &mut parts[hit.part];
        part.hp = (part.hp - amount).max(0.0);
        debug_assert!(part.hp <= before, "part hp increased");
        if hit.part != PartKind::Torso || double_count {
            let torso = &mut parts[PartKind::Torso];
            torso.hp = (torso.hp - amount).max(0.0);
        }
        vel.0 += hit.velocity.normalize_or_zero() * HIT_IMPULSE;

        let part = &mut parts[hit.part];
        let broke = part.hp <= 0.0 && !part.broken;
        if broke {
            part.broken = true;
        }
        let part = *part;

        if broke && part.kind.is_leg() {
            if parts.is_broken(PartKind::LLeg) && parts.is_broken(PartKind::RLeg) {
                enemy.crawling = true;
                enemy.speed = 0.0;
            } else {
                enemy.speed *= 0.5;
            }
        }

        Wound {
            feet: pos.0,
            yaw: enemy.yaw,
            crawling: enemy.crawling,
            part,
            broke,
            dead: parts.is_dead(),
        }
    };

    events.push(SimEvent::Sound { cue: SoundCue::Hit });
    let struck_at = part_center(wound.feet, wound.yaw, wound.crawling, &wound.part);
    store.spawn_particle(rng, ParticleKind::Blood, struck_at);

    if wound.broke {
        dismember(store, rng, events, &wound, hit.velocity);
    }

    if wound.dead {
        kill_enemy(store, ctx, rng, events, hit.enemy);
        HitOutcome::Killed
    } else if wound.broke {
        HitOutcome::PartBroken
    } else {
        HitOutcome::Damaged
    }
}

/// Throw a broken-off part and announce what losing it means.
fn dismember(
    store: &mut EntityStore,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    wound: &Wound,
    velocity: Vec3,
) {
    let jitter = Vec3::new(
        (rng.gen::<f32>() - 0.5) * 0.2,
        0.0,
        (rng.gen::<f32>() - 0.5) * 0.2,
    );
    let height = if wound.crawling {
        CRAWL_HEIGHT
    } else {
        wound.part.offset.y
    };
    let at = wound.feet + Vec3::Y * height + jitter;
    store.spawn_debris(
        rng,
        DebrisSpawn {
            kind: DebrisKind::Limb,
            position: at,
            velocity: velocity * 0.2,
            size: wound.part.size,
            tag: FLESH_TAG,
            yaw: wound.yaw,
            life: None,
        },
    );

    let notice = match wound.part.kind {
        PartKind::RArm => {
            let size = Vec3::new(0.1, 0.1, 0.5);
            drop_weapon(store, rng, at, velocity * 0.1, size, GUN_TAG, wound.yaw);
            Notice::EnemyDisarmed
        }
        PartKind::LArm => {
            let size = Vec3::new(0.05, 0.2, 0.05);
            drop_weapon(store, rng, at, velocity * 0.1, size, KNIFE_TAG, wound.yaw);
            Notice::KnifeDropped
        }
        PartKind::Head => Notice::Headshot,
        PartKind::LLeg | PartKind::RLeg if wound.crawling => Notice::Immobilized,
        PartKind::LLeg | PartKind::RLeg => Notice::LegBroken,
        PartKind::Torso => return,
    };
    log::debug!("{:?} broken off", wound.part.kind);
    events.push(SimEvent::Message { notice });
}

fn drop_weapon(
    store: &mut EntityStore,
    rng: &mut ChaCha8Rng,
    at: Vec3,
    velocity: Vec3,
    size: Vec3,
    tag: u32,
    yaw: f32,
) {
    store.spawn_debris(
        rng,
        DebrisSpawn {
            kind: DebrisKind::Weapon,
            position: at,
            velocity,
            size,
            tag,
            yaw,
            life: None,
        },
    );
}

/// Remove a dead enemy: shatter what is left of it, score the kill and
/// queue a replacement.
pub fn kill_enemy(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    entity: Entity,
) {
    let Ok((serial, feet, velocity, yaw, crawling, parts)) = store
        .world
        .query_one_mut::<(&Enemy, &Position, &Velocity, &BodyParts)>(entity)
        .map(|(e, p, v, b)| (e.serial, p.0, v.0, e.yaw, e.crawling, b.clone()))
    else {
        return;
    };

    if store.forget(entity) {
        events.push(SimEvent::TargetLockChanged { target: None });
    }

    for part in parts.iter().filter(|p| !p.broken) {
        let tag = match part.kind {
            PartKind::Head | PartKind::LArm | PartKind::RArm => FLESH_TAG,
            _ => ARMOUR_TAG,
        };
        let height = if crawling { CRAWL_HEIGHT } else { part.offset.y };
        let jitter = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 0.2,
            0.0,
            (rng.gen::<f32>() - 0.5) * 0.2,
        );
        store.spawn_debris(
            rng,
            DebrisSpawn {
                kind: DebrisKind::Limb,
                position: feet + Vec3::Y * height + jitter,
                velocity: velocity + Vec3::Y * DEATH_SCATTER_LIFT,
                size: part.size,
                tag,
                yaw,
                life: None,
            },
        );
    }
    if !parts.is_broken(PartKind::RArm) {
        store.spawn_debris(
            rng,
            DebrisSpawn {
                kind: DebrisKind::Weapon,
                position: feet + Vec3::Y * 1.5,
                velocity,
                size: Vec3::new(0.1, 0.1, 0.5),
                tag: GUN_TAG,
                yaw,
                life: None,
            },
        );
    }

    let _ = store.world.despawn(entity);
    store.score += ctx.config.tuning.kill_score;
    store
        .pending_spawns
        .push(ctx.now + ctx.config.tuning.enemy_respawn_delay);
    log::debug!("enemy #{serial} shattered, score {}", store.score);

    events.push(SimEvent::ScoreChanged { score: store.score });
    events.push(SimEvent::Sound {
        cue: SoundCue::Kill,
    });
    events.push(SimEvent::Message {
        notice: Notice::EnemyShattered,
    });
    events.push(SimEvent::EnemyCountChanged {
        live: store.live_enemy_count(),
    });
}

/// Blast strength at `distance` from the centre: 1 at the centre, falling
/// linearly to 0 at the edge and beyond.
pub fn blast_falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    1.0 - distance / radius
}

/// Detonate at `center`. Enemies inside the radius lose torso hp and are
/// thrown outward. Anyone it kills shatters before loose debris is
/// thrown, so their pieces fly too. Bodies are not dismembered by blasts.
pub fn apply_blast(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
    center: Vec3,
    blast: Blast,
    damage: f32,
) {
    events.push(SimEvent::Sound {
        cue: SoundCue::Explode,
    });
    for _ in 0..BLAST_SMOKE_COUNT {
        store.spawn_particle(rng, ParticleKind::Smoke, center);
    }
    for _ in 0..BLAST_SPARK_COUNT {
        store.spawn_particle(rng, ParticleKind::Spark, center);
    }

    let mut killed = Vec::new();
    for (entity, (pos, vel, parts, _enemy)) in store
        .world
        .query_mut::<(&mut Position, &mut Velocity, &mut BodyParts, &Enemy)>()
    {
        let distance = pos.0.distance(center);
        let impact = blast_falloff(distance, blast.radius);
        if impact <= 0.0 {
            continue;
        }
        let torso = &mut parts[PartKind::Torso];
        torso.hp = (torso.hp - damage * impact).max(0.0);
        vel.0 += (pos.0 - center).normalize_or_zero() * blast.force * impact;
        pos.0.y += BLAST_LIFT;
        if parts.is_dead() {
            killed.push(entity);
        }
    }

    for entity in killed {
        kill_enemy(store, ctx, rng, events, entity);
    }

    for (_entity, (pos, vel, _debris)) in store
        .world
        .query_mut::<(&mut Position, &mut Velocity, &Debris)>()
    {
        let impact = blast_falloff(pos.0.distance(center), blast.radius);
        if impact <= 0.0 {
            continue;
        }
        vel.0 +=
            (pos.0 - center).normalize_or_zero() * blast.force * impact * BLAST_DEBRIS_FACTOR;
        pos.0.y += BLAST_LIFT;
    }
}

/// Take health off the player. Ignored while the player is down.
pub fn damage_player(
    store: &mut EntityStore,
    ctx: &TickContext,
    events: &mut Vec<SimEvent>,
    amount: f32,
) {
    let player = &mut store.player;
    if player.respawn_at.is_some() {
        return;
    }
    player.health = (player.health - amount).max(0.0);
    events.push(SimEvent::PlayerHealthChanged {
        health: player.health,
    });
    events.push(SimEvent::Sound {
        cue: SoundCue::PlayerHit,
    });

    if player.health <= 0.0 {
        player.respawn_at = Some(ctx.now + ctx.config.tuning.player_respawn_delay);
        log::info!("player down at t={:.2}", ctx.now);
        events.push(SimEvent::Message {
            notice: Notice::PlayerDown,
        });
    }
}
