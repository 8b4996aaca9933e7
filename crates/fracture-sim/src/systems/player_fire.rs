//! Player trigger handling.

use glam::Vec3;
use rand_chacha::ChaCha8Rng;

use fracture_ai::profiles::apply_spread;
use fracture_core::components::Projectile;
use fracture_core::constants::*;
use fracture_core::enums::{DebrisKind, Faction, ShotWeapon};
use fracture_core::events::{SimEvent, SoundCue};

use crate::store::{DebrisSpawn, EntityStore};
use crate::systems::reload::{ammo_event, request_player_reload};
use crate::systems::TickContext;

const CASING_SIZE: Vec3 = Vec3::new(0.02, 0.08, 0.02);
const CASING_TAG: u32 = 0xccaa00;
const CASING_LIFETIME: f32 = 5.0;

/// Result of one fire request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    /// Still inside the previous shot's interval.
    Cooling,
    Reloading,
    Shielding,
    /// Dry: feedback played and a reload started.
    Empty,
}

/// Try to fire the active weapon.
///
/// Rejected while mid-reload, before the fire interval has elapsed, or
/// while shielding. A dry trigger pull plays the empty cue, holds the
/// trigger briefly and starts a reload instead of firing.
pub fn run(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
) -> FireOutcome {
    let now = ctx.now;
    let player = &mut store.player;

    if player.magazine_mut().resolve_reload(now) {
        events.push(ammo_event(player));
    }
    if player.magazine().is_reloading() {
        return FireOutcome::Reloading;
    }
    if now < player.next_shot_at {
        return FireOutcome::Cooling;
    }
    if player.shielding {
        return FireOutcome::Shielding;
    }

    if player.magazine().is_empty() {
        events.push(SimEvent::Sound {
            cue: SoundCue::Empty,
        });
        player.next_shot_at = now + EMPTY_FIRE_LOCKOUT;
        request_player_reload(player, ctx.config, now, events);
        return FireOutcome::Empty;
    }

    let stats = ctx.config.weapons.get(player.weapon);
    if !player.magazine_mut().try_consume() {
        return FireOutcome::Reloading;
    }
    player.next_shot_at = now + stats.fire_interval;
    events.push(ammo_event(player));
    events.push(SimEvent::WeaponFired {
        weapon: player.weapon,
        recoil: stats.recoil,
    });
    events.push(SimEvent::Sound {
        cue: if stats.explosive {
            SoundCue::Rpg
        } else {
            SoundCue::Shoot
        },
    });

    let eye = player.position;
    let view = player.view;
    let aiming = player.aiming;
    let weapon = player.weapon;
    let homing = player.lock;

    let right = view.cross(Vec3::Y).normalize_or_zero();
    let up = right.cross(view).normalize_or_zero();
    let (side, drop) = if aiming { (0.0, -0.15) } else { (0.3, -0.2) };
    let casing_at = eye + right * side + up * drop + view * 0.5;
    store.spawn_debris(
        rng,
        DebrisSpawn {
            kind: DebrisKind::Casing,
            position: casing_at,
            velocity: right * 3.0,
            size: CASING_SIZE,
            tag: CASING_TAG,
            yaw: 0.0,
            life: Some(CASING_LIFETIME),
        },
    );

    let spread = if aiming {
        stats.spread * AIM_SPREAD_FACTOR
    } else {
        stats.spread
    };
    let dir = apply_spread(view, spread, rng);

    store.spawn_projectile(
        eye + dir * MUZZLE_OFFSET,
        dir * stats.projectile_speed,
        Projectile {
            faction: Faction::Player,
            weapon: ShotWeapon::Player(weapon),
            radius: stats.projectile_radius,
            damage: stats.damage,
            life: PROJECTILE_LIFETIME,
            source: None,
            homing,
            blast: stats.blast(),
            tag: stats.tag,
        },
    );
    FireOutcome::Fired
}
