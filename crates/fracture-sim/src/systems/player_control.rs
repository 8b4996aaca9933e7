//! Player intent: stance flags, weapon selection, manual reload and the
//! aim-assist lock.

use fracture_core::commands::InputSnapshot;
use fracture_core::components::{BodyParts, Enemy, PartLock, Player, Position};
use fracture_core::constants::AIM_ASSIST_CONE;
use fracture_core::enums::WeaponType;
use fracture_core::events::{Notice, SimEvent};

use crate::body::part_center;
use crate::store::EntityStore;
use crate::systems::reload::{ammo_event, request_player_reload};
use crate::systems::TickContext;

/// Mirror the sampled input onto the player.
pub fn apply_input(
    store: &mut EntityStore,
    ctx: &TickContext,
    input: &InputSnapshot,
    events: &mut Vec<SimEvent>,
) {
    let player = &mut store.player;
    player.view = input.view_direction();
    player.aiming = input.aim;
    player.shielding = input.shield;

    if let Some(weapon) = input.weapon_select {
        switch_weapon(player, weapon, events);
    }
    if input.reload {
        request_player_reload(player, ctx.config, ctx.now, events);
    }
}

/// Make `weapon` active. A running reload on the old weapon is abandoned
/// and its rounds are not restored.
pub fn switch_weapon(player: &mut Player, weapon: WeaponType, events: &mut Vec<SimEvent>) {
    if player.weapon == weapon {
        return;
    }
    if player.magazine_mut().cancel_reload() {
        events.push(SimEvent::Message {
            notice: Notice::ReloadInterrupted,
        });
    }
    player.weapon = weapon;
    events.push(SimEvent::WeaponChanged { weapon });
    events.push(ammo_event(player));
}

/// Refresh the aim-assist lock.
///
/// While aiming, the intact part of a live enemy with the smallest angle
/// to the view ray inside the assist cone is locked. Otherwise the lock
/// is dropped.
pub fn update_lock(store: &mut EntityStore, events: &mut Vec<SimEvent>) {
    let player = &store.player;
    let mut best: Option<(PartLock, u32, f32)> = None;

    if player.aiming {
        for (entity, (enemy, pos, parts)) in store
            .world
            .query::<(&Enemy, &Position, &BodyParts)>()
            .iter()
        {
            for part in parts.iter().filter(|p| !p.broken) {
                let center = part_center(pos.0, enemy.yaw, enemy.crawling, part);
                let to_part = (center - player.position).normalize_or_zero();
                if to_part == glam::Vec3::ZERO {
                    continue;
                }
                let angle = player.view.angle_between(to_part);
                if angle < AIM_ASSIST_CONE && best.map_or(true, |(_, _, a)| angle < a) {
                    let lock = PartLock {
                        enemy: entity,
                        part: part.kind,
                    };
                    best = Some((lock, enemy.serial, angle));
                }
            }
        }
    }

    let new_lock = best.map(|(lock, _, _)| lock);
    if new_lock != store.player.lock {
        store.player.lock = new_lock;
        events.push(SimEvent::TargetLockChanged {
            target: best.map(|(lock, serial, _)| (serial, lock.part)),
        });
    }
}

