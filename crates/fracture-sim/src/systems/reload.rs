//! Reload timers for the player and every enemy.

use fracture_core::components::{EnemyArmament, Enemy, Player};
use fracture_core::config::GameConfig;
use fracture_core::events::{Notice, SimEvent, SoundCue};

use crate::store::EntityStore;
use crate::systems::TickContext;

/// Refill every magazine whose reload deadline has passed.
pub fn run(store: &mut EntityStore, ctx: &TickContext, events: &mut Vec<SimEvent>) {
    let active = store.player.weapon.index();
    let mut refilled_active = false;
    for (slot, magazine) in store.player.magazines.iter_mut().enumerate() {
        if magazine.resolve_reload(ctx.now) && slot == active {
            refilled_active = true;
        }
    }
    if refilled_active {
        events.push(ammo_event(&store.player));
    }

    for (_entity, (enemy, armament)) in store.world.query_mut::<(&Enemy, &mut EnemyArmament)>() {
        if armament.magazine.resolve_reload(ctx.now) {
            log::debug!("enemy #{} reloaded {:?}", enemy.serial, armament.weapon);
        }
    }
}

/// Start reloading the active weapon. Does nothing while a reload is
/// already running or the magazine is full.
pub fn request_player_reload(
    player: &mut Player,
    config: &GameConfig,
    now: f64,
    events: &mut Vec<SimEvent>,
) -> bool {
    let duration = config.weapons.get(player.weapon).reload_time;
    if !player.magazine_mut().begin_reload(now, duration) {
        return false;
    }
    log::debug!("player reloading {:?}", player.weapon);
    events.push(SimEvent::Sound {
        cue: SoundCue::Reload,
    });
    events.push(SimEvent::Message {
        notice: Notice::Reloading,
    });
    events.push(ammo_event(player));
    true
}

/// Ammo indicator for the active weapon.
pub fn ammo_event(player: &Player) -> SimEvent {
    let magazine = player.magazine();
    SimEvent::AmmoChanged {
        current: magazine.rounds,
        max: magazine.capacity,
        reloading: magazine.is_reloading(),
    }
}
