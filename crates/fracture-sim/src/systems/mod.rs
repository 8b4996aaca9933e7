//! Systems that advance the match each tick.
//!
//! Systems are free functions over the `EntityStore`. They do not own
//! state: entity state lives in components, match bookkeeping in the
//! store, and everything read-only for the tick in `TickContext`.

use fracture_arena::StaticWorld;
use fracture_core::config::GameConfig;

pub mod cosmetics;
pub mod damage;
pub mod enemy_ai;
pub mod movement;
pub mod player_control;
pub mod player_fire;
pub mod projectiles;
pub mod reload;
pub mod respawn;
pub mod snapshot;

/// Read-only inputs shared by every system in one tick.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub arena: &'a StaticWorld,
    pub config: &'a GameConfig,
    /// Simulation time at the start of the tick.
    pub now: f64,
    pub dt: f32,
}
