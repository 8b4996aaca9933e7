//! Player commands and per-tick input sent from the host to the simulation.
//!
//! Commands are queued and processed at the next tick boundary. Input is a
//! level-triggered snapshot that replaces the previous one.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::look_direction;

/// Discrete player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Populate the arena and begin play.
    StartMatch,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
    /// Switch the active weapon.
    SelectWeapon { weapon: WeaponType },
    /// The host captured or released the pointer.
    SetPointerLock { locked: bool },
}

/// Control state sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
    pub aim: bool,
    pub shield: bool,
    pub reload: bool,
    /// Weapon hotkey pressed this tick.
    pub weapon_select: Option<WeaponType>,
    /// Look yaw in radians; 0 looks down -Z.
    pub look_yaw: f32,
    /// Look pitch in radians; positive looks up.
    pub look_pitch: f32,
}

impl InputSnapshot {
    pub fn view_direction(&self) -> glam::Vec3 {
        look_direction(self.look_yaw, self.look_pitch)
    }
}
