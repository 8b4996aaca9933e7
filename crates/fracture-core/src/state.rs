//! Game state snapshot: the complete visible state handed to the host each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::SimTime;

/// Complete game state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub score: u32,
    pub pointer_locked: bool,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub debris: Vec<DebrisView>,
    pub particles: Vec<ParticleView>,
    /// Events raised during the tick that produced this snapshot.
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub view: Vec3,
    pub grounded: bool,
    pub health: f32,
    pub max_health: f32,
    pub weapon: WeaponType,
    pub ammo: AmmoView,
    pub aiming: bool,
    pub shielding: bool,
    /// Serial and part of the aim-assist lock.
    pub lock: Option<(u32, PartKind)>,
    pub down: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmmoView {
    pub current: u32,
    pub max: u32,
    pub reloading: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub serial: u32,
    pub position: Vec3,
    pub yaw: f32,
    pub velocity: Vec3,
    pub state: AiState,
    pub weapon: EnemyWeaponType,
    pub crawling: bool,
    /// Torso hp as a fraction of its maximum, for health bars.
    pub health_fraction: f32,
    pub parts: Vec<PartView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartView {
    pub kind: PartKind,
    pub hp: f32,
    pub max_hp: f32,
    pub broken: bool,
    /// Centre of the part's hit volume in world space.
    pub position: Vec3,
    pub size: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub faction: Faction,
    pub weapon: ShotWeapon,
    pub radius: f32,
    pub tag: u32,
    pub homing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebrisView {
    pub kind: DebrisKind,
    pub position: Vec3,
    pub rotation: Vec3,
    pub size: Vec3,
    pub tag: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleView {
    pub kind: ParticleKind,
    pub position: Vec3,
    pub life: f32,
}
