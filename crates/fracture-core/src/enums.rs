//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Player weapon selection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    #[default]
    Rifle,
    Sniper,
    Smg,
    Rpg,
}

impl WeaponType {
    pub const ALL: [WeaponType; 4] = [
        WeaponType::Rifle,
        WeaponType::Sniper,
        WeaponType::Smg,
        WeaponType::Rpg,
    ];

    /// Slot index into per-weapon arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Weapon carried by an enemy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnemyWeaponType {
    #[default]
    Rifle,
    Shotgun,
    Laser,
    Flamethrower,
}

impl EnemyWeaponType {
    pub const ALL: [EnemyWeaponType; 4] = [
        EnemyWeaponType::Rifle,
        EnemyWeaponType::Shotgun,
        EnemyWeaponType::Laser,
        EnemyWeaponType::Flamethrower,
    ];
}

/// Named body part of an enemy. Each part has its own hit volume and health.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PartKind {
    Head,
    #[default]
    Torso,
    LArm,
    RArm,
    LLeg,
    RLeg,
}

impl PartKind {
    pub const COUNT: usize = 6;

    pub const ALL: [PartKind; PartKind::COUNT] = [
        PartKind::Head,
        PartKind::Torso,
        PartKind::LArm,
        PartKind::RArm,
        PartKind::LLeg,
        PartKind::RLeg,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_leg(self) -> bool {
        matches!(self, PartKind::LLeg | PartKind::RLeg)
    }
}

/// Enemy tactical state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    #[default]
    Chase,
    Flank,
    TacticalCover,
    SeekUpdraft,
}

/// Which side a projectile currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// Weapon a projectile was fired from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "side", content = "weapon")]
pub enum ShotWeapon {
    Player(WeaponType),
    Enemy(EnemyWeaponType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebrisKind {
    /// A severed body part.
    Limb,
    /// A dropped rifle or knife.
    Weapon,
    /// An ejected shell casing.
    Casing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Blood,
    Smoke,
    Spark,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Active,
    Paused,
}
