//! ECS components for hecs entities, plus the player record.
//!
//! Components are plain data. Game logic lives in systems; the only
//! methods here are lookups that keep the part array and its invariants
//! in one place.

use std::ops::{Index, IndexMut};

use glam::Vec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Magazine;

/// World-space position. For enemies this is the point between the feet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec3);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

/// A specific part of a specific enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartLock {
    pub enemy: Entity,
    pub part: PartKind,
}

/// The human player. Owned directly by the entity store, not an ECS entity.
#[derive(Debug, Clone)]
pub struct Player {
    /// Eye position.
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub health: f32,
    pub weapon: WeaponType,
    /// One magazine per weapon, indexed by `WeaponType::index`.
    pub magazines: [Magazine; 4],
    /// Earliest time the next shot may leave the barrel.
    pub next_shot_at: f64,
    /// Aim-assist lock carried by the next shot.
    pub lock: Option<PartLock>,
    /// Unit view direction from the latest input.
    pub view: Vec3,
    pub aiming: bool,
    pub shielding: bool,
    /// Set once an updraft launch is used; cleared on landing.
    pub updraft_spent: bool,
    /// Pending respawn after reaching zero health.
    pub respawn_at: Option<f64>,
}

impl Player {
    pub fn magazine(&self) -> &Magazine {
        &self.magazines[self.weapon.index()]
    }

    pub fn magazine_mut(&mut self) -> &mut Magazine {
        &mut self.magazines[self.weapon.index()]
    }
}

/// Identity and locomotion state of an enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    /// Monotonic spawn number, stable for the enemy's lifetime.
    pub serial: u32,
    pub yaw: f32,
    /// Current move speed. Halved by a broken leg, zero when crawling.
    pub speed: f32,
    pub crawling: bool,
    pub grounded: bool,
    /// Set after riding an updraft; cleared on landing.
    pub updraft_spent: bool,
}

/// One destructible hit volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyPart {
    pub kind: PartKind,
    pub max_hp: f32,
    /// Non-increasing, never below zero.
    pub hp: f32,
    /// One-way: once broken a part takes no further direct damage.
    pub broken: bool,
    pub multiplier: f32,
    pub size: Vec3,
    /// Offset from the feet in the enemy's local frame.
    pub offset: Vec3,
}

/// The six parts of an enemy, indexed by `PartKind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyParts(pub [EnemyPart; PartKind::COUNT]);

impl BodyParts {
    pub fn torso(&self) -> &EnemyPart {
        &self[PartKind::Torso]
    }

    /// Dead exactly when the torso pool is exhausted.
    pub fn is_dead(&self) -> bool {
        self.torso().hp <= 0.0
    }

    pub fn torso_fraction(&self) -> f32 {
        let torso = self.torso();
        if torso.max_hp <= 0.0 {
            return 0.0;
        }
        (torso.hp / torso.max_hp).clamp(0.0, 1.0)
    }

    pub fn is_broken(&self, kind: PartKind) -> bool {
        self[kind].broken
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemyPart> {
        self.0.iter()
    }
}

impl Index<PartKind> for BodyParts {
    type Output = EnemyPart;

    fn index(&self, kind: PartKind) -> &EnemyPart {
        &self.0[kind.index()]
    }
}

impl IndexMut<PartKind> for BodyParts {
    fn index_mut(&mut self, kind: PartKind) -> &mut EnemyPart {
        &mut self.0[kind.index()]
    }
}

/// Tactical state and timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBrain {
    pub state: AiState,
    pub next_decision_at: f64,
    /// Cover destination picked when entering tactical cover.
    pub target_position: Option<Vec3>,
    /// Horizontal move intent, already scaled by the state's speed factor.
    pub steering: Vec3,
    pub next_attack_at: f64,
    pub next_melee_at: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyArmament {
    pub weapon: EnemyWeaponType,
    pub magazine: Magazine,
}

/// Blast carried by an explosive projectile. Damage is the projectile's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blast {
    pub radius: f32,
    pub force: f32,
}

/// A projectile in flight.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub faction: Faction,
    pub weapon: ShotWeapon,
    pub radius: f32,
    pub damage: f32,
    /// Seconds until expiry.
    pub life: f32,
    /// Enemy that fired it, used to aim deflections back.
    pub source: Option<Entity>,
    pub homing: Option<PartLock>,
    pub blast: Option<Blast>,
    /// Colour tag for presentation.
    pub tag: u32,
}

/// A tumbling cosmetic body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debris {
    pub kind: DebrisKind,
    pub size: Vec3,
    pub tag: u32,
    /// Euler rotation (radians).
    pub rotation: Vec3,
    pub spin: Vec3,
    /// Seconds left, or None to live until culled.
    pub life: Option<f32>,
    /// Spawn order, used to drop the oldest pieces first.
    pub order: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub life: f32,
}
