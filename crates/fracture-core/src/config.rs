//! Tuning tables and arena layout.
//!
//! `GameConfig::default()` carries the stock FRACTURE tuning. Hosts may
//! load an override from JSON; either way the table is validated once
//! before the engine starts and treated as immutable afterwards.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::Blast;
use crate::enums::{EnemyWeaponType, WeaponType};

/// Fatal configuration problems, reported once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON or a missing table entry.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("weapon {weapon}: {reason}")]
    InvalidWeapon {
        weapon: String,
        reason: &'static str,
    },
    #[error("arena: {0}")]
    InvalidArena(String),
    #[error("tuning: {0}")]
    InvalidTuning(&'static str),
}

/// Player weapon stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub name: String,
    /// Minimum seconds between shots.
    pub fire_interval: f64,
    pub damage: f32,
    pub spread: f32,
    pub recoil: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub tag: u32,
    #[serde(default)]
    pub explosive: bool,
    #[serde(default)]
    pub blast_radius: Option<f32>,
    #[serde(default)]
    pub blast_force: Option<f32>,
    pub magazine_size: u32,
    /// Seconds from reload start to a full magazine.
    pub reload_time: f64,
}

impl WeaponStats {
    /// Blast parameters for explosive weapons.
    pub fn blast(&self) -> Option<Blast> {
        if !self.explosive {
            return None;
        }
        Some(Blast {
            radius: self.blast_radius?,
            force: self.blast_force?,
        })
    }
}

/// Enemy weapon stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyWeaponStats {
    pub name: String,
    pub fire_interval: f64,
    /// Enemies only open fire inside this distance.
    pub range: f32,
    pub damage: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub spread: f32,
    /// Pellets per trigger pull for burst weapons.
    #[serde(default)]
    pub burst: Option<u32>,
    pub magazine_size: u32,
    pub reload_time: f64,
    pub tag: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWeapons {
    pub rifle: WeaponStats,
    pub sniper: WeaponStats,
    pub smg: WeaponStats,
    pub rpg: WeaponStats,
}

impl PlayerWeapons {
    pub fn get(&self, weapon: WeaponType) -> &WeaponStats {
        match weapon {
            WeaponType::Rifle => &self.rifle,
            WeaponType::Sniper => &self.sniper,
            WeaponType::Smg => &self.smg,
            WeaponType::Rpg => &self.rpg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyWeapons {
    pub rifle: EnemyWeaponStats,
    pub shotgun: EnemyWeaponStats,
    pub laser: EnemyWeaponStats,
    pub flamethrower: EnemyWeaponStats,
}

impl EnemyWeapons {
    pub fn get(&self, weapon: EnemyWeaponType) -> &EnemyWeaponStats {
        match weapon {
            EnemyWeaponType::Rifle => &self.rifle,
            EnemyWeaponType::Shotgun => &self.shotgun,
            EnemyWeaponType::Laser => &self.laser,
            EnemyWeaponType::Flamethrower => &self.flamethrower,
        }
    }
}

/// Axis-aligned box given by centre and full size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub center: Vec3,
    pub size: Vec3,
}

impl BoxSpec {
    pub fn new(center: [f32; 3], size: [f32; 3]) -> Self {
        Self {
            center: Vec3::from(center),
            size: Vec3::from(size),
        }
    }

    /// Top surface height.
    pub fn top(&self) -> f32 {
        self.center.y + self.size.y * 0.5
    }
}

/// Vertical launch column, infinite in height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdraftSpec {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    /// Vertical speed granted on launch.
    pub force: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub floor: BoxSpec,
    pub platforms: Vec<BoxSpec>,
    pub walls: Vec<BoxSpec>,
    pub updrafts: Vec<UpdraftSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub enemy_population: usize,
    pub enemy_respawn_delay: f64,
    pub player_respawn_delay: f64,
    pub kill_score: u32,
    /// Debit the torso pool a second time when the torso itself is hit.
    pub double_count_torso_hits: bool,
}

impl Default for TuningConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            enemy_population: ENEMY_POPULATION,
            enemy_respawn_delay: ENEMY_RESPAWN_DELAY,
            player_respawn_delay: PLAYER_RESPAWN_DELAY,
            kill_score: KILL_SCORE,
            double_count_torso_hits: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub weapons: PlayerWeapons,
    pub enemy_weapons: EnemyWeapons,
    pub arena: ArenaConfig,
    #[serde(default)]
    pub tuning: TuningConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for weapon in WeaponType::ALL {
            validate_weapon(self.weapons.get(weapon))?;
        }
        for weapon in EnemyWeaponType::ALL {
            validate_enemy_weapon(self.enemy_weapons.get(weapon))?;
        }
        validate_arena(&self.arena)?;

        let tuning = &self.tuning;
        if tuning.enemy_respawn_delay < 0.0 || tuning.player_respawn_delay < 0.0 {
            return Err(ConfigError::InvalidTuning("respawn delays must not be negative"));
        }
        Ok(())
    }
}

fn invalid(name: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidWeapon {
        weapon: name.to_string(),
        reason,
    }
}

fn validate_weapon(stats: &WeaponStats) -> Result<(), ConfigError> {
    if stats.magazine_size == 0 {
        return Err(invalid(&stats.name, "magazine size must be positive"));
    }
    if stats.fire_interval <= 0.0 || stats.reload_time <= 0.0 {
        return Err(invalid(&stats.name, "fire interval and reload time must be positive"));
    }
    if stats.projectile_speed <= 0.0 || stats.projectile_radius <= 0.0 {
        return Err(invalid(&stats.name, "projectile speed and radius must be positive"));
    }
    if stats.damage < 0.0 || stats.spread < 0.0 {
        return Err(invalid(&stats.name, "damage and spread must not be negative"));
    }
    if stats.explosive {
        match (stats.blast_radius, stats.blast_force) {
            (Some(radius), Some(force)) if radius > 0.0 && force >= 0.0 => {}
            _ => {
                return Err(invalid(
                    &stats.name,
                    "explosive weapons need a blast radius and force",
                ))
            }
        }
    }
    Ok(())
}

fn validate_enemy_weapon(stats: &EnemyWeaponStats) -> Result<(), ConfigError> {
    if stats.magazine_size == 0 {
        return Err(invalid(&stats.name, "magazine size must be positive"));
    }
    if stats.fire_interval <= 0.0 || stats.reload_time <= 0.0 {
        return Err(invalid(&stats.name, "fire interval and reload time must be positive"));
    }
    if stats.range <= 0.0 || stats.projectile_speed <= 0.0 || stats.projectile_radius <= 0.0 {
        return Err(invalid(&stats.name, "range, projectile speed and radius must be positive"));
    }
    if stats.burst == Some(0) {
        return Err(invalid(&stats.name, "burst must fire at least one pellet"));
    }
    Ok(())
}

fn validate_arena(arena: &ArenaConfig) -> Result<(), ConfigError> {
    let boxes = std::iter::once(&arena.floor)
        .chain(&arena.platforms)
        .chain(&arena.walls);
    for (i, spec) in boxes.enumerate() {
        if spec.size.min_element() <= 0.0 || !spec.center.is_finite() {
            return Err(ConfigError::InvalidArena(format!(
                "collider {i} has a non-positive extent or non-finite centre"
            )));
        }
    }
    for (i, updraft) in arena.updrafts.iter().enumerate() {
        if updraft.radius <= 0.0 || updraft.force <= 0.0 {
            return Err(ConfigError::InvalidArena(format!(
                "updraft {i} needs a positive radius and force"
            )));
        }
    }
    Ok(())
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            weapons: default_player_weapons(),
            enemy_weapons: default_enemy_weapons(),
            arena: default_arena(),
            tuning: TuningConfig::default(),
        }
    }
}

fn default_player_weapons() -> PlayerWeapons {
    PlayerWeapons {
        rifle: WeaponStats {
            name: "Assault Rifle".into(),
            fire_interval: 0.1,
            damage: 20.0,
            spread: 0.01,
            recoil: 0.02,
            projectile_speed: 600.0,
            projectile_radius: 0.1,
            tag: 0xffff00,
            explosive: false,
            blast_radius: None,
            blast_force: None,
            magazine_size: 30,
            reload_time: 2.2,
        },
        sniper: WeaponStats {
            name: "Sniper Rifle".into(),
            fire_interval: 1.5,
            damage: 150.0,
            spread: 0.001,
            recoil: 0.3,
            projectile_speed: 1000.0,
            projectile_radius: 0.2,
            tag: 0xffffff,
            explosive: false,
            blast_radius: None,
            blast_force: None,
            magazine_size: 5,
            reload_time: 3.5,
        },
        smg: WeaponStats {
            name: "SMG".into(),
            fire_interval: 0.05,
            damage: 10.0,
            spread: 0.05,
            recoil: 0.015,
            projectile_speed: 500.0,
            projectile_radius: 0.1,
            tag: 0xffaa00,
            explosive: false,
            blast_radius: None,
            blast_force: None,
            magazine_size: 45,
            reload_time: 1.8,
        },
        rpg: WeaponStats {
            name: "Rocket Launcher".into(),
            fire_interval: 2.0,
            damage: 300.0,
            spread: 0.02,
            recoil: 0.4,
            projectile_speed: 80.0,
            projectile_radius: 0.4,
            tag: 0xff4400,
            explosive: true,
            blast_radius: Some(10.0),
            blast_force: Some(30.0),
            magazine_size: 1,
            reload_time: 3.0,
        },
    }
}

fn default_enemy_weapons() -> EnemyWeapons {
    EnemyWeapons {
        rifle: EnemyWeaponStats {
            name: "Rifle".into(),
            fire_interval: 0.24,
            range: 70.0,
            damage: 3.0,
            projectile_speed: 35.0,
            projectile_radius: 0.15,
            spread: 0.08,
            burst: None,
            magazine_size: 30,
            reload_time: 2.5,
            tag: 0xffaa00,
        },
        shotgun: EnemyWeaponStats {
            name: "Shotgun".into(),
            fire_interval: 2.0,
            range: 25.0,
            damage: 2.0,
            projectile_speed: 30.0,
            projectile_radius: 0.08,
            spread: 0.25,
            burst: Some(8),
            magazine_size: 6,
            reload_time: 3.0,
            tag: 0xffffff,
        },
        laser: EnemyWeaponStats {
            name: "Laser".into(),
            fire_interval: 0.3,
            range: 90.0,
            damage: 6.0,
            projectile_speed: 120.0,
            projectile_radius: 0.1,
            spread: 0.02,
            burst: None,
            magazine_size: 15,
            reload_time: 2.0,
            tag: 0x00ffff,
        },
        flamethrower: EnemyWeaponStats {
            name: "Flamethrower".into(),
            fire_interval: 0.08,
            range: 18.0,
            damage: 0.5,
            projectile_speed: 12.0,
            projectile_radius: 0.35,
            spread: 0.2,
            burst: None,
            magazine_size: 100,
            reload_time: 4.0,
            tag: 0xff4400,
        },
    }
}

/// Height of the first and second platform layers.
const LAYER_1: f32 = 12.0;
const LAYER_2: f32 = 24.0;

fn platform(x: f32, layer: f32, z: f32, w: f32, d: f32) -> BoxSpec {
    BoxSpec::new([x, layer - 0.5, z], [w, 1.0, d])
}

fn default_arena() -> ArenaConfig {
    ArenaConfig {
        floor: BoxSpec::new([0.0, -0.5, 0.0], [100.0, 1.0, 100.0]),
        platforms: vec![
            platform(0.0, LAYER_1, 0.0, 40.0, 40.0),
            platform(-35.0, LAYER_1, 0.0, 20.0, 10.0),
            platform(35.0, LAYER_1, 0.0, 20.0, 10.0),
            platform(0.0, LAYER_2, -35.0, 30.0, 20.0),
            platform(0.0, LAYER_2, 35.0, 30.0, 20.0),
            platform(0.0, LAYER_2, 0.0, 10.0, 80.0),
        ],
        walls: vec![
            // Perimeter
            BoxSpec::new([0.0, 15.0, -50.0], [100.0, 30.0, 2.0]),
            BoxSpec::new([0.0, 15.0, 50.0], [100.0, 30.0, 2.0]),
            BoxSpec::new([-50.0, 15.0, 0.0], [2.0, 30.0, 100.0]),
            BoxSpec::new([50.0, 15.0, 0.0], [2.0, 30.0, 100.0]),
            // Ground cover
            BoxSpec::new([-15.0, 3.0, 15.0], [10.0, 6.0, 2.0]),
            BoxSpec::new([15.0, 3.0, -15.0], [10.0, 6.0, 2.0]),
            // First layer cover
            BoxSpec::new([0.0, LAYER_1 + 2.0, 18.0], [20.0, 4.0, 1.0]),
            BoxSpec::new([0.0, LAYER_1 + 2.0, -18.0], [20.0, 4.0, 1.0]),
            // Second layer cover
            BoxSpec::new([-10.0, LAYER_2 + 2.0, -30.0], [1.0, 4.0, 10.0]),
            BoxSpec::new([10.0, LAYER_2 + 2.0, 30.0], [1.0, 4.0, 10.0]),
        ],
        updrafts: vec![
            UpdraftSpec { x: -25.0, z: 25.0, radius: 4.0, force: 45.0 },
            UpdraftSpec { x: 25.0, z: -25.0, radius: 4.0, force: 45.0 },
            UpdraftSpec { x: -45.0, z: 0.0, radius: 4.0, force: 50.0 },
            UpdraftSpec { x: 45.0, z: 0.0, radius: 4.0, force: 50.0 },
        ],
    }
}
