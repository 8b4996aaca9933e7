//! Entity store: the ECS world plus the state that lives beside it.
//!
//! Enemies, projectiles, debris and particles are hecs entities. The
//! player, the score and the replacement-spawn queue are owned here
//! directly, so every system that mutates the match takes one `&mut
//! EntityStore` instead of a handful of loose references.

use glam::Vec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use fracture_core::components::*;
use fracture_core::config::GameConfig;
use fracture_core::constants::*;
use fracture_core::enums::{DebrisKind, ParticleKind, WeaponType};
use fracture_core::types::Magazine;

/// A debris piece about to be thrown into the world.
pub struct DebrisSpawn {
    pub kind: DebrisKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: Vec3,
    pub tag: u32,
    pub yaw: f32,
    pub life: Option<f32>,
}

pub struct EntityStore {
    pub world: World,
    pub player: Player,
    pub score: u32,
    /// Due times of replacement enemies queued by kills.
    pub pending_spawns: Vec<f64>,
    next_serial: u32,
    next_debris_order: u64,
}

impl EntityStore {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            world: World::new(),
            player: fresh_player(config),
            score: 0,
            pending_spawns: Vec::new(),
            next_serial: 0,
            next_debris_order: 0,
        }
    }

    /// Empty the world and put the player back at the start line.
    pub fn reset(&mut self, config: &GameConfig) {
        self.world.clear();
        self.player = fresh_player(config);
        self.score = 0;
        self.pending_spawns.clear();
        self.next_serial = 0;
        self.next_debris_order = 0;
    }

    pub fn next_serial(&mut self) -> u32 {
        self.next_serial += 1;
        self.next_serial
    }

    pub fn live_enemy_count(&self) -> u32 {
        self.world.query::<&Enemy>().iter().count() as u32
    }

    pub fn serial_of(&self, enemy: Entity) -> Option<u32> {
        self.world.get::<&Enemy>(enemy).ok().map(|e| e.serial)
    }

    /// Drop every reference to `enemy`: the player's lock and any
    /// projectile homing on it or remembering it as the shooter.
    ///
    /// Returns true when the player's lock was cleared.
    pub fn forget(&mut self, enemy: Entity) -> bool {
        let lock_cleared = self.player.lock.is_some_and(|lock| lock.enemy == enemy);
        if lock_cleared {
            self.player.lock = None;
        }
        for (_, projectile) in self.world.query_mut::<&mut Projectile>() {
            if projectile.homing.is_some_and(|lock| lock.enemy == enemy) {
                projectile.homing = None;
            }
            if projectile.source == Some(enemy) {
                projectile.source = None;
            }
        }
        lock_cleared
    }

    pub fn spawn_projectile(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        projectile: Projectile,
    ) -> Entity {
        self.world
            .spawn((Position(position), Velocity(velocity), projectile))
    }

    /// Throw a debris piece with a random kick and spin on top of its
    /// given velocity.
    pub fn spawn_debris(&mut self, rng: &mut ChaCha8Rng, spawn: DebrisSpawn) -> Entity {
        let kick = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 5.0,
            rng.gen::<f32>() * 5.0,
            (rng.gen::<f32>() - 0.5) * 5.0,
        );
        let spin = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 10.0,
            (rng.gen::<f32>() - 0.5) * 10.0,
            (rng.gen::<f32>() - 0.5) * 10.0,
        );
        self.next_debris_order += 1;
        let debris = Debris {
            kind: spawn.kind,
            size: spawn.size,
            tag: spawn.tag,
            rotation: Vec3::new(0.0, spawn.yaw, 0.0),
            spin,
            life: spawn.life,
            order: self.next_debris_order,
        };
        self.world.spawn((
            Position(spawn.position),
            Velocity(spawn.velocity + kick),
            debris,
        ))
    }

    pub fn spawn_particle(
        &mut self,
        rng: &mut ChaCha8Rng,
        kind: ParticleKind,
        position: Vec3,
    ) -> Entity {
        let velocity = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 3.0,
            (rng.gen::<f32>() - 0.5) * 3.0 + 2.0,
            (rng.gen::<f32>() - 0.5) * 3.0,
        );
        self.world.spawn((
            Position(position),
            Velocity(velocity),
            Particle {
                kind,
                life: PARTICLE_LIFETIME,
            },
        ))
    }
}

/// Player at the start line with full health and full magazines.
pub fn fresh_player(config: &GameConfig) -> Player {
    let magazines = WeaponType::ALL.map(|w| Magazine::full(config.weapons.get(w).magazine_size));
    Player {
        position: Vec3::from(PLAYER_START),
        velocity: Vec3::ZERO,
        grounded: false,
        health: PLAYER_MAX_HEALTH,
        weapon: WeaponType::default(),
        magazines,
        next_shot_at: 0.0,
        lock: None,
        view: Vec3::NEG_Z,
        aiming: false,
        shielding: false,
        updraft_spent: false,
        respawn_at: None,
    }
}
