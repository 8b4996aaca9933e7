//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the entity store and the static arena, applies
//! player commands, runs every system in a fixed order each tick, and
//! produces `GameStateSnapshot`s. Completely headless, so the same seed
//! and the same inputs always give the same match.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use fracture_arena::StaticWorld;
use fracture_core::commands::{InputSnapshot, PlayerCommand};
use fracture_core::components::Player;
use fracture_core::config::{ConfigError, GameConfig};
use fracture_core::constants::PLAYER_MAX_HEALTH;
use fracture_core::enums::GamePhase;
use fracture_core::events::{EventSink, Notice, SimEvent};
use fracture_core::state::GameStateSnapshot;
use fracture_core::types::SimTime;

use crate::store::EntityStore;
use crate::systems::{self, TickContext};
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub game: GameConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            game: GameConfig::default(),
        }
    }
}

/// The simulation engine. Owns the world and all match state.
pub struct SimulationEngine {
    store: EntityStore,
    arena: StaticWorld,
    config: GameConfig,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    input: InputSnapshot,
    pointer_locked: bool,
    despawn_buffer: Vec<Entity>,
    events: Vec<SimEvent>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl SimulationEngine {
    /// Create an engine. The game config is validated before anything
    /// else is built.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.game.validate()?;
        let arena = StaticWorld::from_config(&config.game.arena);
        Ok(Self {
            store: EntityStore::new(&config.game),
            arena,
            config: config.game,
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            input: InputSnapshot::default(),
            pointer_locked: false,
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            sinks: Vec::new(),
        })
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Input intents sampled by the next tick. Held until replaced.
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.input = input;
    }

    /// Receive every event as it is emitted, in addition to the copy
    /// carried by each snapshot.
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        for sink in &mut self.sinks {
            for event in &events {
                sink.publish(event);
            }
        }
        systems::snapshot::build_snapshot(
            &self.store,
            &self.time,
            self.phase,
            self.pointer_locked,
            events,
        )
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn score(&self) -> u32 {
        self.store.score
    }

    pub fn player(&self) -> &Player {
        &self.store.player
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.store.world
    }

    pub fn arena(&self) -> &StaticWorld {
        &self.arena
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn live_enemy_count(&self) -> u32 {
        self.store.live_enemy_count()
    }

    /// Start a match with no enemies (for tests that place their own).
    #[cfg(test)]
    pub fn start_sandbox(&mut self) {
        self.store.reset(&self.config);
        self.time = SimTime::default();
        self.phase = GamePhase::Active;
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// Borrow the store, rng and event buffer together with a context for
    /// the current tick, for driving single systems from tests.
    #[cfg(test)]
    pub fn with_systems<R>(
        &mut self,
        f: impl FnOnce(&mut EntityStore, &TickContext, &mut ChaCha8Rng, &mut Vec<SimEvent>) -> R,
    ) -> R {
        let ctx = TickContext {
            arena: &self.arena,
            config: &self.config,
            now: self.time.elapsed_secs,
            dt: self.time.dt(),
        };
        f(&mut self.store, &ctx, &mut self.rng, &mut self.events)
    }

    /// Events emitted since the last tick.
    #[cfg(test)]
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn an enemy at a fixed spot with a known loadout.
    #[cfg(test)]
    pub fn spawn_test_enemy(
        &mut self,
        position: glam::Vec3,
        weapon: fracture_core::enums::EnemyWeaponType,
    ) -> Entity {
        world_setup::spawn_enemy_at(
            &mut self.store,
            &self.config,
            position,
            0.0,
            3.0,
            weapon,
            self.time.elapsed_secs,
        )
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartMatch => {
                if self.phase == GamePhase::MainMenu {
                    self.start_match();
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SelectWeapon { weapon } => {
                if self.phase != GamePhase::MainMenu {
                    systems::player_control::switch_weapon(
                        &mut self.store.player,
                        weapon,
                        &mut self.events,
                    );
                }
            }
            PlayerCommand::SetPointerLock { locked } => {
                if self.pointer_locked != locked {
                    self.pointer_locked = locked;
                    self.events.push(SimEvent::PointerLockChanged { locked });
                }
            }
        }
    }

    fn start_match(&mut self) {
        self.store.reset(&self.config);
        self.time = SimTime::default();
        world_setup::populate(
            &mut self.store,
            &self.arena,
            &self.config,
            &mut self.rng,
            self.time.elapsed_secs,
        );
        self.phase = GamePhase::Active;

        let live = self.store.live_enemy_count();
        log::info!("match started with {live} enemies");
        self.events.push(SimEvent::Message {
            notice: Notice::MatchStarted,
        });
        self.events.push(SimEvent::ScoreChanged { score: 0 });
        self.events.push(SimEvent::PlayerHealthChanged {
            health: PLAYER_MAX_HEALTH,
        });
        self.events.push(SimEvent::EnemyCountChanged { live });
        self.events
            .push(systems::reload::ammo_event(&self.store.player));
    }

    /// Run all systems in order for one tick.
    fn run_systems(&mut self) {
        let ctx = TickContext {
            arena: &self.arena,
            config: &self.config,
            now: self.time.elapsed_secs,
            dt: self.time.dt(),
        };
        let store = &mut self.store;
        let rng = &mut self.rng;
        let events = &mut self.events;
        let input = &self.input;

        // 1. Input and timers
        systems::player_control::apply_input(store, &ctx, input, events);
        systems::reload::run(store, &ctx, events);
        systems::player_control::update_lock(store, events);

        // 2. Movement
        systems::movement::run(store, &ctx, input, rng, events);

        // 3. Projectiles
        systems::projectiles::run(store, &ctx, rng, events);

        // 4. Attacks
        if input.fire && store.player.respawn_at.is_none() {
            systems::player_fire::run(store, &ctx, rng, events);
        }
        systems::enemy_ai::run(store, &ctx, rng, events);

        // 5. Deaths and respawns
        systems::respawn::run(store, &ctx, rng, events, &mut self.despawn_buffer);

        // 6. Cosmetics
        systems::cosmetics::run(store, &ctx, &mut self.despawn_buffer);
    }
}
