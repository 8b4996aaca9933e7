//! arena-harness: runs a headless FRACTURE match with a scripted player.
//!
//! Usage:
//!   arena-harness --ticks 3600 --seed 7
//!   arena-harness --config tuning.json --json > final.json

use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::{Builder, Env};
use glam::Vec3;
use log::LevelFilter;

use fracture_core::commands::{InputSnapshot, PlayerCommand};
use fracture_core::config::GameConfig;
use fracture_core::events::{Notice, SimEvent, SoundCue};
use fracture_core::state::GameStateSnapshot;
use fracture_sim::{SimConfig, SimulationEngine};

const CHEST_HEIGHT: f32 = 1.35;
/// Ticks between strafe direction changes.
const STRAFE_PERIOD: u64 = 90;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 3600)]
    ticks: u64,

    /// RNG seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// JSON tuning override
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    shots: u32,
    hits_taken: u32,
    downs: u32,
}

impl Tally {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Sound { cue: SoundCue::Kill } => self.kills += 1,
            SimEvent::Sound {
                cue: SoundCue::PlayerHit,
            } => self.hits_taken += 1,
            SimEvent::WeaponFired { .. } => self.shots += 1,
            SimEvent::Message {
                notice: Notice::PlayerDown,
            } => self.downs += 1,
            _ => {}
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let game = match &args.config {
        Some(path) => match GameConfig::from_path(path) {
            Ok(game) => game,
            Err(e) => {
                eprintln!("Error loading {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let mut engine = match SimulationEngine::new(SimConfig {
        seed: args.seed,
        game,
    }) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid config: {e}");
            process::exit(1);
        }
    };

    engine.queue_commands([
        PlayerCommand::SetPointerLock { locked: true },
        PlayerCommand::StartMatch,
    ]);

    let mut tally = Tally::default();
    let mut snapshot = engine.tick();
    for _ in 0..args.ticks {
        for event in &snapshot.events {
            tally.record(event);
        }
        engine.set_input(scripted_input(&snapshot));
        snapshot = engine.tick();
    }
    for event in &snapshot.events {
        tally.record(event);
    }

    if args.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing snapshot: {e}");
                process::exit(1);
            }
        }
        return;
    }

    println!("Ticks:        {}", snapshot.time.tick);
    println!("Elapsed:      {:.2}s", snapshot.time.elapsed_secs);
    println!("Score:        {}", snapshot.score);
    println!("Kills:        {}", tally.kills);
    println!("Shots fired:  {}", tally.shots);
    println!("Hits taken:   {}", tally.hits_taken);
    println!("Times down:   {}", tally.downs);
    println!(
        "Health:       {:.0}/{:.0}",
        snapshot.player.health, snapshot.player.max_health
    );
    println!("Live enemies: {}", engine.live_enemy_count());
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.to_string()));
    let _ = builder.try_init();
}

/// Face the nearest enemy's chest, hold aim and fire, and strafe side to side.
fn scripted_input(snapshot: &GameStateSnapshot) -> InputSnapshot {
    let eye = snapshot.player.position;
    let target = snapshot
        .enemies
        .iter()
        .map(|enemy| enemy.position + Vec3::Y * CHEST_HEIGHT)
        .min_by(|a, b| a.distance_squared(eye).total_cmp(&b.distance_squared(eye)));

    let strafe_left = (snapshot.time.tick / STRAFE_PERIOD) % 2 == 0;
    let mut input = InputSnapshot {
        left: strafe_left,
        right: !strafe_left,
        ..Default::default()
    };

    if let Some(target) = target {
        let dir = (target - eye).normalize_or_zero();
        input.look_yaw = (-dir.x).atan2(-dir.z);
        input.look_pitch = dir.y.clamp(-1.0, 1.0).asin();
        input.aim = true;
        input.fire = true;
        input.reload = snapshot.player.ammo.current == 0 && !snapshot.player.ammo.reloading;
    } else {
        let view = snapshot.player.view;
        input.look_yaw = (-view.x).atan2(-view.z) + 0.02;
    }
    input
}
