//! Simulation engine for FRACTURE.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces GameStateSnapshots for the presentation layer.

pub mod body;
pub mod engine;
pub mod store;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use fracture_core as core;

#[cfg(test)]
mod tests;
