//! Enemy AI for FRACTURE.
//!
//! Implements the tactical state machine, movement and attack selection,
//! and weapon-driven fire profiles. Everything here is pure: the simulation
//! gathers a context, calls in, and applies the result.

pub mod fsm;
pub mod profiles;
pub mod steering;

pub use fracture_core as core;

#[cfg(test)]
mod tests;
