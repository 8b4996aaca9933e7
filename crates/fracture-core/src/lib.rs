//! Core types and definitions for the FRACTURE arena simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands and input, state snapshots, events, tuning tables
//! and constants. It has no dependency on any rendering or audio runtime.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
