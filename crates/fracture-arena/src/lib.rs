//! Static arena geometry for FRACTURE.
//!
//! Immutable colliders and updraft columns built from the arena
//! configuration, with the spatial queries the simulation needs:
//! box overlap, ray casts, line-of-sight, ground height and cover points.

pub use fracture_core as core;

pub mod cover;
pub mod geometry;
pub mod los;
pub mod world;

// Re-export key types for convenience.
pub use cover::find_cover_point;
pub use geometry::{Aabb, RayHit};
pub use los::has_line_of_sight;
pub use world::{StaticWorld, Updraft};
