//! Line-of-sight against static geometry.
//!
//! A segment is blocked when any collider is entered strictly inside it,
//! ignoring a margin at both ends so eyes resting against a wall or a
//! target standing on a platform edge still see each other.

use glam::Vec3;

use fracture_core::constants::{LOS_END_MARGIN, LOS_MIN_DISTANCE};

use crate::world::StaticWorld;

/// Check line-of-sight between two points.
///
/// Returns true if no collider is hit between `LOS_END_MARGIN` from the
/// start and `LOS_END_MARGIN` short of the end. Segments shorter than
/// `LOS_MIN_DISTANCE` are always clear.
pub fn has_line_of_sight(world: &StaticWorld, from: Vec3, to: Vec3) -> bool {
    let delta = to - from;
    let dist = delta.length();
    if dist < LOS_MIN_DISTANCE {
        return true; // Too close for geometry to matter
    }
    let dir = delta / dist;

    !world.colliders().iter().any(|collider| {
        collider
            .ray_intersection(from, dir)
            .is_some_and(|hit| {
                hit.distance > LOS_END_MARGIN && hit.distance < dist - LOS_END_MARGIN
            })
    })
}
