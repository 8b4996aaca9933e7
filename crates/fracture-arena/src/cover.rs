//! Cover-point search.

use glam::Vec3;

use fracture_core::constants::{COVER_OFFSET, COVER_SEARCH_RADIUS};

use crate::world::StaticWorld;

/// Pick a spot behind a nearby wall, as seen from the player.
///
/// Each wall within `COVER_SEARCH_RADIUS` of the enemy (measured at the
/// enemy's height) offers four candidates offset on X and Z from its
/// centre. A candidate qualifies when it lies on the far side of the wall
/// from the player; the qualifying candidate nearest the enemy wins.
/// Returns None when no wall offers cover.
pub fn find_cover_point(world: &StaticWorld, enemy: Vec3, player: Vec3) -> Option<Vec3> {
    let offsets = [
        Vec3::new(COVER_OFFSET, 0.0, 0.0),
        Vec3::new(-COVER_OFFSET, 0.0, 0.0),
        Vec3::new(0.0, 0.0, COVER_OFFSET),
        Vec3::new(0.0, 0.0, -COVER_OFFSET),
    ];

    world
        .walls()
        .iter()
        .map(|wall| {
            let c = wall.center();
            Vec3::new(c.x, enemy.y, c.z)
        })
        .filter(|anchor| enemy.distance(*anchor) <= COVER_SEARCH_RADIUS)
        .flat_map(|anchor| {
            let to_player = player - anchor;
            offsets
                .iter()
                .map(move |offset| anchor + *offset)
                .filter(move |candidate| to_player.dot(*candidate - anchor) < 0.0)
        })
        .min_by(|a, b| enemy.distance(*a).total_cmp(&enemy.distance(*b)))
}
