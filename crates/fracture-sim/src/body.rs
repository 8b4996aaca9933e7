//! Enemy body geometry: where each part is in the world.

use glam::Vec3;
use hecs::World;

use fracture_arena::Aabb;
use fracture_core::components::{BodyParts, Enemy, EnemyPart, PartLock, Position};
use fracture_core::constants::{CHEST_HEIGHT, CRAWL_HEIGHT};
use fracture_core::types::yaw_rotate;

/// World-space centre of a part.
///
/// A crawling enemy drags everything along the ground, so its parts keep
/// only their lateral offset at a fixed height above the feet.
pub fn part_center(position: Vec3, yaw: f32, crawling: bool, part: &EnemyPart) -> Vec3 {
    if crawling {
        let lateral = yaw_rotate(Vec3::new(part.offset.x, 0.0, 0.0), yaw);
        position + lateral + Vec3::Y * CRAWL_HEIGHT
    } else {
        let lateral = yaw_rotate(Vec3::new(part.offset.x, 0.0, part.offset.z), yaw);
        position + lateral + Vec3::Y * part.offset.y
    }
}

/// Axis-aligned hit volume of a part.
pub fn part_volume(position: Vec3, yaw: f32, crawling: bool, part: &EnemyPart) -> Aabb {
    Aabb::from_center_size(part_center(position, yaw, crawling, part), part.size)
}

/// Fallback aim point when no specific part is available.
pub fn chest_point(position: Vec3, crawling: bool) -> Vec3 {
    let height = if crawling { CRAWL_HEIGHT } else { CHEST_HEIGHT };
    position + Vec3::Y * height
}

/// Current world position of a locked part, or the chest if that part has
/// been shot off. None once the enemy is gone.
pub fn aim_point(world: &World, lock: PartLock) -> Option<Vec3> {
    let mut query = world
        .query_one::<(&Enemy, &Position, &BodyParts)>(lock.enemy)
        .ok()?;
    let (enemy, pos, parts) = query.get()?;
    let part = &parts[lock.part];
    if part.broken {
        Some(chest_point(pos.0, enemy.crawling))
    } else {
        Some(part_center(pos.0, enemy.yaw, enemy.crawling, part))
    }
}
