//! StaticWorld: immutable colliders and updraft columns.

use glam::Vec3;

use fracture_core::config::{ArenaConfig, BoxSpec};
use fracture_core::types::horizontal_distance;

use crate::geometry::{Aabb, RayHit};

/// Vertical launch column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Updraft {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    /// Vertical speed granted on launch.
    pub force: f32,
}

impl Updraft {
    /// Inside the column, at any height.
    pub fn contains(&self, point: Vec3) -> bool {
        horizontal_distance(point, self.anchor(point.y)) < self.radius
    }

    /// Column axis at the given height.
    pub fn anchor(&self, y: f32) -> Vec3 {
        Vec3::new(self.x, y, self.z)
    }
}

/// Level geometry. Built once from configuration and never mutated.
#[derive(Debug, Clone)]
pub struct StaticWorld {
    /// Floor, platforms and walls, in that order.
    colliders: Vec<Aabb>,
    /// Wall footprints, used as cover anchors.
    walls: Vec<Aabb>,
    updrafts: Vec<Updraft>,
}

impl StaticWorld {
    pub fn from_config(arena: &ArenaConfig) -> Self {
        let to_aabb = |spec: &BoxSpec| Aabb::from_center_size(spec.center, spec.size);

        let walls: Vec<Aabb> = arena.walls.iter().map(to_aabb).collect();
        let colliders = std::iter::once(to_aabb(&arena.floor))
            .chain(arena.platforms.iter().map(to_aabb))
            .chain(walls.iter().copied())
            .collect();
        let updrafts = arena
            .updrafts
            .iter()
            .map(|u| Updraft {
                x: u.x,
                z: u.z,
                radius: u.radius,
                force: u.force,
            })
            .collect();

        Self {
            colliders,
            walls,
            updrafts,
        }
    }

    /// An arena from raw parts, for tests and tools.
    pub fn new(colliders: Vec<Aabb>, walls: Vec<Aabb>, updrafts: Vec<Updraft>) -> Self {
        let mut all = colliders;
        all.extend(walls.iter().copied());
        Self {
            colliders: all,
            walls,
            updrafts,
        }
    }

    pub fn colliders(&self) -> &[Aabb] {
        &self.colliders
    }

    pub fn walls(&self) -> &[Aabb] {
        &self.walls
    }

    pub fn updrafts(&self) -> &[Updraft] {
        &self.updrafts
    }

    /// Whether a volume overlaps any collider.
    pub fn intersects(&self, volume: &Aabb) -> bool {
        self.colliders.iter().any(|c| c.intersects(volume))
    }

    /// Sweep a cube of half-width `radius` from `from` to `to`.
    ///
    /// Reports the first contact along the segment, or the end point when
    /// only the final volume overlaps.
    pub fn sweep(&self, from: Vec3, to: Vec3, radius: f32) -> Option<RayHit> {
        let delta = to - from;
        let length = delta.length();
        if length > f32::EPSILON {
            let dir = delta / length;
            let swept = self
                .colliders
                .iter()
                .filter_map(|c| c.expanded(radius).ray_intersection(from, dir))
                .filter(|hit| hit.distance <= length)
                .min_by(|a, b| a.distance.total_cmp(&b.distance));
            if swept.is_some() {
                return swept;
            }
        }
        let end = Aabb::from_center_size(to, Vec3::splat(radius * 2.0));
        self.intersects(&end).then_some(RayHit {
            distance: length,
            point: to,
        })
    }

    /// Highest collider top at or below `y + step` under the given column.
    pub fn ground_height(&self, x: f32, z: f32, y: f32, step: f32) -> Option<f32> {
        self.colliders
            .iter()
            .filter(|c| x >= c.min.x && x <= c.max.x && z >= c.min.z && z <= c.max.z)
            .map(|c| c.max.y)
            .filter(|top| *top <= y + step)
            .max_by(|a, b| a.total_cmp(b))
    }

    /// The updraft whose column contains `point`, if any.
    pub fn updraft_at(&self, point: Vec3) -> Option<&Updraft> {
        self.updrafts.iter().find(|u| u.contains(point))
    }

    /// The updraft with the nearest axis, measured horizontally.
    pub fn nearest_updraft(&self, point: Vec3) -> Option<&Updraft> {
        self.updrafts.iter().min_by(|a, b| {
            let da = horizontal_distance(point, a.anchor(point.y));
            let db = horizontal_distance(point, b.anchor(point.y));
            da.total_cmp(&db)
        })
    }
}
