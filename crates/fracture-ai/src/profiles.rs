//! Weapon-specific fire profiles for enemies.
//!
//! Consolidates how each enemy weapon turns one trigger pull into
//! projectile directions.

use glam::Vec3;
use rand::Rng;

use fracture_core::config::EnemyWeaponStats;
use fracture_core::enums::EnemyWeaponType;

/// Pellets fired by a burst weapon whose stats omit a count.
pub const DEFAULT_BURST: u32 = 4;

/// Shape of a single trigger pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirePattern {
    /// One aimed round (rifle, laser).
    Single,
    /// Several independently spread pellets (shotgun).
    Burst { pellets: u32 },
    /// One wide, short-lived gout of fire.
    Stream,
}

/// Fire profile for an enemy weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireProfile {
    pub pattern: FirePattern,
    /// Whether a trigger pull plays the shot cue.
    pub audible: bool,
}

/// Get the fire profile for a given enemy weapon.
pub fn get_profile(weapon: EnemyWeaponType, stats: &EnemyWeaponStats) -> FireProfile {
    match weapon {
        EnemyWeaponType::Rifle | EnemyWeaponType::Laser => FireProfile {
            pattern: FirePattern::Single,
            audible: true,
        },
        EnemyWeaponType::Shotgun => FireProfile {
            pattern: FirePattern::Burst {
                pellets: stats.burst.unwrap_or(DEFAULT_BURST),
            },
            audible: true,
        },
        EnemyWeaponType::Flamethrower => FireProfile {
            pattern: FirePattern::Stream,
            audible: false,
        },
    }
}

/// Jitter each axis of `aim` by up to `spread / 2` and renormalize.
pub fn apply_spread(aim: Vec3, spread: f32, rng: &mut impl Rng) -> Vec3 {
    let jitter = Vec3::new(
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
        rng.gen::<f32>() - 0.5,
    ) * spread;
    let dir = (aim + jitter).normalize_or_zero();
    if dir == Vec3::ZERO {
        aim
    } else {
        dir
    }
}

/// Directions for every projectile produced by one trigger pull.
pub fn shot_directions(
    pattern: FirePattern,
    aim: Vec3,
    spread: f32,
    rng: &mut impl Rng,
) -> Vec<Vec3> {
    let count = match pattern {
        FirePattern::Single | FirePattern::Stream => 1,
        FirePattern::Burst { pellets } => pellets,
    };
    (0..count).map(|_| apply_spread(aim, spread, rng)).collect()
}
