//! Action selection: where an enemy moves and how it attacks.
//!
//! Kept separate from the state machine so a state change and the
//! behaviour it implies can be tested independently.

use glam::Vec3;

use fracture_core::constants::*;
use fracture_core::enums::AiState;

/// Cover movement stops inside this horizontal distance of the target.
const COVER_ARRIVAL_RADIUS: f32 = 0.5;

/// Situation used to pick a move direction.
pub struct SteeringContext {
    pub state: AiState,
    pub position: Vec3,
    pub velocity: Vec3,
    pub player_position: Vec3,
    pub cover_target: Option<Vec3>,
    /// Axis of the nearest updraft, if the arena has any.
    pub nearest_updraft: Option<Vec3>,
    /// Spawn serial; its parity picks the flanking side.
    pub serial: u32,
    pub now: f64,
    pub has_line_of_sight: bool,
    /// Left arm intact, so closing to knife range is worthwhile.
    pub melee_capable: bool,
}

/// Horizontal move intent, scaled by the state's speed factor.
///
/// Enemies still carrying momentum from hits or blasts do not steer.
pub fn steer(ctx: &SteeringContext) -> Vec3 {
    if ctx.velocity.length() >= STEERING_SPEED_LIMIT {
        return Vec3::ZERO;
    }

    match ctx.state {
        AiState::SeekUpdraft => ctx
            .nearest_updraft
            .map(|axis| flat_direction(ctx.position, axis) * AI_UPDRAFT_SPEED_FACTOR)
            .unwrap_or(Vec3::ZERO),
        AiState::TacticalCover => match ctx.cover_target {
            Some(target) if flat_distance(ctx.position, target) > COVER_ARRIVAL_RADIUS => {
                flat_direction(ctx.position, target)
            }
            _ => Vec3::ZERO,
        },
        AiState::Flank => flank_direction(ctx),
        AiState::Chase => chase_direction(ctx),
    }
}

/// Perpendicular to the line to the player, side fixed by serial parity.
fn flank_direction(ctx: &SteeringContext) -> Vec3 {
    let to_player = (ctx.player_position - ctx.position).normalize_or_zero();
    let side = to_player.cross(Vec3::Y).normalize_or_zero();
    if ctx.serial % 2 == 0 {
        -side
    } else {
        side
    }
}

fn chase_direction(ctx: &SteeringContext) -> Vec3 {
    let distance = ctx.position.distance(ctx.player_position);
    let toward = flat_direction(ctx.position, ctx.player_position);

    if distance > MELEE_RANGE {
        if distance < AI_STRAFE_DISTANCE && ctx.has_line_of_sight {
            let mut side = Vec3::new(-toward.z, 0.0, toward.x);
            let phase = ctx.now * AI_STRAFE_FREQUENCY + ctx.serial as f64;
            if phase.sin() > 0.0 {
                side = -side;
            }
            return (toward + side * AI_STRAFE_WEIGHT).normalize_or_zero();
        }
        toward
    } else if ctx.melee_capable {
        toward
    } else {
        Vec3::ZERO
    }
}

fn flat_direction(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}

fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec3::new(b.x - a.x, 0.0, b.z - a.z).length()
}

/// What an enemy does with its weapons this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackAction {
    Melee,
    Fire,
    Hold,
}

/// Weapon readiness for one enemy.
pub struct AttackContext {
    pub distance_to_player: f32,
    /// Left arm intact.
    pub melee_capable: bool,
    /// Right arm intact.
    pub ranged_capable: bool,
    pub weapon_range: f32,
    pub melee_ready: bool,
    pub fire_ready: bool,
}

/// Pick melee or ranged fire.
///
/// An enemy in knife range with a knife only ever stabs, waiting out the
/// cooldown rather than shooting. Ranged fire additionally needs a clear
/// shot, which is only evaluated when everything else allows firing.
pub fn select_attack(ctx: &AttackContext, clear_shot: impl FnOnce() -> bool) -> AttackAction {
    if ctx.distance_to_player < MELEE_RANGE && ctx.melee_capable {
        return if ctx.melee_ready {
            AttackAction::Melee
        } else {
            AttackAction::Hold
        };
    }

    let can_fire =
        ctx.ranged_capable && ctx.distance_to_player < ctx.weapon_range && ctx.fire_ready;
    if can_fire && clear_shot() {
        AttackAction::Fire
    } else {
        AttackAction::Hold
    }
}
