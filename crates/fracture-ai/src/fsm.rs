//! Enemy tactical state machine.
//!
//! Pure functions that compute state transitions for a single enemy from a
//! snapshot of its situation. No ECS dependency and no randomness of its
//! own: the caller supplies a uniform roll so decisions stay reproducible
//! under a seeded RNG.

use glam::Vec3;

use fracture_core::constants::*;
use fracture_core::enums::AiState;

/// Input to the tactical FSM for a single enemy.
pub struct TacticalContext {
    pub state: AiState,
    /// The periodic re-evaluation timer has elapsed this tick.
    pub decision_due: bool,
    /// Feet position.
    pub position: Vec3,
    /// Player eye position.
    pub player_position: Vec3,
    pub distance_to_player: f32,
    /// Torso hp as a fraction of its maximum.
    pub torso_fraction: f32,
    /// Whether the enemy's eye can see the player's eye.
    pub has_line_of_sight: bool,
    /// Inside the column of the nearest updraft.
    pub in_updraft: bool,
    /// Uniform sample in [0, 1).
    pub roll: f32,
}

/// Output from the tactical FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticalUpdate {
    pub new_state: AiState,
    pub state_changed: bool,
    /// A fresh cover point should be chosen.
    pub seek_cover: bool,
    /// The enemy rode an updraft above the player and is done with it.
    pub left_updraft: bool,
}

impl TacticalUpdate {
    fn stay(state: AiState) -> Self {
        Self {
            new_state: state,
            state_changed: false,
            seek_cover: false,
            left_updraft: false,
        }
    }

    fn to(from: AiState, to: AiState) -> Self {
        Self {
            new_state: to,
            state_changed: from != to,
            seek_cover: false,
            left_updraft: false,
        }
    }
}

/// Evaluate the FSM for one enemy.
///
/// Leaving an updraft is checked every tick. Everything else only happens
/// on a decision tick, in priority order: climb toward a player who is
/// well above, fall back when badly hurt, mix up tactics at range, and
/// otherwise chase.
pub fn evaluate(ctx: &TacticalContext) -> TacticalUpdate {
    if ctx.state == AiState::SeekUpdraft
        && ctx.in_updraft
        && ctx.position.y > ctx.player_position.y + UPDRAFT_EXIT_MARGIN
    {
        return TacticalUpdate {
            left_updraft: true,
            ..TacticalUpdate::to(ctx.state, AiState::Chase)
        };
    }

    if !ctx.decision_due {
        return TacticalUpdate::stay(ctx.state);
    }

    if ctx.player_position.y > ctx.position.y + AI_UPDRAFT_TRIGGER {
        return TacticalUpdate::to(ctx.state, AiState::SeekUpdraft);
    }

    if ctx.torso_fraction < AI_CRITICAL_HEALTH {
        return evaluate_critical(ctx);
    }

    if ctx.distance_to_player > AI_ENGAGE_DISTANCE {
        return evaluate_ranged(ctx);
    }

    TacticalUpdate::to(ctx.state, AiState::Chase)
}

/// Badly hurt: sometimes break off to cover, otherwise keep doing whatever it was doing.
fn evaluate_critical(ctx: &TacticalContext) -> TacticalUpdate {
    if ctx.state != AiState::TacticalCover && ctx.roll > AI_RETREAT_CHANCE {
        return take_cover(ctx.state);
    }
    TacticalUpdate::stay(ctx.state)
}

fn evaluate_ranged(ctx: &TacticalContext) -> TacticalUpdate {
    if ctx.roll < AI_COVER_CHANCE && ctx.has_line_of_sight {
        take_cover(ctx.state)
    } else if ctx.roll < AI_FLANK_CHANCE {
        TacticalUpdate::to(ctx.state, AiState::Flank)
    } else {
        TacticalUpdate::to(ctx.state, AiState::Chase)
    }
}

fn take_cover(from: AiState) -> TacticalUpdate {
    TacticalUpdate {
        seek_cover: true,
        ..TacticalUpdate::to(from, AiState::TacticalCover)
    }
}
