//! Fundamental simulation types.
//!
//! World space is Y-up. Enemy yaw follows the convention that local +Z
//! faces `(sin yaw, 0, cos yaw)`; the player's look yaw is camera style,
//! where yaw 0 looks down -Z.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{DT, TICK_RATE};

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds. All deadlines compare against this.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 / TICK_RATE as f64;
    }
}

/// Rounds in a magazine plus the reload timer that refills it.
///
/// A reload is an absolute deadline on the simulation clock; the magazine
/// refills on the first tick at or after it, whether or not anyone is
/// trying to fire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Magazine {
    pub rounds: u32,
    pub capacity: u32,
    pub reload_deadline: Option<f64>,
}

impl Magazine {
    pub fn full(capacity: u32) -> Self {
        Self {
            rounds: capacity,
            capacity,
            reload_deadline: None,
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_deadline.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds == 0
    }

    pub fn is_full(&self) -> bool {
        self.rounds >= self.capacity
    }

    /// Start a reload that completes at `now + duration`.
    ///
    /// Returns false without touching anything when a reload is already
    /// running or the magazine is full.
    pub fn begin_reload(&mut self, now: f64, duration: f64) -> bool {
        if self.is_reloading() || self.is_full() {
            return false;
        }
        self.reload_deadline = Some(now + duration);
        true
    }

    /// Refill if the reload deadline has been reached. Returns true on the
    /// tick the reload completes.
    pub fn resolve_reload(&mut self, now: f64) -> bool {
        match self.reload_deadline {
            Some(deadline) if now >= deadline => {
                self.rounds = self.capacity;
                self.reload_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Abandon a running reload. Rounds are not restored.
    pub fn cancel_reload(&mut self) -> bool {
        self.reload_deadline.take().is_some()
    }

    /// Spend one round. Fails while reloading or dry.
    pub fn try_consume(&mut self) -> bool {
        debug_assert!(self.rounds <= self.capacity, "magazine overfilled");
        if self.is_reloading() || self.rounds == 0 {
            return false;
        }
        self.rounds = self.rounds.min(self.capacity) - 1;
        true
    }
}

/// Rotate a local-frame offset into world space for the given yaw.
pub fn yaw_rotate(offset: Vec3, yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw) * offset
}

/// Yaw that turns local +Z toward `to` when standing at `from`.
pub fn yaw_toward(from: Vec3, to: Vec3) -> f32 {
    (to.x - from.x).atan2(to.z - from.z)
}

/// Unit view direction for camera-style look angles.
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(-sy * cp, sp, -cy * cp)
}

/// Horizontal distance between two points.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    (a.x - b.x).hypot(a.z - b.z)
}
