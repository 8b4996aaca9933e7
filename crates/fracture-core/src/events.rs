//! Events emitted by the simulation for UI and audio feedback.
//!
//! Every event raised during a tick is delivered to the subscribed
//! [`EventSink`]s and also attached to that tick's snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Sound cues for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Shoot,
    Reload,
    Hit,
    Kill,
    Rpg,
    JumpPad,
    Explode,
    PlayerHit,
    ShieldHit,
    KnifeHit,
    Block,
    Empty,
}

/// Transient on-screen messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    MatchStarted,
    Reloading,
    ReloadInterrupted,
    EnemyDisarmed,
    KnifeDropped,
    Headshot,
    LegBroken,
    Immobilized,
    EnemyShattered,
    KnifeHit,
    Blocked,
    PlayerDown,
    Respawned,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::MatchStarted => "FRACTURE CORE: match started",
            Notice::Reloading => "Reloading...",
            Notice::ReloadInterrupted => "Reload interrupted",
            Notice::EnemyDisarmed => "Enemy disarmed!",
            Notice::KnifeDropped => "Enemy dropped its knife!",
            Notice::Headshot => "Headshot!",
            Notice::LegBroken => "Leg broken, enemy slowed!",
            Notice::Immobilized => "Both legs gone, enemy immobilized!",
            Notice::EnemyShattered => "Enemy shattered!",
            Notice::KnifeHit => "Knifed!",
            Notice::Blocked => "Blocked!",
            Notice::PlayerDown => "You are down!",
            Notice::Respawned => "Respawning...",
        }
    }
}

/// Everything the simulation reports outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    ScoreChanged { score: u32 },
    WeaponChanged { weapon: WeaponType },
    Message { notice: Notice },
    EnemyCountChanged { live: u32 },
    PlayerHealthChanged { health: f32 },
    PointerLockChanged { locked: bool },
    AmmoChanged { current: u32, max: u32, reloading: bool },
    Sound { cue: SoundCue },
    /// A player shot left the barrel; recoil is the camera kick magnitude.
    WeaponFired { weapon: WeaponType, recoil: f32 },
    /// Aim-assist target changed. `None` means unlocked.
    TargetLockChanged { target: Option<(u32, PartKind)> },
}

/// Output port the presentation layer subscribes through.
pub trait EventSink: Send {
    fn publish(&mut self, event: &SimEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&SimEvent) + Send,
{
    fn publish(&mut self, event: &SimEvent) {
        self(event)
    }
}
