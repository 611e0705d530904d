//! Output stream of the combat core.
//!
//! The core never calls into presentation or audio. Instead it appends
//! [`GameEvent`]s to a buffer that the host drains after every tick:
//! - [`GameEvent`]: What happened, with enough data to place an effect
//! - [`AudioCue`]: The sound a host should play for an event, if any
//! - [`ScoreEvent`]: Scoring facts emitted by collision and rescue handling,
//!   consumed by the [`ProgressionTracker`](crate::progression::ProgressionTracker)
//!
//! # Example
//!
//! ```
//! use ironclad_core::events::{AudioCue, GameEvent};
//! use ironclad_core::entity::EntityId;
//! use glam::Vec2;
//!
//! let event = GameEvent::EnemyDestroyed {
//!     id: EntityId::new(4),
//!     position: Vec2::new(10.0, 10.0),
//! };
//! assert_eq!(event.audio_cue(), Some(AudioCue::Explosion));
//! assert_eq!(GameEvent::RoundReset.audio_cue(), None);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{BoxKind, EntityId, EntityTag};
use crate::lifecycle::RoundState;
use crate::progression::{MilitaryRank, Rank};

// =============================================================================
// Score events
// =============================================================================

/// A scoring fact. Collision code emits these instead of touching the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreEvent {
    /// A box reached zero hits
    BoxDestroyed {
        /// Kind of the destroyed box
        kind: BoxKind,
        /// Score the box yielded
        score: u64,
    },
    /// A projectile destroyed an enemy
    EnemyDestroyed,
    /// A pilot was picked up
    RescueCompleted,
}

// =============================================================================
// Audio cues
// =============================================================================

/// Named sound triggers. Playback is best-effort and never awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// A shell left the barrel
    Fire,
    /// A box took a non-fatal hit
    Hit,
    /// Something blew up
    Explosion,
    /// Score rank promotion
    LevelUp,
    /// A pilot was picked up
    Rescue,
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fire => write!(f, "fire"),
            Self::Hit => write!(f, "hit"),
            Self::Explosion => write!(f, "explosion"),
            Self::LevelUp => write!(f, "level-up"),
            Self::Rescue => write!(f, "rescue"),
        }
    }
}

// =============================================================================
// Game events
// =============================================================================

/// Everything the host may want to present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A projectile was launched
    ProjectileFired {
        /// Projectile identifier
        id: EntityId,
        /// Muzzle position
        position: Vec2,
        /// Facing in degrees
        rotation: f32,
    },
    /// A box took a hit and survived
    BoxHit {
        /// Box identifier
        id: EntityId,
        /// Box kind
        kind: BoxKind,
        /// Hits left
        remaining: u32,
    },
    /// A box was destroyed
    BoxDestroyed {
        /// Box identifier
        id: EntityId,
        /// Box kind
        kind: BoxKind,
        /// Where it was
        position: Vec2,
        /// Score it yielded
        score: u64,
    },
    /// A box was placed by reconciliation
    BoxSpawned {
        /// Box identifier
        id: EntityId,
        /// Box kind
        kind: BoxKind,
        /// Placement
        position: Vec2,
    },
    /// An enemy was placed by reconciliation
    EnemySpawned {
        /// Enemy identifier
        id: EntityId,
        /// Placement
        position: Vec2,
        /// True for chasers
        chasing: bool,
    },
    /// An enemy was destroyed by a projectile or by ramming the tank
    EnemyDestroyed {
        /// Enemy identifier
        id: EntityId,
        /// Where it was
        position: Vec2,
    },
    /// The player's tank was destroyed
    TankDestroyed {
        /// Where it was
        position: Vec2,
    },
    /// An enemy came into contact with the invincible tank. Sent once per
    /// contact, not on every overlapping tick.
    TankGrazed {
        /// The enemy that made contact
        enemy: EntityId,
    },
    /// A fresh tank was placed at the map centre
    TankSpawned {
        /// Tank identifier
        id: EntityId,
        /// Placement
        position: Vec2,
    },
    /// Score crossed a promotion checkpoint
    Promotion {
        /// The checkpoint that was crossed
        checkpoint: u64,
        /// Rank at that checkpoint
        rank: Rank,
    },
    /// Cumulative rescues unlocked a new military rank
    MilitaryPromotion {
        /// The new rank
        rank: MilitaryRank,
    },
    /// A pilot appeared
    RescueSpawned {
        /// Pilot identifier
        id: EntityId,
        /// Placement
        position: Vec2,
    },
    /// A pilot was picked up
    Rescued {
        /// Pilot identifier
        id: EntityId,
        /// Persistent total after this rescue
        total: u64,
    },
    /// A pilot timed out
    RescueExpired {
        /// Pilot identifier
        id: EntityId,
    },
    /// The lifecycle moved to a new state
    StateChanged {
        /// Previous state
        from: RoundState,
        /// New state
        to: RoundState,
    },
    /// One countdown second elapsed
    CountdownTick {
        /// Seconds left
        remaining: u32,
    },
    /// The round was rebuilt after a countdown
    RoundReset,
    /// The invincibility window closed
    InvincibilityEnded,
    /// Placement gave up on a spawn
    SpawnSkipped {
        /// Kind that could not be placed
        tag: EntityTag,
    },
    /// The round context was torn down
    ReturnedToMenu,
}

impl GameEvent {
    /// Sound to play for this event, if any.
    #[must_use]
    pub const fn audio_cue(&self) -> Option<AudioCue> {
        match self {
            Self::ProjectileFired { .. } => Some(AudioCue::Fire),
            Self::BoxHit { .. } => Some(AudioCue::Hit),
            Self::BoxDestroyed { .. } | Self::EnemyDestroyed { .. } | Self::TankDestroyed { .. } => {
                Some(AudioCue::Explosion)
            }
            Self::Promotion { .. } | Self::MilitaryPromotion { .. } => Some(AudioCue::LevelUp),
            Self::Rescued { .. } => Some(AudioCue::Rescue),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_mapping() {
        let id = EntityId::new(1);
        assert_eq!(
            GameEvent::ProjectileFired {
                id,
                position: Vec2::ZERO,
                rotation: 0.0
            }
            .audio_cue(),
            Some(AudioCue::Fire)
        );
        assert_eq!(
            GameEvent::BoxHit {
                id,
                kind: BoxKind::Metal,
                remaining: 1
            }
            .audio_cue(),
            Some(AudioCue::Hit)
        );
        assert_eq!(
            GameEvent::Rescued { id, total: 1 }.audio_cue(),
            Some(AudioCue::Rescue)
        );
        assert_eq!(GameEvent::TankGrazed { enemy: id }.audio_cue(), None);
        assert_eq!(GameEvent::CountdownTick { remaining: 3 }.audio_cue(), None);
    }

    #[test]
    fn cue_names() {
        assert_eq!(AudioCue::LevelUp.to_string(), "level-up");
        assert_eq!(AudioCue::Explosion.to_string(), "explosion");
    }

    #[test]
    fn events_serialize() {
        let event = GameEvent::BoxSpawned {
            id: EntityId::new(2),
            kind: BoxKind::Treasure,
            position: Vec2::new(1.0, 2.0),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
