//! Entity model shared by every movable or collidable object.
//!
//! This module provides:
//! - [`EntityId`]: Unique, ordered identifier issued by the arena
//! - [`EntityTag`]: Kind classification used for logging and timer ownership
//! - [`EntityFlags`]: Status bits (destroyed, rescued, expired)
//! - [`Body`]: The spatial state every entity carries
//!
//! Kind-specific data lives in [`components`]. The arena stores each kind in
//! its own typed collection, so no code ever inspects a heterogeneous list to
//! find out what an entity is.
//!
//! # Example
//!
//! ```
//! use ironclad_core::entity::{Body, EntityFlags};
//! use glam::Vec2;
//!
//! let mut body = Body::new(Vec2::new(10.0, 20.0), 30.0);
//! assert!(body.is_alive());
//!
//! body.destroy();
//! assert!(!body.is_alive());
//! assert!(body.flags.contains(EntityFlags::DESTROYED));
//! ```

pub mod components;

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::spatial::normalize_degrees;

pub use components::{
    Behavior, BoxKind, EnemyTank, Projectile, RescueUnit, SupplyBox, Tank,
};

/// Unique identifier for an entity.
///
/// Entity IDs are issued monotonically by the arena and never reused within a
/// round context. Their ordering is the deterministic iteration order for
/// every collision and movement pass. The arena starts at 1, so the default
/// value 0 marks an unassigned slot (a pooled projectile).
///
/// # Example
///
/// ```
/// use ironclad_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity kind.
///
/// Each kind has its own typed collection in the arena; the tag only travels
/// with events and log lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The player's tank
    Tank,
    /// A hostile tank
    Enemy,
    /// A pooled shell fired by the player
    Projectile,
    /// A destructible box
    Box,
    /// A rescuable pilot
    Rescue,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tank => write!(f, "Tank"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
            Self::Box => write!(f, "Box"),
            Self::Rescue => write!(f, "Rescue"),
        }
    }
}

bitflags! {
    /// Status bits carried by every [`Body`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EntityFlags: u8 {
        /// Removed from play; never collision-tested again
        const DESTROYED = 1 << 0;
        /// A rescue unit that has been picked up
        const RESCUED = 1 << 1;
        /// A rescue unit whose lifetime ran out
        const EXPIRED = 1 << 2;
    }
}

/// Spatial state shared by all entity kinds.
///
/// `rotation` is in degrees and always kept within `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    /// World position
    pub position: Vec2,
    /// Facing in degrees, counter-clockwise from +X
    pub rotation: f32,
    /// Collision radius
    pub radius: f32,
    /// Status bits
    pub flags: EntityFlags,
}

impl Body {
    /// Creates a live body at `position` with the given radius.
    #[must_use]
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            rotation: 0.0,
            radius,
            flags: EntityFlags::empty(),
        }
    }

    /// Returns true unless the body has been destroyed.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.flags.contains(EntityFlags::DESTROYED)
    }

    /// Marks the body destroyed. Idempotent.
    pub fn destroy(&mut self) {
        self.flags.insert(EntityFlags::DESTROYED);
    }

    /// Sets the rotation, wrapping it into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    /// Strict circle overlap against another body.
    #[must_use]
    pub fn overlaps(&self, other: &Body) -> bool {
        crate::spatial::circles_overlap(self.position, self.radius, other.position, other.radius)
    }
}
