//! Kind-specific entity data.
//!
//! Every kind wraps a [`Body`] and adds only what that kind needs. The arena
//! keeps one typed collection per kind.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Body, EntityFlags, EntityId};
use crate::controllers::{ChaseController, MovementContext, MovementController, WanderController};
use crate::pool::Poolable;
use crate::timer::SimTime;

// =============================================================================
// Tank
// =============================================================================

/// The player's tank. Alive or dead; there is no health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Arena-issued identifier
    pub id: EntityId,
    /// Spatial state
    pub body: Body,
    /// Enemy contact is harmless strictly before this instant
    pub invincible_until: SimTime,
}

impl Tank {
    /// Creates a tank with no invincibility.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            body: Body::new(position, radius),
            invincible_until: SimTime::ZERO,
        }
    }

    /// Returns true while `now` is inside the invincibility window.
    #[must_use]
    pub fn is_invincible(&self, now: SimTime) -> bool {
        now < self.invincible_until
    }
}

// =============================================================================
// Enemy
// =============================================================================

/// How an enemy decides where to go. Chosen once at spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Seek the player's tank
    Chasing(ChaseController),
    /// Random walk with periodic heading changes
    Wandering(WanderController),
}

impl Behavior {
    /// Short label for logs and events.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Chasing(_) => "chasing",
            Self::Wandering(_) => "wandering",
        }
    }

    /// Returns true for chasing enemies.
    #[must_use]
    pub const fn is_chasing(&self) -> bool {
        matches!(self, Self::Chasing(_))
    }
}

impl MovementController for Behavior {
    fn propose(
        &mut self,
        body: &mut Body,
        ctx: &MovementContext,
        rng: &mut dyn rand::RngCore,
    ) -> Option<Vec2> {
        match self {
            Self::Chasing(chase) => chase.propose(body, ctx, rng),
            Self::Wandering(wander) => wander.propose(body, ctx, rng),
        }
    }
}

/// A hostile tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTank {
    /// Arena-issued identifier
    pub id: EntityId,
    /// Spatial state
    pub body: Body,
    /// Movement behavior
    pub behavior: Behavior,
}

impl EnemyTank {
    /// Creates a live enemy.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, radius: f32, behavior: Behavior) -> Self {
        Self {
            id,
            body: Body::new(position, radius),
            behavior,
        }
    }
}

// =============================================================================
// Projectile
// =============================================================================

/// A pooled shell.
///
/// Instances are never constructed per shot: the world acquires one from the
/// projectile pool, calls [`Projectile::launch`], and hands it back on exit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Identifier issued at launch; the default value while pooled
    pub id: EntityId,
    /// Spatial state
    pub body: Body,
    /// World units per second
    pub velocity: Vec2,
    /// Who fired it
    pub owner: EntityId,
    /// Launch instant, for the lifetime guard
    pub spawned_at: SimTime,
    /// True between launch and release
    pub active: bool,
}

impl Projectile {
    /// Arms a pooled projectile for flight.
    pub fn launch(
        &mut self,
        id: EntityId,
        owner: EntityId,
        body: Body,
        velocity: Vec2,
        now: SimTime,
    ) {
        self.id = id;
        self.owner = owner;
        self.body = body;
        self.velocity = velocity;
        self.spawned_at = now;
        self.active = true;
    }

    /// Advances the projectile by `dt` seconds. Projectiles are not clamped;
    /// leaving the map is how they exit.
    pub fn integrate(&mut self, dt: f32) {
        self.body.position += self.velocity * dt;
    }
}

impl Poolable for Projectile {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Supply box
// =============================================================================

/// Box kinds in increasing rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoxKind {
    /// Common, one hit
    Wood,
    /// Two hits
    Metal,
    /// Rare, three hits, at most one live at a time
    Treasure,
}

impl BoxKind {
    /// All kinds in rarity order.
    pub const ALL: [Self; 3] = [Self::Wood, Self::Metal, Self::Treasure];

    /// Hits needed to destroy a fresh box.
    #[must_use]
    pub const fn required_hits(self) -> u32 {
        match self {
            Self::Wood => 1,
            Self::Metal => 2,
            Self::Treasure => 3,
        }
    }

    /// Score awarded when the box is destroyed.
    #[must_use]
    pub const fn score(self) -> u64 {
        match self {
            Self::Wood => 100,
            Self::Metal => 200,
            Self::Treasure => 1000,
        }
    }
}

impl std::fmt::Display for BoxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wood => write!(f, "Wood"),
            Self::Metal => write!(f, "Metal"),
            Self::Treasure => write!(f, "Treasure"),
        }
    }
}

/// A destructible box. Also the only obstacle that blocks movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyBox {
    /// Arena-issued identifier
    pub id: EntityId,
    /// Spatial state
    pub body: Body,
    /// Kind, fixed at spawn
    pub kind: BoxKind,
    hits_remaining: u32,
}

impl SupplyBox {
    /// Creates an undamaged box.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, radius: f32, kind: BoxKind) -> Self {
        Self {
            id,
            body: Body::new(position, radius),
            kind,
            hits_remaining: kind.required_hits(),
        }
    }

    /// Hits left before destruction.
    #[must_use]
    pub const fn hits_remaining(&self) -> u32 {
        self.hits_remaining
    }

    /// Registers one hit.
    ///
    /// Returns the box's score on the hit that destroys it and 0 otherwise,
    /// including every hit after destruction.
    ///
    /// # Example
    ///
    /// ```
    /// use ironclad_core::entity::{BoxKind, EntityId, SupplyBox};
    /// use glam::Vec2;
    ///
    /// let mut metal = SupplyBox::new(EntityId::new(1), Vec2::ZERO, 28.0, BoxKind::Metal);
    /// assert_eq!(metal.hit(), 0);
    /// assert_eq!(metal.hit(), 200);
    /// assert!(!metal.body.is_alive());
    /// assert_eq!(metal.hit(), 0);
    /// ```
    pub fn hit(&mut self) -> u64 {
        if self.hits_remaining == 0 {
            return 0;
        }
        self.hits_remaining -= 1;
        if self.hits_remaining == 0 {
            self.body.destroy();
            self.kind.score()
        } else {
            0
        }
    }
}

// =============================================================================
// Rescue unit
// =============================================================================

/// A downed pilot waiting for pickup (rescue mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueUnit {
    /// Arena-issued identifier
    pub id: EntityId,
    /// Spatial state
    pub body: Body,
    /// When the pilot appeared
    pub spawned_at: SimTime,
}

impl RescueUnit {
    /// Creates a waiting pilot.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, radius: f32, now: SimTime) -> Self {
        Self {
            id,
            body: Body::new(position, radius),
            spawned_at: now,
        }
    }

    /// Picks the pilot up. Returns false if it was already rescued, expired,
    /// or otherwise gone, in which case nothing changes.
    pub fn rescue(&mut self) -> bool {
        if !self.body.is_alive() {
            return false;
        }
        self.body.flags.insert(EntityFlags::RESCUED);
        self.body.destroy();
        true
    }

    /// Times the pilot out. Same guard as [`RescueUnit::rescue`].
    pub fn expire(&mut self) -> bool {
        if !self.body.is_alive() {
            return false;
        }
        self.body.flags.insert(EntityFlags::EXPIRED);
        self.body.destroy();
        true
    }

    /// Returns true once the pilot has been picked up.
    #[must_use]
    pub const fn is_rescued(&self) -> bool {
        self.body.flags.contains(EntityFlags::RESCUED)
    }
}
