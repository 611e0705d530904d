//! Circle-overlap queries for movement blocking and damage.
//!
//! All tests use the strict predicate `distance(a, b) < ra + rb`. Destroyed
//! entities are never tested.
//!
//! The `CollisionSystem` has no scoring policy. Damage queries mutate the
//! entities they hit (destroy an enemy, call [`SupplyBox::hit`]) and report
//! [`ScoreEvent`]s for the caller to feed into progression.
//!
//! # Processing Order
//!
//! 1. Projectiles are visited in ID order
//! 2. Each projectile tests live enemies (ID order), then live boxes (ID order)
//! 3. The first target hit consumes the projectile; it is tested no further
//!
//! Because hits are applied immediately, a later projectile in the same pass
//! sees the enemy already destroyed or the box already damaged.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::entity::{Body, BoxKind, EnemyTank, EntityId, Projectile, RescueUnit, SupplyBox, Tank};
use crate::events::ScoreEvent;
use crate::spatial::within;

// =============================================================================
// Reports
// =============================================================================

/// What a projectile struck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    /// An enemy, destroyed outright
    Enemy {
        /// Enemy identifier
        id: EntityId,
        /// Where it was
        position: Vec2,
    },
    /// A box, damaged by one hit
    Box {
        /// Box identifier
        id: EntityId,
        /// Box kind
        kind: BoxKind,
        /// Where it is
        position: Vec2,
        /// Hits left after this one
        remaining: u32,
        /// Score yielded, non-zero only on the destroying hit
        score: u64,
    },
}

/// A projectile consumed by a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileHit {
    /// The consumed projectile
    pub projectile: EntityId,
    /// Its target
    pub target: HitTarget,
}

/// Result buffer of a damage pass, reused across ticks.
#[derive(Debug, Clone, Default)]
pub struct DamageReport {
    /// One entry per consumed projectile, in projectile ID order
    pub hits: Vec<ProjectileHit>,
    /// Score facts in the same order
    pub score_events: Vec<ScoreEvent>,
}

impl DamageReport {
    /// Empties the buffers, keeping their capacity.
    pub fn clear(&mut self) {
        self.hits.clear();
        self.score_events.clear();
    }

    /// Returns true if no projectile hit anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

// =============================================================================
// CollisionSystem
// =============================================================================

/// Blocking and damage queries.
///
/// # Example
///
/// ```
/// use ironclad_core::collision::CollisionSystem;
/// use ironclad_core::entity::Body;
/// use glam::Vec2;
///
/// let crate_body = Body::new(Vec2::new(100.0, 0.0), 28.0);
/// assert!(CollisionSystem::is_blocked(Vec2::new(60.0, 0.0), 30.0, [&crate_body]));
/// assert!(!CollisionSystem::is_blocked(Vec2::new(40.0, 0.0), 30.0, [&crate_body]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionSystem {
    tank_hit_distance: f32,
}

impl CollisionSystem {
    /// Creates the system with the tank-enemy contact distance.
    #[must_use]
    pub const fn new(tank_hit_distance: f32) -> Self {
        Self { tank_hit_distance }
    }

    /// Centre distance under which an enemy counts as touching the tank.
    #[must_use]
    pub const fn tank_hit_distance(&self) -> f32 {
        self.tank_hit_distance
    }

    /// True if a circle at `candidate` would overlap any live obstacle.
    ///
    /// A blocked move is rejected outright; there is no sliding.
    pub fn is_blocked<'a, I>(candidate: Vec2, radius: f32, obstacles: I) -> bool
    where
        I: IntoIterator<Item = &'a Body>,
    {
        obstacles.into_iter().any(|obstacle| {
            obstacle.is_alive()
                && crate::spatial::circles_overlap(candidate, radius, obstacle.position, obstacle.radius)
        })
    }

    /// [`CollisionSystem::is_blocked`] against the box collection.
    #[must_use]
    pub fn blocked_by_boxes(
        candidate: Vec2,
        radius: f32,
        boxes: &BTreeMap<EntityId, SupplyBox>,
    ) -> bool {
        Self::is_blocked(candidate, radius, boxes.values().map(|b| &b.body))
    }

    /// Runs the projectile damage pass.
    ///
    /// Hits are applied to `enemies` and `boxes` immediately and recorded in
    /// `report`, which is cleared first. The caller removes the consumed
    /// projectiles listed in `report.hits`.
    pub fn resolve_projectiles(
        projectiles: &BTreeMap<EntityId, Projectile>,
        enemies: &mut BTreeMap<EntityId, EnemyTank>,
        boxes: &mut BTreeMap<EntityId, SupplyBox>,
        report: &mut DamageReport,
    ) {
        report.clear();

        for projectile in projectiles.values().filter(|p| p.active) {
            let shell = &projectile.body;

            let enemy_hit = enemies
                .values_mut()
                .find(|e| e.body.is_alive() && e.body.overlaps(shell));
            if let Some(enemy) = enemy_hit {
                enemy.body.destroy();
                report.hits.push(ProjectileHit {
                    projectile: projectile.id,
                    target: HitTarget::Enemy {
                        id: enemy.id,
                        position: enemy.body.position,
                    },
                });
                report.score_events.push(ScoreEvent::EnemyDestroyed);
                continue;
            }

            let box_hit = boxes
                .values_mut()
                .find(|b| b.body.is_alive() && b.body.overlaps(shell));
            if let Some(supply) = box_hit {
                let score = supply.hit();
                report.hits.push(ProjectileHit {
                    projectile: projectile.id,
                    target: HitTarget::Box {
                        id: supply.id,
                        kind: supply.kind,
                        position: supply.body.position,
                        remaining: supply.hits_remaining(),
                        score,
                    },
                });
                if score > 0 {
                    report.score_events.push(ScoreEvent::BoxDestroyed {
                        kind: supply.kind,
                        score,
                    });
                }
            }
        }
    }

    /// First live enemy (ID order) within the tank-hit distance of a live tank.
    ///
    /// Invincibility is the caller's concern; contact is reported either way.
    #[must_use]
    pub fn tank_contact(
        &self,
        tank: &Tank,
        enemies: &BTreeMap<EntityId, EnemyTank>,
    ) -> Option<EntityId> {
        if !tank.body.is_alive() {
            return None;
        }
        enemies
            .values()
            .find(|e| {
                e.body.is_alive() && within(tank.body.position, e.body.position, self.tank_hit_distance)
            })
            .map(|e| e.id)
    }

    /// Live pilots overlapping a live tank, in ID order, appended to `out`.
    pub fn rescue_contacts(
        tank: &Tank,
        rescues: &BTreeMap<EntityId, RescueUnit>,
        out: &mut Vec<EntityId>,
    ) {
        out.clear();
        if !tank.body.is_alive() {
            return;
        }
        out.extend(
            rescues
                .values()
                .filter(|r| r.body.is_alive() && r.body.overlaps(&tank.body))
                .map(|r| r.id),
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
