//! Typed entity registry for one round context.
//!
//! The arena keeps one `BTreeMap` per entity kind, keyed by [`EntityId`]. IDs
//! are issued monotonically from 1, so map order is spawn order and every pass
//! over a collection is deterministic.
//!
//! # Lifetimes
//!
//! - Enemies, boxes and pilots are flagged destroyed in place by collision
//!   handling and removed later by [`Arena::compact`]. A destroyed entity stays
//!   in its map until then but is skipped by every query.
//! - Projectiles are pooled values. The world removes them with
//!   [`Arena::take_projectile`] and hands them back to the pool in the same
//!   step, so the projectile map only ever holds in-flight shells.
//!
//! # Example
//!
//! ```
//! use ironclad_core::arena::Arena;
//! use ironclad_core::entity::{BoxKind, SupplyBox};
//! use ironclad_core::spatial::Bounds;
//! use glam::Vec2;
//!
//! let mut arena = Arena::new(Bounds::new(800.0, 600.0));
//! let id = arena.next_id();
//! arena.insert_box(SupplyBox::new(id, Vec2::new(100.0, 100.0), 28.0, BoxKind::Wood));
//!
//! arena.box_mut(id).unwrap().hit();
//! assert_eq!(arena.live_box_count(), 0);
//!
//! let mut removed = Vec::new();
//! arena.compact(&mut removed);
//! assert_eq!(removed, vec![id]);
//! ```

use std::collections::BTreeMap;

use crate::entity::{BoxKind, EnemyTank, EntityId, Projectile, RescueUnit, SupplyBox, Tank};
use crate::spatial::Bounds;

/// Per-kind entity storage with deterministic iteration order.
#[derive(Debug, Clone)]
pub struct Arena {
    next_id: u64,
    bounds: Bounds,
    tank: Option<Tank>,
    enemies: BTreeMap<EntityId, EnemyTank>,
    boxes: BTreeMap<EntityId, SupplyBox>,
    rescues: BTreeMap<EntityId, RescueUnit>,
    projectiles: BTreeMap<EntityId, Projectile>,
}

impl Arena {
    /// Creates an empty arena covering `bounds`.
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        Self {
            next_id: 1,
            bounds,
            tank: None,
            enemies: BTreeMap::new(),
            boxes: BTreeMap::new(),
            rescues: BTreeMap::new(),
            projectiles: BTreeMap::new(),
        }
    }

    /// Issues a fresh entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Full map bounds.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    // -------------------------------------------------------------------------
    // Tank
    // -------------------------------------------------------------------------

    /// The player's tank, if one has been placed this round.
    #[must_use]
    pub const fn tank(&self) -> Option<&Tank> {
        self.tank.as_ref()
    }

    /// Mutable access to the player's tank.
    pub fn tank_mut(&mut self) -> Option<&mut Tank> {
        self.tank.as_mut()
    }

    /// The tank only if it is alive.
    #[must_use]
    pub fn live_tank(&self) -> Option<&Tank> {
        self.tank.as_ref().filter(|t| t.body.is_alive())
    }

    /// Places (or replaces) the player's tank.
    pub fn set_tank(&mut self, tank: Tank) {
        self.tank = Some(tank);
    }

    // -------------------------------------------------------------------------
    // Enemies
    // -------------------------------------------------------------------------

    /// Adds an enemy.
    pub fn insert_enemy(&mut self, enemy: EnemyTank) {
        self.enemies.insert(enemy.id, enemy);
    }

    /// All enemies, including destroyed ones awaiting compaction.
    #[must_use]
    pub const fn enemies(&self) -> &BTreeMap<EntityId, EnemyTank> {
        &self.enemies
    }

    /// Mutable enemy map.
    pub fn enemies_mut(&mut self) -> &mut BTreeMap<EntityId, EnemyTank> {
        &mut self.enemies
    }

    /// Looks up an enemy.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&EnemyTank> {
        self.enemies.get(&id)
    }

    /// Number of live enemies.
    #[must_use]
    pub fn live_enemy_count(&self) -> usize {
        self.enemies.values().filter(|e| e.body.is_alive()).count()
    }

    // -------------------------------------------------------------------------
    // Boxes
    // -------------------------------------------------------------------------

    /// Adds a box.
    pub fn insert_box(&mut self, supply: SupplyBox) {
        self.boxes.insert(supply.id, supply);
    }

    /// All boxes, including destroyed ones awaiting compaction.
    #[must_use]
    pub const fn boxes(&self) -> &BTreeMap<EntityId, SupplyBox> {
        &self.boxes
    }

    /// Mutable box map.
    pub fn boxes_mut(&mut self) -> &mut BTreeMap<EntityId, SupplyBox> {
        &mut self.boxes
    }

    /// Looks up a box.
    #[must_use]
    pub fn supply_box(&self, id: EntityId) -> Option<&SupplyBox> {
        self.boxes.get(&id)
    }

    /// Mutable lookup of a box.
    pub fn box_mut(&mut self, id: EntityId) -> Option<&mut SupplyBox> {
        self.boxes.get_mut(&id)
    }

    /// Number of live boxes.
    #[must_use]
    pub fn live_box_count(&self) -> usize {
        self.boxes.values().filter(|b| b.body.is_alive()).count()
    }

    /// Number of live boxes of one kind.
    #[must_use]
    pub fn live_boxes_of(&self, kind: BoxKind) -> usize {
        self.boxes
            .values()
            .filter(|b| b.kind == kind && b.body.is_alive())
            .count()
    }

    // -------------------------------------------------------------------------
    // Rescue units
    // -------------------------------------------------------------------------

    /// Adds a pilot.
    pub fn insert_rescue(&mut self, unit: RescueUnit) {
        self.rescues.insert(unit.id, unit);
    }

    /// All pilots, including picked-up or expired ones awaiting compaction.
    #[must_use]
    pub const fn rescues(&self) -> &BTreeMap<EntityId, RescueUnit> {
        &self.rescues
    }

    /// Mutable lookup of a pilot.
    pub fn rescue_mut(&mut self, id: EntityId) -> Option<&mut RescueUnit> {
        self.rescues.get_mut(&id)
    }

    /// Number of pilots still waiting.
    #[must_use]
    pub fn live_rescue_count(&self) -> usize {
        self.rescues.values().filter(|r| r.body.is_alive()).count()
    }

    // -------------------------------------------------------------------------
    // Projectiles
    // -------------------------------------------------------------------------

    /// Adds an in-flight projectile.
    pub fn insert_projectile(&mut self, projectile: Projectile) {
        self.projectiles.insert(projectile.id, projectile);
    }

    /// In-flight projectiles.
    #[must_use]
    pub const fn projectiles(&self) -> &BTreeMap<EntityId, Projectile> {
        &self.projectiles
    }

    /// Mutable projectile map.
    pub fn projectiles_mut(&mut self) -> &mut BTreeMap<EntityId, Projectile> {
        &mut self.projectiles
    }

    /// Removes a projectile so it can go back to its pool.
    pub fn take_projectile(&mut self, id: EntityId) -> Option<Projectile> {
        self.projectiles.remove(&id)
    }

    /// Borrows what the projectile damage pass needs: the shells read-only,
    /// the targets mutably.
    pub fn damage_targets(
        &mut self,
    ) -> (
        &BTreeMap<EntityId, Projectile>,
        &mut BTreeMap<EntityId, EnemyTank>,
        &mut BTreeMap<EntityId, SupplyBox>,
    ) {
        (&self.projectiles, &mut self.enemies, &mut self.boxes)
    }

    /// Removes every projectile, in ID order.
    pub fn drain_projectiles(&mut self) -> impl Iterator<Item = Projectile> {
        std::mem::take(&mut self.projectiles).into_values()
    }

    // -------------------------------------------------------------------------
    // Housekeeping
    // -------------------------------------------------------------------------

    /// Removes destroyed enemies, boxes and pilots, appending their IDs to
    /// `removed` in kind order (enemies, boxes, pilots), ID order within a kind.
    ///
    /// `removed` is cleared first so the caller can reuse one buffer.
    pub fn compact(&mut self, removed: &mut Vec<EntityId>) {
        removed.clear();
        removed.extend(
            self.enemies
                .iter()
                .filter(|(_, e)| !e.body.is_alive())
                .map(|(id, _)| *id),
        );
        removed.extend(
            self.boxes
                .iter()
                .filter(|(_, b)| !b.body.is_alive())
                .map(|(id, _)| *id),
        );
        removed.extend(
            self.rescues
                .iter()
                .filter(|(_, r)| !r.body.is_alive())
                .map(|(id, _)| *id),
        );

        self.enemies.retain(|_, e| e.body.is_alive());
        self.boxes.retain(|_, b| b.body.is_alive());
        self.rescues.retain(|_, r| r.body.is_alive());
    }

    /// Drops every entity except projectiles, which the caller drains first.
    /// The ID counter keeps running.
    pub fn clear(&mut self) {
        self.tank = None;
        self.enemies.clear();
        self.boxes.clear();
        self.rescues.clear();
    }

    /// Total number of stored entities of every kind, tank included.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        usize::from(self.tank.is_some())
            + self.enemies.len()
            + self.boxes.len()
            + self.rescues.len()
            + self.projectiles.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
