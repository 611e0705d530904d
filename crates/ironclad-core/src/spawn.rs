//! Population reconciliation for boxes and enemies.
//!
//! Each pass tops a population up to its target. The world compacts the arena
//! (and cancels the timers of whatever it removed) before calling in, so the
//! counts seen here are live counts.
//!
//! # Placement
//!
//! Positions are rejection-sampled: draw uniformly inside the map inset by its
//! margin, and reject the draw if it lies within the configured clearance of
//! the player, any live enemy or any live box. While the tank is dead the
//! player clearance is kept around the respawn point at the map centre. After
//! `max_placement_attempts` rejections the spawn is skipped for this pass and
//! retried on the next one.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use crate::arena::Arena;
use crate::config::{GameConfig, SpawnConfig};
use crate::controllers::{ChaseController, WanderController};
use crate::entity::{Behavior, BoxKind, EnemyTank, EntityTag, SupplyBox};
use crate::events::GameEvent;
use crate::spatial::{within, Bounds};
use crate::timer::SimTime;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Entities created
    pub spawned: usize,
    /// Spawns abandoned after exhausting placement attempts
    pub skipped: usize,
}

/// Keeps box and enemy counts at their targets.
#[derive(Debug, Clone)]
pub struct SpawnController {
    config: SpawnConfig,
    area: Bounds,
    respawn: Vec2,
    box_radius: f32,
    enemy_radius: f32,
    chase_speed: f32,
    wander_speed: f32,
    wander_interval_ms: u64,
}

impl SpawnController {
    /// Builds the controller from the game configuration.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let map = Bounds::new(config.map.width, config.map.height);
        Self {
            config: config.spawn.clone(),
            area: map.inset(config.map.margin),
            respawn: map.center(),
            box_radius: config.entities.box_radius,
            enemy_radius: config.entities.enemy_radius,
            chase_speed: config.movement.chase_speed,
            wander_speed: config.movement.wander_speed,
            wander_interval_ms: config.movement.wander_interval_ms,
        }
    }

    /// Enemy target for a score step (whole sub-levels passed).
    ///
    /// # Example
    ///
    /// ```
    /// use ironclad_core::config::GameConfig;
    /// use ironclad_core::spawn::SpawnController;
    ///
    /// let spawner = SpawnController::new(&GameConfig::default());
    /// assert_eq!(spawner.enemy_target(0), 3);
    /// assert_eq!(spawner.enemy_target(6), 4);
    /// assert_eq!(spawner.enemy_target(14), 6);
    /// assert_eq!(spawner.enemy_target(15), 7);
    /// ```
    #[must_use]
    pub fn enemy_target(&self, score_step: u64) -> usize {
        self.config
            .enemy_steps
            .iter()
            .find(|step| score_step < step.below_tier)
            .map_or(self.config.enemy_cap, |step| step.count)
    }

    /// Minimum number of live boxes.
    #[must_use]
    pub const fn box_target(&self) -> usize {
        self.config.min_boxes
    }

    /// Draws a box kind. Treasure is only possible while none is live.
    pub fn choose_box_kind<R: Rng + ?Sized>(&self, treasure_live: bool, rng: &mut R) -> BoxKind {
        if !treasure_live && rng.gen_bool(self.config.treasure_chance) {
            return BoxKind::Treasure;
        }
        let total = self.config.wood_weight + self.config.metal_weight;
        if rng.gen_range(0..total) < self.config.wood_weight {
            BoxKind::Wood
        } else {
            BoxKind::Metal
        }
    }

    /// Draws an enemy behavior.
    pub fn choose_behavior<R: Rng + ?Sized>(&self, now: SimTime, rng: &mut R) -> Behavior {
        let total = self.config.chasing_weight + self.config.wandering_weight;
        if rng.gen_range(0..total) < self.config.chasing_weight {
            Behavior::Chasing(ChaseController::new(self.chase_speed))
        } else {
            Behavior::Wandering(WanderController::new(
                self.wander_speed,
                self.wander_interval_ms,
                now,
                rng,
            ))
        }
    }

    /// True if `point` keeps the required clearance from everything live.
    #[must_use]
    pub fn is_clear(&self, arena: &Arena, point: Vec2) -> bool {
        let player = arena
            .live_tank()
            .map_or(self.respawn, |t| t.body.position);
        if within(point, player, self.config.player_clearance) {
            return false;
        }
        let near_enemy = arena.enemies().values().any(|e| {
            e.body.is_alive() && within(point, e.body.position, self.config.enemy_clearance)
        });
        if near_enemy {
            return false;
        }
        !arena.boxes().values().any(|b| {
            b.body.is_alive() && within(point, b.body.position, self.config.box_clearance)
        })
    }

    /// Rejection-samples a clear position, or `None` after the attempt budget.
    pub fn find_position<R: Rng + ?Sized>(&self, arena: &Arena, rng: &mut R) -> Option<Vec2> {
        (0..self.config.max_placement_attempts)
            .map(|_| self.area.random_point(rng))
            .find(|point| self.is_clear(arena, *point))
    }

    /// Tops boxes up to the minimum.
    pub fn reconcile_boxes<R: Rng + ?Sized>(
        &self,
        arena: &mut Arena,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        let missing = self.config.min_boxes.saturating_sub(arena.live_box_count());

        for _ in 0..missing {
            let Some(position) = self.find_position(arena, rng) else {
                warn!(
                    tag = %EntityTag::Box,
                    attempts = self.config.max_placement_attempts,
                    "no clear position, skipping spawn"
                );
                events.push(GameEvent::SpawnSkipped { tag: EntityTag::Box });
                report.skipped += 1;
                continue;
            };
            let treasure_live = arena.live_boxes_of(BoxKind::Treasure) > 0;
            let kind = self.choose_box_kind(treasure_live, rng);
            let id = arena.next_id();
            arena.insert_box(SupplyBox::new(id, position, self.box_radius, kind));
            debug!(%id, %kind, x = position.x, y = position.y, "box spawned");
            events.push(GameEvent::BoxSpawned { id, kind, position });
            report.spawned += 1;
        }
        report
    }

    /// Tops enemies up to the target for `score_step`.
    pub fn reconcile_enemies<R: Rng + ?Sized>(
        &self,
        arena: &mut Arena,
        score_step: u64,
        now: SimTime,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        let target = self.enemy_target(score_step);
        let missing = target.saturating_sub(arena.live_enemy_count());

        for _ in 0..missing {
            let Some(position) = self.find_position(arena, rng) else {
                warn!(
                    tag = %EntityTag::Enemy,
                    attempts = self.config.max_placement_attempts,
                    "no clear position, skipping spawn"
                );
                events.push(GameEvent::SpawnSkipped {
                    tag: EntityTag::Enemy,
                });
                report.skipped += 1;
                continue;
            };
            let behavior = self.choose_behavior(now, rng);
            let chasing = behavior.is_chasing();
            let id = arena.next_id();
            debug!(%id, behavior = behavior.label(), x = position.x, y = position.y, "enemy spawned");
            arena.insert_enemy(EnemyTank::new(id, position, self.enemy_radius, behavior));
            events.push(GameEvent::EnemySpawned {
                id,
                position,
                chasing,
            });
            report.spawned += 1;
        }
        report
    }
}
