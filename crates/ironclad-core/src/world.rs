//! The round context and its per-tick pipeline.
//!
//! A [`World`] owns everything that lives for one round context: the arena,
//! the scheduler, the projectile pool, progression, the lifecycle and the
//! injected [`Services`]. Nothing is global; returning to the menu tears the
//! whole context down and only the services survive
//! ([`World::into_services`]).
//!
//! # Tick pipeline
//!
//! [`World::step`] runs these phases in order:
//!
//! 1. **MOVE**: every controller proposes a candidate, then each candidate is
//!    committed unless it overlaps a live box
//! 2. **PROJECTILES**: shells integrate; any that left the map go back to the
//!    pool and their timeout guard is cancelled
//! 3. **DAMAGE**: projectile hits on enemies and boxes, on the committed
//!    positions
//! 4. **CONTACT**: tank versus enemies (graze while invincible, otherwise
//!    fatal), then pilot pickup in rescue mode
//! 5. **SCORE**: score events feed the progression tracker
//! 6. **COMPACT**: destroyed entities are removed and their timers cancelled
//! 7. **TIMERS**: due timers fire in `(due, id)` order
//!
//! # Determinism
//!
//! Collections iterate in [`EntityId`] order, timers fire in a total order
//! and all randomness comes from one `ChaCha8Rng` seeded at construction.
//! The same seed, configuration and inputs always produce the same event
//! stream.
//!
//! # Example
//!
//! ```
//! use ironclad_core::config::GameConfig;
//! use ironclad_core::controllers::Joystick;
//! use ironclad_core::persistence::Services;
//! use ironclad_core::world::World;
//!
//! let mut world = World::new(GameConfig::default(), 42, Services::in_memory()).unwrap();
//! assert_eq!(world.arena().live_box_count(), 20);
//!
//! world.step(16, Joystick::new(90.0, 1.0));
//! assert!(world.fire());
//! assert_eq!(world.counters().shots_fired, 1);
//! ```

use std::fmt;

use glam::Vec2;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::arena::Arena;
use crate::collision::{CollisionSystem, DamageReport, HitTarget};
use crate::config::GameConfig;
use crate::controllers::{Joystick, MovementContext, MovementController, PlayerController};
use crate::entity::{Body, BoxKind, EntityId, Projectile, RescueUnit, Tank};
use crate::error::ConfigError;
use crate::events::{GameEvent, ScoreEvent};
use crate::lifecycle::{CountdownStep, RoundLifecycle, RoundState};
use crate::persistence::{SceneNavigator, Services};
use crate::pool::ObjectPool;
use crate::progression::{MilitaryRank, Progress, ProgressionTracker, Rank};
use crate::spatial::{unit_from_degrees, Bounds};
use crate::spawn::SpawnController;
use crate::timer::{FiredTimer, Scheduler, SimTime, TimerId, TimerKind, TimerOwner};

// =============================================================================
// Inputs and counters
// =============================================================================

/// Edge of the fire button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireEdge {
    /// Pressed
    Start,
    /// Released
    End,
}

/// Per-round statistics. Zeroed on the last countdown second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCounters {
    /// Enemies destroyed by projectiles
    pub kills: u64,
    /// Wood boxes destroyed
    pub wood: u64,
    /// Metal boxes destroyed
    pub metal: u64,
    /// Treasure boxes destroyed
    pub treasure: u64,
    /// Pilots rescued
    pub rescues: u64,
    /// Projectiles launched
    pub shots_fired: u64,
}

impl RoundCounters {
    fn record_box(&mut self, kind: BoxKind) {
        match kind {
            BoxKind::Wood => self.wood += 1,
            BoxKind::Metal => self.metal += 1,
            BoxKind::Treasure => self.treasure += 1,
        }
    }

    /// Boxes of `kind` destroyed this round.
    #[must_use]
    pub const fn boxes_destroyed(&self, kind: BoxKind) -> u64 {
        match kind {
            BoxKind::Wood => self.wood,
            BoxKind::Metal => self.metal,
            BoxKind::Treasure => self.treasure,
        }
    }

    /// Boxes of every kind destroyed this round.
    #[must_use]
    pub const fn total_boxes(&self) -> u64 {
        self.wood + self.metal + self.treasure
    }
}

#[derive(Debug, Clone, Copy)]
enum Mover {
    Tank,
    Enemy(EntityId),
}

// =============================================================================
// World
// =============================================================================

/// One round context.
pub struct World {
    config: GameConfig,
    now: SimTime,
    tick: u64,
    rng: ChaCha8Rng,
    arena: Arena,
    /// Movement area: map bounds inset by the margin
    area: Bounds,
    scheduler: Scheduler,
    pool: ObjectPool<Projectile>,
    collision: CollisionSystem,
    spawner: SpawnController,
    progression: ProgressionTracker,
    lifecycle: RoundLifecycle,
    player: PlayerController,
    counters: RoundCounters,
    services: Services,
    events: Vec<GameEvent>,
    fire_held: bool,
    invincibility_active: bool,
    grazing: Option<EntityId>,
    countdown_timer: Option<TimerId>,

    // Scratch buffers reused every tick
    moves: Vec<(Mover, Vec2)>,
    damage: DamageReport,
    removed: Vec<EntityId>,
    progress: Vec<Progress>,
    scratch_ids: Vec<EntityId>,
}

impl World {
    /// Builds a round context: validates `config`, places the tank at the map
    /// centre, populates boxes and enemies and arms the reconciliation timers.
    ///
    /// The rescued-unit total is read from `services.achievements`; a read
    /// failure is logged and the total starts at zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new(config: GameConfig, seed: u64, services: Services) -> Result<Self, ConfigError> {
        config.validate()?;

        let rescued_total = services.achievements.rescued_total().unwrap_or_else(|err| {
            warn!(%err, "could not read rescued total, starting from zero");
            0
        });
        let progression = ProgressionTracker::new(&config.progression, rescued_total)?;

        let bounds = Bounds::new(config.map.width, config.map.height);
        let area = bounds.inset(config.map.margin);
        let lifecycle = RoundLifecycle::new(config.round.countdown_secs(config.mode));

        let mut world = Self {
            now: SimTime::ZERO,
            tick: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            arena: Arena::new(bounds),
            area,
            scheduler: Scheduler::new(),
            pool: ObjectPool::with_capacity(config.projectiles.pool_capacity),
            collision: CollisionSystem::new(config.round.tank_hit_distance),
            spawner: SpawnController::new(&config),
            progression,
            lifecycle,
            player: PlayerController::new(config.movement.tank_speed),
            counters: RoundCounters::default(),
            events: Vec::new(),
            fire_held: false,
            invincibility_active: false,
            grazing: None,
            countdown_timer: None,
            moves: Vec::new(),
            damage: DamageReport::default(),
            removed: Vec::new(),
            progress: Vec::new(),
            scratch_ids: Vec::new(),
            services,
            config,
        };

        world.place_tank(false);
        world.reconcile_boxes();
        world.reconcile_enemies();

        let box_period = world.config.spawn.box_interval_ms;
        let enemy_period = world.config.spawn.enemy_interval_ms;
        world.scheduler.schedule_repeating(
            TimerOwner::Round,
            TimerKind::BoxReconcile,
            SimTime::ZERO.after(box_period),
            box_period,
        );
        world.scheduler.schedule_repeating(
            TimerOwner::Round,
            TimerKind::EnemyReconcile,
            SimTime::ZERO.after(enemy_period),
            enemy_period,
        );

        info!(
            seed,
            mode = ?world.config.mode,
            boxes = world.arena.live_box_count(),
            enemies = world.arena.live_enemy_count(),
            rescued_total,
            "round context created"
        );
        Ok(world)
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the simulation by `dt_ms` milliseconds with the given stick
    /// input. Does nothing once the round has exited.
    pub fn step(&mut self, dt_ms: u64, joystick: Joystick) {
        if self.lifecycle.is_exited() {
            return;
        }
        self.tick += 1;
        self.now = self.now.after(dt_ms);
        #[allow(clippy::cast_precision_loss)]
        let dt = dt_ms as f32 / 1000.0;
        trace!(tick = self.tick, now = %self.now, "tick");

        self.player.set_input(joystick);

        // Phase 1: MOVE
        self.movement_phase(dt);

        // Phase 2: PROJECTILES
        self.projectile_phase(dt);

        // Phase 3: DAMAGE
        self.damage_phase();

        // Phase 4: CONTACT
        self.tank_contact_phase();
        if self.config.mode.is_rescue() {
            self.rescue_pickup_phase();
        }
        self.check_invincibility();

        // Phase 6: COMPACT (score is applied inline by the damage phase)
        self.compact();

        // Phase 7: TIMERS
        while let Some(fired) = self.scheduler.pop_due(self.now) {
            self.on_timer(fired);
        }
    }

    fn movement_phase(&mut self, dt: f32) {
        let ctx = MovementContext {
            dt,
            now: self.now,
            bounds: self.area,
            target: self.arena.live_tank().map(|t| t.body.position),
        };
        let rng: &mut dyn RngCore = &mut self.rng;

        self.moves.clear();
        if let Some(tank) = self.arena.tank_mut().filter(|t| t.body.is_alive()) {
            if let Some(candidate) = self.player.propose(&mut tank.body, &ctx, rng) {
                self.moves.push((Mover::Tank, candidate));
            }
        }
        for enemy in self
            .arena
            .enemies_mut()
            .values_mut()
            .filter(|e| e.body.is_alive())
        {
            if let Some(candidate) = enemy.behavior.propose(&mut enemy.body, &ctx, rng) {
                self.moves.push((Mover::Enemy(enemy.id), candidate));
            }
        }

        for &(mover, candidate) in &self.moves {
            let radius = match mover {
                Mover::Tank => self.arena.tank().map(|t| t.body.radius),
                Mover::Enemy(id) => self.arena.enemy(id).map(|e| e.body.radius),
            };
            let Some(radius) = radius else { continue };
            if CollisionSystem::blocked_by_boxes(candidate, radius, self.arena.boxes()) {
                continue;
            }
            let body = match mover {
                Mover::Tank => self.arena.tank_mut().map(|t| &mut t.body),
                Mover::Enemy(id) => self.arena.enemies_mut().get_mut(&id).map(|e| &mut e.body),
            };
            if let Some(body) = body {
                body.position = self.area.clamp(candidate);
            }
        }
    }

    fn projectile_phase(&mut self, dt: f32) {
        let bounds = self.arena.bounds();
        let mut exited = std::mem::take(&mut self.scratch_ids);
        exited.clear();
        for projectile in self.arena.projectiles_mut().values_mut() {
            projectile.integrate(dt);
            if !bounds.contains(projectile.body.position) {
                exited.push(projectile.id);
            }
        }
        for id in exited.drain(..) {
            trace!(%id, "projectile left the map");
            self.release_projectile(id);
        }
        self.scratch_ids = exited;
    }

    fn damage_phase(&mut self) {
        let (projectiles, enemies, boxes) = self.arena.damage_targets();
        CollisionSystem::resolve_projectiles(projectiles, enemies, boxes, &mut self.damage);
        if self.damage.is_empty() {
            return;
        }

        let mut damage = std::mem::take(&mut self.damage);
        for hit in &damage.hits {
            self.release_projectile(hit.projectile);
            match hit.target {
                HitTarget::Enemy { id, position } => {
                    debug!(%id, projectile = %hit.projectile, "enemy destroyed");
                    self.counters.kills += 1;
                    self.events.push(GameEvent::EnemyDestroyed { id, position });
                    if self.config.mode.is_rescue() {
                        let due = self.now.after(self.config.round.rescue_spawn_delay_ms);
                        self.scheduler.schedule_once(
                            TimerOwner::Round,
                            TimerKind::RescueSpawn { at: position },
                            due,
                        );
                    }
                }
                HitTarget::Box {
                    id,
                    kind,
                    position,
                    remaining,
                    score,
                } => {
                    if remaining > 0 {
                        debug!(%id, %kind, remaining, "box hit");
                        self.events.push(GameEvent::BoxHit { id, kind, remaining });
                    } else if score > 0 {
                        debug!(%id, %kind, score, "box destroyed");
                        self.counters.record_box(kind);
                        self.events.push(GameEvent::BoxDestroyed {
                            id,
                            kind,
                            position,
                            score,
                        });
                    }
                }
            }
        }
        // Phase 5: SCORE
        for event in &damage.score_events {
            self.award(*event);
        }
        damage.clear();
        self.damage = damage;
    }

    fn tank_contact_phase(&mut self) {
        let contact = self.arena.live_tank().and_then(|tank| {
            self.collision
                .tank_contact(tank, self.arena.enemies())
                .map(|enemy| (enemy, tank.is_invincible(self.now), tank.body.position))
        });
        let previous = self.grazing.take();
        let Some((enemy_id, invincible, tank_position)) = contact else {
            return;
        };

        // One graze event per contact, not per overlapping tick
        if invincible {
            if previous != Some(enemy_id) {
                trace!(enemy = %enemy_id, "invincible tank grazed");
                self.events.push(GameEvent::TankGrazed { enemy: enemy_id });
            }
            self.grazing = Some(enemy_id);
            return;
        }
        if !self.lifecycle.is_playing() {
            return;
        }

        if let Some(enemy) = self.arena.enemies_mut().get_mut(&enemy_id) {
            enemy.body.destroy();
            let position = enemy.body.position;
            self.events.push(GameEvent::EnemyDestroyed {
                id: enemy_id,
                position,
            });
        }
        if let Some(tank) = self.arena.tank_mut() {
            tank.body.destroy();
        }
        self.events.push(GameEvent::TankDestroyed {
            position: tank_position,
        });
        info!(
            enemy = %enemy_id,
            score = self.progression.score(),
            kills = self.counters.kills,
            "tank destroyed"
        );
        self.submit_score();

        if let Some(seconds) = self.lifecycle.fatal_contact() {
            self.publish_state_changes();
            let period = self.config.round.countdown_interval_ms;
            self.countdown_timer = Some(self.scheduler.schedule_repeating(
                TimerOwner::Round,
                TimerKind::CountdownTick,
                self.now.after(period),
                period,
            ));
            if seconds == 1 {
                self.reset_round_counters();
            }
        }
    }

    fn rescue_pickup_phase(&mut self) {
        let Some(tank) = self.arena.live_tank() else {
            return;
        };
        let mut contacts = std::mem::take(&mut self.scratch_ids);
        CollisionSystem::rescue_contacts(tank, self.arena.rescues(), &mut contacts);
        for id in contacts.drain(..) {
            self.rescue(id);
        }
        self.scratch_ids = contacts;
    }

    fn check_invincibility(&mut self) {
        if !self.invincibility_active {
            return;
        }
        let expired = self
            .arena
            .tank()
            .map_or(true, |t| !t.is_invincible(self.now));
        if expired {
            self.invincibility_active = false;
            debug!(now = %self.now, "invincibility ended");
            self.events.push(GameEvent::InvincibilityEnded);
        }
    }

    fn compact(&mut self) {
        self.arena.compact(&mut self.removed);
        for &id in &self.removed {
            self.scheduler.cancel_owner(TimerOwner::Entity(id));
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    fn on_timer(&mut self, fired: FiredTimer) {
        trace!(timer = ?fired.id, kind = ?fired.kind, due = %fired.due, "timer fired");
        match fired.kind {
            TimerKind::BoxReconcile => {
                self.compact();
                self.reconcile_boxes();
            }
            TimerKind::EnemyReconcile => {
                self.compact();
                self.reconcile_enemies();
            }
            TimerKind::CountdownTick => self.on_countdown_tick(fired.id),
            TimerKind::ProjectileTimeout(id) => {
                if self.release_projectile(id) {
                    debug!(%id, "projectile timed out");
                }
            }
            TimerKind::RescueSpawn { at } => self.spawn_rescue(at),
            TimerKind::RescueExpire(id) => {
                if let Some(unit) = self.arena.rescue_mut(id) {
                    if unit.expire() {
                        debug!(%id, "pilot expired");
                        self.events.push(GameEvent::RescueExpired { id });
                    }
                }
            }
        }
    }

    fn on_countdown_tick(&mut self, timer: TimerId) {
        let step = self.lifecycle.countdown_tick();
        self.publish_state_changes();
        match step {
            CountdownStep::Ignored => {
                self.scheduler.cancel(timer);
            }
            CountdownStep::Tick { remaining } => {
                self.events.push(GameEvent::CountdownTick { remaining });
            }
            CountdownStep::ResetCounters => {
                self.events.push(GameEvent::CountdownTick { remaining: 1 });
                self.reset_round_counters();
            }
            CountdownStep::Rebuild => {
                let id = self.countdown_timer.take().unwrap_or(timer);
                self.scheduler.cancel(id);
                self.events.push(GameEvent::CountdownTick { remaining: 0 });
                self.rebuild_round();
            }
        }
    }

    fn reset_round_counters(&mut self) {
        debug!(score = self.progression.score(), "round counters reset");
        self.progression.reset_round();
        self.counters = RoundCounters::default();
    }

    fn rebuild_round(&mut self) {
        self.compact();
        self.place_tank(self.config.mode.is_rescue());
        self.reconcile_boxes();
        self.reconcile_enemies();
        self.lifecycle.finish_reset();
        self.publish_state_changes();
        self.events.push(GameEvent::RoundReset);
        info!(
            boxes = self.arena.live_box_count(),
            enemies = self.arena.live_enemy_count(),
            "round rebuilt"
        );
    }

    fn spawn_rescue(&mut self, at: Vec2) {
        if !self.config.mode.is_rescue() || self.lifecycle.is_exited() {
            return;
        }
        let id = self.arena.next_id();
        let position = self.arena.bounds().clamp(at);
        self.arena.insert_rescue(RescueUnit::new(
            id,
            position,
            self.config.entities.rescue_radius,
            self.now,
        ));
        self.scheduler.schedule_once(
            TimerOwner::Entity(id),
            TimerKind::RescueExpire(id),
            self.now.after(self.config.round.rescue_lifetime_ms),
        );
        debug!(%id, x = position.x, y = position.y, "pilot spawned");
        self.events.push(GameEvent::RescueSpawned { id, position });
    }

    // =========================================================================
    // Shared steps
    // =========================================================================

    fn place_tank(&mut self, invincible: bool) {
        let id = self.arena.next_id();
        let position = self.arena.bounds().center();
        let mut tank = Tank::new(id, position, self.config.entities.tank_radius);
        if invincible {
            tank.invincible_until = self.now.after(self.config.round.invincibility_ms);
            self.invincibility_active = true;
        }
        self.arena.set_tank(tank);
        self.events.push(GameEvent::TankSpawned { id, position });
    }

    fn reconcile_boxes(&mut self) {
        let report = self
            .spawner
            .reconcile_boxes(&mut self.arena, &mut self.rng, &mut self.events);
        if report.spawned > 0 || report.skipped > 0 {
            debug!(spawned = report.spawned, skipped = report.skipped, "box reconciliation");
        }
    }

    fn reconcile_enemies(&mut self) {
        let report = self.spawner.reconcile_enemies(
            &mut self.arena,
            self.progression.score_step(),
            self.now,
            &mut self.rng,
            &mut self.events,
        );
        if report.spawned > 0 || report.skipped > 0 {
            debug!(spawned = report.spawned, skipped = report.skipped, "enemy reconciliation");
        }
    }

    /// Takes a projectile out of flight, cancels its timeout and returns it to
    /// the pool. Returns false if it was already gone.
    fn release_projectile(&mut self, id: EntityId) -> bool {
        let Some(projectile) = self.arena.take_projectile(id) else {
            return false;
        };
        self.scheduler.cancel_owner(TimerOwner::Entity(id));
        self.pool.release(projectile);
        true
    }

    fn submit_score(&mut self) {
        let score = self.progression.score();
        if score == 0 {
            return;
        }
        let rank = self.progression.rank().to_string();
        let now_ms = self.services.clock.now_epoch_ms();
        match self.services.archive.submit(score, &rank, now_ms) {
            Ok(true) => info!(score, %rank, "new best score"),
            Ok(false) => {}
            Err(err) => warn!(%err, score, "failed to record score"),
        }
    }

    fn publish_state_changes(&mut self) {
        self.events.extend(
            self.lifecycle
                .drain_changes()
                .map(|change| GameEvent::StateChanged {
                    from: change.from,
                    to: change.to,
                }),
        );
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Launches one projectile from the tank's muzzle.
    ///
    /// Returns false when not playing, when the tank is dead, or when the
    /// pool is exhausted (the shot is dropped).
    pub fn fire(&mut self) -> bool {
        if !self.lifecycle.is_playing() {
            return false;
        }
        let Some(tank) = self.arena.live_tank() else {
            return false;
        };
        let (owner, origin, rotation, tank_radius) =
            (tank.id, tank.body.position, tank.body.rotation, tank.body.radius);

        let Some(mut projectile) = self.pool.acquire() else {
            debug!(in_use = self.pool.in_use(), "shot dropped");
            return false;
        };

        let id = self.arena.next_id();
        let direction = unit_from_degrees(rotation);
        let radius = self.config.entities.projectile_radius;
        let mut body = Body::new(origin + direction * (tank_radius + radius), radius);
        body.set_rotation(rotation);
        let position = body.position;
        projectile.launch(id, owner, body, direction * self.config.projectiles.speed, self.now);

        self.scheduler.schedule_once(
            TimerOwner::Entity(id),
            TimerKind::ProjectileTimeout(id),
            self.now.after(self.config.projectiles.lifetime_ms),
        );
        self.arena.insert_projectile(projectile);
        self.counters.shots_fired += 1;
        trace!(%id, rotation, "projectile fired");
        self.events.push(GameEvent::ProjectileFired {
            id,
            position,
            rotation,
        });
        true
    }

    /// Fire-button edge. A press fires once; holding does not repeat until
    /// the button is released. Returns true if a projectile was launched.
    pub fn fire_edge(&mut self, edge: FireEdge) -> bool {
        match edge {
            FireEdge::Start if !self.fire_held => {
                self.fire_held = true;
                self.fire()
            }
            FireEdge::Start => false,
            FireEdge::End => {
                self.fire_held = false;
                false
            }
        }
    }

    /// Rescues a live pilot. Idempotent: a pilot already rescued, expired or
    /// removed yields false and changes nothing.
    ///
    /// The new rescued total is written to the achievement store; a write
    /// failure is logged and play continues.
    pub fn rescue(&mut self, id: EntityId) -> bool {
        if !self.config.mode.is_rescue() {
            return false;
        }
        let Some(unit) = self.arena.rescue_mut(id) else {
            return false;
        };
        if !unit.rescue() {
            return false;
        }
        self.scheduler.cancel_owner(TimerOwner::Entity(id));
        self.counters.rescues += 1;
        self.award(ScoreEvent::RescueCompleted);

        let total = self.progression.rescued_total();
        if let Err(err) = self.services.achievements.store_rescued_total(total) {
            warn!(%err, total, "failed to persist rescued total");
        }
        debug!(%id, total, "pilot rescued");
        self.events.push(GameEvent::Rescued { id, total });
        true
    }

    /// Applies a scoring fact and publishes any promotions. Returns the
    /// points awarded.
    pub fn award(&mut self, event: ScoreEvent) -> u64 {
        let mut progress = std::mem::take(&mut self.progress);
        progress.clear();
        let points = self.progression.apply(event, &mut progress);
        for item in progress.drain(..) {
            match item {
                Progress::Promotion { checkpoint, rank } => {
                    info!(checkpoint, %rank, "promoted");
                    self.events.push(GameEvent::Promotion { checkpoint, rank });
                }
                Progress::MilitaryPromotion(rank) => {
                    info!(%rank, "military promotion");
                    self.events.push(GameEvent::MilitaryPromotion { rank });
                }
            }
        }
        self.progress = progress;
        points
    }

    /// Tears the round down and hands control to `navigator`.
    ///
    /// The score is offered to the archive, every timer is cancelled, every
    /// projectile goes back to the pool and every collection is emptied
    /// before the navigator is called. A second call does nothing.
    pub fn return_to_menu(&mut self, navigator: &mut dyn SceneNavigator) {
        if self.lifecycle.is_exited() {
            return;
        }
        if self.arena.live_tank().is_some() {
            self.submit_score();
        }

        self.scheduler.clear();
        for projectile in self.arena.drain_projectiles() {
            self.pool.release(projectile);
        }
        self.arena.clear();
        self.countdown_timer = None;
        self.invincibility_active = false;
        self.grazing = None;
        self.fire_held = false;

        self.lifecycle.exit();
        self.publish_state_changes();
        self.events.push(GameEvent::ReturnedToMenu);
        info!(
            best_score = self.progression.best_score(),
            pooled = self.pool.available(),
            "returned to menu"
        );
        navigator.return_to_menu();
    }

    /// Takes the events produced since the last call.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Consumes the world and returns the injected services.
    #[must_use]
    pub fn into_services(self) -> Services {
        self.services
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Simulation time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.now
    }

    /// Ticks stepped so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.lifecycle.state()
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// All entities.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable entity access, for scripted setups.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Pending timers.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Projectile pool.
    #[must_use]
    pub const fn pool(&self) -> &ObjectPool<Projectile> {
        &self.pool
    }

    /// Score and rank state.
    #[must_use]
    pub const fn progression(&self) -> &ProgressionTracker {
        &self.progression
    }

    /// Current round score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.progression.score()
    }

    /// Best score this session.
    #[must_use]
    pub const fn best_score(&self) -> u64 {
        self.progression.best_score()
    }

    /// Current score rank.
    #[must_use]
    pub fn rank(&self) -> Rank {
        self.progression.rank()
    }

    /// Current military rank.
    #[must_use]
    pub fn military_rank(&self) -> MilitaryRank {
        self.progression.military_rank()
    }

    /// This round's statistics.
    #[must_use]
    pub const fn counters(&self) -> &RoundCounters {
        &self.counters
    }

    /// Returns true while the tank's invincibility window is open.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.arena
            .live_tank()
            .is_some_and(|t| t.is_invincible(self.now))
    }

    /// Events not yet drained.
    #[must_use]
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("now", &self.now)
            .field("state", &self.lifecycle.state())
            .field("score", &self.progression.score())
            .field("entities", &self.arena.entity_count())
            .field("timers", &self.scheduler.len())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}
