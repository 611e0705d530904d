//! Test helper functions for setting up round contexts and entities.
//!
//! Most scenarios start from a "quiet" world: no box minimum and no enemy
//! target, so reconciliation never spawns anything and every entity in the
//! arena was placed by the test itself.

use glam::Vec2;

use crate::config::{GameConfig, GameMode};
use crate::controllers::{ChaseController, Joystick, WanderController};
use crate::entity::{Behavior, BoxKind, EnemyTank, EntityId, SupplyBox};
use crate::events::GameEvent;
use crate::persistence::{
    AchievementLedger, Leaderboard, ManualClock, MemoryStore, Services,
};
use crate::timer::SimTime;
use crate::world::World;

/// Tick length used by the scenarios, in milliseconds.
pub const TICK_MS: u64 = 16;

// =============================================================================
// Setup
// =============================================================================

/// Default configuration with population reconciliation switched off.
pub fn quiet_config(mode: GameMode) -> GameConfig {
    let mut config = GameConfig::with_mode(mode);
    config.spawn.min_boxes = 0;
    config.spawn.enemy_steps.clear();
    config.spawn.enemy_cap = 0;
    config
}

/// In-memory services on a manual clock starting at `epoch_ms`.
pub fn manual_services(epoch_ms: u64) -> (Services, ManualClock) {
    let clock = ManualClock::new(epoch_ms);
    let services = Services {
        archive: Box::new(Leaderboard::new(MemoryStore::default())),
        achievements: Box::new(AchievementLedger::new(MemoryStore::default())),
        clock: Box::new(clock.clone()),
    };
    (services, clock)
}

/// A world built from [`quiet_config`] with seed 42.
pub fn quiet_world(mode: GameMode) -> World {
    let (services, _clock) = manual_services(0);
    World::new(quiet_config(mode), 42, services).unwrap()
}

/// A world with the default configuration.
pub fn default_world(mode: GameMode, seed: u64) -> World {
    let (services, _clock) = manual_services(0);
    World::new(GameConfig::with_mode(mode), seed, services).unwrap()
}

// =============================================================================
// Entities
// =============================================================================

/// Places a box of `kind` at `position`.
pub fn spawn_box(world: &mut World, position: Vec2, kind: BoxKind) -> EntityId {
    let radius = world.config().entities.box_radius;
    let arena = world.arena_mut();
    let id = arena.next_id();
    arena.insert_box(SupplyBox::new(id, position, radius, kind));
    id
}

/// Places an enemy that chases at zero speed, so it holds its position.
pub fn spawn_parked_enemy(world: &mut World, position: Vec2) -> EntityId {
    spawn_enemy(world, position, Behavior::Chasing(ChaseController::new(0.0)))
}

/// Places a chasing enemy at `position` moving at `speed`.
pub fn spawn_chaser(world: &mut World, position: Vec2, speed: f32) -> EntityId {
    spawn_enemy(world, position, Behavior::Chasing(ChaseController::new(speed)))
}

/// Places a wandering enemy at `position`.
pub fn spawn_wanderer(world: &mut World, position: Vec2, seed: u64) -> EntityId {
    use rand::SeedableRng;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    let behavior = Behavior::Wandering(WanderController::new(70.0, 1000, world.now(), &mut rng));
    spawn_enemy(world, position, behavior)
}

fn spawn_enemy(world: &mut World, position: Vec2, behavior: Behavior) -> EntityId {
    let radius = world.config().entities.enemy_radius;
    let arena = world.arena_mut();
    let id = arena.next_id();
    arena.insert_enemy(EnemyTank::new(id, position, radius, behavior));
    id
}

/// Live tank position.
pub fn tank_position(world: &World) -> Vec2 {
    world.arena().live_tank().unwrap().body.position
}

/// Turns the tank to face `degrees` without moving it.
pub fn face(world: &mut World, degrees: f32) {
    world.arena_mut().tank_mut().unwrap().body.set_rotation(degrees);
}

// =============================================================================
// Driving
// =============================================================================

/// Steps `ticks` times with an idle stick.
pub fn run_idle(world: &mut World, ticks: usize) {
    for _ in 0..ticks {
        world.step(TICK_MS, Joystick::idle());
    }
}

/// Steps until simulation time reaches at least `until`.
pub fn run_until(world: &mut World, until: SimTime) {
    while world.now() < until {
        world.step(TICK_MS, Joystick::idle());
    }
}

/// Drains the event stream into a vector.
pub fn take_events(world: &mut World) -> Vec<GameEvent> {
    world.drain_events().collect()
}
