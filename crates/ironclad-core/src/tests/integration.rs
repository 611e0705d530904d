//! Integration tests for the full round pipeline.
//!
//! These tests drive a [`World`] tick by tick and check:
//! - Projectile flight, damage and recycling
//! - Score, promotions and the uncapped tier
//! - The fatal-contact / countdown / reset cycle and invincibility
//! - Pilot spawn, rescue and expiry
//! - Population reconciliation
//! - Teardown on return to menu

use glam::Vec2;

use crate::config::{GameConfig, GameMode};
use crate::controllers::Joystick;
use crate::entity::{BoxKind, EntityId};
use crate::events::{AudioCue, GameEvent, ScoreEvent};
use crate::lifecycle::RoundState;
use crate::persistence::{SceneNavigator, ScoreWindow, WallClock};
use crate::timer::{SimTime, TimerOwner};
use crate::world::{FireEdge, World};

use super::helpers::{
    default_world, face, manual_services, quiet_config, quiet_world, run_idle, run_until,
    spawn_box, spawn_chaser, spawn_parked_enemy, spawn_wanderer, take_events, tank_position,
    TICK_MS,
};

fn promotions(events: &[GameEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Promotion { checkpoint, .. } => Some(*checkpoint),
            _ => None,
        })
        .collect()
}

fn states(events: &[GameEvent]) -> Vec<RoundState> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect()
}

fn spawned_pilot(events: &[GameEvent]) -> Option<(EntityId, Vec2)> {
    events.iter().find_map(|e| match e {
        GameEvent::RescueSpawned { id, position } => Some((*id, *position)),
        _ => None,
    })
}

/// Kills a parked enemy 150 units ahead of the tank and waits for its pilot.
fn shoot_down_enemy_for_pilot(world: &mut World) -> (EntityId, Vec2) {
    let ahead = tank_position(world) + Vec2::new(150.0, 0.0);
    spawn_parked_enemy(world, ahead);
    assert!(world.fire());
    run_idle(world, 20);
    let until = world.now().after(900);
    run_until(world, until);
    let events = take_events(world);
    spawned_pilot(&events).expect("pilot should appear after the delay")
}

// =============================================================================
// Projectiles and boxes
// =============================================================================

#[test]
fn test_wood_box_end_to_end() {
    let mut world = quiet_world(GameMode::Endless);
    let origin = tank_position(&world);
    let box_id = spawn_box(&mut world, origin + Vec2::new(150.0, 0.0), BoxKind::Wood);
    take_events(&mut world);

    assert!(world.fire());
    run_idle(&mut world, 20);

    let events = take_events(&mut world);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::BoxDestroyed { id, kind: BoxKind::Wood, score: 100, .. } if *id == box_id
    )));
    assert_eq!(world.score(), 100);
    assert!(promotions(&events).is_empty());
    assert_eq!(world.progression().next_checkpoint(), Some(3_000));
    assert!(world.arena().supply_box(box_id).is_none());
    assert_eq!(world.counters().boxes_destroyed(BoxKind::Wood), 1);
}

#[test]
fn test_metal_box_needs_two_shots() {
    let mut world = quiet_world(GameMode::Endless);
    let origin = tank_position(&world);
    let box_id = spawn_box(&mut world, origin + Vec2::new(150.0, 0.0), BoxKind::Metal);

    assert!(world.fire());
    run_idle(&mut world, 20);
    let events = take_events(&mut world);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::BoxHit { remaining: 1, .. })));
    assert_eq!(world.score(), 0);
    assert_eq!(world.arena().supply_box(box_id).unwrap().hits_remaining(), 1);

    assert!(world.fire());
    run_idle(&mut world, 20);
    let events = take_events(&mut world);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::BoxDestroyed { score: 200, .. })));
    assert_eq!(world.score(), 200);
    assert!(world.arena().supply_box(box_id).is_none());
}

#[test]
fn test_hit_releases_projectile_and_cancels_timeout() {
    let mut world = quiet_world(GameMode::Endless);
    let origin = tank_position(&world);
    spawn_box(&mut world, origin + Vec2::new(150.0, 0.0), BoxKind::Treasure);
    let baseline_timers = world.scheduler().len();

    assert!(world.fire());
    let shell = *world.arena().projectiles().keys().next().unwrap();
    assert_eq!(world.pool().in_use(), 1);
    assert_eq!(world.scheduler().pending_for(TimerOwner::Entity(shell)), 1);

    run_idle(&mut world, 20);

    assert!(world.arena().projectiles().is_empty());
    assert_eq!(world.pool().in_use(), 0);
    assert_eq!(world.scheduler().pending_for(TimerOwner::Entity(shell)), 0);
    assert_eq!(world.scheduler().len(), baseline_timers);
}

#[test]
fn test_projectile_leaving_map_is_recycled() {
    let mut world = quiet_world(GameMode::Endless);
    face(&mut world, 180.0);
    assert!(world.fire());

    run_idle(&mut world, 100);

    assert!(world.arena().projectiles().is_empty());
    assert_eq!(world.pool().in_use(), 0);
    assert_eq!(world.pool().available(), world.pool().capacity());
}

#[test]
fn test_projectile_timeout_forces_release() {
    let mut config = quiet_config(GameMode::Endless);
    config.projectiles.lifetime_ms = 100;
    let (services, _clock) = manual_services(0);
    let mut world = World::new(config, 1, services).unwrap();

    assert!(world.fire());
    run_idle(&mut world, 5);
    assert_eq!(world.arena().projectiles().len(), 1);

    run_until(&mut world, SimTime::from_millis(112));
    assert!(world.arena().projectiles().is_empty());
    assert_eq!(world.pool().in_use(), 0);
}

#[test]
fn test_pool_exhaustion_drops_the_shot() {
    let mut config = quiet_config(GameMode::Endless);
    config.projectiles.pool_capacity = 2;
    let (services, _clock) = manual_services(0);
    let mut world = World::new(config, 1, services).unwrap();

    assert!(world.fire());
    assert!(world.fire());
    assert!(!world.fire());
    assert_eq!(world.counters().shots_fired, 2);
    assert_eq!(world.pool().available(), 0);
    assert_eq!(world.arena().projectiles().len(), 2);
}

#[test]
fn test_fire_edge_fires_once_per_press() {
    let mut world = quiet_world(GameMode::Endless);

    assert!(world.fire_edge(FireEdge::Start));
    assert!(!world.fire_edge(FireEdge::Start));
    assert!(!world.fire_edge(FireEdge::End));
    assert!(world.fire_edge(FireEdge::Start));
    assert_eq!(world.counters().shots_fired, 2);

    let cues: Vec<_> = take_events(&mut world)
        .iter()
        .filter_map(GameEvent::audio_cue)
        .collect();
    assert_eq!(cues, vec![AudioCue::Fire, AudioCue::Fire]);
}

// =============================================================================
// Movement
// =============================================================================

#[test]
fn test_box_blocks_tank_without_sliding() {
    let mut world = quiet_world(GameMode::Endless);
    let start = tank_position(&world);
    spawn_box(&mut world, start + Vec2::new(70.0, 0.0), BoxKind::Wood);

    for _ in 0..30 {
        world.step(TICK_MS, Joystick::new(0.0, 1.0));
    }

    let position = tank_position(&world);
    assert!(position.x > start.x);
    assert!(position.x <= start.x + 12.0);
    assert!((position.y - start.y).abs() < f32::EPSILON);
}

#[test]
fn test_tank_stays_inside_margin() {
    let mut world = quiet_world(GameMode::Endless);
    for _ in 0..400 {
        world.step(TICK_MS, Joystick::new(225.0, 1.0));
    }
    let margin = world.config().map.margin;
    let position = tank_position(&world);
    assert!((position.x - margin).abs() < 1e-3);
    assert!((position.y - margin).abs() < 1e-3);
    assert!((world.arena().tank().unwrap().body.rotation - 225.0).abs() < 1e-3);
}

#[test]
fn test_chaser_closes_in_and_wanderer_moves() {
    let mut world = quiet_world(GameMode::Endless);
    let tank = tank_position(&world);
    let chaser = spawn_chaser(&mut world, tank + Vec2::new(400.0, 0.0), 90.0);
    let wanderer = spawn_wanderer(&mut world, tank + Vec2::new(-400.0, -300.0), 3);
    let wanderer_start = world.arena().enemy(wanderer).unwrap().body.position;

    run_idle(&mut world, 30);

    let chaser_body = &world.arena().enemy(chaser).unwrap().body;
    assert!(chaser_body.position.distance(tank) < 400.0);
    assert!((chaser_body.rotation - 180.0).abs() < 1e-3);
    let moved = world.arena().enemy(wanderer).unwrap().body.position;
    assert!(moved.distance(wanderer_start) > 1.0);
}

// =============================================================================
// Progression
// =============================================================================

#[test]
fn test_score_jump_fires_every_crossed_checkpoint() {
    let mut world = quiet_world(GameMode::Endless);
    world.award(ScoreEvent::BoxDestroyed {
        kind: BoxKind::Treasure,
        score: 9_500,
    });
    assert_eq!(promotions(&take_events(&mut world)), vec![3_000, 6_000, 9_000]);
}

#[test]
fn test_apex_tier_at_66000_and_69000() {
    let mut world = quiet_world(GameMode::Endless);
    world.award(ScoreEvent::BoxDestroyed {
        kind: BoxKind::Treasure,
        score: 66_000,
    });
    let rank = world.rank();
    assert_eq!(rank.tier, "Great Wall");
    assert_eq!(rank.level, 1);
    assert_eq!(promotions(&take_events(&mut world)).len(), 22);

    world.award(ScoreEvent::BoxDestroyed {
        kind: BoxKind::Treasure,
        score: 3_000,
    });
    assert_eq!(world.rank().level, 2);
    assert!(promotions(&take_events(&mut world)).is_empty());
}

#[test]
fn test_enemy_kill_scores_bonus() {
    let mut world = quiet_world(GameMode::Endless);
    let origin = tank_position(&world);
    let enemy = spawn_parked_enemy(&mut world, origin + Vec2::new(150.0, 0.0));

    assert!(world.fire());
    run_idle(&mut world, 20);

    assert!(world.arena().enemy(enemy).is_none());
    assert_eq!(world.score(), 300);
    assert_eq!(world.counters().kills, 1);
    assert_eq!(world.state(), RoundState::Playing);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_fatal_contact_countdown_and_reset_endless() {
    let mut world = quiet_world(GameMode::Endless);
    world.award(ScoreEvent::BoxDestroyed {
        kind: BoxKind::Treasure,
        score: 1_000,
    });
    let old_tank = world.arena().tank().unwrap().id;
    let origin = tank_position(&world);
    let enemy = spawn_parked_enemy(&mut world, origin + Vec2::new(50.0, 0.0));
    take_events(&mut world);

    world.step(TICK_MS, Joystick::idle());
    let events = take_events(&mut world);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::TankDestroyed { .. })));
    assert_eq!(
        states(&events),
        vec![RoundState::GameOver, RoundState::Countdown(5)]
    );
    assert!(world.arena().enemy(enemy).is_none());
    assert!(world.arena().live_tank().is_none());
    assert!(!world.fire());

    run_until(&mut world, SimTime::from_millis(3_016));
    assert_eq!(world.state(), RoundState::Countdown(2));
    assert_eq!(world.score(), 1_000);

    run_until(&mut world, SimTime::from_millis(4_016));
    assert_eq!(world.state(), RoundState::Countdown(1));
    assert_eq!(world.score(), 0);
    assert_eq!(*world.counters(), crate::world::RoundCounters::default());

    run_until(&mut world, SimTime::from_millis(5_016));
    assert_eq!(world.state(), RoundState::Playing);
    let tank = world.arena().live_tank().unwrap();
    assert_ne!(tank.id, old_tank);
    assert_eq!(tank.body.position, world.arena().bounds().center());
    assert!(!world.is_invincible());
    assert_eq!(world.best_score(), 1_000);

    let events = take_events(&mut world);
    let ticks: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::CountdownTick { remaining } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![4, 3, 2, 1, 0]);
    assert!(events.iter().any(|e| matches!(e, GameEvent::RoundReset)));
    assert_eq!(
        states(&events).last(),
        Some(&RoundState::Playing)
    );
}

#[test]
fn test_countdown_spawns_keep_respawn_point_clear() {
    let mut config = GameConfig::with_mode(GameMode::Endless);
    // chasers hold still while there is no tank to chase
    config.spawn.wandering_weight = 0;
    let clearance = config.spawn.player_clearance;
    let (services, _clock) = manual_services(0);
    let mut world = World::new(config, 11, services).unwrap();
    let center = world.arena().bounds().center();

    let origin = tank_position(&world);
    spawn_parked_enemy(&mut world, origin + Vec2::new(50.0, 0.0));
    world.step(TICK_MS, Joystick::idle());
    assert!(world.arena().live_tank().is_none());

    // Empty the map so the countdown passes repopulate all of it.
    let arena = world.arena_mut();
    arena.boxes_mut().values_mut().for_each(|b| b.body.destroy());
    arena.enemies_mut().values_mut().for_each(|e| e.body.destroy());
    take_events(&mut world);

    run_until(&mut world, SimTime::from_millis(5_016));
    assert_eq!(world.state(), RoundState::Playing);
    let events = take_events(&mut world);
    let spawns: Vec<Vec2> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::BoxSpawned { position, .. } | GameEvent::EnemySpawned { position, .. } => {
                Some(*position)
            }
            _ => None,
        })
        .collect();
    assert!(spawns.len() >= 20);
    for position in spawns {
        assert!(
            position.distance(center) >= clearance,
            "spawned at {position} during countdown"
        );
    }

    let rebuilt = tank_position(&world);
    for _ in 0..10 {
        world.step(TICK_MS, Joystick::new(0.0, 1.0));
    }
    assert_eq!(world.state(), RoundState::Playing);
    assert_ne!(tank_position(&world), rebuilt);
}

#[test]
fn test_reset_renews_invincibility_in_rescue_mode() {
    let mut world = quiet_world(GameMode::Rescue);
    assert!(!world.is_invincible());
    let origin = tank_position(&world);
    spawn_parked_enemy(&mut world, origin + Vec2::new(50.0, 0.0));

    world.step(TICK_MS, Joystick::idle());
    assert_eq!(world.state(), RoundState::Countdown(7));

    run_until(&mut world, SimTime::from_millis(7_016));
    assert_eq!(world.state(), RoundState::Playing);
    assert!(world.is_invincible());
    take_events(&mut world);

    run_until(&mut world, SimTime::from_millis(12_032));
    assert!(!world.is_invincible());
    assert!(take_events(&mut world)
        .iter()
        .any(|e| matches!(e, GameEvent::InvincibilityEnded)));
}

#[test]
fn test_invincible_contact_only_grazes() {
    let mut world = quiet_world(GameMode::Rescue);
    world.arena_mut().tank_mut().unwrap().invincible_until = SimTime::from_millis(10_000);
    let origin = tank_position(&world);
    let enemy = spawn_parked_enemy(&mut world, origin + Vec2::new(50.0, 0.0));

    run_idle(&mut world, 3);

    assert_eq!(world.state(), RoundState::Playing);
    assert!(world.arena().enemy(enemy).unwrap().body.is_alive());
    assert!(world.arena().live_tank().is_some());
    let events = take_events(&mut world);
    let grazes = |events: &[GameEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::TankGrazed { enemy: id } if *id == enemy))
            .count()
    };
    assert_eq!(grazes(&events), 1);
    assert!(states(&events).is_empty());

    // Breaking contact and touching again counts as a new graze.
    world.arena_mut().enemies_mut().get_mut(&enemy).unwrap().body.position =
        origin + Vec2::new(300.0, 0.0);
    run_idle(&mut world, 2);
    world.arena_mut().enemies_mut().get_mut(&enemy).unwrap().body.position =
        origin + Vec2::new(50.0, 0.0);
    run_idle(&mut world, 2);
    assert_eq!(grazes(&take_events(&mut world)), 1);
}

#[test]
fn test_one_second_countdown_resets_immediately() {
    let mut config = quiet_config(GameMode::Endless);
    config.round.countdown_endless_secs = 1;
    let (services, _clock) = manual_services(0);
    let mut world = World::new(config, 1, services).unwrap();
    world.award(ScoreEvent::EnemyDestroyed);
    let origin = tank_position(&world);
    spawn_parked_enemy(&mut world, origin + Vec2::new(50.0, 0.0));

    world.step(TICK_MS, Joystick::idle());
    assert_eq!(world.state(), RoundState::Countdown(1));
    assert_eq!(world.score(), 0);

    run_until(&mut world, SimTime::from_millis(1_016));
    assert_eq!(world.state(), RoundState::Playing);
}

#[test]
fn test_fatal_contact_records_best_score() {
    let (services, clock) = manual_services(5_000);
    let mut world = World::new(quiet_config(GameMode::Endless), 1, services).unwrap();
    world.award(ScoreEvent::BoxDestroyed {
        kind: BoxKind::Treasure,
        score: 4_200,
    });
    let origin = tank_position(&world);
    spawn_parked_enemy(&mut world, origin + Vec2::new(50.0, 0.0));
    world.step(TICK_MS, Joystick::idle());

    clock.advance(60_000);
    let mut services = world.into_services();
    let best = services
        .archive
        .best(ScoreWindow::Daily, clock.now_epoch_ms())
        .unwrap()
        .unwrap();
    assert_eq!(best.score, 4_200);
    assert_eq!(best.recorded_at_ms, 5_000);
    assert_eq!(best.rank, "Bronze 2");
}

// =============================================================================
// Rescue
// =============================================================================

#[test]
fn test_pilot_rescue_is_idempotent_and_persisted() {
    let mut world = quiet_world(GameMode::Rescue);
    let (pilot, position) = shoot_down_enemy_for_pilot(&mut world);
    assert_eq!(position, tank_position(&world) + Vec2::new(150.0, 0.0));
    assert_eq!(world.scheduler().pending_for(TimerOwner::Entity(pilot)), 1);

    assert!(world.rescue(pilot));
    assert!(!world.rescue(pilot));
    assert_eq!(world.scheduler().pending_for(TimerOwner::Entity(pilot)), 0);
    assert_eq!(world.score(), 800);
    assert_eq!(world.counters().rescues, 1);
    assert_eq!(world.progression().rescued_total(), 1);

    let events = take_events(&mut world);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::Rescued { total: 1, .. })));

    run_idle(&mut world, 1);
    assert_eq!(world.arena().live_rescue_count(), 0);
    assert!(world.arena().rescues().is_empty());

    let services = world.into_services();
    assert_eq!(services.achievements.rescued_total().unwrap(), 1);
}

#[test]
fn test_pilot_expires_after_lifetime() {
    let mut world = quiet_world(GameMode::Rescue);
    let (pilot, _) = shoot_down_enemy_for_pilot(&mut world);

    let until = world.now().after(7_000);
    run_until(&mut world, until);

    assert!(take_events(&mut world)
        .iter()
        .any(|e| matches!(e, GameEvent::RescueExpired { id } if *id == pilot)));
    assert!(!world.rescue(pilot));
    assert_eq!(world.progression().rescued_total(), 0);
}

#[test]
fn test_driving_over_pilot_rescues_it() {
    let mut world = quiet_world(GameMode::Rescue);
    let (pilot, _) = shoot_down_enemy_for_pilot(&mut world);

    for _ in 0..60 {
        world.step(TICK_MS, Joystick::new(0.0, 1.0));
    }

    assert!(take_events(&mut world)
        .iter()
        .any(|e| matches!(e, GameEvent::Rescued { id, .. } if *id == pilot)));
}

#[test]
fn test_no_pilots_in_endless_mode() {
    let mut world = quiet_world(GameMode::Endless);
    let origin = tank_position(&world);
    spawn_parked_enemy(&mut world, origin + Vec2::new(150.0, 0.0));
    assert!(world.fire());
    run_until(&mut world, SimTime::from_millis(2_000));
    assert!(spawned_pilot(&take_events(&mut world)).is_none());
    assert!(world.arena().rescues().is_empty());
}

#[test]
fn test_rescues_reach_military_promotion() {
    let (mut services, _clock) = manual_services(0);
    services.achievements.store_rescued_total(4).unwrap();
    let mut world = World::new(quiet_config(GameMode::Rescue), 1, services).unwrap();
    assert_eq!(world.military_rank().name, "Private");

    let (pilot, _) = shoot_down_enemy_for_pilot(&mut world);
    assert!(world.rescue(pilot));

    assert_eq!(world.military_rank().name, "Corporal");
    assert!(take_events(&mut world)
        .iter()
        .any(|e| matches!(e, GameEvent::MilitaryPromotion { rank } if rank.name == "Corporal")));
}

// =============================================================================
// Population
// =============================================================================

#[test]
fn test_initial_population_and_replenishment() {
    let mut world = default_world(GameMode::Endless, 11);
    assert_eq!(world.arena().live_box_count(), 20);
    assert_eq!(world.arena().live_enemy_count(), 3);
    assert!(world.arena().live_boxes_of(BoxKind::Treasure) <= 1);

    let doomed: Vec<EntityId> = world.arena().boxes().keys().take(5).copied().collect();
    for id in &doomed {
        world.arena_mut().box_mut(*id).unwrap().body.destroy();
    }

    run_until(&mut world, SimTime::from_millis(2_000));

    assert_eq!(world.arena().live_box_count(), 20);
    for id in &doomed {
        assert!(world.arena().supply_box(*id).is_none());
    }
    assert!(world.arena().live_boxes_of(BoxKind::Treasure) <= 1);
}

#[test]
fn test_enemy_target_grows_with_score() {
    let mut config = quiet_config(GameMode::Endless);
    config.spawn.enemy_steps = crate::config::SpawnConfig::default().enemy_steps;
    config.spawn.enemy_cap = 7;
    config.movement.chase_speed = 0.0;
    config.movement.wander_speed = 0.0;
    let (services, _clock) = manual_services(0);
    let mut world = World::new(config, 5, services).unwrap();
    assert_eq!(world.arena().live_enemy_count(), 3);

    world.award(ScoreEvent::BoxDestroyed {
        kind: BoxKind::Treasure,
        score: 18_000,
    });
    assert_eq!(world.progression().score_step(), 6);
    run_until(&mut world, SimTime::from_millis(2_000));

    assert_eq!(world.arena().live_enemy_count(), 4);
}

// =============================================================================
// Teardown
// =============================================================================

#[derive(Default)]
struct RecordingNavigator {
    calls: usize,
}

impl SceneNavigator for RecordingNavigator {
    fn return_to_menu(&mut self) {
        self.calls += 1;
    }
}

#[test]
fn test_return_to_menu_releases_everything() {
    let mut world = default_world(GameMode::Rescue, 3);
    assert!(world.fire());
    assert!(world.fire());
    world.award(ScoreEvent::BoxDestroyed {
        kind: BoxKind::Wood,
        score: 1_200,
    });
    let mut navigator = RecordingNavigator::default();

    world.return_to_menu(&mut navigator);

    assert_eq!(navigator.calls, 1);
    assert_eq!(world.state(), RoundState::Exited);
    assert!(world.scheduler().is_empty());
    assert_eq!(world.pool().in_use(), 0);
    assert_eq!(world.arena().entity_count(), 0);
    assert!(take_events(&mut world)
        .iter()
        .any(|e| matches!(e, GameEvent::ReturnedToMenu)));

    let tick = world.tick();
    world.step(TICK_MS, Joystick::new(0.0, 1.0));
    assert_eq!(world.tick(), tick);
    assert!(!world.fire());

    world.return_to_menu(&mut navigator);
    assert_eq!(navigator.calls, 1);

    let mut services = world.into_services();
    let best = services.archive.best(ScoreWindow::Monthly, 0).unwrap().unwrap();
    assert_eq!(best.score, 1_200);
}
