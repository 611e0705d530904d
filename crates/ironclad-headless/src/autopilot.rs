//! A simple scripted player.
//!
//! Priorities, highest first: pick up a waiting pilot, back away from an enemy
//! that is too close, turn to face and shoot the nearest enemy, and otherwise
//! drive towards the nearest box and shoot it.

use glam::Vec2;
use ironclad_core::spatial::heading_degrees;
use ironclad_core::{FireEdge, Joystick, World};

/// Enemies closer than this are fled from.
const DANGER_RADIUS: f32 = 160.0;
/// Boxes are approached until this close, then shot.
const BOX_RANGE: f32 = 220.0;
/// Deflection used to turn in place.
const TURN_MAGNITUDE: f32 = 0.05;

/// What the autopilot wants this tick.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    /// Stick input
    pub stick: Joystick,
    /// Fire-button edge to send before the tick, if any
    pub fire: Option<FireEdge>,
}

/// Scripted player with a fixed fire cadence.
#[derive(Debug)]
pub struct Autopilot {
    fire_every: u64,
    ticks: u64,
}

impl Autopilot {
    /// Creates an autopilot that presses fire once every `fire_every` ticks.
    pub fn new(fire_every: u64) -> Self {
        Self {
            fire_every: fire_every.max(2),
            ticks: 0,
        }
    }

    /// Decides the input for the next tick.
    pub fn decide(&mut self, world: &World) -> Decision {
        let fire = match self.ticks % self.fire_every {
            0 => Some(FireEdge::Start),
            1 => Some(FireEdge::End),
            _ => None,
        };
        self.ticks += 1;
        // Releases always go through so the button never sticks
        let release = fire.filter(|edge| *edge == FireEdge::End);

        let Some(tank) = world.arena().live_tank() else {
            return Decision {
                stick: Joystick::idle(),
                fire: release,
            };
        };
        let me = tank.body.position;
        let arena = world.arena();

        let pilot = nearest(
            me,
            arena
                .rescues()
                .values()
                .filter(|r| r.body.is_alive())
                .map(|r| r.body.position),
        );
        if let Some(pilot) = pilot {
            return Decision {
                stick: Joystick::new(heading_degrees(pilot - me), 1.0),
                fire,
            };
        }

        let enemy = nearest(
            me,
            arena
                .enemies()
                .values()
                .filter(|e| e.body.is_alive())
                .map(|e| e.body.position),
        );
        if let Some(enemy) = enemy {
            let toward = heading_degrees(enemy - me);
            if me.distance(enemy) < DANGER_RADIUS && !world.is_invincible() {
                return Decision {
                    stick: Joystick::new(toward + 180.0, 1.0),
                    fire: release,
                };
            }
            return Decision {
                stick: Joystick::new(toward, TURN_MAGNITUDE),
                fire,
            };
        }

        let target = nearest(
            me,
            arena
                .boxes()
                .values()
                .filter(|b| b.body.is_alive())
                .map(|b| b.body.position),
        );
        match target {
            Some(target) => {
                let magnitude = if me.distance(target) > BOX_RANGE {
                    1.0
                } else {
                    TURN_MAGNITUDE
                };
                Decision {
                    stick: Joystick::new(heading_degrees(target - me), magnitude),
                    fire,
                }
            }
            None => Decision {
                stick: Joystick::idle(),
                fire: release,
            },
        }
    }
}

fn nearest(from: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    points.min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}
