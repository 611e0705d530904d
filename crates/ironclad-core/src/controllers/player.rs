//! Joystick-driven movement for the player's tank.

use glam::Vec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{MovementContext, MovementController};
use crate::entity::Body;
use crate::spatial::unit_from_degrees;

/// Decoded joystick state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Joystick {
    /// Direction in degrees, counter-clockwise from +X
    pub angle_deg: f32,
    /// Deflection in `[0, 1]`; 0 means no movement intent
    pub magnitude: f32,
}

impl Joystick {
    /// Creates a joystick reading. Magnitude is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(angle_deg: f32, magnitude: f32) -> Self {
        Self {
            angle_deg,
            magnitude: magnitude.clamp(0.0, 1.0),
        }
    }

    /// Centred stick.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            angle_deg: 0.0,
            magnitude: 0.0,
        }
    }
}

/// Moves the tank along the joystick direction, scaled by deflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerController {
    speed: f32,
    input: Joystick,
}

impl PlayerController {
    /// Creates a controller with full-deflection `speed` in units per second.
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            input: Joystick::idle(),
        }
    }

    /// Latches the joystick reading for the next tick.
    pub fn set_input(&mut self, input: Joystick) {
        self.input = input;
    }

    /// Current joystick reading.
    #[must_use]
    pub const fn input(&self) -> Joystick {
        self.input
    }
}

impl MovementController for PlayerController {
    fn propose(
        &mut self,
        body: &mut Body,
        ctx: &MovementContext,
        _rng: &mut dyn RngCore,
    ) -> Option<Vec2> {
        let magnitude = self.input.magnitude.clamp(0.0, 1.0);
        if magnitude <= 0.0 {
            return None;
        }
        body.set_rotation(self.input.angle_deg);
        let step = unit_from_degrees(self.input.angle_deg) * self.speed * magnitude * ctx.dt;
        Some(ctx.bounds.clamp(body.position + step))
    }
}
