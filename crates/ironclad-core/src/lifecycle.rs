//! Round lifecycle state machine.
//!
//! ```text
//! Playing ──fatal contact──▶ GameOver ──▶ Countdown(n) ──tick──▶ … ──▶ Countdown(1)
//!    ▲                                                                   │ tick
//!    └──────────── finish_reset ◀──────────── Resetting ◀────────────────┘
//!
//! any state ──exit──▶ Exited (terminal)
//! ```
//!
//! The lifecycle only tracks state. The world performs the side effects each
//! transition asks for (destroying the tank, resetting counters, rebuilding
//! the round) and reads the recorded [`StateChange`]s back out to publish them.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// Normal play
    Playing,
    /// The tank was destroyed; passes straight to the countdown
    GameOver,
    /// Seconds left before the round is rebuilt
    Countdown(u32),
    /// The round is being rebuilt
    Resetting,
    /// Torn down; no further transitions
    Exited,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "Playing"),
            Self::GameOver => write!(f, "GameOver"),
            Self::Countdown(n) => write!(f, "Countdown({n})"),
            Self::Resetting => write!(f, "Resetting"),
            Self::Exited => write!(f, "Exited"),
        }
    }
}

/// One recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// State left
    pub from: RoundState,
    /// State entered
    pub to: RoundState,
}

/// What a countdown tick asks the world to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Not counting down; nothing to do
    Ignored,
    /// Show the remaining seconds
    Tick {
        /// Seconds left
        remaining: u32,
    },
    /// Last second: reset score and round counters now
    ResetCounters,
    /// Countdown over: rebuild the round, then call
    /// [`RoundLifecycle::finish_reset`]
    Rebuild,
}

/// The play / game-over / countdown / reset cycle.
#[derive(Debug, Clone)]
pub struct RoundLifecycle {
    state: RoundState,
    countdown_secs: u32,
    changes: Vec<StateChange>,
}

impl RoundLifecycle {
    /// Starts in [`RoundState::Playing`]. A zero countdown is treated as one
    /// second.
    #[must_use]
    pub fn new(countdown_secs: u32) -> Self {
        Self {
            state: RoundState::Playing,
            countdown_secs: countdown_secs.max(1),
            changes: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.state
    }

    /// Returns true in [`RoundState::Playing`].
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.state, RoundState::Playing)
    }

    /// Returns true once the round has been torn down.
    #[must_use]
    pub const fn is_exited(&self) -> bool {
        matches!(self.state, RoundState::Exited)
    }

    /// Configured countdown length.
    #[must_use]
    pub const fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    fn transition(&mut self, to: RoundState) {
        let from = self.state;
        self.state = to;
        info!(%from, %to, "round state changed");
        self.changes.push(StateChange { from, to });
    }

    /// The tank took fatal contact. Moves `Playing → GameOver → Countdown(n)`
    /// and returns `n`, or `None` if not playing.
    ///
    /// A one-second countdown starts on its last second, so the caller should
    /// reset counters immediately when `n == 1`.
    pub fn fatal_contact(&mut self) -> Option<u32> {
        if !self.is_playing() {
            return None;
        }
        self.transition(RoundState::GameOver);
        self.transition(RoundState::Countdown(self.countdown_secs));
        Some(self.countdown_secs)
    }

    /// Advances the countdown by one second.
    pub fn countdown_tick(&mut self) -> CountdownStep {
        let RoundState::Countdown(n) = self.state else {
            return CountdownStep::Ignored;
        };
        let remaining = n.saturating_sub(1);
        if remaining == 0 {
            self.transition(RoundState::Resetting);
            return CountdownStep::Rebuild;
        }
        self.transition(RoundState::Countdown(remaining));
        if remaining == 1 {
            CountdownStep::ResetCounters
        } else {
            CountdownStep::Tick { remaining }
        }
    }

    /// Completes `Resetting → Playing`. Returns false in any other state.
    pub fn finish_reset(&mut self) -> bool {
        if self.state != RoundState::Resetting {
            return false;
        }
        self.transition(RoundState::Playing);
        true
    }

    /// Moves to [`RoundState::Exited`] from any state. Returns false if
    /// already exited.
    pub fn exit(&mut self) -> bool {
        if self.is_exited() {
            return false;
        }
        self.transition(RoundState::Exited);
        true
    }

    /// Takes the transitions recorded since the last call.
    pub fn drain_changes(&mut self) -> std::vec::Drain<'_, StateChange> {
        self.changes.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(lifecycle: &mut RoundLifecycle) -> Vec<RoundState> {
        lifecycle.drain_changes().map(|c| c.to).collect()
    }

    #[test]
    fn starts_playing() {
        let lifecycle = RoundLifecycle::new(5);
        assert_eq!(lifecycle.state(), RoundState::Playing);
        assert!(lifecycle.is_playing());
    }

    #[test]
    fn full_cycle() {
        let mut lifecycle = RoundLifecycle::new(5);

        assert_eq!(lifecycle.fatal_contact(), Some(5));
        assert_eq!(
            states(&mut lifecycle),
            vec![RoundState::GameOver, RoundState::Countdown(5)]
        );

        assert_eq!(lifecycle.countdown_tick(), CountdownStep::Tick { remaining: 4 });
        assert_eq!(lifecycle.countdown_tick(), CountdownStep::Tick { remaining: 3 });
        assert_eq!(lifecycle.countdown_tick(), CountdownStep::Tick { remaining: 2 });
        assert_eq!(lifecycle.countdown_tick(), CountdownStep::ResetCounters);
        assert_eq!(lifecycle.state(), RoundState::Countdown(1));
        assert_eq!(lifecycle.countdown_tick(), CountdownStep::Rebuild);
        assert_eq!(lifecycle.state(), RoundState::Resetting);

        assert!(lifecycle.finish_reset());
        assert!(lifecycle.is_playing());
    }

    #[test]
    fn fatal_contact_ignored_outside_play() {
        let mut lifecycle = RoundLifecycle::new(7);
        lifecycle.fatal_contact();
        assert_eq!(lifecycle.fatal_contact(), None);
        assert_eq!(lifecycle.state(), RoundState::Countdown(7));
    }

    #[test]
    fn countdown_tick_ignored_while_playing() {
        let mut lifecycle = RoundLifecycle::new(5);
        assert_eq!(lifecycle.countdown_tick(), CountdownStep::Ignored);
        assert!(!lifecycle.finish_reset());
        assert!(states(&mut lifecycle).is_empty());
    }

    #[test]
    fn exit_from_any_state_is_terminal() {
        let mut lifecycle = RoundLifecycle::new(5);
        lifecycle.fatal_contact();
        lifecycle.countdown_tick();
        assert!(lifecycle.exit());
        assert!(!lifecycle.exit());
        assert_eq!(lifecycle.countdown_tick(), CountdownStep::Ignored);
        assert_eq!(lifecycle.fatal_contact(), None);
        assert!(lifecycle.is_exited());
    }

    #[test]
    fn display() {
        assert_eq!(RoundState::Countdown(3).to_string(), "Countdown(3)");
        assert_eq!(RoundState::Exited.to_string(), "Exited");
    }
}
