//! Simulation clock and cooperative timer scheduler.
//!
//! All waiting in the combat core (spawn reconciliation, countdown, projectile
//! lifetime, pilot expiry) is modelled as a scheduled future callback, never as
//! a blocking call. Timers are plain data: the [`Scheduler`] hands back a
//! [`FiredTimer`] describing what is due and the world decides what to do.
//!
//! # Ownership
//!
//! Every timer has a [`TimerOwner`]. Destroying an entity must call
//! [`Scheduler::cancel_owner`] in the same step, so no callback can fire
//! against freed state. Round-scoped timers are dropped by
//! [`Scheduler::clear`] on teardown.
//!
//! # Determinism
//!
//! Due timers are popped in `(due time, timer id)` order. Timer IDs increase
//! monotonically, so two timers due at the same instant fire in the order they
//! were scheduled.
//!
//! # Example
//!
//! ```
//! use ironclad_core::timer::{Scheduler, SimTime, TimerKind, TimerOwner};
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.schedule_repeating(TimerOwner::Round, TimerKind::BoxReconcile, SimTime::ZERO, 2000);
//!
//! let fired = scheduler.pop_due(SimTime::ZERO).unwrap();
//! assert_eq!(fired.kind, TimerKind::BoxReconcile);
//! assert!(scheduler.pop_due(SimTime::from_millis(1999)).is_none());
//! assert!(scheduler.pop_due(SimTime::from_millis(2000)).is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

// =============================================================================
// SimTime
// =============================================================================

/// Simulation time in whole milliseconds since the round context started.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// The start of the round context.
    pub const ZERO: Self = Self(0);

    /// Creates a time from milliseconds.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the start.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// The instant `ms` milliseconds after this one.
    #[must_use]
    pub const fn after(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, or zero if `earlier` is later.
    #[must_use]
    pub const fn since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimTime({}ms)", self.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// =============================================================================
// Timer types
// =============================================================================

/// Handle for a scheduled timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw value of this handle.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Logical owner of a timer, used for bulk cancellation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerOwner {
    /// Lives as long as the round context
    Round,
    /// Cancelled when the entity is destroyed or recycled
    Entity(EntityId),
}

/// What a timer does when it fires.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Box population reconciliation pass
    BoxReconcile,
    /// Enemy population reconciliation pass
    EnemyReconcile,
    /// One second of the post-game-over countdown
    CountdownTick,
    /// Force-recycle a projectile that is still in flight
    ProjectileTimeout(EntityId),
    /// Place a pilot where an enemy was destroyed
    RescueSpawn {
        /// Where the enemy died
        at: Vec2,
    },
    /// A pilot waited too long
    RescueExpire(EntityId),
}

/// A timer that came due.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FiredTimer {
    /// Handle of the timer (still valid for periodic timers)
    pub id: TimerId,
    /// Owner it was scheduled for
    pub owner: TimerOwner,
    /// What to do
    pub kind: TimerKind,
    /// When it was due
    pub due: SimTime,
}

#[derive(Debug, Clone)]
struct Timer {
    owner: TimerOwner,
    kind: TimerKind,
    due: SimTime,
    period_ms: Option<u64>,
}

// =============================================================================
// Scheduler
// =============================================================================

/// Single-threaded cooperative timer scheduler.
///
/// Holds one-shot and periodic timers. Nothing fires on its own: the owner
/// drains due timers with [`Scheduler::pop_due`] once per tick, and handlers
/// may schedule or cancel timers between pops.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    next_id: u64,
    timers: BTreeMap<TimerId, Timer>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a timer that fires once at `due`.
    pub fn schedule_once(&mut self, owner: TimerOwner, kind: TimerKind, due: SimTime) -> TimerId {
        self.insert(Timer {
            owner,
            kind,
            due,
            period_ms: None,
        })
    }

    /// Schedules a timer that first fires at `first_due` and then every
    /// `period_ms` milliseconds until cancelled.
    ///
    /// A zero period is treated as one millisecond so the timer cannot spin.
    pub fn schedule_repeating(
        &mut self,
        owner: TimerOwner,
        kind: TimerKind,
        first_due: SimTime,
        period_ms: u64,
    ) -> TimerId {
        self.insert(Timer {
            owner,
            kind,
            due: first_due,
            period_ms: Some(period_ms.max(1)),
        })
    }

    fn insert(&mut self, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, timer);
        id
    }

    /// Cancels a single timer. Returns false if it was not scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Cancels every timer belonging to `owner`, returning how many were removed.
    pub fn cancel_owner(&mut self, owner: TimerOwner) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, timer| timer.owner != owner);
        before - self.timers.len()
    }

    /// Drops every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Removes and returns the earliest timer due at or before `now`.
    ///
    /// Periodic timers are re-armed one period later and keep their handle.
    /// A periodic timer that fell several periods behind fires once per call,
    /// so callers draining in a loop see every missed period.
    pub fn pop_due(&mut self, now: SimTime) -> Option<FiredTimer> {
        let (id, due) = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= now)
            .map(|(id, timer)| (*id, timer.due))
            .min_by_key(|(id, due)| (*due, *id))?;

        let timer = self.timers.get_mut(&id)?;
        let fired = FiredTimer {
            id,
            owner: timer.owner,
            kind: timer.kind,
            due,
        };
        match timer.period_ms {
            Some(period) => timer.due = due.after(period),
            None => {
                self.timers.remove(&id);
            }
        }
        Some(fired)
    }

    /// Returns true if the timer is still scheduled.
    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of timers currently held for `owner`.
    #[must_use]
    pub fn pending_for(&self, owner: TimerOwner) -> usize {
        self.timers.values().filter(|t| t.owner == owner).count()
    }

    /// Earliest due time among scheduled timers.
    #[must_use]
    pub fn next_due(&self) -> Option<SimTime> {
        self.timers.values().map(|t| t.due).min()
    }

    /// Number of scheduled timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
