//! Score, rank and promotion tracking.
//!
//! This module provides:
//! - [`RankTable`]: score → [`Rank`] derivation
//! - [`MilitaryTable`]: rescued-unit total → [`MilitaryRank`]
//! - [`ProgressionTracker`]: the per-round score state machine
//!
//! # Checkpoints
//!
//! The tracker holds the ordered queue of promotion checkpoints (one per
//! sub-level boundary). Whenever the score reaches the front checkpoint it is
//! popped and a promotion is reported. A single large jump pops every
//! checkpoint it crosses, in increasing order, and a popped checkpoint can
//! never fire again until [`ProgressionTracker::reset_round`] refills the queue.
//!
//! # Example
//!
//! ```
//! use ironclad_core::config::ProgressionConfig;
//! use ironclad_core::events::ScoreEvent;
//! use ironclad_core::entity::BoxKind;
//! use ironclad_core::progression::{Progress, ProgressionTracker};
//!
//! let mut tracker = ProgressionTracker::new(&ProgressionConfig::default(), 0).unwrap();
//! let mut out = Vec::new();
//!
//! tracker.apply(ScoreEvent::BoxDestroyed { kind: BoxKind::Treasure, score: 9_500 }, &mut out);
//! let checkpoints: Vec<u64> = out
//!     .iter()
//!     .filter_map(|p| match p {
//!         Progress::Promotion { checkpoint, .. } => Some(*checkpoint),
//!         Progress::MilitaryPromotion(_) => None,
//!     })
//!     .collect();
//! assert_eq!(checkpoints, vec![3_000, 6_000, 9_000]);
//! ```

mod military;
mod rank;

pub use military::{MilitaryRank, MilitaryTable};
pub use rank::{Rank, RankTable};

use std::collections::VecDeque;

use tracing::debug;

use crate::config::ProgressionConfig;
use crate::error::ConfigError;
use crate::events::ScoreEvent;

/// Progress notifications produced by [`ProgressionTracker::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A score checkpoint was crossed
    Promotion {
        /// The checkpoint value
        checkpoint: u64,
        /// Rank at the checkpoint
        rank: Rank,
    },
    /// The rescued-unit total reached a new military rank
    MilitaryPromotion(MilitaryRank),
}

/// Per-round score state plus the cross-round counters.
#[derive(Debug, Clone)]
pub struct ProgressionTracker {
    ranks: RankTable,
    military: MilitaryTable,
    enemy_bonus: u64,
    rescue_bonus: u64,
    score: u64,
    checkpoints: VecDeque<u64>,
    best_score: u64,
    rescued_total: u64,
}

impl ProgressionTracker {
    /// Creates a tracker with a zero score.
    ///
    /// `rescued_total` seeds the persistent rescued-unit counter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either rank table is invalid.
    pub fn new(config: &ProgressionConfig, rescued_total: u64) -> Result<Self, ConfigError> {
        let ranks = RankTable::new(config)?;
        let military = MilitaryTable::new(&config.military)?;
        let checkpoints = ranks.checkpoints().collect();
        Ok(Self {
            ranks,
            military,
            enemy_bonus: config.enemy_bonus,
            rescue_bonus: config.rescue_bonus,
            score: 0,
            checkpoints,
            best_score: 0,
            rescued_total,
        })
    }

    /// Applies a scoring fact, appending any promotions to `out`.
    ///
    /// Returns the points awarded.
    pub fn apply(&mut self, event: ScoreEvent, out: &mut Vec<Progress>) -> u64 {
        let points = match event {
            ScoreEvent::BoxDestroyed { score, .. } => score,
            ScoreEvent::EnemyDestroyed => self.enemy_bonus,
            ScoreEvent::RescueCompleted => {
                let before = self.military_rank();
                self.rescued_total = self.rescued_total.saturating_add(1);
                let after = self.military_rank();
                if after > before {
                    debug!(rank = %after, total = self.rescued_total, "military promotion");
                    out.push(Progress::MilitaryPromotion(after));
                }
                self.rescue_bonus
            }
        };
        self.add_points(points, out);
        points
    }

    fn add_points(&mut self, points: u64, out: &mut Vec<Progress>) {
        self.score = self.score.saturating_add(points);
        self.best_score = self.best_score.max(self.score);

        while let Some(&checkpoint) = self.checkpoints.front() {
            if self.score < checkpoint {
                break;
            }
            self.checkpoints.pop_front();
            let rank = self.ranks.rank_for(checkpoint);
            debug!(checkpoint, rank = %rank, "promotion");
            out.push(Progress::Promotion { checkpoint, rank });
        }
    }

    /// Zeroes the round score and refills the checkpoint queue. The best score
    /// and rescued total survive.
    pub fn reset_round(&mut self) {
        self.score = 0;
        self.checkpoints = self.ranks.checkpoints().collect();
    }

    /// Current round score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Best score seen by this tracker.
    #[must_use]
    pub const fn best_score(&self) -> u64 {
        self.best_score
    }

    /// Whole sub-levels passed this round, the input to the enemy target table.
    #[must_use]
    pub const fn score_step(&self) -> u64 {
        self.ranks.step(self.score)
    }

    /// Current score rank.
    #[must_use]
    pub fn rank(&self) -> Rank {
        self.ranks.rank_for(self.score)
    }

    /// Checkpoint that will fire next, if any remain.
    #[must_use]
    pub fn next_checkpoint(&self) -> Option<u64> {
        self.checkpoints.front().copied()
    }

    /// Checkpoints still pending this round.
    #[must_use]
    pub fn pending_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }

    /// Cumulative rescued units.
    #[must_use]
    pub const fn rescued_total(&self) -> u64 {
        self.rescued_total
    }

    /// Military rank for the current rescued total.
    #[must_use]
    pub fn military_rank(&self) -> MilitaryRank {
        self.military.rank_for(self.rescued_total)
    }

    /// The rank table in use.
    #[must_use]
    pub const fn rank_table(&self) -> &RankTable {
        &self.ranks
    }
}
