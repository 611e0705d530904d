//! Military rank from the cumulative rescued-unit counter.
//!
//! Independent of score rank: the counter persists across rounds and sessions
//! and maps through its own threshold table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::MilitaryRankSpec;
use crate::error::ConfigError;

/// A military rank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MilitaryRank {
    /// Position in the table
    pub index: usize,
    /// Display name
    pub name: String,
}

impl fmt::Display for MilitaryRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validated, strictly increasing threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct MilitaryTable {
    ranks: Vec<MilitaryRankSpec>,
}

impl MilitaryTable {
    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMilitaryTable`] for an empty table and
    /// [`ConfigError::NonMonotonicThreshold`] if thresholds do not strictly
    /// increase.
    pub fn new(ranks: &[MilitaryRankSpec]) -> Result<Self, ConfigError> {
        if ranks.is_empty() {
            return Err(ConfigError::EmptyMilitaryTable);
        }
        if let Some(index) = ranks
            .windows(2)
            .position(|pair| pair[1].threshold <= pair[0].threshold)
        {
            return Err(ConfigError::NonMonotonicThreshold {
                index: index + 1,
                threshold: ranks[index + 1].threshold,
            });
        }
        Ok(Self {
            ranks: ranks.to_vec(),
        })
    }

    /// Highest rank whose threshold `total` has reached. Totals below the first
    /// threshold map to the first rank.
    #[must_use]
    pub fn rank_for(&self, total: u64) -> MilitaryRank {
        let reached = self.ranks.partition_point(|r| r.threshold <= total);
        let index = reached.saturating_sub(1);
        MilitaryRank {
            index,
            name: self.ranks[index].name.clone(),
        }
    }
}
