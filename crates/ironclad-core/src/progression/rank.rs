//! Score rank derivation.
//!
//! Score is cut into sub-levels of `points_per_level` points. The tier table
//! assigns consecutive sub-levels to named tiers; once the table is exhausted
//! the uncapped apex tier takes over and its level keeps growing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ProgressionConfig, TierSpec};
use crate::error::ConfigError;

/// A score rank: tier plus sub-level.
///
/// Ordering follows progression: a higher tier beats any level of a lower
/// tier, and within a tier a higher level wins.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank {
    /// Position in the tier table; the apex tier is one past the last entry
    pub tier_index: usize,
    /// Sub-level within the tier, starting at 1
    pub level: u64,
    /// Tier display name
    pub tier: String,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tier, self.level)
    }
}

/// Validated tier table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankTable {
    points_per_level: u64,
    tiers: Vec<TierSpec>,
    apex_name: String,
    total_levels: u64,
}

impl RankTable {
    /// Builds the table from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyTierTable`] for an empty table,
    /// [`ConfigError::EmptyTier`] for a tier with zero sub-levels, and
    /// [`ConfigError::InvalidValue`] for a zero `points_per_level`.
    pub fn new(config: &ProgressionConfig) -> Result<Self, ConfigError> {
        if config.points_per_level == 0 {
            return Err(ConfigError::InvalidValue {
                field: "progression.points_per_level",
                reason: "must be non-zero",
            });
        }
        if config.tiers.is_empty() {
            return Err(ConfigError::EmptyTierTable);
        }
        if let Some(tier) = config.tiers.iter().find(|t| t.levels == 0) {
            return Err(ConfigError::EmptyTier {
                name: tier.name.clone(),
            });
        }

        let total_levels = config.tiers.iter().map(|t| u64::from(t.levels)).sum();
        Ok(Self {
            points_per_level: config.points_per_level,
            tiers: config.tiers.clone(),
            apex_name: config.apex_name.clone(),
            total_levels,
        })
    }

    /// Score spanned by one sub-level.
    #[must_use]
    pub const fn points_per_level(&self) -> u64 {
        self.points_per_level
    }

    /// Sub-levels below the apex tier.
    #[must_use]
    pub const fn total_levels(&self) -> u64 {
        self.total_levels
    }

    /// Score at which the apex tier begins.
    #[must_use]
    pub const fn apex_threshold(&self) -> u64 {
        self.total_levels.saturating_mul(self.points_per_level)
    }

    /// Promotion checkpoints: one per sub-level boundary, up to and including
    /// the apex threshold.
    pub fn checkpoints(&self) -> impl Iterator<Item = u64> + '_ {
        (1..=self.total_levels).map(move |step| step * self.points_per_level)
    }

    /// Number of whole sub-levels `score` has passed.
    #[must_use]
    pub const fn step(&self, score: u64) -> u64 {
        score / self.points_per_level
    }

    /// Rank for a score.
    ///
    /// # Example
    ///
    /// ```
    /// use ironclad_core::config::ProgressionConfig;
    /// use ironclad_core::progression::RankTable;
    ///
    /// let table = RankTable::new(&ProgressionConfig::default()).unwrap();
    /// assert_eq!(table.rank_for(0).to_string(), "Bronze 1");
    /// assert_eq!(table.rank_for(12_000).to_string(), "Silver 1");
    /// assert_eq!(table.rank_for(66_000).to_string(), "Great Wall 1");
    /// assert_eq!(table.rank_for(69_000).to_string(), "Great Wall 2");
    /// ```
    #[must_use]
    pub fn rank_for(&self, score: u64) -> Rank {
        let apex = self.apex_threshold();
        if score >= apex {
            return Rank {
                tier_index: self.tiers.len(),
                level: 1 + (score - apex) / self.points_per_level,
                tier: self.apex_name.clone(),
            };
        }

        let step = self.step(score);
        let mut floor = 0;
        for (tier_index, tier) in self.tiers.iter().enumerate() {
            let ceiling = floor + u64::from(tier.levels);
            if step < ceiling {
                return Rank {
                    tier_index,
                    level: step - floor + 1,
                    tier: tier.name.clone(),
                };
            }
            floor = ceiling;
        }

        // step < total_levels whenever score < apex, so the walk always returns
        Rank {
            tier_index: self.tiers.len(),
            level: 1,
            tier: self.apex_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> RankTable {
        RankTable::new(&ProgressionConfig::default()).unwrap()
    }

    #[test]
    fn sub_level_boundaries() {
        let table = table();
        assert_eq!(table.rank_for(2_999).to_string(), "Bronze 1");
        assert_eq!(table.rank_for(3_000).to_string(), "Bronze 2");
        assert_eq!(table.rank_for(11_999).to_string(), "Bronze 4");
        assert_eq!(table.rank_for(60_000).to_string(), "Star 1");
        assert_eq!(table.rank_for(65_999).to_string(), "Star 2");
    }

    #[test]
    fn apex_is_uncapped() {
        let table = table();
        assert_eq!(table.apex_threshold(), 66_000);
        let rank = table.rank_for(66_000);
        assert_eq!(rank.tier, "Great Wall");
        assert_eq!(rank.level, 1);
        assert_eq!(table.rank_for(69_000).level, 2);
        assert_eq!(table.rank_for(1_000_000).level, 1 + (1_000_000 - 66_000) / 3000);
    }

    #[test]
    fn checkpoints_cover_every_level() {
        let table = table();
        let checkpoints: Vec<u64> = table.checkpoints().collect();
        assert_eq!(checkpoints.len(), 22);
        assert_eq!(checkpoints.first(), Some(&3_000));
        assert_eq!(checkpoints.last(), Some(&66_000));
    }

    #[test]
    fn empty_tables_rejected() {
        let mut config = ProgressionConfig::default();
        config.tiers.clear();
        assert!(matches!(RankTable::new(&config), Err(ConfigError::EmptyTierTable)));

        let mut config = ProgressionConfig::default();
        config.tiers[0].levels = 0;
        assert!(matches!(RankTable::new(&config), Err(ConfigError::EmptyTier { .. })));
    }

    #[test]
    fn custom_table() {
        let config = ProgressionConfig {
            points_per_level: 10,
            tiers: vec![
                TierSpec {
                    name: "Low".into(),
                    levels: 1,
                },
                TierSpec {
                    name: "High".into(),
                    levels: 3,
                },
            ],
            apex_name: "Top".into(),
            ..ProgressionConfig::default()
        };
        let table = RankTable::new(&config).unwrap();
        assert_eq!(table.rank_for(9).to_string(), "Low 1");
        assert_eq!(table.rank_for(10).to_string(), "High 1");
        assert_eq!(table.rank_for(39).to_string(), "High 3");
        assert_eq!(table.rank_for(40).to_string(), "Top 1");
    }

    proptest! {
        #[test]
        fn rank_is_monotonic_in_score(a in 0u64..200_000, b in 0u64..200_000) {
            let table = table();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.rank_for(low) <= table.rank_for(high));
        }
    }
}
