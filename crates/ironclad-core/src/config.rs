//! Game configuration.
//!
//! Every tuning constant of the combat core lives here, grouped by concern.
//! All groups deserialize with `#[serde(default)]`, so a JSON file only needs
//! to mention the values it overrides:
//!
//! ```
//! use ironclad_core::config::{GameConfig, GameMode};
//!
//! let config = GameConfig::from_json_str(r#"{ "mode": "Rescue", "spawn": { "min_boxes": 12 } }"#)
//!     .unwrap();
//! assert_eq!(config.mode, GameMode::Rescue);
//! assert_eq!(config.spawn.min_boxes, 12);
//! assert_eq!(config.map.width, 1600.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Game Mode
// =============================================================================

/// Which ruleset a round runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Destroy enemies and boxes for score.
    #[default]
    Endless,
    /// Endless rules plus rescuable pilots and post-reset invincibility.
    Rescue,
}

impl GameMode {
    /// Returns true if rescue-only mechanics are active.
    #[must_use]
    pub const fn is_rescue(self) -> bool {
        matches!(self, Self::Rescue)
    }
}

// =============================================================================
// Groups
// =============================================================================

/// Playfield dimensions. The map spans `[0, width] x [0, height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in world units
    pub width: f32,
    /// Map height in world units
    pub height: f32,
    /// Inset applied when clamping movement and drawing spawn positions
    pub margin: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
            margin: 40.0,
        }
    }
}

/// Collision radii per entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Player tank radius
    pub tank_radius: f32,
    /// Enemy tank radius
    pub enemy_radius: f32,
    /// Projectile radius
    pub projectile_radius: f32,
    /// Destructible box radius
    pub box_radius: f32,
    /// Rescue unit radius
    pub rescue_radius: f32,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            tank_radius: 30.0,
            enemy_radius: 30.0,
            projectile_radius: 6.0,
            box_radius: 28.0,
            rescue_radius: 20.0,
        }
    }
}

/// Movement speeds in world units per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Player tank speed at full joystick deflection
    pub tank_speed: f32,
    /// Speed of chasing enemies
    pub chase_speed: f32,
    /// Speed of wandering enemies
    pub wander_speed: f32,
    /// Interval between wandering heading changes
    pub wander_interval_ms: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            tank_speed: 240.0,
            chase_speed: 90.0,
            wander_speed: 70.0,
            wander_interval_ms: 1000,
        }
    }
}

/// Projectile flight and pooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Muzzle speed in world units per second
    pub speed: f32,
    /// Forced recycling delay after acquisition
    pub lifetime_ms: u64,
    /// Number of projectiles pre-allocated in the pool
    pub pool_capacity: usize,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 600.0,
            lifetime_ms: 5000,
            pool_capacity: 32,
        }
    }
}

/// One step of the enemy target-count table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStep {
    /// The step applies while the score tier is below this value
    pub below_tier: u64,
    /// Target number of live enemies
    pub count: usize,
}

/// Population reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Interval between box reconciliation passes
    pub box_interval_ms: u64,
    /// Interval between enemy reconciliation passes
    pub enemy_interval_ms: u64,
    /// Minimum number of live boxes
    pub min_boxes: usize,
    /// Chance a creation attempt yields Treasure when none is live
    pub treasure_chance: f64,
    /// Relative weight of Wood boxes
    pub wood_weight: u32,
    /// Relative weight of Metal boxes
    pub metal_weight: u32,
    /// Relative weight of chasing enemies
    pub chasing_weight: u32,
    /// Relative weight of wandering enemies
    pub wandering_weight: u32,
    /// Enemy target counts by score tier, in increasing `below_tier` order
    pub enemy_steps: Vec<EnemyStep>,
    /// Enemy target once every step is exceeded
    pub enemy_cap: usize,
    /// Rejection-sampling attempts per spawn
    pub max_placement_attempts: u32,
    /// Minimum distance between a spawn and the player
    pub player_clearance: f32,
    /// Minimum distance between a spawn and any enemy
    pub enemy_clearance: f32,
    /// Minimum distance between a spawn and any box
    pub box_clearance: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            box_interval_ms: 2000,
            enemy_interval_ms: 2000,
            min_boxes: 20,
            treasure_chance: 0.1,
            wood_weight: 2,
            metal_weight: 1,
            chasing_weight: 2,
            wandering_weight: 1,
            enemy_steps: vec![
                EnemyStep { below_tier: 6, count: 3 },
                EnemyStep { below_tier: 9, count: 4 },
                EnemyStep { below_tier: 12, count: 5 },
                EnemyStep { below_tier: 15, count: 6 },
            ],
            enemy_cap: 7,
            max_placement_attempts: 50,
            player_clearance: 220.0,
            enemy_clearance: 100.0,
            box_clearance: 70.0,
        }
    }
}

/// A named score tier and how many sub-levels it spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Display name
    pub name: String,
    /// Number of sub-levels in the tier
    pub levels: u32,
}

impl TierSpec {
    fn new(name: &str, levels: u32) -> Self {
        Self {
            name: name.to_string(),
            levels,
        }
    }
}

/// A military rank and the rescued-unit total that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilitaryRankSpec {
    /// Display name
    pub name: String,
    /// Cumulative rescues required
    pub threshold: u64,
}

impl MilitaryRankSpec {
    fn new(name: &str, threshold: u64) -> Self {
        Self {
            name: name.to_string(),
            threshold,
        }
    }
}

/// Score, rank and achievement tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Score spanned by one sub-level
    pub points_per_level: u64,
    /// Ordered tier table below the uncapped tier
    pub tiers: Vec<TierSpec>,
    /// Name of the uncapped tier reached after the table is exhausted
    pub apex_name: String,
    /// Score for destroying an enemy
    pub enemy_bonus: u64,
    /// Score for completing a rescue
    pub rescue_bonus: u64,
    /// Military ranks in increasing threshold order
    pub military: Vec<MilitaryRankSpec>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            points_per_level: 3000,
            tiers: vec![
                TierSpec::new("Bronze", 4),
                TierSpec::new("Silver", 4),
                TierSpec::new("Gold", 4),
                TierSpec::new("Platinum", 4),
                TierSpec::new("Diamond", 4),
                TierSpec::new("Star", 2),
            ],
            apex_name: "Great Wall".to_string(),
            enemy_bonus: 300,
            rescue_bonus: 500,
            military: vec![
                MilitaryRankSpec::new("Private", 0),
                MilitaryRankSpec::new("Corporal", 5),
                MilitaryRankSpec::new("Sergeant", 15),
                MilitaryRankSpec::new("Lieutenant", 30),
                MilitaryRankSpec::new("Captain", 50),
                MilitaryRankSpec::new("Major", 80),
                MilitaryRankSpec::new("Colonel", 120),
                MilitaryRankSpec::new("General", 180),
                MilitaryRankSpec::new("Marshal", 250),
            ],
        }
    }
}

/// Round lifecycle timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Countdown length in endless mode
    pub countdown_endless_secs: u32,
    /// Countdown length in rescue mode
    pub countdown_rescue_secs: u32,
    /// Interval between countdown ticks
    pub countdown_interval_ms: u64,
    /// Invincibility window granted on reset in rescue mode
    pub invincibility_ms: u64,
    /// Centre distance at which an enemy destroys the tank
    pub tank_hit_distance: f32,
    /// Delay between an enemy's destruction and its pilot appearing
    pub rescue_spawn_delay_ms: u64,
    /// How long a pilot waits before expiring
    pub rescue_lifetime_ms: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            countdown_endless_secs: 5,
            countdown_rescue_secs: 7,
            countdown_interval_ms: 1000,
            invincibility_ms: 5000,
            tank_hit_distance: 70.0,
            rescue_spawn_delay_ms: 800,
            rescue_lifetime_ms: 7000,
        }
    }
}

impl RoundConfig {
    /// Countdown length for the given mode.
    #[must_use]
    pub const fn countdown_secs(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::Endless => self.countdown_endless_secs,
            GameMode::Rescue => self.countdown_rescue_secs,
        }
    }
}

// =============================================================================
// GameConfig
// =============================================================================

/// Complete configuration for one round context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Ruleset
    pub mode: GameMode,
    /// Playfield
    pub map: MapConfig,
    /// Collision radii
    pub entities: EntityConfig,
    /// Movement speeds
    pub movement: MovementConfig,
    /// Projectiles
    pub projectiles: ProjectileConfig,
    /// Population reconciliation
    pub spawn: SpawnConfig,
    /// Score and rank tables
    pub progression: ProgressionConfig,
    /// Lifecycle timing
    pub round: RoundConfig,
}

impl GameConfig {
    /// Default configuration with the given mode.
    #[must_use]
    pub fn with_mode(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parses a JSON document and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation
    /// error from [`GameConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every precondition the simulation relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let map = &self.map;
        positive("map.width", map.width)?;
        positive("map.height", map.height)?;
        if map.margin < 0.0 || map.margin * 2.0 >= map.width.min(map.height) {
            return Err(ConfigError::InvalidValue {
                field: "map.margin",
                reason: "must be non-negative and smaller than half the map",
            });
        }

        let e = &self.entities;
        positive("entities.tank_radius", e.tank_radius)?;
        positive("entities.enemy_radius", e.enemy_radius)?;
        positive("entities.projectile_radius", e.projectile_radius)?;
        positive("entities.box_radius", e.box_radius)?;
        positive("entities.rescue_radius", e.rescue_radius)?;

        if self.movement.wander_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "movement.wander_interval_ms",
                reason: "must be non-zero",
            });
        }

        positive("projectiles.speed", self.projectiles.speed)?;
        if self.projectiles.pool_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "projectiles.pool_capacity",
                reason: "must be non-zero",
            });
        }

        self.validate_spawn()?;
        self.validate_progression()?;

        let round = &self.round;
        if round.countdown_endless_secs == 0 || round.countdown_rescue_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "round.countdown_secs",
                reason: "must be at least one second",
            });
        }
        if round.countdown_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "round.countdown_interval_ms",
                reason: "must be non-zero",
            });
        }
        positive("round.tank_hit_distance", round.tank_hit_distance)?;

        Ok(())
    }

    fn validate_spawn(&self) -> Result<(), ConfigError> {
        let spawn = &self.spawn;
        if spawn.box_interval_ms == 0 || spawn.enemy_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "spawn.interval_ms",
                reason: "must be non-zero",
            });
        }
        if !(0.0..=1.0).contains(&spawn.treasure_chance) {
            return Err(ConfigError::InvalidValue {
                field: "spawn.treasure_chance",
                reason: "must be within [0, 1]",
            });
        }
        if spawn.wood_weight + spawn.metal_weight == 0 {
            return Err(ConfigError::InvalidValue {
                field: "spawn.wood_weight",
                reason: "box weights must not both be zero",
            });
        }
        if spawn.chasing_weight + spawn.wandering_weight == 0 {
            return Err(ConfigError::InvalidValue {
                field: "spawn.chasing_weight",
                reason: "behavior weights must not both be zero",
            });
        }
        if spawn
            .enemy_steps
            .windows(2)
            .any(|w| w[0].below_tier >= w[1].below_tier)
        {
            return Err(ConfigError::InvalidValue {
                field: "spawn.enemy_steps",
                reason: "tiers must be strictly increasing",
            });
        }
        if spawn.max_placement_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "spawn.max_placement_attempts",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }

    fn validate_progression(&self) -> Result<(), ConfigError> {
        let progression = &self.progression;
        if progression.points_per_level == 0 {
            return Err(ConfigError::InvalidValue {
                field: "progression.points_per_level",
                reason: "must be non-zero",
            });
        }
        if progression.tiers.is_empty() {
            return Err(ConfigError::EmptyTierTable);
        }
        if let Some(tier) = progression.tiers.iter().find(|t| t.levels == 0) {
            return Err(ConfigError::EmptyTier {
                name: tier.name.clone(),
            });
        }
        if progression.military.is_empty() {
            return Err(ConfigError::EmptyMilitaryTable);
        }
        for (index, pair) in progression.military.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ConfigError::NonMonotonicThreshold {
                    index: index + 1,
                    threshold: pair[1].threshold,
                });
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: "must be a positive finite number",
        })
    }
}
