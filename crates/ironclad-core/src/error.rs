//! Error types for startup validation and persistence.
//!
//! The simulation hot path never returns errors: dead entities are skipped,
//! pool exhaustion drops the shot, and placement exhaustion skips a spawn.
//! Errors only surface where the host can act on them: loading configuration
//! and talking to the persistence collaborators.

use thiserror::Error;

/// Configuration problems detected at startup.
///
/// These are precondition violations. A `World` is never constructed from a
/// configuration that fails validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration JSON could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A rank tier table contains no tiers.
    #[error("rank tier table is empty")]
    EmptyTierTable,

    /// A tier declares zero sub-levels.
    #[error("rank tier `{name}` has no sub-levels")]
    EmptyTier {
        /// Name of the offending tier
        name: String,
    },

    /// The military rank threshold table is empty.
    #[error("military rank table is empty")]
    EmptyMilitaryTable,

    /// Military rank thresholds are not strictly increasing.
    #[error("military rank threshold {threshold} at index {index} does not increase")]
    NonMonotonicThreshold {
        /// Index of the first out-of-order entry
        index: usize,
        /// The offending threshold value
        threshold: u64,
    },

    /// A numeric setting is outside its valid range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the setting
        field: &'static str,
        /// Human-readable constraint that was violated
        reason: &'static str,
    },
}

/// Failures reported by persistence collaborators.
///
/// The `World` logs these and carries on; persistence is best-effort.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backing store refused a write.
    #[error("storage backend rejected write for key `{key}`: {reason}")]
    Backend {
        /// Storage key that was being written
        key: String,
        /// Backend-specific reason
        reason: String,
    },

    /// A stored record could not be encoded or decoded.
    #[error("failed to encode or decode record: {0}")]
    Codec(#[from] serde_json::Error),
}
