//! Collaborators that outlive a round context.
//!
//! The combat core talks to storage, time and navigation only through the
//! traits in this module:
//! - [`KeyValueStore`]: string records under fixed keys ([`MemoryStore`] ships in-crate)
//! - [`ScoreArchive`]: best scores per expiry window ([`Leaderboard`])
//! - [`AchievementStore`]: the rescued-unit counter ([`AchievementLedger`])
//! - [`WallClock`]: epoch time for record expiry ([`SystemClock`], [`ManualClock`])
//! - [`SceneNavigator`]: the host's "return to menu" hook
//!
//! A [`Services`] bundle is injected into the world and handed back when the
//! world is dropped, so nothing persists through global state.
//!
//! # Example
//!
//! ```
//! use ironclad_core::persistence::{Leaderboard, MemoryStore, ScoreArchive, ScoreWindow};
//!
//! const HOUR_MS: u64 = 60 * 60 * 1000;
//!
//! let mut board = Leaderboard::new(MemoryStore::default());
//! board.submit(4_200, "Bronze 2", 0).unwrap();
//!
//! assert_eq!(board.best(ScoreWindow::Daily, HOUR_MS).unwrap().unwrap().score, 4_200);
//! // a day later the daily record has expired, the 30-day one has not
//! assert!(board.best(ScoreWindow::Daily, 25 * HOUR_MS).unwrap().is_none());
//! assert!(board.best(ScoreWindow::Monthly, 25 * HOUR_MS).unwrap().is_some());
//! ```

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PersistenceError;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

// =============================================================================
// Storage
// =============================================================================

/// String records under string keys.
pub trait KeyValueStore {
    /// Reads a record.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Writes a record, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Backend`] if the backend refuses the write.
    fn put(&mut self, key: &str, value: String) -> Result<(), PersistenceError>;

    /// Deletes a record, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the backend refuses the delete.
    fn remove(&mut self, key: &str) -> Result<bool, PersistenceError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    /// A store that rejects every write, for exercising failure paths.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            entries: BTreeMap::new(),
            read_only: true,
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_writable(&self, key: &str) -> Result<(), PersistenceError> {
        if self.read_only {
            return Err(PersistenceError::Backend {
                key: key.to_string(),
                reason: "store is read-only".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, PersistenceError> {
        self.check_writable(key)?;
        Ok(self.entries.remove(key).is_some())
    }
}

// =============================================================================
// Clock
// =============================================================================

/// Source of wall-clock time for record expiry.
pub trait WallClock {
    /// Milliseconds since the Unix epoch.
    fn now_epoch_ms(&self) -> u64;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// A settable clock. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock reading `epoch_ms`.
    #[must_use]
    pub fn new(epoch_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(epoch_ms)),
        }
    }

    /// Sets the current instant.
    pub fn set(&self, epoch_ms: u64) {
        self.now.set(epoch_ms);
    }

    /// Moves the clock forward.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl WallClock for ManualClock {
    fn now_epoch_ms(&self) -> u64 {
        self.now.get()
    }
}

// =============================================================================
// Score archive
// =============================================================================

/// Retention windows for best-score records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreWindow {
    /// Best score of the last 24 hours
    Daily,
    /// Best score of the last 30 days
    Monthly,
}

impl ScoreWindow {
    /// Both windows.
    pub const ALL: [Self; 2] = [Self::Daily, Self::Monthly];

    /// Storage key of the window's record.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Daily => "ironclad.best.daily",
            Self::Monthly => "ironclad.best.30d",
        }
    }

    /// Age at which a record expires.
    #[must_use]
    pub const fn ttl_ms(self) -> u64 {
        match self {
            Self::Daily => DAY_MS,
            Self::Monthly => 30 * DAY_MS,
        }
    }
}

/// A persisted best score with its rank snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Round score
    pub score: u64,
    /// Rank at that score, as displayed
    pub rank: String,
    /// When the record was written
    pub recorded_at_ms: u64,
}

impl ScoreRecord {
    /// Returns true once the record is older than the window allows.
    #[must_use]
    pub const fn is_expired(&self, window: ScoreWindow, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.recorded_at_ms) >= window.ttl_ms()
    }
}

/// Best-score persistence.
pub trait ScoreArchive {
    /// Offers a finished score. Returns true if it became the best in at
    /// least one window.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if a record cannot be read or written.
    fn submit(&mut self, score: u64, rank: &str, now_ms: u64) -> Result<bool, PersistenceError>;

    /// Current best for a window. Expired records are discarded.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the record cannot be read or decoded.
    fn best(
        &mut self,
        window: ScoreWindow,
        now_ms: u64,
    ) -> Result<Option<ScoreRecord>, PersistenceError>;
}

/// [`ScoreArchive`] storing one JSON record per window.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Leaderboard<S> {
    /// Wraps a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> ScoreArchive for Leaderboard<S> {
    fn submit(&mut self, score: u64, rank: &str, now_ms: u64) -> Result<bool, PersistenceError> {
        let mut improved = false;
        for window in ScoreWindow::ALL {
            let beaten = self
                .best(window, now_ms)?
                .map_or(true, |current| score > current.score);
            if beaten {
                let record = ScoreRecord {
                    score,
                    rank: rank.to_string(),
                    recorded_at_ms: now_ms,
                };
                self.store.put(window.key(), serde_json::to_string(&record)?)?;
                debug!(?window, score, "best score recorded");
                improved = true;
            }
        }
        Ok(improved)
    }

    fn best(
        &mut self,
        window: ScoreWindow,
        now_ms: u64,
    ) -> Result<Option<ScoreRecord>, PersistenceError> {
        let Some(raw) = self.store.get(window.key())? else {
            return Ok(None);
        };
        let record: ScoreRecord = serde_json::from_str(&raw)?;
        if record.is_expired(window, now_ms) {
            debug!(?window, recorded_at_ms = record.recorded_at_ms, "discarding expired record");
            self.store.remove(window.key())?;
            return Ok(None);
        }
        Ok(Some(record))
    }
}

// =============================================================================
// Achievements
// =============================================================================

/// Persistent rescued-unit counter. Never expires.
pub trait AchievementStore {
    /// Stored total.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the counter cannot be read or decoded.
    fn rescued_total(&self) -> Result<u64, PersistenceError>;

    /// Stores a new total.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the write fails.
    fn store_rescued_total(&mut self, total: u64) -> Result<(), PersistenceError>;
}

/// [`AchievementStore`] over a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct AchievementLedger<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AchievementLedger<S> {
    const KEY: &'static str = "ironclad.achievements.rescued";

    /// Wraps a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> AchievementStore for AchievementLedger<S> {
    fn rescued_total(&self) -> Result<u64, PersistenceError> {
        match self.store.get(Self::KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(0),
        }
    }

    fn store_rescued_total(&mut self, total: u64) -> Result<(), PersistenceError> {
        self.store.put(Self::KEY, serde_json::to_string(&total)?)
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Host hook invoked once the round has been torn down.
pub trait SceneNavigator {
    /// Leave the round and show the menu.
    fn return_to_menu(&mut self);
}

/// Navigator that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl SceneNavigator for NoopNavigator {
    fn return_to_menu(&mut self) {}
}

// =============================================================================
// Services bundle
// =============================================================================

/// Collaborators injected into a round context.
pub struct Services {
    /// Best-score storage
    pub archive: Box<dyn ScoreArchive>,
    /// Rescued-unit counter storage
    pub achievements: Box<dyn AchievementStore>,
    /// Time source for record timestamps
    pub clock: Box<dyn WallClock>,
}

impl Services {
    /// In-memory stores with the system clock.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            archive: Box::new(Leaderboard::new(MemoryStore::default())),
            achievements: Box::new(AchievementLedger::new(MemoryStore::default())),
            clock: Box::new(SystemClock),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

// =============================================================================
// Percentile placeholder
// =============================================================================

/// Rough share of players scoring below `score`, in `[0, 1)`.
///
/// This is a statistical stand-in, not a population query: a saturating
/// curve over score blended with a small deterministic per-score jitter so
/// neighbouring scores do not read identically. The same score always yields
/// the same value.
#[must_use]
pub fn estimate_percentile(score: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let curve = 1.0 - (-(score as f64) / 20_000.0).exp();
    let jitter = unit_hash(score);
    (0.9 * curve + 0.1 * jitter).clamp(0.0, 0.999_999)
}

/// Splitmix64 finaliser mapped onto `[0, 1)`.
#[allow(clippy::cast_precision_loss)]
fn unit_hash(value: u64) -> f64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: u64 = 60 * 60 * 1000;

    mod leaderboard_tests {
        use super::*;

        #[test]
        fn empty_board_has_no_best() {
            let mut board = Leaderboard::new(MemoryStore::default());
            assert!(board.best(ScoreWindow::Daily, 0).unwrap().is_none());
        }

        #[test]
        fn lower_score_does_not_replace_best() {
            let mut board = Leaderboard::new(MemoryStore::default());
            assert!(board.submit(5_000, "Bronze 2", 0).unwrap());
            assert!(!board.submit(4_000, "Bronze 2", HOUR_MS).unwrap());
            let best = board.best(ScoreWindow::Monthly, HOUR_MS).unwrap().unwrap();
            assert_eq!(best.score, 5_000);
            assert_eq!(best.recorded_at_ms, 0);
        }

        #[test]
        fn expired_daily_record_is_discarded_and_replaced() {
            let mut board = Leaderboard::new(MemoryStore::default());
            board.submit(9_000, "Bronze 4", 0).unwrap();

            assert!(board.submit(100, "Bronze 1", 24 * HOUR_MS).unwrap());
            let daily = board.best(ScoreWindow::Daily, 24 * HOUR_MS).unwrap().unwrap();
            assert_eq!(daily.score, 100);
            let monthly = board.best(ScoreWindow::Monthly, 24 * HOUR_MS).unwrap().unwrap();
            assert_eq!(monthly.score, 9_000);
        }

        #[test]
        fn monthly_expires_after_thirty_days() {
            let mut board = Leaderboard::new(MemoryStore::default());
            board.submit(9_000, "Bronze 4", 0).unwrap();
            assert!(board
                .best(ScoreWindow::Monthly, 30 * 24 * HOUR_MS)
                .unwrap()
                .is_none());
            // only the daily record is left until it is read
            assert_eq!(board.store().len(), 1);
            assert!(board.best(ScoreWindow::Daily, 30 * 24 * HOUR_MS).unwrap().is_none());
            assert!(board.store().is_empty());
        }

        #[test]
        fn records_are_json() {
            let mut board = Leaderboard::new(MemoryStore::default());
            board.submit(300, "Bronze 1", 7).unwrap();
            let raw = board.store().get(ScoreWindow::Daily.key()).unwrap().unwrap();
            let record: ScoreRecord = serde_json::from_str(&raw).unwrap();
            assert_eq!(record.rank, "Bronze 1");
            assert_eq!(record.recorded_at_ms, 7);
        }

        #[test]
        fn corrupt_record_is_a_codec_error() {
            let mut store = MemoryStore::default();
            store.put(ScoreWindow::Daily.key(), "{oops".to_string()).unwrap();
            let mut board = Leaderboard::new(store);
            assert!(matches!(
                board.best(ScoreWindow::Daily, 0),
                Err(PersistenceError::Codec(_))
            ));
        }

        #[test]
        fn read_only_backend_surfaces_error() {
            let mut board = Leaderboard::new(MemoryStore::read_only());
            assert!(matches!(
                board.submit(1, "Bronze 1", 0),
                Err(PersistenceError::Backend { .. })
            ));
        }
    }

    mod achievement_tests {
        use super::*;

        #[test]
        fn counter_round_trips_without_expiry() {
            let mut ledger = AchievementLedger::new(MemoryStore::default());
            assert_eq!(ledger.rescued_total().unwrap(), 0);
            ledger.store_rescued_total(17).unwrap();
            assert_eq!(ledger.rescued_total().unwrap(), 17);
        }
    }

    mod clock_tests {
        use super::*;

        #[test]
        fn manual_clock_clones_share_time() {
            let clock = ManualClock::new(10);
            let handle = clock.clone();
            handle.advance(5);
            assert_eq!(clock.now_epoch_ms(), 15);
            clock.set(1);
            assert_eq!(handle.now_epoch_ms(), 1);
        }

        #[test]
        fn system_clock_is_after_2020() {
            assert!(SystemClock.now_epoch_ms() > 1_577_836_800_000);
        }
    }

    mod percentile_tests {
        use super::*;

        #[test]
        fn deterministic_and_in_range() {
            for score in [0, 1, 100, 3_000, 66_000, u64::MAX] {
                let p = estimate_percentile(score);
                assert!((0.0..1.0).contains(&p));
                assert_eq!(p, estimate_percentile(score));
            }
        }

        #[test]
        fn high_scores_rank_higher_on_average() {
            let low: f64 = (0..100).map(|s| estimate_percentile(s * 10)).sum();
            let high: f64 = (0..100).map(|s| estimate_percentile(60_000 + s * 10)).sum();
            assert!(high > low);
        }
    }
}
