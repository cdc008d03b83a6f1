//! The elapsed-time cache.
//!
//! [`TimeCache`] holds one [`TimeCacheEntry`] per log entry, in log order.
//! Each cache entry records the pause bookkeeping *after* its log entry has
//! been observed, so any prefix of the cache is enough to resume the fold.
//!
//! The cache is derived data. It is valid for a log when it has the same
//! length and every cache entry's `event_id` matches the log entry at the
//! same index. [`TimeCache::refresh`] keeps the longest matching prefix and
//! extends it; [`TimeCache::rebuild`] starts over.
//!
//! # Paused intervals
//!
//! PAUSE/UNPAUSE and SAVE_GAME/LOAD_GAME both open and close paused
//! intervals. When the two overlap (a save taken while paused) the clock is
//! stopped from the first opening until both are closed, so overlapping time
//! is only subtracted once.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use tally_clock::cache::TimeCache;
//! use tally_core::prelude::*;
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
//! let log = vec![
//!     LogEntry::new(GameAction::StartGame, Some(0), t0),
//!     LogEntry::new(GameAction::Pause, None, t0 + Duration::minutes(10)),
//!     LogEntry::new(GameAction::Unpause, None, t0 + Duration::minutes(15)),
//!     LogEntry::new(GameAction::AddCoins, Some(0), t0 + Duration::minutes(20)),
//! ];
//!
//! let cache = TimeCache::rebuild(&log);
//! let last = cache.get(3).unwrap();
//! assert_eq!(last.total_pause_ms, 5 * 60 * 1000);
//! assert_eq!(last.adjusted_duration_ms, 15 * 60 * 1000);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::action::GameAction;
use tally_core::entry::{EntryId, LogEntry};

// ---------------------------------------------------------------------------
// TimeCacheEntry
// ---------------------------------------------------------------------------

/// Pause bookkeeping and pause-adjusted elapsed time at one log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCacheEntry {
    /// Id of the log entry this cache entry belongs to.
    pub event_id: EntryId,
    /// Total closed paused time so far, in milliseconds.
    pub total_pause_ms: i64,
    /// A SAVE_GAME is open (no LOAD_GAME yet).
    pub in_save_state: bool,
    /// A PAUSE is open (no UNPAUSE yet).
    pub in_pause_state: bool,
    /// When the currently open paused interval began.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_since: Option<DateTime<Utc>>,
    /// Wall-clock time since START_GAME minus paused time, in milliseconds.
    pub adjusted_duration_ms: i64,
}

// ---------------------------------------------------------------------------
// PauseTracker
// ---------------------------------------------------------------------------

/// Running pause state carried from one log entry to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PauseTracker {
    pub total_pause_ms: i64,
    pub in_save: bool,
    pub in_pause: bool,
    pub paused_since: Option<DateTime<Utc>>,
}

impl PauseTracker {
    pub fn from_entry(entry: &TimeCacheEntry) -> Self {
        Self {
            total_pause_ms: entry.total_pause_ms,
            in_save: entry.in_save_state,
            in_pause: entry.in_pause_state,
            paused_since: entry.paused_since,
        }
    }

    fn is_paused(&self) -> bool {
        self.in_save || self.in_pause
    }

    /// Fold one log action into the tracker.
    pub fn observe(&mut self, action: GameAction, at: DateTime<Utc>) {
        let was_paused = self.is_paused();
        match action {
            GameAction::SaveGame => self.in_save = true,
            GameAction::LoadGame => self.in_save = false,
            GameAction::Pause => self.in_pause = true,
            GameAction::Unpause => self.in_pause = false,
            _ => return,
        }
        match (was_paused, self.is_paused()) {
            (false, true) => self.paused_since = Some(at),
            (true, false) => {
                if let Some(since) = self.paused_since.take() {
                    self.total_pause_ms += (at - since).num_milliseconds().max(0);
                }
            }
            _ => {}
        }
    }

    /// Paused time up to `at`, counting an interval that is still open.
    pub fn paused_through(&self, at: DateTime<Utc>) -> i64 {
        let open = self
            .paused_since
            .map_or(0, |since| (at - since).num_milliseconds().max(0));
        self.total_pause_ms + open
    }

    fn snapshot(&self, entry: &LogEntry, start: DateTime<Utc>) -> TimeCacheEntry {
        let elapsed = (entry.timestamp - start).num_milliseconds();
        TimeCacheEntry {
            event_id: entry.id,
            total_pause_ms: self.total_pause_ms,
            in_save_state: self.in_save,
            in_pause_state: self.in_pause,
            paused_since: self.paused_since,
            adjusted_duration_ms: (elapsed - self.paused_through(entry.timestamp)).max(0),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeCache
// ---------------------------------------------------------------------------

/// Per-entry elapsed-time cache for a game log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeCache {
    entries: Vec<TimeCacheEntry>,
}

impl TimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache for `log` from scratch.
    ///
    /// A log that does not begin with START_GAME has no meaningful clock and
    /// yields an empty cache.
    pub fn rebuild(log: &[LogEntry]) -> Self {
        let mut cache = Self::new();
        cache.extend_from(log);
        cache
    }

    /// Bring the cache up to date with `log`, reusing every leading cache
    /// entry whose id still matches.
    pub fn refresh(&mut self, log: &[LogEntry]) {
        let valid = self.valid_prefix_len(log);
        if valid < self.entries.len() {
            tracing::debug!(
                cached = self.entries.len(),
                reused = valid,
                log_len = log.len(),
                "time cache diverged from log; truncating"
            );
            self.entries.truncate(valid);
        }
        self.extend_from(log);
    }

    fn extend_from(&mut self, log: &[LogEntry]) {
        let Some(first) = log.first() else {
            return;
        };
        if first.action != GameAction::StartGame {
            tracing::warn!(first = %first.action, "log does not begin with START_GAME; no time cache");
            self.entries.clear();
            return;
        }
        let start = first.timestamp;
        let mut tracker = self
            .entries
            .last()
            .map(PauseTracker::from_entry)
            .unwrap_or_default();
        for entry in &log[self.entries.len()..] {
            tracker.observe(entry.action, entry.timestamp);
            self.entries.push(tracker.snapshot(entry, start));
        }
    }

    /// Number of leading cache entries whose ids match `log`.
    pub fn valid_prefix_len(&self, log: &[LogEntry]) -> usize {
        self.entries
            .iter()
            .zip(log)
            .take_while(|(cached, entry)| cached.event_id == entry.id)
            .count()
    }

    /// `true` when every log entry has a matching cache entry and nothing
    /// more.
    pub fn is_valid_for(&self, log: &[LogEntry]) -> bool {
        self.entries.len() == log.len() && self.valid_prefix_len(log) == log.len()
    }

    pub fn get(&self, index: usize) -> Option<&TimeCacheEntry> {
        self.entries.get(index)
    }

    /// The cache entry recorded for log entry `id`.
    pub fn entry_for(&self, id: EntryId) -> Option<&TimeCacheEntry> {
        self.entries.iter().rev().find(|entry| entry.event_id == id)
    }

    pub fn last(&self) -> Option<&TimeCacheEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeCacheEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 19, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn entry(action: GameAction, minutes: i64) -> LogEntry {
        let player = if action.is_no_player() { None } else { Some(0) };
        LogEntry::new(action, player, t(minutes))
    }

    const MINUTE: i64 = 60_000;

    // -- 1. Fold ------------------------------------------------------------

    #[test]
    fn one_entry_per_log_entry() {
        let log = vec![
            entry(GameAction::StartGame, 0),
            entry(GameAction::AddCoins, 3),
            entry(GameAction::NextTurn, 7),
        ];
        let cache = TimeCache::rebuild(&log);
        assert_eq!(cache.len(), 3);
        assert!(cache.is_valid_for(&log));
        assert_eq!(cache.get(0).unwrap().adjusted_duration_ms, 0);
        assert_eq!(cache.get(2).unwrap().adjusted_duration_ms, 7 * MINUTE);
        assert_eq!(cache.entry_for(log[1].id).unwrap().adjusted_duration_ms, 3 * MINUTE);
    }

    #[test]
    fn save_and_load_pair_is_paused_time() {
        let log = vec![
            entry(GameAction::StartGame, 0),
            entry(GameAction::SaveGame, 10),
            entry(GameAction::LoadGame, 70),
            entry(GameAction::AddBuys, 75),
        ];
        let cache = TimeCache::rebuild(&log);
        let save = cache.get(1).unwrap();
        assert!(save.in_save_state);
        assert_eq!(save.paused_since, Some(t(10)));
        let last = cache.get(3).unwrap();
        assert!(!last.in_save_state);
        assert_eq!(last.total_pause_ms, 60 * MINUTE);
        assert_eq!(last.adjusted_duration_ms, 15 * MINUTE);
    }

    #[test]
    fn overlapping_save_and_pause_count_once() {
        let log = vec![
            entry(GameAction::StartGame, 0),
            entry(GameAction::SaveGame, 10),
            entry(GameAction::Pause, 10),
            entry(GameAction::Unpause, 30),
            entry(GameAction::LoadGame, 40),
            entry(GameAction::AddCards, 45),
        ];
        let cache = TimeCache::rebuild(&log);
        let during = cache.get(3).unwrap();
        assert!(during.in_save_state);
        assert!(!during.in_pause_state);
        assert_eq!(during.total_pause_ms, 0);
        assert_eq!(cache.last().unwrap().total_pause_ms, 30 * MINUTE);
        assert_eq!(cache.last().unwrap().adjusted_duration_ms, 15 * MINUTE);
    }

    // -- 2. Refresh ---------------------------------------------------------

    #[test]
    fn refresh_extends_and_matches_rebuild() {
        let mut log = vec![entry(GameAction::StartGame, 0), entry(GameAction::Pause, 2)];
        let mut cache = TimeCache::rebuild(&log);
        log.push(entry(GameAction::Unpause, 5));
        log.push(entry(GameAction::AddActions, 6));
        cache.refresh(&log);
        assert_eq!(cache, TimeCache::rebuild(&log));
    }

    #[test]
    fn refresh_drops_diverged_suffix() {
        let mut log = vec![
            entry(GameAction::StartGame, 0),
            entry(GameAction::Pause, 2),
            entry(GameAction::Unpause, 5),
            entry(GameAction::AddActions, 6),
        ];
        let mut cache = TimeCache::rebuild(&log);
        log.remove(1);
        log.remove(1);
        assert_eq!(cache.valid_prefix_len(&log), 1);
        cache.refresh(&log);
        assert_eq!(cache, TimeCache::rebuild(&log));
        assert_eq!(cache.last().unwrap().adjusted_duration_ms, 6 * MINUTE);
    }

    #[test]
    fn log_without_start_has_no_cache() {
        let log = vec![entry(GameAction::AddCoins, 0)];
        assert!(TimeCache::rebuild(&log).is_empty());
        assert!(TimeCache::rebuild(&[]).is_empty());
    }

    #[test]
    fn cache_serializes_as_a_list() {
        let log = vec![entry(GameAction::StartGame, 0)];
        let cache = TimeCache::rebuild(&log);
        let json = serde_json::to_value(&cache).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["adjustedDurationMs"], serde_json::json!(0));
        let back: TimeCache = serde_json::from_value(json).unwrap();
        assert_eq!(back, cache);
    }
}
