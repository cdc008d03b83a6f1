//! Pause-adjusted duration queries over a game log.
//!
//! Every query takes the log plus its [`TimeCache`]. A cache that does not
//! match the log is rebuilt locally for the query; the caller's cache is
//! left alone. Logs that do not begin with START_GAME report zero.
//!
//! The game clock stops at END_GAME: asking for any instant after the game
//! ended returns the duration at END_GAME.

use std::borrow::Cow;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tally_core::action::GameAction;
use tally_core::entry::LogEntry;

use crate::cache::{PauseTracker, TimeCache};

fn usable<'a>(log: &[LogEntry], cache: &'a TimeCache) -> Cow<'a, TimeCache> {
    if cache.is_valid_for(log) {
        Cow::Borrowed(cache)
    } else {
        Cow::Owned(TimeCache::rebuild(log))
    }
}

fn started(log: &[LogEntry]) -> Option<&LogEntry> {
    log.first().filter(|entry| entry.action == GameAction::StartGame)
}

// ---------------------------------------------------------------------------
// Point queries
// ---------------------------------------------------------------------------

/// Pause-adjusted game time elapsed between START_GAME and `at`.
///
/// A paused interval that is still open at `at` counts as paused through
/// `at`.
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tally_clock::cache::TimeCache;
/// use tally_clock::duration::duration_up_to;
/// use tally_core::prelude::*;
///
/// let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let log = vec![
///     LogEntry::new(GameAction::StartGame, Some(0), t0),
///     LogEntry::new(GameAction::Pause, None, t0 + Duration::minutes(10)),
/// ];
/// let cache = TimeCache::rebuild(&log);
/// let elapsed = duration_up_to(&log, &cache, t0 + Duration::minutes(30));
/// assert_eq!(elapsed, Duration::minutes(10));
/// ```
pub fn duration_up_to(log: &[LogEntry], cache: &TimeCache, at: DateTime<Utc>) -> Duration {
    let Some(start) = started(log) else {
        return Duration::zero();
    };
    if at <= start.timestamp {
        return Duration::zero();
    }
    let Some(index) = log.iter().rposition(|entry| entry.timestamp <= at) else {
        return Duration::zero();
    };
    let cache = usable(log, cache);
    let Some(cached) = cache.get(index) else {
        return Duration::zero();
    };
    if log[index].action == GameAction::EndGame {
        return Duration::milliseconds(cached.adjusted_duration_ms);
    }
    let tracker = PauseTracker::from_entry(cached);
    let elapsed = (at - start.timestamp).num_milliseconds() - tracker.paused_through(at);
    Duration::milliseconds(elapsed.max(0))
}

/// Pause-adjusted game time at log entry `index`.
pub fn adjusted_duration_at(log: &[LogEntry], cache: &TimeCache, index: usize) -> Duration {
    let cache = usable(log, cache);
    cache
        .get(index)
        .map_or_else(Duration::zero, |entry| {
            Duration::milliseconds(entry.adjusted_duration_ms)
        })
}

/// Pause-adjusted time since the current turn began (the last START_GAME or
/// NEXT_TURN), measured up to `now`.
pub fn current_turn_duration(log: &[LogEntry], cache: &TimeCache, now: DateTime<Utc>) -> Duration {
    let Some(turn_start) = log
        .iter()
        .rposition(|entry| matches!(entry.action, GameAction::StartGame | GameAction::NextTurn))
    else {
        return Duration::zero();
    };
    let cache = usable(log, cache);
    let started_at = cache
        .get(turn_start)
        .map_or(0, |entry| entry.adjusted_duration_ms);
    let elapsed = duration_up_to(log, &cache, now).num_milliseconds() - started_at;
    Duration::milliseconds(elapsed.max(0))
}

/// Total pause-adjusted duration of the game up to `now`.
pub fn game_duration(log: &[LogEntry], cache: &TimeCache, now: DateTime<Utc>) -> Duration {
    duration_up_to(log, cache, now)
}

// ---------------------------------------------------------------------------
// Per-turn durations
// ---------------------------------------------------------------------------

/// The span of one completed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDuration {
    /// 1-based turn number.
    pub turn: u32,
    /// Whose turn it was.
    pub player_index: Option<usize>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Pause-adjusted length of the turn in milliseconds.
    pub duration_ms: i64,
}

impl TurnDuration {
    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms)
    }
}

/// Every completed turn in `log`. A turn begins at START_GAME or NEXT_TURN
/// and ends at the following NEXT_TURN or END_GAME.
pub fn turn_durations(log: &[LogEntry], cache: &TimeCache) -> Vec<TurnDuration> {
    let mut durations = Vec::new();
    if started(log).is_none() {
        return durations;
    }
    let cache = usable(log, cache);
    let adjusted = |index: usize| cache.get(index).map_or(0, |e| e.adjusted_duration_ms);

    let mut turn = 1;
    let mut turn_start = 0;
    for (index, entry) in log.iter().enumerate().skip(1) {
        if !matches!(entry.action, GameAction::NextTurn | GameAction::EndGame) {
            continue;
        }
        let opener = &log[turn_start];
        durations.push(TurnDuration {
            turn,
            player_index: opener.player_index,
            start: opener.timestamp,
            end: entry.timestamp,
            duration_ms: (adjusted(index) - adjusted(turn_start)).max(0),
        });
        if entry.action == GameAction::EndGame {
            break;
        }
        turn += 1;
        turn_start = index;
    }
    durations
}

/// Mean length of `turns`, or zero when there are none.
pub fn average_turn_duration(turns: &[TurnDuration]) -> Duration {
    mean(turns.iter())
}

/// Mean length of the turns taken by `player_index`.
pub fn average_turn_duration_for_player(turns: &[TurnDuration], player_index: usize) -> Duration {
    mean(
        turns
            .iter()
            .filter(|turn| turn.player_index == Some(player_index)),
    )
}

fn mean<'a>(turns: impl Iterator<Item = &'a TurnDuration>) -> Duration {
    let (total, count) = turns.fold((0i64, 0i64), |(total, count), turn| {
        (total + turn.duration_ms, count + 1)
    });
    if count == 0 {
        return Duration::zero();
    }
    Duration::milliseconds(total / count)
}

/// Format a span as `"{d}d {h}h {m}m {s}s"`. Negative spans format as zero.
///
/// ```
/// use chrono::Duration;
/// use tally_clock::duration::format_time_span;
///
/// let span = Duration::days(1) + Duration::hours(2) + Duration::seconds(65);
/// assert_eq!(format_time_span(span), "1d 2h 1m 5s");
/// assert_eq!(format_time_span(Duration::seconds(-5)), "0d 0h 0m 0s");
/// ```
pub fn format_time_span(span: Duration) -> String {
    let total = span.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}
