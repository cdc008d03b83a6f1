//! Tally Clock -- pause-aware game time for tally logs.
//!
//! A game's wall-clock span is interrupted by pauses and by the gap between
//! saving a game and loading it again. This crate folds a log into a
//! [`TimeCache`](cache::TimeCache) holding the pause-adjusted elapsed time at
//! every entry, and answers duration questions from it:
//!
//! - [`duration_up_to`](duration::duration_up_to): game time at any instant.
//! - [`current_turn_duration`](duration::current_turn_duration) and
//!   [`turn_durations`](duration::turn_durations): per-turn spans.
//! - [`game_duration`](duration::game_duration), averages and
//!   [`format_time_span`](duration::format_time_span) for display.
//!
//! The cache is derived data and never authoritative. Queries rebuild a
//! private copy when the cache they are handed does not match the log.

#![deny(unsafe_code)]

pub mod cache;
pub mod duration;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::cache::{TimeCache, TimeCacheEntry};
    pub use crate::duration::{
        adjusted_duration_at, average_turn_duration, average_turn_duration_for_player,
        current_turn_duration, duration_up_to, format_time_span, game_duration, turn_durations,
        TurnDuration,
    };
}
