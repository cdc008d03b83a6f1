//! Tally Core -- the vocabulary of the game-tally engine.
//!
//! This crate defines everything a game log is made of: the closed set of
//! [`GameAction`](action::GameAction)s, the [`LogEntry`](entry::LogEntry)
//! records that carry them, the per-player counters they move, the shared
//! supply, game options and scoring. It has no notion of time accounting or
//! state transitions; those live in `tally-clock` and `tally-engine`.
//!
//! # Quick Start
//!
//! ```
//! use tally_core::prelude::*;
//!
//! let target = resolve_field(GameAction::AddProvinces).unwrap();
//! assert_eq!(target.bucket, Bucket::Victory);
//! assert_eq!(target.supply_pile(), Some(SupplyPile::Provinces));
//!
//! let mut player = Player::new("Ada");
//! *player.counter_mut(target.bucket, target.subfield).unwrap() += 1;
//! assert_eq!(victory_points(&player), 3 + 6);
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod entry;
pub mod field;
pub mod options;
pub mod player;
pub mod score;
pub mod supply;

use action::GameAction;
use entry::EntryId;
use field::{Bucket, Subfield};
use supply::SupplyPile;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while validating, applying or replaying game actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TallyError {
    /// The action tag is not part of the catalogue.
    #[error("invalid action '{action}'")]
    InvalidAction { action: String },

    /// A player index was supplied for an action that takes none.
    #[error("player index is not relevant for {action}")]
    PlayerIndexNotRelevant { action: GameAction },

    /// A player index was missing or out of range.
    #[error("invalid player index {index:?} for a game with {player_count} players")]
    InvalidPlayerIndex {
        index: Option<usize>,
        player_count: usize,
    },

    /// A negative or oversized count.
    #[error("invalid count {count}: counts must be between 0 and {max}", max = u32::MAX)]
    InvalidCount { count: i64 },

    /// The bucket has no such subfield.
    #[error("player field '{bucket}.{subfield}' does not exist")]
    InvalidField { bucket: Bucket, subfield: Subfield },

    /// The shared supply cannot cover a gain.
    #[error("not enough {pile} in the supply: {available} left, {requested} requested")]
    InsufficientSupply {
        pile: SupplyPile,
        available: u32,
        requested: u64,
    },

    /// A player or game-wide counter would drop below zero.
    #[error("not enough {counter}: {available} left, {requested} requested")]
    InsufficientCounter {
        counter: String,
        available: u32,
        requested: u64,
    },

    /// An addition would carry a counter or supply pile past `u32::MAX`.
    #[error("{counter} cannot grow past {max}: {current} plus {added}", max = u32::MAX)]
    CounterOverflow {
        counter: String,
        current: u32,
        added: u64,
    },

    /// There is no log to replay.
    #[error("the game log is empty")]
    EmptyLog,

    /// The first log entry is not START_GAME.
    #[error("the game log must begin with START_GAME, found {found}")]
    InvalidStartEntry { found: GameAction },

    /// A saved game predates the oldest version this build can read.
    #[error("saved game version {found} is older than the minimum compatible version {minimum}")]
    IncompatibleSaveVersion { found: String, minimum: String },

    /// Only UNPAUSE may follow PAUSE.
    #[error("the game is paused: {action} cannot be logged until it is unpaused")]
    GamePaused { action: GameAction },

    /// The trash flag was set on something other than a victory removal.
    #[error("{action} cannot be trashed: only victory removals may be")]
    InvalidTrashAction { action: GameAction },

    /// A link points at a missing entry or at an entry that is itself linked.
    #[error("linked action {linked_id} does not reference a main log entry")]
    InvalidLinkedAction { linked_id: EntryId },

    #[error("a game needs at least {minimum} players, got {count}")]
    TooFewPlayers { count: usize, minimum: usize },

    #[error("a game allows at most {maximum} players, got {count}")]
    TooManyPlayers { count: usize, maximum: usize },

    /// A saved log must end with SAVE_GAME or END_GAME to be loaded.
    #[error("a saved log must end with SAVE_GAME or END_GAME, found {found}")]
    InvalidSaveLog { found: GameAction },

    /// A version string that is not `major.minor.patch`.
    #[error("invalid version string '{0}'")]
    InvalidVersion(String),

    /// Encoding or decoding persisted data failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl TallyError {
    /// Errors raised because a counter or pile would go negative. Callers
    /// that explore moves speculatively treat these as "not possible now".
    pub fn is_insufficiency(&self) -> bool {
        matches!(
            self,
            TallyError::InsufficientSupply { .. } | TallyError::InsufficientCounter { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::action::GameAction;
    pub use crate::entry::{EntryId, LogEntry, NO_PLAYER};
    pub use crate::field::{action_for_field, resolve_field, Bucket, FieldTarget, Subfield};
    pub use crate::options::{GameOptions, MatOptions, MAX_PLAYERS, MIN_PLAYERS};
    pub use crate::player::{MatCounters, Player, TurnCounters, VictoryCounters};
    pub use crate::score::{rank_players, victory_points, RankedPlayer};
    pub use crate::supply::{initial_prophecy_suns, initial_supply, Supply, SupplyPile};
    pub use crate::TallyError;
}
