//! Tally Engine -- event-sourced game state for a card-game scorekeeper.
//!
//! The log is the single source of truth. A [`GameState`](state::GameState)
//! is the projection of its log: every counter can be recomputed by folding
//! the log from the start. On top of that this crate provides:
//!
//! - [`validate`](validate::validate) / [`append`](validate::append): check a
//!   requested action and log it.
//! - [`apply_action`](apply::apply_action): the pure state transition.
//! - [`apply_grouped_action`](group::apply_grouped_action): several linked
//!   entries logged as one.
//! - [`reconstruct`](reconstruct::reconstruct): replay a log from scratch.
//! - [`undo`](undo::undo): remove any past entry and its linked group, then
//!   replay, refusing if any counter would go negative.
//! - [`SaveStore`](persist::SaveStore): save and load through a key/value
//!   store.
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use tally_engine::prelude::*;
//!
//! let state = new_game(&["Ann", "Ben"], GameOptions::default(), 0, Utc::now()).unwrap();
//! let state = append(&state, ActionRequest::new(GameAction::AddCoins).player(0).count(5)).unwrap();
//! let state = append(&state, ActionRequest::new(GameAction::RemoveCoins).player(0).count(3)).unwrap();
//! assert_eq!(state.players[0].turn.coins, 2);
//!
//! let outcome = undo(state, 2);
//! assert!(outcome.success);
//! assert_eq!(outcome.state.players[0].turn.coins, 5);
//! assert_eq!(outcome.state.log.len(), 2);
//! ```

#![deny(unsafe_code)]

pub mod apply;
pub mod group;
pub mod links;
pub mod persist;
pub mod reconstruct;
pub mod simulate;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod undo;
pub mod validate;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the vocabulary crate for convenience.
pub use tally_core;

/// Re-export the clock crate for convenience.
pub use tally_clock;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use tally_clock::prelude::*;
    pub use tally_core::prelude::*;

    pub use crate::apply::{apply_action, next_player_index, previous_player_index};
    pub use crate::group::{apply_grouped_action, SubAction};
    pub use crate::links::{linked_group, remove_target_and_linked, LinkGroup, LinkIndex};
    pub use crate::persist::{
        decode_state, encode_state, MemoryStorage, SaveConfig, SaveStore, SaveVersion,
        SavedGameMetadata, StorageService,
    };
    pub use crate::reconstruct::reconstruct;
    pub use crate::simulate::{simulate_session, SimulationConfig};
    pub use crate::snapshot::{state_hash, verify_replay, ReplayReport};
    pub use crate::state::{
        new_game, GameState, GameStep, GAME_VERSION, MIN_COMPATIBLE_SAVE_VERSION,
    };
    pub use crate::stats::{turn_statistics, TurnStatistics};
    pub use crate::undo::{can_undo, undo, UndoOutcome, UndoRejection};
    pub use crate::validate::{append, validate, ActionRequest};
}
