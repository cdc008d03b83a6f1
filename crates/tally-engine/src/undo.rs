//! Undo of any past log entry.
//!
//! Undoing entry `i` removes its whole linked group from the log and replays
//! what is left. If the replay would drive any counter or supply pile below
//! zero, the undo is refused and the caller keeps the state it had.
//!
//! Two gates run before any replay:
//!
//! - The game must be in [`GameStep::Playing`].
//! - START_GAME and the no-player actions are never undoable. NEXT_TURN and
//!   SELECT_PLAYER are undoable only as the last entry of the log.
//!
//! The action-kind gate is checked against every member of the targeted
//! entry's linked group, so a turn advance inside a group still has to be the
//! last entry of the log.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use tally_engine::prelude::*;
//!
//! let state = new_game(&["Ann", "Ben"], GameOptions::default(), 0, Utc::now()).unwrap();
//! let state = append(&state, ActionRequest::new(GameAction::AddCoins).player(0).count(2)).unwrap();
//! let state = append(&state, ActionRequest::new(GameAction::RemoveCoins).player(0).count(2)).unwrap();
//!
//! // Removing the gain would leave the later spend without coins to spend.
//! assert!(!can_undo(&state, 1));
//! // The spend itself can go.
//! let outcome = undo(state, 2);
//! assert!(outcome.success);
//! assert_eq!(outcome.state.players[0].turn.coins, 2);
//! ```

use tally_clock::cache::TimeCache;
use tally_core::action::GameAction;
use tally_core::TallyError;

use crate::links::{remove_target_and_linked, LinkIndex};
use crate::reconstruct::reconstruct;
use crate::state::{GameState, GameStep};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why an undo was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UndoRejection {
    #[error("log index {index} is out of range for a log of {len} entries")]
    OutOfRange { index: usize, len: usize },

    #[error("undo is only available while the game is being played (step is {step:?})")]
    NotPlaying { step: GameStep },

    #[error("{action} can never be undone")]
    NeverUndoable { action: GameAction },

    #[error("{action} can only be undone while it is the most recent entry")]
    NotMostRecent { action: GameAction },

    /// Replaying the shortened log failed.
    #[error("replay after removal failed: {0}")]
    Replay(#[source] TallyError),
}

/// Result of [`undo`]: always a usable state, plus whether it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    /// The new state on success; the caller's original state otherwise.
    pub state: GameState,
    pub success: bool,
    /// Why the undo was refused, when it was.
    pub rejection: Option<UndoRejection>,
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

fn check_kind(action: GameAction, is_last: bool) -> Result<(), UndoRejection> {
    if action.is_never_undoable() {
        return Err(UndoRejection::NeverUndoable { action });
    }
    if action.undoable_only_when_last() && !is_last {
        return Err(UndoRejection::NotMostRecent { action });
    }
    Ok(())
}

fn check_gates(state: &GameState, index: usize) -> Result<(), UndoRejection> {
    let len = state.log.len();
    if index >= len {
        return Err(UndoRejection::OutOfRange { index, len });
    }
    if state.current_step != GameStep::Playing {
        return Err(UndoRejection::NotPlaying {
            step: state.current_step,
        });
    }

    let last = len - 1;
    let links = LinkIndex::build(&state.log);
    let Some(group) = links.group(&state.log, index) else {
        return Err(UndoRejection::OutOfRange { index, len });
    };
    if group.main.is_none() && state.log[index].linked_action_id.is_some() {
        tracing::warn!(
            index,
            "undo target links to a missing entry; removing the target alone"
        );
    }
    for member in group.members {
        check_kind(state.log[member].action, member == last)?;
    }
    Ok(())
}

fn replay_without(state: &GameState, index: usize) -> Result<GameState, UndoRejection> {
    check_gates(state, index)?;
    let trimmed = remove_target_and_linked(state, index);
    reconstruct(&trimmed).map_err(UndoRejection::Replay)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Whether log entry `index` can be undone right now. Never changes `state`.
pub fn can_undo(state: &GameState, index: usize) -> bool {
    replay_without(state, index).is_ok()
}

/// Undo log entry `index` and its linked group.
///
/// On success the returned state is the replay of the shortened log with a
/// freshly built time cache. On failure the original state comes back
/// unchanged with `success == false`.
pub fn undo(state: GameState, index: usize) -> UndoOutcome {
    match replay_without(&state, index) {
        Ok(mut rebuilt) => {
            rebuilt.time_cache = TimeCache::rebuild(&rebuilt.log);
            tracing::info!(
                index,
                removed = state.log.len() - rebuilt.log.len(),
                "undo applied"
            );
            UndoOutcome {
                state: rebuilt,
                success: true,
                rejection: None,
            }
        }
        Err(rejection) => {
            match &rejection {
                UndoRejection::Replay(err) if err.is_insufficiency() => tracing::warn!(
                    index,
                    error = %err,
                    "undo refused: replay would leave a counter negative"
                ),
                other => tracing::warn!(index, reason = %other, "undo refused"),
            }
            UndoOutcome {
                state,
                success: false,
                rejection: Some(rejection),
            }
        }
    }
}
