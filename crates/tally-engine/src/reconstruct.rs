//! Rebuilding a state from its log.

use tally_core::action::GameAction;
use tally_core::TallyError;

use crate::apply::apply_in_place;
use crate::state::GameState;

/// Replay `state.log` from a blank state with the same players and options.
///
/// The first entry must be START_GAME. Every entry goes through the action
/// applier, so a log that cannot be replayed (an insufficiency introduced by
/// removing earlier entries, say) fails with the applier's error. The
/// returned state carries a freshly built time cache.
pub fn reconstruct(state: &GameState) -> Result<GameState, TallyError> {
    let first = state.log.first().ok_or(TallyError::EmptyLog)?;
    if first.action != GameAction::StartGame {
        return Err(TallyError::InvalidStartEntry {
            found: first.action,
        });
    }

    let mut rebuilt = state.initial()?;
    rebuilt.log.reserve(state.log.len());
    for (index, entry) in state.log.iter().enumerate() {
        if let Err(err) = apply_in_place(&mut rebuilt, entry) {
            tracing::debug!(index, action = %entry.action, error = %err, "replay stopped");
            return Err(err);
        }
    }
    rebuilt.time_cache.refresh(&rebuilt.log);
    Ok(rebuilt)
}
