//! The action applier: one log entry in, one new state out.
//!
//! [`apply_action`] never touches its input. It works on a copy, and on any
//! error the copy is dropped, so a rejected entry leaves no trace.

use tally_core::action::GameAction;
use tally_core::entry::LogEntry;
use tally_core::field::{resolve_field, FieldTarget};
use tally_core::player::{counter_out_of_range, offset_counter};
use tally_core::TallyError;

use crate::state::{GameState, GameStep};

/// The player after `current` in seating order.
///
/// With no players there is no next player. With one player it is always
/// that player. With no current player the first seat is next.
pub fn next_player_index(current: Option<usize>, player_count: usize) -> Option<usize> {
    if player_count == 0 {
        return None;
    }
    Some(current.map_or(0, |index| (index + 1) % player_count))
}

/// The player before `current` in seating order.
pub fn previous_player_index(current: Option<usize>, player_count: usize) -> Option<usize> {
    if player_count == 0 {
        return None;
    }
    Some(current.map_or(0, |index| (index + player_count - 1) % player_count))
}

/// Apply `entry` to `state`, returning the new state with `entry` appended
/// to its log and the time cache brought up to date.
///
/// # Errors
///
/// - [`TallyError::GamePaused`] if the log ends in PAUSE and `entry` is not
///   UNPAUSE.
/// - [`TallyError::InvalidPlayerIndex`] if a counter adjustment names a
///   player that does not exist.
/// - [`TallyError::InsufficientCounter`] / [`TallyError::InsufficientSupply`]
///   if a counter or supply pile would drop below zero.
/// - [`TallyError::CounterOverflow`] if an addition would pass `u32::MAX`.
pub fn apply_action(state: &GameState, entry: &LogEntry) -> Result<GameState, TallyError> {
    let mut next = state.clone();
    apply_in_place(&mut next, entry)?;
    next.time_cache.refresh(&next.log);
    Ok(next)
}

/// Apply `entry` directly to `state` without refreshing the time cache.
///
/// On error `state` may be partially updated; callers discard it.
pub(crate) fn apply_in_place(state: &mut GameState, entry: &LogEntry) -> Result<(), TallyError> {
    if state.is_paused() && entry.action != GameAction::Unpause {
        return Err(TallyError::GamePaused {
            action: entry.action,
        });
    }

    match entry.action {
        GameAction::StartGame => {
            state.first_player_index = entry.player_index;
            state.current_player_index = entry.player_index;
            state.selected_player_index = entry.player_index;
            state.current_step = GameStep::Playing;
            state.current_turn = 1;
        }
        GameAction::EndGame => {
            state.current_step = GameStep::Ended;
        }
        GameAction::NextTurn => {
            let next_player = next_player_index(state.current_player_index, state.players.len());
            if entry.player_index != next_player {
                tracing::warn!(
                    logged = ?entry.player_index,
                    computed = ?next_player,
                    turn = state.current_turn,
                    "NEXT_TURN names a different player than seating order; using seating order"
                );
            }
            state.current_player_index = next_player;
            state.selected_player_index = next_player;
            state.current_turn += 1;
            for player in &mut state.players {
                player.begin_turn();
            }
        }
        GameAction::SelectPlayer => {
            if entry.player_index.is_some() {
                state.selected_player_index = entry.player_index;
            }
        }
        GameAction::AddProphecy | GameAction::RemoveProphecy => {
            apply_prophecy(state, entry)?;
        }
        action => {
            if let (Some(player_index), Some(target)) = (entry.player_index, resolve_field(action)) {
                apply_player_delta(state, player_index, target, entry)?;
            }
        }
    }

    state.log.push(entry.clone());
    Ok(())
}

fn apply_player_delta(
    state: &mut GameState,
    player_index: usize,
    target: FieldTarget,
    entry: &LogEntry,
) -> Result<(), TallyError> {
    let player_count = state.players.len();
    let player = state
        .players
        .get_mut(player_index)
        .ok_or(TallyError::InvalidPlayerIndex {
            index: Some(player_index),
            player_count,
        })?;

    let delta = target.delta(entry.effective_count());
    let slot = player.counter_mut(target.bucket, target.subfield)?;
    let current = *slot;
    *slot = offset_counter(current, delta).ok_or_else(|| {
        counter_out_of_range(format!("{}.{}", target.bucket, target.subfield), current, delta)
    })?;

    if !entry.trash {
        if let Some(pile) = target.supply_pile() {
            state.supply.adjust(pile, -delta)?;
        }
    }
    Ok(())
}

/// The prophecy pool only moves when Rising Sun is in use.
fn apply_prophecy(state: &mut GameState, entry: &LogEntry) -> Result<(), TallyError> {
    if !state.options.rising_sun {
        return Ok(());
    }
    let current = state.prophecy_suns.unwrap_or(0);
    let delta = entry.signed_count();
    let suns = offset_counter(current, delta)
        .ok_or_else(|| counter_out_of_range("prophecy.suns".to_owned(), current, delta))?;
    state.prophecy_suns = Some(suns);
    Ok(())
}
