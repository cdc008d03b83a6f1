//! Per-turn statistics, computed by replaying the log once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_clock::cache::TimeCache;
use tally_core::action::GameAction;
use tally_core::score::victory_points;
use tally_core::supply::Supply;
use tally_core::TallyError;

use crate::apply::apply_in_place;
use crate::state::GameState;

/// What the table looked like when a turn ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnStatistics {
    pub turn: u32,
    /// Whose turn it was.
    pub player_index: Option<usize>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Pause-adjusted turn length in milliseconds.
    pub duration_ms: i64,
    /// Every player's victory points at the end of the turn.
    pub player_scores: Vec<i64>,
    pub supply: Supply,
}

/// One record per completed turn of `state`'s log.
///
/// A turn completes at NEXT_TURN or END_GAME. Fails like
/// [`reconstruct`](crate::reconstruct::reconstruct) if the log cannot be
/// replayed.
pub fn turn_statistics(state: &GameState) -> Result<Vec<TurnStatistics>, TallyError> {
    let first = state.log.first().ok_or(TallyError::EmptyLog)?;
    if first.action != GameAction::StartGame {
        return Err(TallyError::InvalidStartEntry {
            found: first.action,
        });
    }

    let cache = if state.time_cache.is_valid_for(&state.log) {
        state.time_cache.clone()
    } else {
        TimeCache::rebuild(&state.log)
    };
    let adjusted = |index: usize| cache.get(index).map_or(0, |e| e.adjusted_duration_ms);

    let mut replay = state.initial()?;
    let mut stats = Vec::new();
    let mut turn = 1;
    let mut turn_start = 0;

    for (index, entry) in state.log.iter().enumerate() {
        apply_in_place(&mut replay, entry)?;
        if !matches!(entry.action, GameAction::NextTurn | GameAction::EndGame) {
            continue;
        }
        let opener = &state.log[turn_start];
        stats.push(TurnStatistics {
            turn,
            player_index: opener.player_index,
            start: opener.timestamp,
            end: entry.timestamp,
            duration_ms: (adjusted(index) - adjusted(turn_start)).max(0),
            player_scores: replay.players.iter().map(victory_points).collect(),
            supply: replay.supply.clone(),
        });
        if entry.action == GameAction::EndGame {
            break;
        }
        turn += 1;
        turn_start = index;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tally_core::options::GameOptions;
    use tally_core::supply::SupplyPile;

    use crate::state::new_game;
    use crate::validate::{append, ActionRequest};

    #[test]
    fn one_record_per_completed_turn() {
        let t0 = Utc::now();
        let state = new_game(&["A", "B"], GameOptions::default(), 0, t0).unwrap();
        let state = append(
            &state,
            ActionRequest::new(GameAction::AddDuchies).player(0).count(1).at(t0 + Duration::minutes(1)),
        )
        .unwrap();
        let state = append(&state, ActionRequest::next_turn(&state).at(t0 + Duration::minutes(3))).unwrap();
        let state = append(
            &state,
            ActionRequest::new(GameAction::AddProvinces).player(1).count(1).at(t0 + Duration::minutes(4)),
        )
        .unwrap();
        let state = append(&state, ActionRequest::new(GameAction::EndGame).at(t0 + Duration::minutes(8))).unwrap();

        let stats = turn_statistics(&state).unwrap();
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].turn, 1);
        assert_eq!(stats[0].player_index, Some(0));
        assert_eq!(stats[0].duration_ms, 3 * 60_000);
        assert_eq!(stats[0].player_scores, vec![6, 3]);
        assert_eq!(stats[0].supply.get(SupplyPile::Duchies), Some(7));

        assert_eq!(stats[1].turn, 2);
        assert_eq!(stats[1].player_index, Some(1));
        assert_eq!(stats[1].duration_ms, 5 * 60_000);
        assert_eq!(stats[1].player_scores, vec![6, 9]);
    }

    #[test]
    fn game_without_turn_boundaries_has_no_records() {
        let state = new_game(&["A", "B"], GameOptions::default(), 0, Utc::now()).unwrap();
        assert!(turn_statistics(&state).unwrap().is_empty());
    }
}
