//! The validator and append path.
//!
//! Callers describe what they want logged with an [`ActionRequest`].
//! [`validate`] checks the request against the current state and produces a
//! fully populated [`LogEntry`]; [`append`] validates and applies in one step.
//!
//! Rules are checked in this order, and the first failure is returned:
//!
//! 1. The action tag is recognized ([`ActionRequest::parse`]).
//! 2. No-player actions carry no player index; every other action names a
//!    player in range.
//! 3. A supplied count is non-negative.
//! 4. The trash flag is only set on victory removals.
//! 5. A link points at an existing main entry.
//! 6. A paused game accepts nothing but UNPAUSE.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use tally_engine::prelude::*;
//!
//! let state = new_game(&["Ann", "Ben"], GameOptions::default(), 0, Utc::now()).unwrap();
//! let state = append(&state, ActionRequest::new(GameAction::AddCoins).player(0).count(3)).unwrap();
//! assert_eq!(state.players[0].turn.coins, 3);
//!
//! let err = append(&state, ActionRequest::new(GameAction::Pause).player(0)).unwrap_err();
//! assert!(matches!(err, TallyError::PlayerIndexNotRelevant { .. }));
//! ```

use std::str::FromStr;

use chrono::{DateTime, Utc};
use tally_core::action::GameAction;
use tally_core::entry::{EntryId, LogEntry};
use tally_core::field::{resolve_field, Bucket};
use tally_core::TallyError;

use crate::apply::{apply_action, next_player_index};
use crate::state::GameState;

// ---------------------------------------------------------------------------
// ActionRequest
// ---------------------------------------------------------------------------

/// A candidate log entry, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: GameAction,
    pub player_index: Option<usize>,
    /// Signed so that a negative count can be reported rather than
    /// unrepresentable.
    pub count: Option<i64>,
    pub correction: bool,
    pub trash: bool,
    pub linked_action_id: Option<EntryId>,
    pub action_name: Option<String>,
    /// Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActionRequest {
    pub fn new(action: GameAction) -> Self {
        Self {
            action,
            player_index: None,
            count: None,
            correction: false,
            trash: false,
            linked_action_id: None,
            action_name: None,
            timestamp: None,
        }
    }

    /// A request for the action with wire tag `tag`.
    ///
    /// Fails with [`TallyError::InvalidAction`] for unknown tags.
    pub fn parse(tag: &str) -> Result<Self, TallyError> {
        GameAction::from_str(tag).map(Self::new)
    }

    /// A NEXT_TURN request naming the player who is next in seating order.
    pub fn next_turn(state: &GameState) -> Self {
        let next = next_player_index(state.current_player_index, state.players.len());
        Self {
            player_index: next,
            ..Self::new(GameAction::NextTurn)
        }
    }

    pub fn player(mut self, index: usize) -> Self {
        self.player_index = Some(index);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn correction(mut self) -> Self {
        self.correction = true;
        self
    }

    pub fn trash(mut self) -> Self {
        self.trash = true;
        self
    }

    pub fn linked_to(mut self, main: EntryId) -> Self {
        self.linked_action_id = Some(main);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.action_name = Some(name.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check `request` against `state` and build the entry to append.
///
/// `state` is never modified.
pub fn validate(state: &GameState, request: ActionRequest) -> Result<LogEntry, TallyError> {
    let action = request.action;
    let player_count = state.players.len();

    if action.is_no_player() {
        if request.player_index.is_some() {
            return Err(TallyError::PlayerIndexNotRelevant { action });
        }
    } else {
        match request.player_index {
            Some(index) if index < player_count => {}
            index => return Err(TallyError::InvalidPlayerIndex { index, player_count }),
        }
    }

    let count = request
        .count
        .map(|count| u32::try_from(count).map_err(|_| TallyError::InvalidCount { count }))
        .transpose()?;

    if request.trash {
        let victory_removal = action.is_removal()
            && resolve_field(action).is_some_and(|target| target.bucket == Bucket::Victory);
        if !victory_removal {
            return Err(TallyError::InvalidTrashAction { action });
        }
    }

    if let Some(linked_id) = request.linked_action_id {
        let links_to_main = state
            .log
            .iter()
            .any(|entry| entry.id == linked_id && entry.is_main());
        if !links_to_main {
            return Err(TallyError::InvalidLinkedAction { linked_id });
        }
    }

    if state.is_paused() && action != GameAction::Unpause {
        return Err(TallyError::GamePaused { action });
    }

    let mut entry = LogEntry::new(
        action,
        request.player_index,
        request.timestamp.unwrap_or_else(Utc::now),
    );
    entry.player_name = request
        .player_index
        .and_then(|index| state.player(index))
        .map(|player| player.name.clone());
    entry.current_player_index = state.current_player_index;
    entry.turn = if action == GameAction::NextTurn {
        state.current_turn + 1
    } else {
        state.current_turn
    };
    entry.count = count;
    entry.correction = request.correction;
    entry.trash = request.trash;
    entry.linked_action_id = request.linked_action_id;
    entry.action_name = request.action_name;

    match action {
        GameAction::NextTurn => {
            entry.prev_player_index = state.current_player_index;
            entry.player_turn_details =
                Some(state.players.iter().map(|player| player.turn).collect());
        }
        GameAction::SelectPlayer => {
            entry.prev_player_index = state.selected_player_index;
        }
        _ => {}
    }

    Ok(entry)
}

/// Validate `request` and apply it, returning the new state.
pub fn append(state: &GameState, request: ActionRequest) -> Result<GameState, TallyError> {
    let entry = validate(state, request)?;
    let next = apply_action(state, &entry)?;
    tracing::debug!(
        action = %entry.action,
        player = ?entry.player_index,
        count = ?entry.count,
        turn = entry.turn,
        "log entry appended"
    );
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::options::GameOptions;

    use crate::state::new_game;

    fn game() -> GameState {
        new_game(&["Ann", "Ben", "Cat"], GameOptions::default(), 0, Utc::now()).unwrap()
    }

    // -- 1. Rule order ------------------------------------------------------

    #[test]
    fn unknown_tag() {
        assert!(matches!(
            ActionRequest::parse("ADD_WIDGETS"),
            Err(TallyError::InvalidAction { .. })
        ));
        assert_eq!(
            ActionRequest::parse("ADD_BUYS").unwrap().action,
            GameAction::AddBuys
        );
    }

    #[test]
    fn player_index_rules() {
        let state = game();
        assert!(matches!(
            validate(&state, ActionRequest::new(GameAction::SaveGame).player(1)),
            Err(TallyError::PlayerIndexNotRelevant { action: GameAction::SaveGame })
        ));
        assert!(matches!(
            validate(&state, ActionRequest::new(GameAction::AddCoins)),
            Err(TallyError::InvalidPlayerIndex { index: None, player_count: 3 })
        ));
        assert!(matches!(
            validate(&state, ActionRequest::new(GameAction::AddCoins).player(3)),
            Err(TallyError::InvalidPlayerIndex { index: Some(3), .. })
        ));
    }

    #[test]
    fn count_must_not_be_negative() {
        let state = game();
        assert!(matches!(
            validate(&state, ActionRequest::new(GameAction::AddCoins).player(0).count(-1)),
            Err(TallyError::InvalidCount { count: -1 })
        ));
        let zero = validate(&state, ActionRequest::new(GameAction::AddCoins).player(0).count(0)).unwrap();
        assert_eq!(zero.count, Some(0));
        let absent = validate(&state, ActionRequest::new(GameAction::AddCoins).player(0)).unwrap();
        assert_eq!(absent.count, None);
    }

    #[test]
    fn trash_only_on_victory_removals() {
        let state = game();
        assert!(validate(&state, ActionRequest::new(GameAction::RemoveEstates).player(0).trash()).is_ok());
        assert!(matches!(
            validate(&state, ActionRequest::new(GameAction::AddEstates).player(0).trash()),
            Err(TallyError::InvalidTrashAction { .. })
        ));
        assert!(matches!(
            validate(&state, ActionRequest::new(GameAction::RemoveCoins).player(0).trash()),
            Err(TallyError::InvalidTrashAction { .. })
        ));
    }

    #[test]
    fn links_must_target_main_entries() {
        let state = game();
        let start_id = state.log[0].id;
        let missing = EntryId::new();
        assert!(matches!(
            validate(&state, ActionRequest::new(GameAction::AddBuys).player(0).linked_to(missing)),
            Err(TallyError::InvalidLinkedAction { linked_id }) if linked_id == missing
        ));

        let linked = append(&state, ActionRequest::new(GameAction::AddBuys).player(0).linked_to(start_id)).unwrap();
        let child_id = linked.log[1].id;
        assert!(matches!(
            validate(&linked, ActionRequest::new(GameAction::AddBuys).player(0).linked_to(child_id)),
            Err(TallyError::InvalidLinkedAction { .. })
        ));
    }

    #[test]
    fn paused_rejects_everything_but_unpause() {
        let paused = append(&game(), ActionRequest::new(GameAction::Pause)).unwrap();
        assert!(matches!(
            validate(&paused, ActionRequest::new(GameAction::AddCoins).player(0)),
            Err(TallyError::GamePaused { .. })
        ));
        assert!(validate(&paused, ActionRequest::new(GameAction::Unpause)).is_ok());
    }

    // -- 2. Populated entry -------------------------------------------------

    #[test]
    fn entry_is_fully_populated() {
        let state = game();
        let at = Utc::now();
        let entry = validate(
            &state,
            ActionRequest::new(GameAction::AddCards).player(2).count(2).correction().at(at),
        )
        .unwrap();
        assert_eq!(entry.player_name.as_deref(), Some("Cat"));
        assert_eq!(entry.current_player_index, Some(0));
        assert_eq!(entry.turn, 1);
        assert_eq!(entry.timestamp, at);
        assert!(entry.correction);
        assert_ne!(entry.id, state.log[0].id);
    }

    #[test]
    fn next_turn_records_previous_player_and_counters() {
        let state = append(&game(), ActionRequest::new(GameAction::AddCoins).player(0).count(5)).unwrap();
        let entry = validate(&state, ActionRequest::next_turn(&state)).unwrap();
        assert_eq!(entry.player_index, Some(1));
        assert_eq!(entry.prev_player_index, Some(0));
        assert_eq!(entry.turn, 2);
        let details = entry.player_turn_details.unwrap();
        assert_eq!(details.len(), 3);
        assert_eq!(details[0].coins, 5);
    }

    #[test]
    fn rejected_request_leaves_state_alone() {
        let state = game();
        let before = state.clone();
        assert!(append(&state, ActionRequest::new(GameAction::RemoveCoins).player(0).count(1)).is_err());
        assert_eq!(state, before);
    }
}
