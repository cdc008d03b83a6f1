//! Grouped actions: one named main entry with linked steps.
//!
//! A grouped action such as "Play Market" logs a GROUPED_ACTION main entry
//! and one linked entry per step (+1 card, +1 action, +1 buy, +1 coin). The
//! steps are applied together or not at all, and undoing any one of them
//! undoes the whole group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::action::GameAction;
use tally_core::TallyError;

use crate::state::GameState;
use crate::validate::{append, ActionRequest};

/// One step of a grouped action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAction {
    pub action: GameAction,
    /// Player the step applies to; `None` means the selected player.
    #[serde(default)]
    pub player_index: Option<usize>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub trash: bool,
}

impl SubAction {
    pub fn new(action: GameAction, count: i64) -> Self {
        Self {
            action,
            player_index: None,
            count: Some(count),
            trash: false,
        }
    }

    pub fn for_player(mut self, index: usize) -> Self {
        self.player_index = Some(index);
        self
    }
}

/// Log `name` as a grouped action for the selected player, followed by every
/// step in `steps` linked to it, all stamped `at`.
///
/// Any failing step fails the whole group and `state` is left as it was.
pub fn apply_grouped_action(
    state: &GameState,
    name: &str,
    steps: &[SubAction],
    at: DateTime<Utc>,
) -> Result<GameState, TallyError> {
    let mut main = ActionRequest::new(GameAction::GroupedAction)
        .named(name)
        .at(at);
    main.player_index = state.selected_player_index;
    let mut next = append(state, main)?;
    let main_id = next
        .log
        .last()
        .map(|entry| entry.id)
        .ok_or(TallyError::EmptyLog)?;

    for step in steps {
        let mut request = ActionRequest::new(step.action).linked_to(main_id).at(at);
        if !step.action.is_no_player() {
            request.player_index = step.player_index.or(state.selected_player_index);
        }
        request.count = step.count;
        request.trash = step.trash;
        next = append(&next, request)?;
    }

    tracing::debug!(name, steps = steps.len(), "grouped action applied");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::options::GameOptions;

    use crate::state::new_game;
    use crate::undo::undo;

    fn market() -> Vec<SubAction> {
        vec![
            SubAction::new(GameAction::AddCards, 1),
            SubAction::new(GameAction::AddActions, 1),
            SubAction::new(GameAction::AddBuys, 1),
            SubAction::new(GameAction::AddCoins, 1),
        ]
    }

    #[test]
    fn steps_link_to_the_main_entry() {
        let state = new_game(&["A", "B"], GameOptions::default(), 1, Utc::now()).unwrap();
        let next = apply_grouped_action(&state, "Play Market", &market(), Utc::now()).unwrap();
        assert_eq!(next.log.len(), 6);
        let main = &next.log[1];
        assert_eq!(main.action, GameAction::GroupedAction);
        assert_eq!(main.describe(), "Play Market");
        assert!(next.log[2..].iter().all(|e| e.linked_action_id == Some(main.id)));
        let player = &next.players[1];
        assert_eq!(
            (player.turn.cards, player.turn.actions, player.turn.buys, player.turn.coins),
            (6, 2, 2, 1)
        );
    }

    #[test]
    fn failing_step_rolls_back_everything() {
        let state = new_game(&["A", "B"], GameOptions::default(), 0, Utc::now()).unwrap();
        let steps = vec![
            SubAction::new(GameAction::AddCoins, 3),
            SubAction::new(GameAction::RemoveBuys, 5),
        ];
        let err = apply_grouped_action(&state, "Overspend", &steps, Utc::now()).unwrap_err();
        assert!(err.is_insufficiency());
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.players[0].turn.coins, 0);
    }

    #[test]
    fn undoing_one_step_undoes_the_group() {
        let state = new_game(&["A", "B"], GameOptions::default(), 0, Utc::now()).unwrap();
        let played = apply_grouped_action(&state, "Play Market", &market(), Utc::now()).unwrap();
        let outcome = undo(played, 3);
        assert!(outcome.success);
        assert_eq!(outcome.state.log.len(), 1);
        assert_eq!(outcome.state.players[0].turn, state.players[0].turn);
    }

    #[test]
    fn steps_can_target_other_players() {
        let state = new_game(&["A", "B", "C"], GameOptions::default(), 0, Utc::now()).unwrap();
        let steps = vec![
            SubAction::new(GameAction::AddCards, 2),
            SubAction::new(GameAction::AddCurses, 1).for_player(1),
            SubAction::new(GameAction::AddCurses, 1).for_player(2),
        ];
        let next = apply_grouped_action(&state, "Play Witch", &steps, Utc::now()).unwrap();
        assert_eq!(next.players[1].victory.curses, 1);
        assert_eq!(next.players[2].victory.curses, 1);
        assert_eq!(next.players[0].turn.cards, 7);
    }
}
