//! The closed catalogue of loggable game actions.
//!
//! Every [`LogEntry`](crate::entry::LogEntry) carries exactly one
//! [`GameAction`]. On the wire an action is its SCREAMING_SNAKE_CASE tag
//! (`"ADD_COINS"`); for display it is a short English sentence with the
//! entry's count substituted (`"Added 3 Coins"`).
//!
//! Actions fall into a few overlapping sets that drive validation and undo:
//!
//! - **No-player** actions ([`GameAction::is_no_player`]) must be logged
//!   without a player index.
//! - **Adjustment** actions ([`GameAction::is_adjustment`]) add to or remove
//!   from a counter; removals carry a negative [`sign`](GameAction::sign).
//! - **Never undoable** actions ([`GameAction::is_never_undoable`]) and
//!   actions that are only undoable as the most recent entry
//!   ([`GameAction::undoable_only_when_last`]).
//!
//! # Example
//!
//! ```
//! use std::str::FromStr;
//! use tally_core::action::GameAction;
//!
//! let action = GameAction::from_str("REMOVE_COINS").unwrap();
//! assert_eq!(action, GameAction::RemoveCoins);
//! assert_eq!(action.sign(), -1);
//! assert_eq!(action.describe(Some(3)), "Removed 3 Coins");
//! assert!(GameAction::from_str("ADD_SPACESHIPS").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TallyError;

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Declares the action enum together with its wire tags and description
/// templates so the three can never drift apart.
macro_rules! game_actions {
    ($($(#[$meta:meta])* $variant:ident => $tag:literal, $template:literal;)+) => {
        /// A single kind of loggable game action.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum GameAction {
            $(
                $(#[$meta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl GameAction {
            /// Every action in declaration order.
            pub const ALL: &'static [GameAction] = &[$(GameAction::$variant),+];

            /// The stable wire tag, e.g. `"ADD_COINS"`.
            pub fn tag(self) -> &'static str {
                match self {
                    $(GameAction::$variant => $tag,)+
                }
            }

            /// The description template. `{COUNT}` marks where the entry's
            /// count is substituted.
            pub fn template(self) -> &'static str {
                match self {
                    $(GameAction::$variant => $template,)+
                }
            }
        }
    };
}

game_actions! {
    /// The first entry of every log. Carries the first player's index.
    StartGame => "START_GAME", "Started Game";
    /// Moves the game to its final step.
    EndGame => "END_GAME", "Ended Game";
    /// Opens a paused interval that lasts until the matching load.
    SaveGame => "SAVE_GAME", "Saved Game";
    /// Closes the paused interval opened by a save.
    LoadGame => "LOAD_GAME", "Loaded Game";
    /// Advances to the next player's turn.
    NextTurn => "NEXT_TURN", "Next Turn";
    /// Opens a paused interval.
    Pause => "PAUSE", "Paused Game";
    /// Closes a paused interval.
    Unpause => "UNPAUSE", "Unpaused Game";
    /// Changes which player the adjustments are aimed at.
    SelectPlayer => "SELECT_PLAYER", "Selected Player";
    /// Main entry of a multi-step action; its steps link back to it.
    GroupedAction => "GROUPED_ACTION", "Grouped Action";

    AddActions => "ADD_ACTIONS", "Added {COUNT} Actions";
    RemoveActions => "REMOVE_ACTIONS", "Removed {COUNT} Actions";
    AddBuys => "ADD_BUYS", "Added {COUNT} Buys";
    RemoveBuys => "REMOVE_BUYS", "Removed {COUNT} Buys";
    AddCoins => "ADD_COINS", "Added {COUNT} Coins";
    RemoveCoins => "REMOVE_COINS", "Removed {COUNT} Coins";
    AddCards => "ADD_CARDS", "Added {COUNT} Cards";
    RemoveCards => "REMOVE_CARDS", "Removed {COUNT} Cards";
    AddGains => "ADD_GAINS", "Added {COUNT} Gains";
    RemoveGains => "REMOVE_GAINS", "Removed {COUNT} Gains";

    AddCoffers => "ADD_COFFERS", "Added {COUNT} Coffers";
    RemoveCoffers => "REMOVE_COFFERS", "Removed {COUNT} Coffers";
    AddVillagers => "ADD_VILLAGERS", "Added {COUNT} Villagers";
    RemoveVillagers => "REMOVE_VILLAGERS", "Removed {COUNT} Villagers";
    AddDebt => "ADD_DEBT", "Added {COUNT} Debt";
    RemoveDebt => "REMOVE_DEBT", "Removed {COUNT} Debt";
    AddFavors => "ADD_FAVORS", "Added {COUNT} Favors";
    RemoveFavors => "REMOVE_FAVORS", "Removed {COUNT} Favors";

    /// Adds suns to the shared prophecy pool (Rising Sun only).
    AddProphecy => "ADD_PROPHECY", "Added {COUNT} Prophecy Suns";
    /// Removes suns from the shared prophecy pool (Rising Sun only).
    RemoveProphecy => "REMOVE_PROPHECY", "Removed {COUNT} Prophecy Suns";

    AddEstates => "ADD_ESTATES", "Added {COUNT} Estates";
    RemoveEstates => "REMOVE_ESTATES", "Removed {COUNT} Estates";
    AddDuchies => "ADD_DUCHIES", "Added {COUNT} Duchies";
    RemoveDuchies => "REMOVE_DUCHIES", "Removed {COUNT} Duchies";
    AddProvinces => "ADD_PROVINCES", "Added {COUNT} Provinces";
    RemoveProvinces => "REMOVE_PROVINCES", "Removed {COUNT} Provinces";
    AddColonies => "ADD_COLONIES", "Added {COUNT} Colonies";
    RemoveColonies => "REMOVE_COLONIES", "Removed {COUNT} Colonies";
    AddVpTokens => "ADD_VP_TOKENS", "Added {COUNT} VP Tokens";
    RemoveVpTokens => "REMOVE_VP_TOKENS", "Removed {COUNT} VP Tokens";
    AddOtherVp => "ADD_OTHER_VP", "Added {COUNT} Other VP";
    RemoveOtherVp => "REMOVE_OTHER_VP", "Removed {COUNT} Other VP";
    AddCurses => "ADD_CURSES", "Added {COUNT} Curses";
    RemoveCurses => "REMOVE_CURSES", "Removed {COUNT} Curses";

    AddNextTurnActions => "ADD_NEXT_TURN_ACTIONS", "Added {COUNT} Next Turn Actions";
    RemoveNextTurnActions => "REMOVE_NEXT_TURN_ACTIONS", "Removed {COUNT} Next Turn Actions";
    AddNextTurnBuys => "ADD_NEXT_TURN_BUYS", "Added {COUNT} Next Turn Buys";
    RemoveNextTurnBuys => "REMOVE_NEXT_TURN_BUYS", "Removed {COUNT} Next Turn Buys";
    AddNextTurnCoins => "ADD_NEXT_TURN_COINS", "Added {COUNT} Next Turn Coins";
    RemoveNextTurnCoins => "REMOVE_NEXT_TURN_COINS", "Removed {COUNT} Next Turn Coins";
    AddNextTurnCards => "ADD_NEXT_TURN_CARDS", "Added {COUNT} Next Turn Cards";
    RemoveNextTurnCards => "REMOVE_NEXT_TURN_CARDS", "Removed {COUNT} Next Turn Cards";
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

impl GameAction {
    /// Actions that are logged without a player index.
    pub fn is_no_player(self) -> bool {
        matches!(
            self,
            GameAction::EndGame
                | GameAction::SaveGame
                | GameAction::LoadGame
                | GameAction::Pause
                | GameAction::Unpause
        )
    }

    /// Actions that must name a concrete player.
    pub fn requires_player(self) -> bool {
        !self.is_no_player()
    }

    /// Add/remove actions that move a counter.
    pub fn is_adjustment(self) -> bool {
        self.tag().starts_with("ADD_") || self.is_removal()
    }

    /// Adjustments that take units away.
    pub fn is_removal(self) -> bool {
        self.tag().starts_with("REMOVE_")
    }

    /// `-1` for removals, `+1` for everything else.
    pub fn sign(self) -> i64 {
        if self.is_removal() {
            -1
        } else {
            1
        }
    }

    /// Actions that can never be undone: game start and every no-player
    /// action.
    pub fn is_never_undoable(self) -> bool {
        self == GameAction::StartGame || self.is_no_player()
    }

    /// Actions that may only be undone while they are the last log entry.
    pub fn undoable_only_when_last(self) -> bool {
        matches!(self, GameAction::NextTurn | GameAction::SelectPlayer)
    }

    /// Actions that open a paused interval.
    pub fn opens_pause(self) -> bool {
        matches!(self, GameAction::Pause | GameAction::SaveGame)
    }

    /// Actions that close a paused interval.
    pub fn closes_pause(self) -> bool {
        matches!(self, GameAction::Unpause | GameAction::LoadGame)
    }

    /// Render the description with `count` substituted. Without a count the
    /// placeholder is dropped: `"Added Coins"`.
    pub fn describe(self, count: Option<u32>) -> String {
        let template = self.template();
        match count {
            Some(count) => template.replace("{COUNT}", &count.to_string()),
            None => template.replace(" {COUNT}", ""),
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GameAction {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameAction::ALL
            .iter()
            .copied()
            .find(|action| action.tag() == s)
            .ok_or_else(|| TallyError::InvalidAction {
                action: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique() {
        let mut tags: Vec<&str> = GameAction::ALL.iter().map(|a| a.tag()).collect();
        let total = tags.len();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), total);
    }

    #[test]
    fn wire_tag_matches_serde() {
        for action in GameAction::ALL {
            let json = serde_json::to_string(action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.tag()));
            let back: GameAction = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *action);
        }
    }

    #[test]
    fn unknown_tag_is_invalid_action() {
        let err = GameAction::from_str("ADD_DRAGONS").unwrap_err();
        assert!(matches!(err, TallyError::InvalidAction { ref action } if action == "ADD_DRAGONS"));
    }

    #[test]
    fn no_player_set() {
        let no_player: Vec<GameAction> = GameAction::ALL
            .iter()
            .copied()
            .filter(|a| a.is_no_player())
            .collect();
        assert_eq!(
            no_player,
            vec![
                GameAction::EndGame,
                GameAction::SaveGame,
                GameAction::LoadGame,
                GameAction::Pause,
                GameAction::Unpause,
            ]
        );
        assert!(GameAction::StartGame.requires_player());
        assert!(GameAction::NextTurn.requires_player());
        assert!(GameAction::SelectPlayer.requires_player());
    }

    #[test]
    fn adjustment_signs() {
        assert_eq!(GameAction::AddCoins.sign(), 1);
        assert_eq!(GameAction::RemoveCoins.sign(), -1);
        assert_eq!(GameAction::RemoveNextTurnCards.sign(), -1);
        assert!(GameAction::AddProphecy.is_adjustment());
        assert!(!GameAction::NextTurn.is_adjustment());
        assert!(!GameAction::GroupedAction.is_adjustment());
    }

    #[test]
    fn undo_classes() {
        assert!(GameAction::StartGame.is_never_undoable());
        assert!(GameAction::Pause.is_never_undoable());
        assert!(!GameAction::NextTurn.is_never_undoable());
        assert!(GameAction::NextTurn.undoable_only_when_last());
        assert!(GameAction::SelectPlayer.undoable_only_when_last());
        assert!(!GameAction::AddCoins.undoable_only_when_last());
    }

    #[test]
    fn describe_substitutes_count() {
        assert_eq!(GameAction::AddEstates.describe(Some(2)), "Added 2 Estates");
        assert_eq!(GameAction::AddEstates.describe(None), "Added Estates");
        assert_eq!(GameAction::NextTurn.describe(Some(1)), "Next Turn");
    }
}
