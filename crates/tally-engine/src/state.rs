//! The game state and new-game setup.
//!
//! A [`GameState`] is a value. Every transition in this crate takes a state
//! by reference and returns a new one; nothing mutates a state a caller can
//! still see.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use tally_engine::prelude::*;
//!
//! let state = new_game(&["Ann", "Ben", "Cy"], GameOptions::default(), 1, Utc::now()).unwrap();
//! assert_eq!(state.current_step, GameStep::Playing);
//! assert_eq!(state.current_player_index, Some(1));
//! assert_eq!(state.log.len(), 1);
//! assert_eq!(state.log[0].action, GameAction::StartGame);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_clock::cache::TimeCache;
use tally_core::action::GameAction;
use tally_core::entry::{player_slot, LogEntry};
use tally_core::options::{GameOptions, MAX_PLAYERS, MIN_PLAYERS};
use tally_core::player::Player;
use tally_core::supply::{initial_prophecy_suns, initial_supply, Supply};
use tally_core::TallyError;

use crate::apply::apply_action;

/// Version stamped on every new game and saved game.
pub const GAME_VERSION: &str = "0.7.0";

/// Oldest saved-game version that can still be loaded.
pub const MIN_COMPATIBLE_SAVE_VERSION: &str = "0.7.0";

// ---------------------------------------------------------------------------
// GameStep
// ---------------------------------------------------------------------------

/// Where the game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStep {
    /// Players and options are being chosen; nothing is logged yet.
    Setup,
    /// START_GAME has been applied.
    Playing,
    /// END_GAME has been applied.
    Ended,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Everything known about a game: the counters derived from the log, and the
/// log itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub players: Vec<Player>,
    pub options: GameOptions,
    pub supply: Supply,
    /// Shared prophecy pool; `None` when Rising Sun is not in use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prophecy_suns: Option<u32>,
    pub current_turn: u32,
    #[serde(with = "player_slot")]
    pub current_player_index: Option<usize>,
    #[serde(with = "player_slot")]
    pub first_player_index: Option<usize>,
    #[serde(with = "player_slot")]
    pub selected_player_index: Option<usize>,
    pub current_step: GameStep,
    pub log: Vec<LogEntry>,
    /// Derived from `log`; rebuilt whenever it stops matching.
    #[serde(default)]
    pub time_cache: TimeCache,
    pub game_version: String,
}

impl GameState {
    /// A state in [`GameStep::Setup`] with fresh counters for `players` and
    /// an empty log.
    pub fn blank(players: Vec<Player>, options: GameOptions) -> Result<Self, TallyError> {
        let count = players.len();
        let supply = initial_supply(count, &options)?;
        let prophecy_suns = initial_prophecy_suns(count, &options)?;
        Ok(Self {
            players,
            options,
            supply,
            prophecy_suns,
            current_turn: 1,
            current_player_index: None,
            first_player_index: None,
            selected_player_index: None,
            current_step: GameStep::Setup,
            log: Vec::new(),
            time_cache: TimeCache::new(),
            game_version: GAME_VERSION.to_owned(),
        })
    }

    /// The blank state this game was started from: same player names, same
    /// options, every counter back at its starting value.
    pub fn initial(&self) -> Result<Self, TallyError> {
        let players = self
            .players
            .iter()
            .map(|player| Player::new(player.name.clone()))
            .collect();
        let mut blank = Self::blank(players, self.options.clone())?;
        blank.game_version = self.game_version.clone();
        Ok(blank)
    }

    /// `true` while the last log entry is an open PAUSE.
    pub fn is_paused(&self) -> bool {
        self.last_action() == Some(GameAction::Pause)
    }

    pub fn last_action(&self) -> Option<GameAction> {
        self.log.last().map(|entry| entry.action)
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Start a game for `names` with `first_player` taking the first turn.
///
/// Fails with [`TallyError::TooFewPlayers`] / [`TallyError::TooManyPlayers`]
/// outside 2..=6 players, and with [`TallyError::InvalidPlayerIndex`] if
/// `first_player` is not one of them.
pub fn new_game<S: AsRef<str>>(
    names: &[S],
    options: GameOptions,
    first_player: usize,
    at: DateTime<Utc>,
) -> Result<GameState, TallyError> {
    if names.len() < MIN_PLAYERS {
        return Err(TallyError::TooFewPlayers {
            count: names.len(),
            minimum: MIN_PLAYERS,
        });
    }
    if names.len() > MAX_PLAYERS {
        return Err(TallyError::TooManyPlayers {
            count: names.len(),
            maximum: MAX_PLAYERS,
        });
    }
    if first_player >= names.len() {
        return Err(TallyError::InvalidPlayerIndex {
            index: Some(first_player),
            player_count: names.len(),
        });
    }

    let players = names.iter().map(|name| Player::new(name.as_ref())).collect();
    let blank = GameState::blank(players, options)?;

    let mut start = LogEntry::new(GameAction::StartGame, Some(first_player), at);
    start.player_name = Some(blank.players[first_player].name.clone());
    start.current_player_index = Some(first_player);

    let state = apply_action(&blank, &start)?;
    tracing::debug!(
        players = state.players.len(),
        first_player,
        "new game started"
    );
    Ok(state)
}
