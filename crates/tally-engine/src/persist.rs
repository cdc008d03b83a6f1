//! Saving and loading games through a key/value storage collaborator.
//!
//! A saved game is the JSON encoding of its [`GameState`], stored under
//! `game_key_prefix + id`. A separate list of [`SavedGameMetadata`] lives
//! under `saved_games_key` so that saves can be listed without decoding
//! every blob.
//!
//! Saving and loading also write to the log. A save appends SAVE_GAME, which
//! opens a save interval on the clock; a load appends LOAD_GAME linked to
//! that SAVE_GAME, which closes it. Time spent between the two is excluded
//! from every duration.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use tally_engine::persist::{MemoryStorage, SaveStore};
//! use tally_engine::prelude::*;
//!
//! let t0 = Utc::now();
//! let state = new_game(&["Ann", "Ben"], GameOptions::default(), 0, t0).unwrap();
//!
//! let mut store = SaveStore::new(MemoryStorage::default());
//! let (saved, id) = store.save_game(&state, "Friday night", None, t0).unwrap();
//! assert_eq!(saved.last_action(), Some(GameAction::SaveGame));
//!
//! let loaded = store.load_game(&id, t0 + Duration::hours(1)).unwrap().unwrap();
//! assert_eq!(loaded.last_action(), Some(GameAction::LoadGame));
//! assert_eq!(store.saved_games().len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_clock::cache::TimeCache;
use tally_core::action::GameAction;
use tally_core::TallyError;
use uuid::Uuid;

use crate::state::{GameState, GameStep, MIN_COMPATIBLE_SAVE_VERSION};
use crate::validate::{append, ActionRequest};

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// A `major.minor.patch` version, ordered numerically.
///
/// Pre-release and build suffixes (`-beta.1`, `+abc`) are accepted and
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FromStr for SaveVersion {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s.trim().split(['-', '+']).next().unwrap_or_default();
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(TallyError::InvalidVersion(s.to_owned()));
        }
        let number = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| TallyError::InvalidVersion(s.to_owned()))
        };
        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
        })
    }
}

impl fmt::Display for SaveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// JSON encoding of `state`.
pub fn encode_state(state: &GameState) -> Result<String, TallyError> {
    serde_json::to_string(state).map_err(|e| TallyError::Serialization(e.to_string()))
}

/// Decode a saved game, refusing logs that are empty and versions older than
/// `minimum`.
///
/// The time cache is taken as stored; callers that go on to use the state
/// should rebuild it.
pub fn decode_state(json: &str, minimum: &SaveVersion) -> Result<GameState, TallyError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| TallyError::Serialization(e.to_string()))?;

    let log_is_empty = value
        .get("log")
        .and_then(serde_json::Value::as_array)
        .map_or(true, Vec::is_empty);
    if log_is_empty {
        return Err(TallyError::EmptyLog);
    }

    let found = value
        .get("gameVersion")
        .and_then(serde_json::Value::as_str)
        .filter(|v| !v.is_empty());
    let Some(found) = found else {
        return Err(TallyError::IncompatibleSaveVersion {
            found: "undefined".to_owned(),
            minimum: minimum.to_string(),
        });
    };
    if found.parse::<SaveVersion>()? < *minimum {
        return Err(TallyError::IncompatibleSaveVersion {
            found: found.to_owned(),
            minimum: minimum.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| TallyError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Storage collaborator
// ---------------------------------------------------------------------------

/// String key/value storage.
pub trait StorageService {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: String);

    fn remove_item(&mut self, key: &str);

    /// Remove every key.
    fn clear(&mut self);
}

/// In-memory [`StorageService`] for tests and local runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl StorageService for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_owned(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

// ---------------------------------------------------------------------------
// SaveStore
// ---------------------------------------------------------------------------

/// One row of the saved-games list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGameMetadata {
    pub id: String,
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

/// Storage keys and version floor used by [`SaveStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfig {
    /// Key holding the JSON list of [`SavedGameMetadata`].
    pub saved_games_key: String,
    /// Prefix of the key each game blob is stored under.
    pub game_key_prefix: String,
    pub minimum_version: SaveVersion,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            saved_games_key: "@tally_saved_games".to_owned(),
            game_key_prefix: "@tally_game_".to_owned(),
            minimum_version: SaveVersion::from_str(MIN_COMPATIBLE_SAVE_VERSION).unwrap_or(
                SaveVersion {
                    major: 0,
                    minor: 0,
                    patch: 0,
                },
            ),
        }
    }
}

/// Saves, loads and lists games in a [`StorageService`].
#[derive(Debug, Clone)]
pub struct SaveStore<S> {
    storage: S,
    config: SaveConfig,
}

impl<S: StorageService> SaveStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, SaveConfig::default())
    }

    pub fn with_config(storage: S, config: SaveConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn game_key(&self, id: &str) -> String {
        format!("{}{}", self.config.game_key_prefix, id)
    }

    /// Save `state` under `existing_id`, or under a fresh id.
    ///
    /// SAVE_GAME is appended at `at` unless the game has ended. If the game
    /// is paused, SAVE_GAME goes in just before the trailing PAUSE with the
    /// pause's timestamp, so the log still ends paused. Returns the state as
    /// saved and its id.
    pub fn save_game(
        &mut self,
        state: &GameState,
        name: &str,
        existing_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(GameState, String), TallyError> {
        let mut saved = if state.current_step == GameStep::Ended {
            state.clone()
        } else if state.is_paused() {
            let mut unpaused = state.clone();
            let pause = unpaused.log.pop().ok_or(TallyError::EmptyLog)?;
            let mut with_save = append(
                &unpaused,
                ActionRequest::new(GameAction::SaveGame).at(pause.timestamp),
            )?;
            with_save.log.push(pause);
            with_save
        } else {
            append(state, ActionRequest::new(GameAction::SaveGame).at(at))?
        };
        saved.time_cache = TimeCache::rebuild(&saved.log);

        let id = existing_id.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
        let key = self.game_key(&id);
        self.storage.set_item(&key, encode_state(&saved)?);

        let row = SavedGameMetadata {
            id: id.clone(),
            name: name.to_owned(),
            saved_at: at,
        };
        let mut games = self.saved_games();
        match games.iter_mut().find(|game| game.id == id) {
            Some(existing) => *existing = row,
            None => games.push(row),
        }
        self.write_saved_games(&games)?;

        tracing::info!(id = %id, name, entries = saved.log.len(), "game saved");
        Ok((saved, id))
    }

    /// Load the game saved under `id` and log the load at `at`.
    ///
    /// Returns `Ok(None)` when nothing is stored under `id` or the stored
    /// blob is not a readable game. A stored game that is too old, has an
    /// empty log, or does not end in SAVE_GAME or END_GAME is an error.
    pub fn load_game(&self, id: &str, at: DateTime<Utc>) -> Result<Option<GameState>, TallyError> {
        let Some(json) = self.storage.get_item(&self.game_key(id)) else {
            tracing::error!(id, "no saved game under this id");
            return Ok(None);
        };

        let mut state = match decode_state(&json, &self.config.minimum_version) {
            Ok(state) => state,
            Err(err @ (TallyError::Serialization(_) | TallyError::InvalidVersion(_))) => {
                tracing::error!(id, error = %err, "saved game is corrupt");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        if state.is_paused() {
            state.log.pop();
        }
        let last = state.log.last().ok_or(TallyError::EmptyLog)?;
        match last.action {
            GameAction::SaveGame => {
                let save_id = last.id;
                state.time_cache = TimeCache::rebuild(&state.log);
                state = append(
                    &state,
                    ActionRequest::new(GameAction::LoadGame)
                        .linked_to(save_id)
                        .at(at),
                )?;
            }
            GameAction::EndGame => {}
            found => return Err(TallyError::InvalidSaveLog { found }),
        }
        state.time_cache = TimeCache::rebuild(&state.log);

        tracing::info!(id, entries = state.log.len(), "game loaded");
        Ok(Some(state))
    }

    /// Every saved game, in save order. Unreadable list data reads as empty.
    pub fn saved_games(&self) -> Vec<SavedGameMetadata> {
        let Some(json) = self.storage.get_item(&self.config.saved_games_key) else {
            return Vec::new();
        };
        serde_json::from_str(&json).unwrap_or_else(|err| {
            tracing::error!(error = %err, "saved games list is corrupt");
            Vec::new()
        })
    }

    /// Remove the game saved under `id` and its list row. Returns `true`
    /// when a list row was removed.
    pub fn delete_saved_game(&mut self, id: &str) -> bool {
        let mut games = self.saved_games();
        let before = games.len();
        games.retain(|game| game.id != id);
        let removed = games.len() != before;
        if removed {
            if let Err(err) = self.write_saved_games(&games) {
                tracing::error!(id, error = %err, "could not rewrite saved games list");
            }
        }
        let key = self.game_key(id);
        self.storage.remove_item(&key);
        removed
    }

    fn write_saved_games(&mut self, games: &[SavedGameMetadata]) -> Result<(), TallyError> {
        let json =
            serde_json::to_string(games).map_err(|e| TallyError::Serialization(e.to_string()))?;
        let key = self.config.saved_games_key.clone();
        self.storage.set_item(&key, json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tally_core::options::GameOptions;

    use crate::state::new_game;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T19:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn game() -> GameState {
        new_game(&["A", "B"], GameOptions::default(), 0, t0()).unwrap()
    }

    // -- 1. Versions ----------------------------------------------------------

    #[test]
    fn versions_order_numerically() {
        let a: SaveVersion = "0.7.0".parse().unwrap();
        let b: SaveVersion = "0.10.0-beta.2".parse().unwrap();
        assert!(a < b);
        assert_eq!(b.to_string(), "0.10.0");
        assert!(matches!(
            "1.2".parse::<SaveVersion>(),
            Err(TallyError::InvalidVersion(_))
        ));
    }

    // -- 2. Decoding ----------------------------------------------------------

    #[test]
    fn old_or_missing_version_is_rejected() {
        let min: SaveVersion = "0.7.0".parse().unwrap();
        let mut value = serde_json::to_value(game()).unwrap();
        value["gameVersion"] = "0.6.9".into();
        let err = decode_state(&value.to_string(), &min).unwrap_err();
        assert_eq!(
            err,
            TallyError::IncompatibleSaveVersion {
                found: "0.6.9".into(),
                minimum: "0.7.0".into()
            }
        );

        value.as_object_mut().unwrap().remove("gameVersion");
        let err = decode_state(&value.to_string(), &min).unwrap_err();
        assert!(matches!(err, TallyError::IncompatibleSaveVersion { found, .. } if found == "undefined"));
    }

    #[test]
    fn empty_log_is_rejected() {
        let min: SaveVersion = "0.7.0".parse().unwrap();
        let mut value = serde_json::to_value(game()).unwrap();
        value["log"] = serde_json::json!([]);
        assert_eq!(decode_state(&value.to_string(), &min), Err(TallyError::EmptyLog));
    }

    // -- 3. Save --------------------------------------------------------------

    #[test]
    fn save_while_paused_keeps_the_pause_last() {
        let state = game();
        let paused = append(
            &state,
            ActionRequest::new(GameAction::Pause).at(t0() + Duration::minutes(5)),
        )
        .unwrap();
        let mut store = SaveStore::new(MemoryStorage::default());
        let (saved, _) = store
            .save_game(&paused, "paused", None, t0() + Duration::minutes(9))
            .unwrap();
        let actions: Vec<_> = saved.log.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![GameAction::StartGame, GameAction::SaveGame, GameAction::Pause]
        );
        assert_eq!(saved.log[1].timestamp, t0() + Duration::minutes(5));
    }

    #[test]
    fn saving_an_ended_game_adds_nothing() {
        let ended = append(&game(), ActionRequest::new(GameAction::EndGame)).unwrap();
        let mut store = SaveStore::new(MemoryStorage::default());
        let (saved, _) = store.save_game(&ended, "done", None, t0()).unwrap();
        assert_eq!(saved.log.len(), ended.log.len());
    }

    #[test]
    fn resave_updates_the_list_in_place() {
        let mut store = SaveStore::new(MemoryStorage::default());
        let (_, first) = store.save_game(&game(), "one", None, t0()).unwrap();
        let (_, second) = store.save_game(&game(), "two", None, t0()).unwrap();
        store
            .save_game(&game(), "one again", Some(&first), t0() + Duration::hours(1))
            .unwrap();
        let games = store.saved_games();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, first);
        assert_eq!(games[0].name, "one again");
        assert_eq!(games[1].id, second);
    }

    // -- 4. Load --------------------------------------------------------------

    #[test]
    fn missing_or_corrupt_blob_loads_as_none() {
        let mut storage = MemoryStorage::default();
        storage.set_item("@tally_game_bad", "{not json".to_owned());
        let store = SaveStore::new(storage);
        assert_eq!(store.load_game("absent", t0()), Ok(None));
        assert_eq!(store.load_game("bad", t0()), Ok(None));
    }

    #[test]
    fn load_links_to_the_save() {
        let mut store = SaveStore::new(MemoryStorage::default());
        let (saved, id) = store.save_game(&game(), "g", None, t0()).unwrap();
        let loaded = store
            .load_game(&id, t0() + Duration::minutes(30))
            .unwrap()
            .unwrap();
        let load = loaded.log.last().unwrap();
        assert_eq!(load.action, GameAction::LoadGame);
        assert_eq!(load.linked_action_id, Some(saved.log[1].id));
        assert!(loaded.time_cache.is_valid_for(&loaded.log));
    }

    #[test]
    fn log_not_ending_in_save_is_rejected() {
        let mut storage = MemoryStorage::default();
        let state = append(&game(), ActionRequest::new(GameAction::AddCoins).player(0)).unwrap();
        storage.set_item("@tally_game_x", encode_state(&state).unwrap());
        let store = SaveStore::new(storage);
        assert_eq!(
            store.load_game("x", t0()),
            Err(TallyError::InvalidSaveLog {
                found: GameAction::AddCoins
            })
        );
    }

    // -- 5. List management ---------------------------------------------------

    #[test]
    fn delete_removes_row_and_blob() {
        let mut store = SaveStore::new(MemoryStorage::default());
        let (_, id) = store.save_game(&game(), "g", None, t0()).unwrap();
        assert!(store.delete_saved_game(&id));
        assert!(store.saved_games().is_empty());
        assert_eq!(store.load_game(&id, t0()), Ok(None));
        assert!(!store.delete_saved_game(&id));
    }

    #[test]
    fn corrupt_list_reads_as_empty() {
        let mut storage = MemoryStorage::default();
        storage.set_item("@tally_saved_games", "[{".to_owned());
        assert!(SaveStore::new(storage).saved_games().is_empty());
    }
}
