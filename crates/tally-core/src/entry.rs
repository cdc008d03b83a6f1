//! Log entries: the immutable events the game state is derived from.
//!
//! An entry is either a *main* entry or a *linked* entry. A linked entry
//! points at its main entry through `linked_action_id`; links are at most one
//! level deep.
//!
//! On the wire, player indices use `-1` for "no player" (see
//! [`player_slot`]); in Rust they are `Option<usize>`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::GameAction;
use crate::player::TurnCounters;

/// Wire value of "no player".
pub const NO_PLAYER: i64 = -1;

// ---------------------------------------------------------------------------
// EntryId
// ---------------------------------------------------------------------------

/// Unique id of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// LogEntry
// ---------------------------------------------------------------------------

/// One event in the game log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: EntryId,
    pub timestamp: DateTime<Utc>,
    pub action: GameAction,
    /// The player the action targets.
    #[serde(with = "player_slot")]
    pub player_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    /// Whose turn it was when the entry was logged.
    #[serde(with = "player_slot", default)]
    pub current_player_index: Option<usize>,
    pub turn: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub correction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_action_id: Option<EntryId>,
    /// Victory removal that leaves the game instead of returning to supply.
    #[serde(default, skip_serializing_if = "is_false")]
    pub trash: bool,
    /// Player before a NEXT_TURN or SELECT_PLAYER.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_player_index: Option<usize>,
    /// Every player's live turn counters at the moment a NEXT_TURN is logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_turn_details: Option<Vec<TurnCounters>>,
    /// Display name of a grouped action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl LogEntry {
    /// A bare entry with every optional field empty.
    pub fn new(action: GameAction, player_index: Option<usize>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::new(),
            timestamp,
            action,
            player_index,
            player_name: None,
            current_player_index: None,
            turn: 1,
            count: None,
            correction: false,
            linked_action_id: None,
            trash: false,
            prev_player_index: None,
            player_turn_details: None,
            action_name: None,
        }
    }

    /// `true` unless this entry links to a main entry.
    pub fn is_main(&self) -> bool {
        self.linked_action_id.is_none()
    }

    /// Id of the main entry of this entry's group.
    pub fn main_id(&self) -> EntryId {
        self.linked_action_id.unwrap_or(self.id)
    }

    /// The count, or 1 when absent.
    pub fn effective_count(&self) -> u32 {
        self.count.unwrap_or(1)
    }

    /// The count with the action's sign applied.
    pub fn signed_count(&self) -> i64 {
        self.action.sign() * i64::from(self.effective_count())
    }

    /// Human-readable summary. Grouped actions show their own name.
    pub fn describe(&self) -> String {
        match (&self.action, &self.action_name) {
            (GameAction::GroupedAction, Some(name)) => name.clone(),
            _ => self.action.describe(self.count),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire encoding of player indices
// ---------------------------------------------------------------------------

/// Serde adapter: `Option<usize>` encoded as an integer with `-1` for `None`.
///
/// Use with `#[serde(with = "tally_core::entry::player_slot")]`.
pub mod player_slot {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NO_PLAYER;

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(index) => serializer.serialize_u64(*index as u64),
            None => serializer.serialize_i64(NO_PLAYER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            return Ok(None);
        }
        usize::try_from(raw).map(Some).map_err(D::Error::custom)
    }
}
