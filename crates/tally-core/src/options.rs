//! Game configuration and fixed limits.

use serde::{Deserialize, Serialize};

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 2;

/// Most players a game can start with.
pub const MAX_PLAYERS: usize = 6;

/// Which optional rules and mats are in use for a game.
///
/// Options are fixed at setup and are carried along in every saved game so a
/// replay sees the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    /// Whether the curse pile is in the supply.
    pub curses: bool,
    /// Adds platinums and colonies to the supply.
    pub prosperity: bool,
    /// Enables the shared prophecy pool.
    pub rising_sun: bool,
    pub mats: MatOptions,
}

/// Mat counters shown for each player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatOptions {
    pub coffers_villagers: bool,
    pub debt: bool,
    pub favors: bool,
}

/// Curses are in play by default; the other expansions are off.
impl Default for GameOptions {
    fn default() -> Self {
        Self {
            curses: true,
            prosperity: false,
            rising_sun: false,
            mats: MatOptions::default(),
        }
    }
}

impl GameOptions {
    /// Every optional rule and mat switched on.
    pub fn everything() -> Self {
        Self {
            curses: true,
            prosperity: true,
            rising_sun: true,
            mats: MatOptions {
                coffers_villagers: true,
                debt: true,
                favors: true,
            },
        }
    }
}
