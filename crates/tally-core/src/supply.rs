//! The shared supply of cards and the prophecy pool.
//!
//! A pile that is absent from [`Supply`] is not in play this game. Gaining
//! from such a pile is an insufficiency; returning to it is a no-op.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::{GameOptions, MAX_PLAYERS, MIN_PLAYERS};
use crate::player::offset_counter;
use crate::TallyError;

// ---------------------------------------------------------------------------
// SupplyPile
// ---------------------------------------------------------------------------

/// A pile in the shared supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SupplyPile {
    Coppers,
    Silvers,
    Golds,
    Platinums,
    Estates,
    Duchies,
    Provinces,
    Colonies,
    Curses,
}

impl fmt::Display for SupplyPile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SupplyPile::Coppers => "coppers",
            SupplyPile::Silvers => "silvers",
            SupplyPile::Golds => "golds",
            SupplyPile::Platinums => "platinums",
            SupplyPile::Estates => "estates",
            SupplyPile::Duchies => "duchies",
            SupplyPile::Provinces => "provinces",
            SupplyPile::Colonies => "colonies",
            SupplyPile::Curses => "curses",
        })
    }
}

// ---------------------------------------------------------------------------
// Supply
// ---------------------------------------------------------------------------

/// Remaining cards per pile. Only piles in play are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Supply {
    piles: BTreeMap<SupplyPile, u32>,
}

impl Supply {
    /// An empty supply with no piles in play.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `pile` in play with `count` cards.
    pub fn with_pile(mut self, pile: SupplyPile, count: u32) -> Self {
        self.piles.insert(pile, count);
        self
    }

    /// Cards left in `pile`, or `None` if it is not in play.
    pub fn get(&self, pile: SupplyPile) -> Option<u32> {
        self.piles.get(&pile).copied()
    }

    pub fn in_play(&self, pile: SupplyPile) -> bool {
        self.piles.contains_key(&pile)
    }

    /// Iterate the piles in play.
    pub fn iter(&self) -> impl Iterator<Item = (SupplyPile, u32)> + '_ {
        self.piles.iter().map(|(pile, count)| (*pile, *count))
    }

    /// Move `pile` by `delta` cards.
    ///
    /// Taking more cards than remain fails with
    /// [`TallyError::InsufficientSupply`] and leaves the pile unchanged.
    pub fn adjust(&mut self, pile: SupplyPile, delta: i64) -> Result<(), TallyError> {
        let Some(current) = self.piles.get_mut(&pile) else {
            if delta < 0 {
                return Err(TallyError::InsufficientSupply {
                    pile,
                    available: 0,
                    requested: delta.unsigned_abs(),
                });
            }
            return Ok(());
        };
        *current = match offset_counter(*current, delta) {
            Some(next) => next,
            None if delta < 0 => {
                return Err(TallyError::InsufficientSupply {
                    pile,
                    available: *current,
                    requested: delta.unsigned_abs(),
                })
            }
            None => {
                return Err(TallyError::CounterOverflow {
                    counter: format!("supply.{pile}"),
                    current: *current,
                    added: delta.unsigned_abs(),
                })
            }
        };
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Setup tables
// ---------------------------------------------------------------------------

fn check_player_count(player_count: usize) -> Result<(), TallyError> {
    if player_count < MIN_PLAYERS {
        return Err(TallyError::TooFewPlayers {
            count: player_count,
            minimum: MIN_PLAYERS,
        });
    }
    if player_count > MAX_PLAYERS {
        return Err(TallyError::TooManyPlayers {
            count: player_count,
            maximum: MAX_PLAYERS,
        });
    }
    Ok(())
}

/// The supply at the start of a game for `player_count` players.
///
/// ```
/// use tally_core::options::GameOptions;
/// use tally_core::supply::{initial_supply, SupplyPile};
///
/// let supply = initial_supply(2, &GameOptions::default()).unwrap();
/// assert_eq!(supply.get(SupplyPile::Provinces), Some(8));
/// assert_eq!(supply.get(SupplyPile::Curses), Some(10));
/// assert!(!supply.in_play(SupplyPile::Colonies));
/// ```
pub fn initial_supply(player_count: usize, options: &GameOptions) -> Result<Supply, TallyError> {
    check_player_count(player_count)?;
    // Bounded by MAX_PLAYERS above.
    let players = player_count as u32;

    let victory = if players == 2 { 8 } else { 12 };
    let provinces = match players {
        2 => 8,
        3 | 4 => 12,
        5 => 15,
        _ => 18,
    };

    let mut supply = Supply::new()
        .with_pile(SupplyPile::Coppers, 60 - 7 * players)
        .with_pile(SupplyPile::Silvers, 40)
        .with_pile(SupplyPile::Golds, 30)
        .with_pile(SupplyPile::Estates, victory)
        .with_pile(SupplyPile::Duchies, victory)
        .with_pile(SupplyPile::Provinces, provinces);

    if options.curses {
        supply = supply.with_pile(SupplyPile::Curses, 10 * (players - 1));
    }
    if options.prosperity {
        supply = supply
            .with_pile(SupplyPile::Platinums, 12)
            .with_pile(SupplyPile::Colonies, victory);
    }
    Ok(supply)
}

/// Suns in the prophecy pool at the start of a game, or `None` when the
/// Rising Sun expansion is not in use.
pub fn initial_prophecy_suns(
    player_count: usize,
    options: &GameOptions,
) -> Result<Option<u32>, TallyError> {
    check_player_count(player_count)?;
    if !options.rising_sun {
        return Ok(None);
    }
    let suns = match player_count {
        2 => 5,
        3 => 8,
        4 => 10,
        5 => 12,
        _ => 13,
    };
    Ok(Some(suns))
}
