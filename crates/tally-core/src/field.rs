//! Field resolution: which player counter an action touches.
//!
//! Each adjustment action maps to exactly one `(bucket, subfield)` pair and a
//! sign. Actions without a per-player target (start, end, save, load, next
//! turn, pause, unpause, select player, grouped action) and the game-wide
//! prophecy actions resolve to `None`.
//!
//! Victory subfields that mirror a supply pile (estates, duchies, provinces,
//! colonies, curses) also report that pile through [`FieldTarget::supply_pile`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::GameAction;
use crate::supply::SupplyPile;
use crate::TallyError;

// ---------------------------------------------------------------------------
// Bucket / Subfield
// ---------------------------------------------------------------------------

/// A named group of counters on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    /// Counters for the turn in progress.
    Turn,
    /// Counters that become the player's turn counters at the next turn.
    NextTurn,
    /// Persistent per-player resources.
    Mats,
    /// Scoring counters.
    Victory,
}

/// A single counter inside a [`Bucket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subfield {
    Actions,
    Buys,
    Coins,
    Cards,
    Gains,
    Coffers,
    Villagers,
    Debt,
    Favors,
    Estates,
    Duchies,
    Provinces,
    Colonies,
    Tokens,
    Other,
    Curses,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bucket::Turn => "turn",
            Bucket::NextTurn => "newTurn",
            Bucket::Mats => "mats",
            Bucket::Victory => "victory",
        })
    }
}

impl fmt::Display for Subfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Subfield::Actions => "actions",
            Subfield::Buys => "buys",
            Subfield::Coins => "coins",
            Subfield::Cards => "cards",
            Subfield::Gains => "gains",
            Subfield::Coffers => "coffers",
            Subfield::Villagers => "villagers",
            Subfield::Debt => "debt",
            Subfield::Favors => "favors",
            Subfield::Estates => "estates",
            Subfield::Duchies => "duchies",
            Subfield::Provinces => "provinces",
            Subfield::Colonies => "colonies",
            Subfield::Tokens => "tokens",
            Subfield::Other => "other",
            Subfield::Curses => "curses",
        })
    }
}

// ---------------------------------------------------------------------------
// FieldTarget
// ---------------------------------------------------------------------------

/// The counter an adjustment action moves, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTarget {
    pub bucket: Bucket,
    pub subfield: Subfield,
    /// `+1` or `-1`.
    pub sign: i64,
}

impl FieldTarget {
    /// The supply pile mirrored by this counter, if any.
    pub fn supply_pile(&self) -> Option<SupplyPile> {
        if self.bucket != Bucket::Victory {
            return None;
        }
        match self.subfield {
            Subfield::Estates => Some(SupplyPile::Estates),
            Subfield::Duchies => Some(SupplyPile::Duchies),
            Subfield::Provinces => Some(SupplyPile::Provinces),
            Subfield::Colonies => Some(SupplyPile::Colonies),
            Subfield::Curses => Some(SupplyPile::Curses),
            _ => None,
        }
    }

    /// The signed change this target applies for `count` units.
    pub fn delta(&self, count: u32) -> i64 {
        self.sign * i64::from(count)
    }
}

/// Resolve the player counter touched by `action`.
pub fn resolve_field(action: GameAction) -> Option<FieldTarget> {
    use Bucket::*;
    use GameAction as A;

    let (bucket, subfield) = match action {
        A::AddActions | A::RemoveActions => (Turn, Subfield::Actions),
        A::AddBuys | A::RemoveBuys => (Turn, Subfield::Buys),
        A::AddCoins | A::RemoveCoins => (Turn, Subfield::Coins),
        A::AddCards | A::RemoveCards => (Turn, Subfield::Cards),
        A::AddGains | A::RemoveGains => (Turn, Subfield::Gains),

        A::AddCoffers | A::RemoveCoffers => (Mats, Subfield::Coffers),
        A::AddVillagers | A::RemoveVillagers => (Mats, Subfield::Villagers),
        A::AddDebt | A::RemoveDebt => (Mats, Subfield::Debt),
        A::AddFavors | A::RemoveFavors => (Mats, Subfield::Favors),

        A::AddEstates | A::RemoveEstates => (Victory, Subfield::Estates),
        A::AddDuchies | A::RemoveDuchies => (Victory, Subfield::Duchies),
        A::AddProvinces | A::RemoveProvinces => (Victory, Subfield::Provinces),
        A::AddColonies | A::RemoveColonies => (Victory, Subfield::Colonies),
        A::AddVpTokens | A::RemoveVpTokens => (Victory, Subfield::Tokens),
        A::AddOtherVp | A::RemoveOtherVp => (Victory, Subfield::Other),
        A::AddCurses | A::RemoveCurses => (Victory, Subfield::Curses),

        A::AddNextTurnActions | A::RemoveNextTurnActions => (NextTurn, Subfield::Actions),
        A::AddNextTurnBuys | A::RemoveNextTurnBuys => (NextTurn, Subfield::Buys),
        A::AddNextTurnCoins | A::RemoveNextTurnCoins => (NextTurn, Subfield::Coins),
        A::AddNextTurnCards | A::RemoveNextTurnCards => (NextTurn, Subfield::Cards),

        A::StartGame
        | A::EndGame
        | A::SaveGame
        | A::LoadGame
        | A::NextTurn
        | A::Pause
        | A::Unpause
        | A::SelectPlayer
        | A::GroupedAction
        | A::AddProphecy
        | A::RemoveProphecy => return None,
    };

    Some(FieldTarget {
        bucket,
        subfield,
        sign: action.sign(),
    })
}

/// The action that adds to (`increment == true`) or removes from the given
/// counter. Fails with [`TallyError::InvalidField`] for pairs no action
/// targets, such as `turn.favors`.
pub fn action_for_field(
    bucket: Bucket,
    subfield: Subfield,
    increment: bool,
) -> Result<GameAction, TallyError> {
    let sign = if increment { 1 } else { -1 };
    GameAction::ALL
        .iter()
        .copied()
        .find(|action| {
            resolve_field(*action)
                == Some(FieldTarget {
                    bucket,
                    subfield,
                    sign,
                })
        })
        .ok_or(TallyError::InvalidField { bucket, subfield })
}
