//! Per-player counters.
//!
//! All counters are unsigned. Adjustments arrive as signed deltas and go
//! through [`offset_counter`], which refuses to move a counter below zero.

use serde::{Deserialize, Serialize};

use crate::field::{Bucket, Subfield};
use crate::TallyError;

/// Estates each player starts with in hand.
pub const STARTING_ESTATES: u32 = 3;

// ---------------------------------------------------------------------------
// Counter groups
// ---------------------------------------------------------------------------

/// Counters for a single turn. The default is the standard opening of a
/// turn: one action, one buy, no coins, five cards, no gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnCounters {
    pub actions: u32,
    pub buys: u32,
    pub coins: u32,
    pub cards: u32,
    pub gains: u32,
}

impl Default for TurnCounters {
    fn default() -> Self {
        Self {
            actions: 1,
            buys: 1,
            coins: 0,
            cards: 5,
            gains: 0,
        }
    }
}

/// Persistent resources kept on a player's mats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatCounters {
    pub coffers: u32,
    pub villagers: u32,
    pub debt: u32,
    pub favors: u32,
}

/// Scoring counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictoryCounters {
    pub estates: u32,
    pub duchies: u32,
    pub provinces: u32,
    pub colonies: u32,
    pub tokens: u32,
    pub other: u32,
    pub curses: u32,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub mats: MatCounters,
    pub turn: TurnCounters,
    /// Becomes `turn` when the next turn begins.
    pub new_turn: TurnCounters,
    pub victory: VictoryCounters,
}

impl Player {
    /// A fresh player holding the starting estates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_owned(),
            mats: MatCounters::default(),
            turn: TurnCounters::default(),
            new_turn: TurnCounters::default(),
            victory: VictoryCounters {
                estates: STARTING_ESTATES,
                ..VictoryCounters::default()
            },
        }
    }

    /// Read a counter by bucket and subfield.
    pub fn counter(&self, bucket: Bucket, subfield: Subfield) -> Result<u32, TallyError> {
        let value = match bucket {
            Bucket::Turn => turn_value(&self.turn, subfield),
            Bucket::NextTurn => turn_value(&self.new_turn, subfield),
            Bucket::Mats => match subfield {
                Subfield::Coffers => Some(self.mats.coffers),
                Subfield::Villagers => Some(self.mats.villagers),
                Subfield::Debt => Some(self.mats.debt),
                Subfield::Favors => Some(self.mats.favors),
                _ => None,
            },
            Bucket::Victory => match subfield {
                Subfield::Estates => Some(self.victory.estates),
                Subfield::Duchies => Some(self.victory.duchies),
                Subfield::Provinces => Some(self.victory.provinces),
                Subfield::Colonies => Some(self.victory.colonies),
                Subfield::Tokens => Some(self.victory.tokens),
                Subfield::Other => Some(self.victory.other),
                Subfield::Curses => Some(self.victory.curses),
                _ => None,
            },
        };
        value.ok_or(TallyError::InvalidField { bucket, subfield })
    }

    /// Mutable access to a counter by bucket and subfield.
    ///
    /// Fails with [`TallyError::InvalidField`] when the bucket has no such
    /// subfield.
    pub fn counter_mut(
        &mut self,
        bucket: Bucket,
        subfield: Subfield,
    ) -> Result<&mut u32, TallyError> {
        let slot = match bucket {
            Bucket::Turn => turn_slot(&mut self.turn, subfield),
            Bucket::NextTurn => turn_slot(&mut self.new_turn, subfield),
            Bucket::Mats => match subfield {
                Subfield::Coffers => Some(&mut self.mats.coffers),
                Subfield::Villagers => Some(&mut self.mats.villagers),
                Subfield::Debt => Some(&mut self.mats.debt),
                Subfield::Favors => Some(&mut self.mats.favors),
                _ => None,
            },
            Bucket::Victory => match subfield {
                Subfield::Estates => Some(&mut self.victory.estates),
                Subfield::Duchies => Some(&mut self.victory.duchies),
                Subfield::Provinces => Some(&mut self.victory.provinces),
                Subfield::Colonies => Some(&mut self.victory.colonies),
                Subfield::Tokens => Some(&mut self.victory.tokens),
                Subfield::Other => Some(&mut self.victory.other),
                Subfield::Curses => Some(&mut self.victory.curses),
                _ => None,
            },
        };
        slot.ok_or(TallyError::InvalidField { bucket, subfield })
    }

    /// Start a new turn: the live counters are replaced by the next-turn
    /// counters. The next-turn counters are kept as they are.
    pub fn begin_turn(&mut self) {
        self.turn = self.new_turn;
    }
}

fn turn_value(counters: &TurnCounters, subfield: Subfield) -> Option<u32> {
    match subfield {
        Subfield::Actions => Some(counters.actions),
        Subfield::Buys => Some(counters.buys),
        Subfield::Coins => Some(counters.coins),
        Subfield::Cards => Some(counters.cards),
        Subfield::Gains => Some(counters.gains),
        _ => None,
    }
}

fn turn_slot(counters: &mut TurnCounters, subfield: Subfield) -> Option<&mut u32> {
    match subfield {
        Subfield::Actions => Some(&mut counters.actions),
        Subfield::Buys => Some(&mut counters.buys),
        Subfield::Coins => Some(&mut counters.coins),
        Subfield::Cards => Some(&mut counters.cards),
        Subfield::Gains => Some(&mut counters.gains),
        _ => None,
    }
}

/// The error for a counter move that [`offset_counter`] refused: a removal
/// that would go below zero, or an addition past `u32::MAX`.
pub fn counter_out_of_range(counter: String, current: u32, delta: i64) -> TallyError {
    if delta < 0 {
        TallyError::InsufficientCounter {
            counter,
            available: current,
            requested: delta.unsigned_abs(),
        }
    } else {
        TallyError::CounterOverflow {
            counter,
            current,
            added: delta.unsigned_abs(),
        }
    }
}

/// `current + delta`, or `None` if the result would leave `u32`.
pub fn offset_counter(current: u32, delta: i64) -> Option<u32> {
    let next = i64::from(current).checked_add(delta)?;
    u32::try_from(next).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_defaults() {
        let p = Player::new("  Alice ");
        assert_eq!(p.name, "Alice");
        assert_eq!(p.turn, TurnCounters::default());
        assert_eq!(p.turn.actions, 1);
        assert_eq!(p.turn.cards, 5);
        assert_eq!(p.victory.estates, STARTING_ESTATES);
        assert_eq!(p.mats, MatCounters::default());
    }

    #[test]
    fn counter_access_by_field() {
        let mut p = Player::new("Bob");
        *p.counter_mut(Bucket::Mats, Subfield::Coffers).unwrap() += 2;
        *p.counter_mut(Bucket::NextTurn, Subfield::Buys).unwrap() += 1;
        assert_eq!(p.mats.coffers, 2);
        assert_eq!(p.new_turn.buys, 2);
        assert_eq!(p.counter(Bucket::Victory, Subfield::Estates).unwrap(), 3);
    }

    #[test]
    fn counter_reads_match_mutable_slots() {
        let mut p = Player::new("Erin");
        p.turn.gains = 4;
        p.new_turn.actions = 2;
        p.mats.favors = 6;
        p.victory.curses = 1;
        for (bucket, subfield, expected) in [
            (Bucket::Turn, Subfield::Gains, 4),
            (Bucket::NextTurn, Subfield::Actions, 2),
            (Bucket::Mats, Subfield::Favors, 6),
            (Bucket::Victory, Subfield::Curses, 1),
        ] {
            assert_eq!(p.counter(bucket, subfield).unwrap(), expected);
            assert_eq!(*p.clone().counter_mut(bucket, subfield).unwrap(), expected);
        }
        assert!(matches!(
            p.counter(Bucket::Mats, Subfield::Coins),
            Err(TallyError::InvalidField { .. })
        ));
    }

    #[test]
    fn mismatched_bucket_is_invalid_field() {
        let mut p = Player::new("Carol");
        let err = p.counter_mut(Bucket::Turn, Subfield::Curses).unwrap_err();
        assert!(matches!(
            err,
            TallyError::InvalidField {
                bucket: Bucket::Turn,
                subfield: Subfield::Curses
            }
        ));
    }

    #[test]
    fn begin_turn_rolls_next_turn_counters() {
        let mut p = Player::new("Dave");
        p.new_turn.cards = 7;
        p.turn.coins = 9;
        p.begin_turn();
        assert_eq!(p.turn.cards, 7);
        assert_eq!(p.turn.coins, 0);
        assert_eq!(p.new_turn.cards, 7);
    }

    #[test]
    fn offset_refuses_negative() {
        assert_eq!(offset_counter(3, -3), Some(0));
        assert_eq!(offset_counter(3, 2), Some(5));
        assert_eq!(offset_counter(0, -1), None);
        assert_eq!(offset_counter(u32::MAX, 1), None);
    }

    #[test]
    fn out_of_range_names_the_direction() {
        assert!(matches!(
            counter_out_of_range("mats.debt".to_owned(), 1, -2),
            TallyError::InsufficientCounter { available: 1, requested: 2, .. }
        ));
        assert!(matches!(
            counter_out_of_range("mats.debt".to_owned(), u32::MAX, 3),
            TallyError::CounterOverflow { current: u32::MAX, added: 3, .. }
        ));
    }
}
