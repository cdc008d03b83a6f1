//! Victory-point scoring and player ranking.

use serde::{Deserialize, Serialize};

use crate::player::Player;

pub const ESTATE_VP: i64 = 1;
pub const DUCHY_VP: i64 = 3;
pub const PROVINCE_VP: i64 = 6;
pub const COLONY_VP: i64 = 10;
pub const CURSE_VP: i64 = -1;

/// Total victory points held by `player`.
pub fn victory_points(player: &Player) -> i64 {
    let v = &player.victory;
    i64::from(v.estates) * ESTATE_VP
        + i64::from(v.duchies) * DUCHY_VP
        + i64::from(v.provinces) * PROVINCE_VP
        + i64::from(v.colonies) * COLONY_VP
        + i64::from(v.tokens)
        + i64::from(v.other)
        + i64::from(v.curses) * CURSE_VP
}

/// A player's place in the standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPlayer {
    /// Index into the game's player list.
    pub index: usize,
    pub score: i64,
    /// 1-based; tied scores share a rank and the next rank is skipped.
    pub rank: usize,
}

/// Rank players by score (descending), breaking ties in ordering by name.
pub fn rank_players(players: &[Player]) -> Vec<RankedPlayer> {
    let mut scored: Vec<(usize, i64)> = players
        .iter()
        .enumerate()
        .map(|(index, player)| (index, victory_points(player)))
        .collect();
    scored.sort_by(|(a_index, a_score), (b_index, b_score)| {
        b_score
            .cmp(a_score)
            .then_with(|| players[*a_index].name.cmp(&players[*b_index].name))
    });

    let mut ranked: Vec<RankedPlayer> = Vec::with_capacity(scored.len());
    for (position, (index, score)) in scored.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if prev.score == score => prev.rank,
            _ => position + 1,
        };
        ranked.push(RankedPlayer { index, score, rank });
    }
    ranked
}
