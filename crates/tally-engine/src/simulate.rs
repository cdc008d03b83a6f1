//! Seeded session simulator.
//!
//! Drives a game through the public append path with random but plausible
//! play: counter changes, buys from the supply, grouped actions, the odd
//! pause, and a NEXT_TURN at the end of each turn. Moves the engine rejects
//! for lack of supply or counters are skipped. The same config always
//! produces the same log.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tally_core::action::GameAction;
use tally_core::options::GameOptions;
use tally_core::TallyError;

use crate::group::{apply_grouped_action, SubAction};
use crate::state::{new_game, GameState};
use crate::validate::{append, ActionRequest};

/// What to simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub players: usize,
    /// Number of NEXT_TURN entries to log before END_GAME.
    pub turns: u32,
    pub seed: u64,
    pub options: GameOptions,
    /// Timestamp of START_GAME.
    pub start: DateTime<Utc>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: 3,
            turns: 50,
            seed: 42,
            options: GameOptions::everything(),
            start: Utc.with_ymd_and_hms(2023, 1, 1, 18, 0, 0).single().unwrap_or_default(),
        }
    }
}

const MOVES: &[GameAction] = &[
    GameAction::AddActions,
    GameAction::RemoveActions,
    GameAction::AddBuys,
    GameAction::RemoveBuys,
    GameAction::AddCoins,
    GameAction::RemoveCoins,
    GameAction::AddCards,
    GameAction::AddGains,
    GameAction::AddCoffers,
    GameAction::RemoveCoffers,
    GameAction::AddVillagers,
    GameAction::RemoveVillagers,
    GameAction::AddDebt,
    GameAction::RemoveDebt,
    GameAction::AddFavors,
    GameAction::RemoveFavors,
    GameAction::RemoveProphecy,
    GameAction::AddEstates,
    GameAction::AddDuchies,
    GameAction::AddProvinces,
    GameAction::AddColonies,
    GameAction::RemoveEstates,
    GameAction::AddVpTokens,
    GameAction::AddCurses,
    GameAction::AddNextTurnCards,
];

fn market() -> Vec<SubAction> {
    vec![
        SubAction::new(GameAction::AddCards, 1),
        SubAction::new(GameAction::AddActions, 1),
        SubAction::new(GameAction::AddBuys, 1),
        SubAction::new(GameAction::AddCoins, 1),
    ]
}

/// Keep `result` if it succeeded; skip it if the engine refused it for lack
/// of supply or counters.
fn keep_or_skip(
    state: GameState,
    result: Result<GameState, TallyError>,
) -> Result<GameState, TallyError> {
    match result {
        Ok(next) => Ok(next),
        Err(err) if err.is_insufficiency() => Ok(state),
        Err(err) => Err(err),
    }
}

/// Play out a session described by `config` and return the ended game.
///
/// # Errors
///
/// Setup errors from [`new_game`], and any rejection other than running out
/// of supply or counters.
pub fn simulate_session(config: &SimulationConfig) -> Result<GameState, TallyError> {
    let mut rng = Pcg64::seed_from_u64(config.seed);
    let first = rng.gen_range(0..config.players.max(1));
    let mut now = config.start;
    let mut state = new_game(
        &(0..config.players)
            .map(|i| format!("Player {}", i + 1))
            .collect::<Vec<_>>(),
        config.options.clone(),
        first,
        now,
    )?;

    for _ in 0..config.turns {
        let moves = rng.gen_range(1..=6);
        for _ in 0..moves {
            now += Duration::seconds(rng.gen_range(5..90));
            let current = state.selected_player_index.unwrap_or(0);

            if rng.gen_bool(0.1) {
                let next = apply_grouped_action(&state, "Play Market", &market(), now);
                state = keep_or_skip(state, next)?;
                continue;
            }

            let action = MOVES[rng.gen_range(0..MOVES.len())];
            let player = if action == GameAction::AddCurses {
                rng.gen_range(0..state.players.len())
            } else {
                current
            };
            let mut request = ActionRequest::new(action)
                .player(player)
                .count(rng.gen_range(1..=3))
                .at(now);
            if action == GameAction::RemoveEstates && rng.gen_bool(0.5) {
                request = request.trash();
            }
            let next = append(&state, request);
            state = keep_or_skip(state, next)?;
        }

        if rng.gen_bool(0.05) {
            now += Duration::seconds(5);
            state = append(&state, ActionRequest::new(GameAction::Pause).at(now))?;
            now += Duration::minutes(rng.gen_range(1..10));
            state = append(&state, ActionRequest::new(GameAction::Unpause).at(now))?;
        }

        now += Duration::seconds(rng.gen_range(5..30));
        state = append(&state, ActionRequest::next_turn(&state).at(now))?;
    }

    now += Duration::seconds(30);
    let ended = append(&state, ActionRequest::new(GameAction::EndGame).at(now))?;
    tracing::debug!(
        seed = config.seed,
        entries = ended.log.len(),
        "simulated session"
    );
    Ok(ended)
}
