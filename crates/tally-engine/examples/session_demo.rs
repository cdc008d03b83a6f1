//! Scripted scorekeeping session -- plays a short game, undoes a mistake,
//! saves and reloads it, and prints the final standings.
//!
//! Run with:
//!   cargo run --example session_demo -p tally-engine
//!
//! Set `RUST_LOG=debug` to see every append and replay.

use anyhow::Context;
use chrono::{Duration, Utc};
use tally_engine::prelude::*;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let t0 = Utc::now();
    let mut now = t0;
    let mut tick = |minutes: i64| {
        now += Duration::minutes(minutes);
        now
    };

    let options = GameOptions {
        prosperity: true,
        ..GameOptions::default()
    };
    let mut state = new_game(&["Ann", "Ben", "Cy"], options, 0, t0)?;

    // -- Ann plays a Market and buys a Duchy ---------------------------------
    let market = [
        SubAction::new(GameAction::AddCards, 1),
        SubAction::new(GameAction::AddActions, 1),
        SubAction::new(GameAction::AddBuys, 1),
        SubAction::new(GameAction::AddCoins, 1),
    ];
    state = apply_grouped_action(&state, "Play Market", &market, tick(1))?;
    state = append(
        &state,
        ActionRequest::new(GameAction::AddDuchies).player(0).count(1).at(tick(1)),
    )?;

    // -- Ben's turn: a Province is logged for the wrong player ---------------
    state = append(&state, ActionRequest::next_turn(&state).at(tick(2)))?;
    state = append(
        &state,
        ActionRequest::new(GameAction::AddProvinces).player(2).count(1).at(tick(3)),
    )?;
    let mistake = state.log.len() - 1;
    println!(
        "logged {:?} before undo: {}",
        state.log[mistake].action,
        state.log[mistake].describe()
    );
    let outcome = undo(state, mistake);
    anyhow::ensure!(outcome.success, "undo refused: {:?}", outcome.rejection);
    state = append(
        &outcome.state,
        ActionRequest::new(GameAction::AddProvinces).player(1).count(1).at(tick(1)),
    )?;

    // -- A break, then Cy's turn ----------------------------------------------
    state = append(&state, ActionRequest::new(GameAction::Pause).at(tick(1)))?;
    state = append(&state, ActionRequest::new(GameAction::Unpause).at(tick(10)))?;
    state = append(&state, ActionRequest::next_turn(&state).at(tick(1)))?;
    state = append(
        &state,
        ActionRequest::new(GameAction::AddColonies).player(2).count(1).at(tick(4)),
    )?;

    // -- Save, reload the next day, finish -------------------------------------
    let mut store = SaveStore::new(MemoryStorage::default());
    let (_, id) = store.save_game(&state, "Demo night", None, tick(1))?;
    let mut state = store
        .load_game(&id, tick(24 * 60))?
        .context("saved game vanished from storage")?;
    state = append(&state, ActionRequest::new(GameAction::EndGame).at(tick(2)))?;

    let played = game_duration(&state.log, &state.time_cache, now);
    println!("game time (pauses and saves excluded): {}", format_time_span(played));

    for turn in turn_statistics(&state)? {
        println!(
            "turn {} ({:?}): {} -- scores {:?}",
            turn.turn,
            turn.player_index,
            format_time_span(Duration::milliseconds(turn.duration_ms)),
            turn.player_scores
        );
    }

    for ranked in rank_players(&state.players) {
        println!(
            "#{} {} with {} VP",
            ranked.rank, state.players[ranked.index].name, ranked.score
        );
    }

    let report = verify_replay(&state)?;
    anyhow::ensure!(report.is_deterministic(), "replay diverged: {report:?}");
    println!("replayed {} entries, hash {}", report.entries_replayed, report.actual_hash);
    Ok(())
}
