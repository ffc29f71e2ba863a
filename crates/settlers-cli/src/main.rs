//! Runs a bot-vs-bot game and reports the result.

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use settlers_core::{Bot, Game, GameSnapshot, GameState, Layout, MoveRecord, PlayerId, Policy};
use std::fs;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::Config;

/// What gets written to `SETTLERS_HISTORY`
#[derive(Serialize)]
struct Report<'a> {
    winner: Option<PlayerId>,
    turns: u32,
    history: &'a [MoveRecord],
    final_state: GameSnapshot,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let layout = match &config.layout_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading layout {}", path.display()))?;
            Layout::from_json(&text).with_context(|| format!("loading layout {}", path.display()))?
        }
        None => Layout::beginner(),
    };

    let seed = config.game.seed;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let policies: Vec<Box<dyn Policy>> = config
        .bots
        .iter()
        .enumerate()
        .map(|(i, difficulty)| {
            let bot = match seed {
                Some(seed) => Bot::with_seed(*difficulty, seed.wrapping_add(i as u64 + 1)),
                None => Bot::new(*difficulty),
            };
            Box::new(bot) as Box<dyn Policy>
        })
        .collect();

    let state = GameState::new(&layout, &config.game)?;
    let mut game = Game::new(state, policies)?;
    game.setup(&layout.starting_vertices)
        .context("placing starting settlements")?;

    info!(
        "Starting {}-player game to {} VP, roads {:?} ({})",
        config.game.num_players,
        config.game.victory_points_to_win,
        game.state().road_rule(),
        config
            .bots
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let winner = game.run(&mut rng, config.game.max_turns)?;
    match winner {
        Some(player) => info!(
            "Player {} wins after {} turns",
            player,
            game.turns_played()
        ),
        None => info!("Stopped after {} turns without a winner", game.turns_played()),
    }
    for agent in game.state().agents() {
        info!("{}", agent);
    }

    if let Some(path) = &config.history_path {
        let report = Report {
            winner,
            turns: game.turns_played(),
            history: game.history(),
            final_state: game.state().snapshot(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing history {}", path.display()))?;
        info!("Wrote {} moves to {}", game.history().len(), path.display());
    }

    Ok(())
}
