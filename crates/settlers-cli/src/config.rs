//! Settings read from the environment.

use anyhow::{bail, Context};
use settlers_core::{BotDifficulty, GameConfig, RoadRule};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Everything needed to run one game
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub game: GameConfig,
    /// One difficulty per player
    pub bots: Vec<BotDifficulty>,
    /// JSON layout to play on instead of the beginner board
    pub layout_path: Option<PathBuf>,
    /// Where to write the move history
    pub history_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key-value source
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GameConfig::default();
        let game = GameConfig {
            num_players: parse(&get, "SETTLERS_PLAYERS")?.unwrap_or(defaults.num_players),
            victory_points_to_win: parse(&get, "SETTLERS_VP_TO_WIN")?
                .unwrap_or(defaults.victory_points_to_win),
            max_turns: parse(&get, "SETTLERS_MAX_TURNS")?.unwrap_or(defaults.max_turns),
            seed: parse(&get, "SETTLERS_SEED")?,
            road_rule: match get("SETTLERS_ROAD_RULE").as_deref().map(str::trim) {
                None | Some("") | Some("adjacent") => RoadRule::AdjacentToBuildings,
                Some("network") => RoadRule::ExtendNetwork,
                Some(other) => bail!("SETTLERS_ROAD_RULE must be 'adjacent' or 'network', got '{}'", other),
            },
        };
        game.validate()?;

        let players = game.num_players as usize;
        let bots = match get("SETTLERS_BOTS").filter(|s| !s.trim().is_empty()) {
            None => vec![BotDifficulty::Medium; players],
            Some(list) => {
                let parsed = list
                    .split(',')
                    .map(|s| s.parse::<BotDifficulty>().map_err(anyhow::Error::msg))
                    .collect::<anyhow::Result<Vec<_>>>()
                    .context("invalid SETTLERS_BOTS")?;
                match parsed.len() {
                    1 => vec![parsed[0]; players],
                    n if n == players => parsed,
                    n => bail!("SETTLERS_BOTS lists {} bots for {} players", n, players),
                }
            }
        };

        Ok(Self {
            game,
            bots,
            layout_path: get("SETTLERS_LAYOUT").map(PathBuf::from),
            history_path: get("SETTLERS_HISTORY").map(PathBuf::from),
        })
    }
}

fn parse<T, F>(get: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {}='{}': {}", key, raw, e)),
    }
}
