//! Decision policies for agents.
//!
//! This module provides the `Policy` seam the turn loop asks for moves, and
//! bots at three difficulty levels:
//! - Easy: Random legal moves
//! - Medium: Fixed priorities (cities, then settlements, then roads)
//! - Hard: One-ply lookahead over successor states

use crate::actions::Action;
use crate::board::{Board, PlayerId, VertexId};
use crate::game::GameState;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chooses one action per turn for an agent
pub trait Policy {
    /// Pick one of `state.legal_actions(agent)`, or `None` to pass
    fn choose_action(&mut self, state: &GameState, agent: PlayerId) -> Option<Action>;
}

impl<F> Policy for F
where
    F: FnMut(&GameState, PlayerId) -> Option<Action>,
{
    fn choose_action(&mut self, state: &GameState, agent: PlayerId) -> Option<Action> {
        self(state, agent)
    }
}

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Medium => "medium",
            BotDifficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for BotDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(BotDifficulty::Easy),
            "medium" => Ok(BotDifficulty::Medium),
            "hard" => Ok(BotDifficulty::Hard),
            other => Err(format!("unknown bot difficulty '{}'", other)),
        }
    }
}

/// A bot player that can decide on actions
pub struct Bot {
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self {
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Easy: Just pick a random legal action
    fn choose_easy(&mut self, actions: &[Action]) -> Option<Action> {
        actions.choose(&mut self.rng).copied()
    }

    /// Medium: cities on the richest settlement, then the richest free
    /// vertex, then the road heading for the best open spot
    fn choose_medium(&mut self, state: &GameState, actions: &[Action]) -> Option<Action> {
        let board = state.board();

        let city = best_by(actions, |a| match a {
            Action::City(v) => Some(board.production_score(*v)),
            _ => None,
        });
        if city.is_some() {
            return city;
        }

        let settlement = best_by(actions, |a| match a {
            Action::Settle(v) => Some(board.production_score(*v)),
            _ => None,
        });
        if settlement.is_some() {
            return settlement;
        }

        let road = best_by(actions, |a| match a {
            Action::Road(e) => Some(
                board
                    .vertex_ends(*e)
                    .iter()
                    .map(|v| expansion_score(board, *v))
                    .max()
                    .unwrap_or(0),
            ),
            _ => None,
        });
        road.or_else(|| self.choose_easy(actions))
    }

    /// Hard: evaluate every successor and keep the best one
    fn choose_hard(&mut self, state: &GameState, agent: PlayerId, actions: &[Action]) -> Option<Action> {
        best_by(actions, |a| {
            state
                .generate_successor(agent, *a)
                .ok()
                .map(|next| evaluate(&next, agent))
        })
    }
}

impl Policy for Bot {
    fn choose_action(&mut self, state: &GameState, agent: PlayerId) -> Option<Action> {
        let actions = state.legal_actions(agent);
        if actions.is_empty() {
            return None;
        }

        match self.difficulty {
            BotDifficulty::Easy => self.choose_easy(&actions),
            BotDifficulty::Medium => self.choose_medium(state, &actions),
            BotDifficulty::Hard => self.choose_hard(state, agent, &actions),
        }
    }
}

/// The highest-scoring action; the earliest wins ties
fn best_by<F>(actions: &[Action], mut score: F) -> Option<Action>
where
    F: FnMut(&Action) -> Option<u32>,
{
    let mut best: Option<(u32, Action)> = None;
    for action in actions {
        if let Some(s) = score(action) {
            if best.map_or(true, |(top, _)| s > top) {
                best = Some((s, *action));
            }
        }
    }
    best.map(|(_, action)| action)
}

/// How good a vertex is as a stepping stone: its own score if it can be
/// settled, otherwise the best settleable neighbour
fn expansion_score(board: &Board, vertex: VertexId) -> u32 {
    if board.can_settle(vertex) {
        return board.production_score(vertex);
    }
    board
        .neighbors_of_vertex(vertex)
        .iter()
        .filter(|n| board.can_settle(**n))
        .map(|n| board.production_score(*n))
        .max()
        .unwrap_or(0)
}

/// Position value for `agent`: victory points dominate, then expected
/// production, then the best open vertex at the end of a road
fn evaluate(state: &GameState, agent: PlayerId) -> u32 {
    let Some(me) = state.agent(agent) else {
        return 0;
    };
    let board = state.board();

    let production: u32 = me
        .settlements
        .iter()
        .map(|v| board.production_score(*v))
        .chain(me.cities.iter().map(|v| 2 * board.production_score(*v)))
        .sum();

    let frontier = me
        .roads
        .iter()
        .flat_map(|e| board.vertex_ends(*e))
        .filter(|v| board.can_settle(**v))
        .map(|v| board.production_score(*v))
        .max()
        .unwrap_or(0);

    me.victory_points() * 1000 + production * 10 + frontier
}
