//! The turn loop.
//!
//! A `Game` owns one `GameState` and one `Policy` per agent. Each turn rolls
//! (or is handed) a dice total, pays every agent, lets the current agent act
//! once and moves on. Turns are applied to a copy and committed whole, so a
//! policy returning an illegal action leaves the game as it was.

use crate::actions::{Action, GameEvent};
use crate::board::PlayerId;
use crate::bot::Policy;
use crate::game::{GameError, GameState};
use crate::hex::VertexCoord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One entry of the move history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-based turn number
    pub turn: u32,
    pub agent: PlayerId,
    pub name: String,
    pub roll: u8,
    /// `None` when the agent passed
    pub action: Option<Action>,
}

pub struct Game {
    state: GameState,
    policies: Vec<Box<dyn Policy>>,
    history: Vec<MoveRecord>,
    current: PlayerId,
    turns_played: u32,
}

impl Game {
    /// Pair a state with one policy per agent, in agent order
    pub fn new(state: GameState, policies: Vec<Box<dyn Policy>>) -> Result<Self, GameError> {
        if policies.len() != state.num_agents() {
            return Err(GameError::PolicyCount {
                expected: state.num_agents(),
                found: policies.len(),
            });
        }
        Ok(Self {
            state,
            policies,
            history: Vec::new(),
            current: 0,
            turns_played: 0,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn current_agent(&self) -> PlayerId {
        self.current
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.game_over()
    }

    /// Hand out the starting vertices round robin and pay each agent one
    /// card per hexagon touching its settlements.
    ///
    /// Every agent must receive at least one vertex.
    pub fn setup(&mut self, starting_vertices: &[VertexCoord]) -> Result<Vec<GameEvent>, GameError> {
        let agents = self.state.num_agents();
        if starting_vertices.len() < agents {
            return Err(GameError::NotEnoughStartingVertices {
                agents,
                vertices: starting_vertices.len(),
            });
        }

        let mut next = self.state.deep_copy();
        let mut events = Vec::new();

        for (i, coord) in starting_vertices.iter().enumerate() {
            let player = (i % agents) as PlayerId;
            let vertex = next.board().vertex_id(*coord)?;
            next.place_initial_settlement(player, vertex)?;
            events.push(GameEvent::InitialSettlementPlaced {
                player,
                location: vertex,
            });
        }

        for (player, gained) in next.collect_initial_resources() {
            debug!("Player {} starts with {}", player, gained);
            events.push(GameEvent::ResourcesCollected { player, gained });
        }

        self.state = next;
        Ok(events)
    }

    /// Play one turn for the current agent with the given dice total.
    ///
    /// Fails with `TerminalState` once someone has won. Any other error
    /// comes from the policy's action and leaves the game unchanged.
    pub fn play_turn(&mut self, die_roll: u8) -> Result<Vec<GameEvent>, GameError> {
        if let Some(winner) = self.state.game_over() {
            return Err(GameError::TerminalState { winner });
        }

        let player = self.current;
        let turn = self.turns_played + 1;
        let mut next = self.state.deep_copy();
        let mut events = vec![GameEvent::DiceRolled {
            player,
            total: die_roll,
        }];

        for (agent, gained) in next.distribute_resources(die_roll) {
            if !gained.is_empty() {
                events.push(GameEvent::ResourcesCollected { player: agent, gained });
            }
        }

        let policy = self
            .policies
            .get_mut(player as usize)
            .ok_or(GameError::UnknownAgent(player))?;
        let action = policy.choose_action(&next, player);

        match action {
            Some(action) => {
                let description = action.describe(next.board());
                next.apply_action(player, action).map_err(|e| {
                    warn!("Turn {}: player {} chose illegal {}: {}", turn, player, description, e);
                    e
                })?;
                debug!("Turn {}: player {} rolled {} and built {}", turn, player, die_roll, description);
                events.push(GameEvent::built(player, action));
            }
            None => {
                debug!("Turn {}: player {} rolled {} and passed", turn, player, die_roll);
                events.push(GameEvent::TurnPassed { player });
            }
        }

        let name = next
            .agent(player)
            .map(|a| a.name.clone())
            .unwrap_or_default();
        self.history.push(MoveRecord {
            turn,
            agent: player,
            name,
            roll: die_roll,
            action,
        });

        if let Some(winner) = next.game_over() {
            let victory_points = next.victory_points(winner);
            info!("Player {} won on turn {} with {} VP", winner, turn, victory_points);
            events.push(GameEvent::GameWon {
                player: winner,
                victory_points,
            });
        }

        self.state = next;
        self.turns_played = turn;
        self.current = ((player as usize + 1) % self.state.num_agents()) as PlayerId;
        Ok(events)
    }

    /// Roll two dice per turn until someone wins or `max_turns` turns have
    /// been played in total
    pub fn run<R: Rng>(&mut self, rng: &mut R, max_turns: u32) -> Result<Option<PlayerId>, GameError> {
        while self.state.game_over().is_none() && self.turns_played < max_turns {
            let roll = rng.gen_range(1..=6) + rng.gen_range(1..=6);
            self.play_turn(roll)?;
        }

        let winner = self.winner();
        if winner.is_none() {
            info!("No winner after {} turns", self.turns_played);
        }
        Ok(winner)
    }
}
