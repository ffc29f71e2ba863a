//! Core game state.
//!
//! `GameState` pairs one board with the ordered agents. It enumerates legal
//! actions and produces successor states without touching the receiver, which
//! is what lets bots search over independent copies.

use crate::actions::Action;
use crate::agent::{Agent, ResourceHand};
use crate::board::{Board, BoardError, BoardSnapshot, PlayerId, VertexBuilding, VertexId};
use crate::layout::{Layout, LayoutError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Where new roads may be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoadRule {
    /// Only on edges touching one of the agent's settlements or cities
    #[default]
    AdjacentToBuildings,
    /// Also from the far end of the agent's own roads, unless another
    /// player has built on that vertex
    ExtendNetwork,
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of agents (2-4)
    pub num_players: u8,
    /// Victory points needed to win
    pub victory_points_to_win: u32,
    /// Turns played before the runner gives up without a winner
    pub max_turns: u32,
    /// Seed for dice and bots; entropy when absent
    pub seed: Option<u64>,
    pub road_rule: RoadRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 3,
            victory_points_to_win: 10,
            max_turns: 1000,
            seed: None,
            road_rule: RoadRule::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if !(2..=4).contains(&self.num_players) {
            return Err(GameError::InvalidPlayerCount(self.num_players));
        }
        if self.victory_points_to_win == 0 {
            return Err(GameError::InvalidVictoryPoints);
        }
        Ok(())
    }
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("game is over, player {winner} has won")]
    TerminalState { winner: PlayerId },

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("no own settlement at {0}")]
    NotYourSettlement(VertexId),

    #[error("no agent with index {0}")]
    UnknownAgent(PlayerId),

    #[error("games need 2-4 players, got {0}")]
    InvalidPlayerCount(u8),

    #[error("victory points to win must be at least 1")]
    InvalidVictoryPoints,

    #[error("expected one policy per agent ({expected}), got {found}")]
    PolicyCount { expected: usize, found: usize },

    #[error("{vertices} starting vertices cannot seat {agents} agents")]
    NotEnoughStartingVertices { agents: usize, vertices: usize },
}

/// The complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    agents: Vec<Agent>,
    road_rule: RoadRule,
}

impl GameState {
    /// Create a fresh game on `layout` with empty-handed agents named
    /// `Player 0`, `Player 1`, ...
    pub fn new(layout: &Layout, config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let board = Board::from_layout(layout)?;
        let agents = (0..config.num_players)
            .map(|i| Agent::new(format!("Player {}", i), i, config.victory_points_to_win))
            .collect();

        Ok(Self {
            board,
            agents,
            road_rule: config.road_rule,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: PlayerId) -> Option<&Agent> {
        self.agents.get(id as usize)
    }

    pub fn agent_mut(&mut self, id: PlayerId) -> Option<&mut Agent> {
        self.agents.get_mut(id as usize)
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Where this game lets new roads go
    pub fn road_rule(&self) -> RoadRule {
        self.road_rule
    }

    /// Victory points of an agent, 0 for unknown indices
    pub fn victory_points(&self, id: PlayerId) -> u32 {
        self.agent(id).map_or(0, Agent::victory_points)
    }

    /// The first agent in turn order that has reached the win threshold.
    ///
    /// Several agents crossing the threshold at once resolve to the lowest
    /// index.
    pub fn game_over(&self) -> Option<PlayerId> {
        self.agents.iter().find(|a| a.has_won()).map(|a| a.agent_index)
    }

    /// Every action `agent` may take right now.
    ///
    /// Roads come first, then settlements, then cities. Within a category the
    /// order follows the agent's own piece lists and then board adjacency.
    /// The result is empty once the game is over.
    pub fn legal_actions(&self, agent: PlayerId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.game_over().is_some() {
            return actions;
        }
        let Some(agent) = self.agent(agent) else {
            return actions;
        };

        if agent.can_build_road() {
            let mut seen = HashSet::new();
            for vertex in self.road_origins(agent) {
                for edge in self.board.edges_of_vertex(vertex) {
                    let open = self.board.edge(*edge).is_some_and(|e| !e.is_occupied());
                    if open && seen.insert(*edge) {
                        actions.push(Action::Road(*edge));
                    }
                }
            }
        }

        if agent.can_settle() {
            let mut seen = HashSet::new();
            for road in &agent.roads {
                for candidate in self.board.vertex_ends(*road) {
                    if self.board.can_settle(*candidate) && seen.insert(*candidate) {
                        actions.push(Action::Settle(*candidate));
                    }
                }
            }
        }

        if agent.can_build_city() {
            actions.extend(agent.settlements.iter().map(|v| Action::City(*v)));
        }

        actions
    }

    /// Vertices new roads may start from, in settlement, city, road order
    fn road_origins(&self, agent: &Agent) -> Vec<VertexId> {
        let mut origins: Vec<VertexId> = agent
            .settlements
            .iter()
            .chain(&agent.cities)
            .copied()
            .collect();

        if self.road_rule == RoadRule::ExtendNetwork {
            for road in &agent.roads {
                for end in self.board.vertex_ends(*road) {
                    let blocked = self
                        .board
                        .vertex(*end)
                        .and_then(|v| v.owner())
                        .is_some_and(|owner| owner != agent.agent_index);
                    if !blocked && !origins.contains(end) {
                        origins.push(*end);
                    }
                }
            }
        }

        origins
    }

    /// The state after `player` takes `action`.
    ///
    /// Works on a copy: the receiver is never changed, and on error the copy
    /// is dropped.
    pub fn generate_successor(&self, player: PlayerId, action: Action) -> Result<GameState, GameError> {
        if let Some(winner) = self.game_over() {
            return Err(GameError::TerminalState { winner });
        }

        let mut next = self.deep_copy();
        next.agent_mut(player)
            .ok_or(GameError::UnknownAgent(player))?
            .apply_action(action)?;
        next.board.apply_action(player, action)?;
        Ok(next)
    }

    /// Apply an action to this state, all or nothing
    pub fn apply_action(&mut self, player: PlayerId, action: Action) -> Result<(), GameError> {
        *self = self.generate_successor(player, action)?;
        Ok(())
    }

    /// Place a free settlement before the first turn.
    ///
    /// Follows the board's placement rules but costs nothing and ignores
    /// roads.
    pub fn place_initial_settlement(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), GameError> {
        if self.agent(player).is_none() {
            return Err(GameError::UnknownAgent(player));
        }
        self.board.build_settlement(player, vertex)?;
        if let Some(agent) = self.agent_mut(player) {
            agent.settlements.push(vertex);
        }
        Ok(())
    }

    /// Pay out a dice roll to every agent, in agent order
    pub fn distribute_resources(&mut self, die_roll: u8) -> Vec<(PlayerId, ResourceHand)> {
        let board = &self.board;
        self.agents
            .iter_mut()
            .map(|agent| (agent.agent_index, agent.update_resources(die_roll, board)))
            .collect()
    }

    /// Pay every agent the starting cards for its settlements
    pub fn collect_initial_resources(&mut self) -> Vec<(PlayerId, ResourceHand)> {
        let board = &self.board;
        self.agents
            .iter_mut()
            .map(|agent| (agent.agent_index, agent.collect_initial_resources(board)))
            .collect()
    }

    /// Copy the board and every agent; the copy shares no mutable state
    pub fn deep_copy(&self) -> GameState {
        GameState {
            board: self.board.deep_copy(),
            agents: self.agents.iter().map(Agent::deep_copy).collect(),
            road_rule: self.road_rule,
        }
    }

    /// Count buildings of `player` on the board; agrees with the agent's
    /// own lists unless something bypassed `apply_action`
    pub fn buildings_on_board(&self, player: PlayerId) -> (usize, usize) {
        self.board
            .buildings_of(player)
            .iter()
            .filter_map(|v| self.board.vertex(*v))
            .fold((0, 0), |(s, c), v| match v.building {
                VertexBuilding::Settlement(_) => (s + 1, c),
                VertexBuilding::City(_) => (s, c + 1),
                VertexBuilding::Empty => (s, c),
            })
    }

    /// JSON-friendly view of the whole game
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.snapshot(),
            agents: self.agents.clone(),
            winner: self.game_over(),
        }
    }
}

/// JSON-friendly game representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: BoardSnapshot,
    pub agents: Vec<Agent>,
    pub winner: Option<PlayerId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{EdgeCoord, VertexCoord};

    fn rich() -> ResourceHand {
        ResourceHand::with_amounts(10, 10, 10, 10, 10)
    }

    fn new_game(config: &GameConfig) -> GameState {
        GameState::new(&Layout::beginner(), config).unwrap()
    }

    fn vid(state: &GameState, x: i32, y: i32) -> VertexId {
        state.board().vertex_id(VertexCoord::new(x, y)).unwrap()
    }

    /// Player 0 settled on (2, 2) with enough resources for anything
    fn settled_game() -> GameState {
        let mut state = new_game(&GameConfig::default());
        let v = vid(&state, 2, 2);
        state.place_initial_settlement(0, v).unwrap();
        state.agent_mut(0).unwrap().resources = rich();
        state
    }

    #[test]
    fn test_new_game() {
        let state = new_game(&GameConfig::default());
        assert_eq!(state.num_agents(), 3);
        assert_eq!(state.agent(1).unwrap().name, "Player 1");
        assert_eq!(state.game_over(), None);
        assert!(state.agent(3).is_none());
    }

    #[test]
    fn test_player_count_is_checked() {
        for count in [0, 1, 5] {
            let config = GameConfig {
                num_players: count,
                ..GameConfig::default()
            };
            assert_eq!(
                GameState::new(&Layout::beginner(), &config),
                Err(GameError::InvalidPlayerCount(count))
            );
        }
    }

    #[test]
    fn test_zero_victory_points_is_rejected() {
        let config = GameConfig {
            victory_points_to_win: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(GameError::InvalidVictoryPoints));
        assert_eq!(
            GameState::new(&Layout::beginner(), &config),
            Err(GameError::InvalidVictoryPoints)
        );

        let one = GameConfig {
            victory_points_to_win: 1,
            ..GameConfig::default()
        };
        let state = GameState::new(&Layout::beginner(), &one).unwrap();
        assert_eq!(state.game_over(), None);
    }

    #[test]
    fn test_no_pieces_no_actions() {
        let mut state = new_game(&GameConfig::default());
        state.agent_mut(0).unwrap().resources = rich();
        assert!(state.legal_actions(0).is_empty());
        assert!(state.legal_actions(9).is_empty());
    }

    #[test]
    fn test_legal_actions_order() {
        let state = settled_game();
        let v = vid(&state, 2, 2);
        let actions = state.legal_actions(0);

        let mut expected: Vec<Action> = state
            .board()
            .edges_of_vertex(v)
            .iter()
            .map(|e| Action::Road(*e))
            .collect();
        expected.push(Action::City(v));
        assert_eq!(actions, expected);
    }

    #[test]
    fn test_actions_gated_by_affordability() {
        let mut state = settled_game();
        state.agent_mut(0).unwrap().resources = ResourceHand::with_amounts(0, 0, 3, 2, 0);
        let v = vid(&state, 2, 2);
        assert_eq!(state.legal_actions(0), vec![Action::City(v)]);

        state.agent_mut(0).unwrap().resources = ResourceHand::with_amounts(1, 1, 0, 0, 0);
        assert!(state
            .legal_actions(0)
            .iter()
            .all(|a| matches!(a, Action::Road(_))));
    }

    #[test]
    fn test_settle_proposes_the_free_road_end() {
        let mut state = settled_game();
        let board = state.board();
        let first = board.edge_id(EdgeCoord::new(5, 4)).unwrap();
        let second = board.edge_id(EdgeCoord::new(7, 4)).unwrap();
        state.apply_action(0, Action::Road(first)).unwrap();
        state.apply_action(0, Action::Road(second)).unwrap();

        let settles: Vec<Action> = state
            .legal_actions(0)
            .into_iter()
            .filter(|a| matches!(a, Action::Settle(_)))
            .collect();
        assert_eq!(settles, vec![Action::Settle(vid(&state, 4, 2))]);
    }

    #[test]
    fn test_one_hop_roads_never_reach_a_legal_settlement() {
        let mut state = settled_game();
        for _ in 0..3 {
            let road = state
                .legal_actions(0)
                .into_iter()
                .find(|a| matches!(a, Action::Road(_)))
                .unwrap();
            state.apply_action(0, road).unwrap();
        }
        assert!(!state
            .legal_actions(0)
            .iter()
            .any(|a| matches!(a, Action::Road(_) | Action::Settle(_))));
    }

    #[test]
    fn test_extended_roads_grow_from_road_ends() {
        let config = GameConfig {
            road_rule: RoadRule::ExtendNetwork,
            ..GameConfig::default()
        };
        let mut state = new_game(&config);
        let v = vid(&state, 2, 2);
        state.place_initial_settlement(0, v).unwrap();
        state.agent_mut(0).unwrap().resources = rich();

        let first = state.board().edge_id(EdgeCoord::new(5, 4)).unwrap();
        let second = state.board().edge_id(EdgeCoord::new(7, 4)).unwrap();
        state.apply_action(0, Action::Road(first)).unwrap();
        assert!(state.legal_actions(0).contains(&Action::Road(second)));
    }

    #[test]
    fn test_extended_roads_blocked_by_opponent() {
        let config = GameConfig {
            road_rule: RoadRule::ExtendNetwork,
            ..GameConfig::default()
        };
        let mut state = new_game(&config);
        state.place_initial_settlement(0, vid(&state, 2, 2)).unwrap();
        state.place_initial_settlement(1, vid(&state, 4, 2)).unwrap();
        state.agent_mut(0).unwrap().resources = rich();

        let edge = |state: &GameState, x, y| state.board().edge_id(EdgeCoord::new(x, y)).unwrap();
        let first = edge(&state, 5, 4);
        let second = edge(&state, 7, 4);
        state.apply_action(0, Action::Road(first)).unwrap();
        state.apply_action(0, Action::Road(second)).unwrap();

        let actions = state.legal_actions(0);
        // Player 1 sits on (4, 2), so the network cannot pass through it
        assert!(!actions.contains(&Action::Road(edge(&state, 9, 4))));
        assert!(!actions.contains(&Action::Road(edge(&state, 8, 5))));
        assert!(actions.contains(&Action::Road(edge(&state, 6, 3))));
    }

    #[test]
    fn test_legal_action_soundness() {
        let mut state = settled_game();
        let far = vid(&state, 4, 4);
        state.place_initial_settlement(1, far).unwrap();
        let road = state.board().edges_of_vertex(vid(&state, 2, 2))[0];
        state.apply_action(0, Action::Road(road)).unwrap();

        let agent = state.agent(0).unwrap();
        for action in state.legal_actions(0) {
            match action {
                Action::Road(e) => {
                    assert!(!state.board().edge(e).unwrap().is_occupied());
                    let ends = state.board().vertex_ends(e);
                    assert!(ends
                        .iter()
                        .any(|v| state.board().vertex(*v).unwrap().owner() == Some(0)));
                }
                Action::Settle(v) => assert!(state.board().can_settle(v)),
                Action::City(v) => {
                    assert!(agent.settlements.contains(&v));
                    assert_eq!(
                        state.board().vertex(v).unwrap().building,
                        VertexBuilding::Settlement(0)
                    );
                }
            }
        }
    }

    #[test]
    fn test_successor_leaves_receiver_untouched() {
        let state = settled_game();
        let before = state.clone();
        let action = state.legal_actions(0)[0];

        let next = state.generate_successor(0, action).unwrap();
        assert_eq!(state, before);
        assert_ne!(next, before);
        assert_eq!(next.agent(0).unwrap().roads.len(), 1);
        assert_eq!(state.agent(0).unwrap().roads.len(), 0);
    }

    #[test]
    fn test_failed_successor_changes_nothing() {
        let mut state = settled_game();
        let road = state.board().edges_of_vertex(vid(&state, 2, 2))[0];
        state.apply_action(0, Action::Road(road)).unwrap();
        let before = state.clone();

        let err = state.apply_action(0, Action::Road(road)).unwrap_err();
        assert!(matches!(err, GameError::Board(BoardError::AlreadyBuilt(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_city_on_settlement() {
        let state = settled_game();
        let v = vid(&state, 2, 2);
        let next = state.generate_successor(0, Action::City(v)).unwrap();

        assert_eq!(next.board().vertex(v).unwrap().building, VertexBuilding::City(0));
        assert_eq!(next.victory_points(0), 2);
        assert_eq!(next.buildings_on_board(0), (0, 1));

        let unowned = vid(&state, 4, 4);
        assert_eq!(
            state.generate_successor(0, Action::City(unowned)),
            Err(GameError::NotYourSettlement(unowned))
        );
    }

    #[test]
    fn test_terminal_short_circuit() {
        let config = GameConfig {
            victory_points_to_win: 1,
            ..GameConfig::default()
        };
        let mut state = new_game(&config);
        let v = vid(&state, 2, 2);
        state.place_initial_settlement(0, v).unwrap();
        state.agent_mut(0).unwrap().resources = rich();

        assert_eq!(state.game_over(), Some(0));
        for agent in 0..3 {
            assert!(state.legal_actions(agent).is_empty());
        }
        assert_eq!(
            state.generate_successor(0, Action::City(v)),
            Err(GameError::TerminalState { winner: 0 })
        );
    }

    #[test]
    fn test_game_over_prefers_lowest_index() {
        let config = GameConfig {
            victory_points_to_win: 1,
            ..GameConfig::default()
        };
        let mut state = new_game(&config);
        state.place_initial_settlement(2, vid(&state, 3, 1)).unwrap();
        state.place_initial_settlement(1, vid(&state, 4, 4)).unwrap();
        assert_eq!(state.game_over(), Some(1));
    }

    #[test]
    fn test_initial_settlement_rules() {
        let mut state = new_game(&GameConfig::default());
        let v = vid(&state, 2, 2);
        state.place_initial_settlement(0, v).unwrap();

        let neighbor = state.board().neighbors_of_vertex(v)[0];
        assert!(matches!(
            state.place_initial_settlement(1, neighbor),
            Err(GameError::Board(BoardError::TooClose(_)))
        ));
        assert_eq!(state.place_initial_settlement(7, v), Err(GameError::UnknownAgent(7)));
        assert!(state.agent(1).unwrap().settlements.is_empty());
    }

    #[test]
    fn test_original_changes_do_not_reach_copy() {
        let mut state = settled_game();
        let copy = state.deep_copy();
        let snapshot_before = copy.clone();

        let v = vid(&state, 4, 4);
        state.place_initial_settlement(1, v).unwrap();
        let home = vid(&state, 2, 2);
        state.apply_action(0, Action::City(home)).unwrap();

        assert!(!copy.board().vertex(v).unwrap().is_occupied());
        assert_eq!(
            copy.board().vertex(home).unwrap().building,
            VertexBuilding::Settlement(0)
        );
        assert!(copy.agent(1).unwrap().settlements.is_empty());
        assert!(copy.agent(0).unwrap().cities.is_empty());
        assert_eq!(copy.agent(0).unwrap().resources, rich());
        assert_eq!(copy, snapshot_before);
    }

    #[test]
    fn test_distribute_resources() {
        let mut state = settled_game();
        state.agent_mut(0).unwrap().resources = ResourceHand::new();
        let payouts = state.distribute_resources(11);

        assert_eq!(payouts.len(), 3);
        assert_eq!(payouts[0].1.lumber, 1);
        assert!(payouts[1].1.is_empty());
        assert_eq!(state.agent(0).unwrap().resources.lumber, 1);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let state = settled_game();
        let mut copy = state.deep_copy();
        copy.agent_mut(0).unwrap().resources = ResourceHand::new();
        let v = vid(&copy, 4, 4);
        copy.place_initial_settlement(1, v).unwrap();

        assert_eq!(state.agent(0).unwrap().resources, rich());
        assert!(!state.board().vertex(v).unwrap().is_occupied());
        assert!(state.agent(1).unwrap().settlements.is_empty());
    }

    #[test]
    fn test_snapshot() {
        let state = settled_game();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.board.buildings.len(), 1);
        assert_eq!(snapshot.agents.len(), 3);
        assert_eq!(snapshot.winner, None);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
