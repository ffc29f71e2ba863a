//! Integration tests for the settlers game engine.
//!
//! These tests drive the public API end to end: board construction, setup,
//! turns, successor search and snapshots.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use settlers_core::*;

fn beginner_state(config: &GameConfig) -> GameState {
    GameState::new(&Layout::beginner(), config).expect("beginner layout is valid")
}

fn vertex(state: &GameState, x: i32, y: i32) -> VertexId {
    state.board().vertex_id(VertexCoord::new(x, y)).unwrap()
}

/// Every action a bot can see, applied one after another from the same state
fn successors(state: &GameState, player: PlayerId) -> Vec<GameState> {
    state
        .legal_actions(player)
        .into_iter()
        .map(|a| state.generate_successor(player, a).unwrap())
        .collect()
}

#[test]
fn test_edge_scenario() {
    let mut edge = Edge::new(1, 2);
    assert_eq!(edge.to_string(), "Unoccupied (1, 2)");

    edge.build(5).unwrap();
    assert_eq!(edge.to_string(), "R5 (1, 2)");
    assert!(edge.is_occupied());

    assert!(edge.build(5).is_err());
    assert!(edge.build(4).is_err());
    assert_eq!(edge.to_string(), "R5 (1, 2)");
}

#[test]
fn test_build_once_on_every_edge() {
    let mut board = Board::from_layout(&Layout::beginner()).unwrap();
    for i in 0..board.edges().len() {
        let edge = EdgeId(i);
        let owner = (i % 4) as PlayerId;
        board.apply_action(owner, Action::Road(edge)).unwrap();

        let coord = board.edge(edge).unwrap().coord;
        for other in 0..4 {
            assert_eq!(
                board.apply_action(other, Action::Road(edge)),
                Err(BoardError::AlreadyBuilt(board::Site::Edge(coord)))
            );
        }
        assert_eq!(board.edge(edge).unwrap().player, Some(owner));
        assert_eq!(board.edge(edge).unwrap().coord, coord);
    }
}

#[test]
fn test_city_scenario() {
    let mut state = beginner_state(&GameConfig::default());
    let v = vertex(&state, 2, 2);
    state.place_initial_settlement(0, v).unwrap();
    state.agent_mut(0).unwrap().resources = ResourceHand::with_amounts(0, 0, 3, 2, 0);

    let next = state.generate_successor(0, Action::City(v)).unwrap();
    assert_eq!(next.board().get_vertex(2, 2).unwrap().to_string(), "C0 (2, 2)");

    let unowned = vertex(&state, 4, 4);
    assert!(state.generate_successor(0, Action::City(unowned)).is_err());
    let mut board = state.board().deep_copy();
    assert!(matches!(
        board.build_city(0, unowned),
        Err(BoardError::NoSettlement { player: 0, .. })
    ));
}

#[test]
fn test_setup_and_turns() {
    let state = beginner_state(&GameConfig::default());
    let policies: Vec<Box<dyn Policy>> = (0..3)
        .map(|i| Box::new(Bot::with_seed(BotDifficulty::Easy, i)) as Box<dyn Policy>)
        .collect();
    let mut game = Game::new(state, policies).unwrap();

    let events = game.setup(&Layout::beginner().starting_vertices).unwrap();
    let placed = events
        .iter()
        .filter(|e| matches!(e, GameEvent::InitialSettlementPlaced { .. }))
        .count();
    assert_eq!(placed, 3);

    for roll in [8, 6, 10, 5, 9, 3] {
        game.play_turn(roll).unwrap();
    }
    assert_eq!(game.history().len(), 6);
    assert_eq!(game.turns_played(), 6);

    // Agent ledgers and the board agree after any sequence of turns
    for agent in game.state().agents() {
        let (settlements, cities) = game.state().buildings_on_board(agent.agent_index);
        assert_eq!(settlements, agent.settlements.len());
        assert_eq!(cities, agent.cities.len());
        assert_eq!(game.state().board().roads_of(agent.agent_index).len(), agent.roads.len());
    }
}

#[test]
fn test_lookahead_is_isolated() {
    let mut state = beginner_state(&GameConfig::default());
    state.place_initial_settlement(0, vertex(&state, 2, 2)).unwrap();
    state.place_initial_settlement(1, vertex(&state, 4, 4)).unwrap();
    state.agent_mut(0).unwrap().resources = ResourceHand::with_amounts(5, 5, 5, 5, 5);
    let before = state.clone();

    let children = successors(&state, 0);
    assert_eq!(children.len(), state.legal_actions(0).len());
    assert_eq!(state, before);

    // Siblings do not see each other's builds
    for (i, child) in children.iter().enumerate() {
        let built: usize = child.board().roads_of(0).len() + child.agent(0).unwrap().cities.len();
        assert_eq!(built, 1, "child {} should differ by exactly one build", i);
    }

    let grandchildren: usize = children.iter().map(|c| successors(c, 0).len()).sum();
    assert!(grandchildren > 0);
    assert_eq!(state, before);
}

#[test]
fn test_terminal_state() {
    let config = GameConfig {
        victory_points_to_win: 2,
        ..GameConfig::default()
    };
    let mut state = beginner_state(&config);
    let v = vertex(&state, 3, 1);
    state.place_initial_settlement(2, v).unwrap();
    state.agent_mut(2).unwrap().resources = ResourceHand::with_amounts(0, 0, 3, 2, 0);
    state.apply_action(2, Action::City(v)).unwrap();

    assert_eq!(state.game_over(), Some(2));
    for player in 0..3 {
        assert!(state.legal_actions(player).is_empty());
    }
    assert_eq!(
        state.generate_successor(0, Action::Road(EdgeId(0))),
        Err(GameError::TerminalState { winner: 2 })
    );
}

#[test]
fn test_seeded_games_are_reproducible() {
    let play = || {
        let config = GameConfig {
            victory_points_to_win: 2,
            ..GameConfig::default()
        };
        let policies: Vec<Box<dyn Policy>> = (0..3)
            .map(|i| Box::new(Bot::with_seed(BotDifficulty::Hard, i)) as Box<dyn Policy>)
            .collect();
        let mut game = Game::new(beginner_state(&config), policies).unwrap();
        game.setup(&Layout::beginner().starting_vertices).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let winner = game.run(&mut rng, 500).unwrap();
        (winner, game.history().to_vec())
    };

    assert_eq!(play(), play());
}

#[test]
fn test_snapshot_json() {
    let mut state = beginner_state(&GameConfig::default());
    state.place_initial_settlement(0, vertex(&state, 2, 2)).unwrap();

    let json = serde_json::to_value(state.snapshot()).unwrap();
    assert_eq!(json["board"]["buildings"][0]["x"], 2);
    assert_eq!(json["board"]["buildings"][0]["building"]["Settlement"], 0);
    assert_eq!(json["agents"][0]["name"], "Player 0");
    assert_eq!(json["winner"], serde_json::Value::Null);
}

#[test]
fn test_custom_layout_from_json() {
    let json = r#"{
        "hexagons": [
            { "coord": { "column": 0, "row": 0 }, "tile_type": { "Resource": "Brick" }, "production_number": 6 },
            { "coord": { "column": 2, "row": 0 }, "tile_type": { "Resource": "Lumber" }, "production_number": 8 },
            { "coord": { "column": 1, "row": 1 }, "tile_type": "Desert", "production_number": null }
        ],
        "starting_vertices": [ { "x": 2, "y": 1 } ]
    }"#;
    let layout = Layout::from_json(json).unwrap();
    let board = Board::from_layout(&layout).unwrap();

    assert_eq!(board.hexagons().len(), 3);
    // Three mutually adjacent hexagons share one corner and three sides
    assert_eq!(board.vertices().len(), 3 * 6 - 3 - 2);
    assert_eq!(board.edges().len(), 3 * 6 - 3);

    let centre = board.vertex_id(VertexCoord::new(2, 1)).unwrap();
    assert_eq!(board.hexagons_of_vertex(centre).len(), 3);
    assert_eq!(board.production_score(centre), 5 + 5);
}
