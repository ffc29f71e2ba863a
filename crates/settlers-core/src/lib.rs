//! Settlers - a hex-board settlement game engine
//!
//! This crate provides the core game logic, including:
//! - Coordinate system for hexagons, vertices and edges
//! - Board graph with adjacency built once from a layout
//! - Agent ledgers: resources, pieces and victory points
//! - Game state with legal-action enumeration and successor states
//! - A turn loop and bot policies
//!
//! # Architecture
//!
//! Board entities live in arenas addressed by stable ids. The adjacency
//! indices are shared between copies of a board, so copying a `GameState`
//! for lookahead only duplicates ownership fields and agent ledgers.
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for hexagons, vertices and edges
//! - [`layout`]: Fixed board layouts
//! - [`board`]: Board graph and build protocol
//! - [`agent`]: Agent state and resources
//! - [`game`]: Game state, legality and successors
//! - [`runner`]: Turn loop
//! - [`bot`]: Decision policies

pub mod actions;
pub mod agent;
pub mod board;
pub mod bot;
pub mod game;
pub mod hex;
pub mod layout;
pub mod runner;

// Re-export commonly used types
pub use actions::{Action, GameEvent};
pub use agent::{Agent, ResourceHand};
pub use board::{
    Board, BoardError, BoardSnapshot, Edge, EdgeId, Harbor, Hexagon, HexagonId, PlayerId, Resource,
    TileType, Vertex, VertexBuilding, VertexId,
};
pub use bot::{Bot, BotDifficulty, Policy};
pub use game::{GameConfig, GameError, GameSnapshot, GameState, RoadRule};
pub use hex::{EdgeCoord, HexCoord, VertexCoord};
pub use layout::{Layout, LayoutError};
pub use runner::{Game, MoveRecord};
