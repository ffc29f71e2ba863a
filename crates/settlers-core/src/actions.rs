//! Build actions and the events produced while a game runs.

use crate::agent::ResourceHand;
use crate::board::{Board, EdgeId, PlayerId, VertexId};
use serde::{Deserialize, Serialize};

/// A single build action; the location kind follows from the variant.
///
/// Ids are only meaningful for the board they were taken from and for its
/// copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Build a road on an edge
    Road(EdgeId),
    /// Build a settlement on a vertex
    Settle(VertexId),
    /// Upgrade an own settlement to a city
    City(VertexId),
}

impl Action {
    /// Human-readable form with board coordinates, e.g. `road at (5, 2)`
    pub fn describe(&self, board: &Board) -> String {
        match self {
            Action::Road(edge) => match board.edge(*edge) {
                Some(e) => format!("road at {}", e.coord),
                None => format!("road at {}", edge),
            },
            Action::Settle(vertex) | Action::City(vertex) => {
                let kind = if matches!(self, Action::Settle(_)) {
                    "settlement"
                } else {
                    "city"
                };
                match board.vertex(*vertex) {
                    Some(v) => format!("{} at {}", kind, v.coord),
                    None => format!("{} at {}", kind, vertex),
                }
            }
        }
    }
}

/// Events that occur as a result of playing turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Starting settlement placed during setup
    InitialSettlementPlaced { player: PlayerId, location: VertexId },

    /// Dice were rolled
    DiceRolled { player: PlayerId, total: u8 },

    /// An agent collected resources
    ResourcesCollected { player: PlayerId, gained: ResourceHand },

    /// A road was built
    RoadBuilt { player: PlayerId, location: EdgeId },

    /// A settlement was built
    SettlementBuilt { player: PlayerId, location: VertexId },

    /// A settlement was upgraded to a city
    CityBuilt { player: PlayerId, location: VertexId },

    /// The agent had no legal action or chose not to act
    TurnPassed { player: PlayerId },

    /// A player won the game
    GameWon { player: PlayerId, victory_points: u32 },
}

impl GameEvent {
    /// The event recording a successfully applied action
    pub fn built(player: PlayerId, action: Action) -> Self {
        match action {
            Action::Road(location) => GameEvent::RoadBuilt { player, location },
            Action::Settle(location) => GameEvent::SettlementBuilt { player, location },
            Action::City(location) => GameEvent::CityBuilt { player, location },
        }
    }
}
