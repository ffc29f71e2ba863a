//! Agent state and resource management.
//!
//! This module contains:
//! - `ResourceHand` for managing resource counts
//! - Building costs and piece supply
//! - `Agent`, the per-player ledger of resources and owned pieces

use crate::actions::Action;
use crate::board::{Board, EdgeId, PlayerId, Resource, VertexId};
use crate::game::GameError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        match resource {
            Resource::Brick => self.brick += amount,
            Resource::Lumber => self.lumber += amount,
            Resource::Ore => self.ore += amount,
            Resource::Grain => self.grain += amount,
            Resource::Wool => self.wool += amount,
        }
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        self.brick += other.brick;
        self.lumber += other.lumber;
        self.ore += other.ore;
        self.grain += other.grain;
        self.wool += other.wool;
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.brick >= cost.brick
            && self.lumber >= cost.lumber
            && self.ore >= cost.ore
            && self.grain >= cost.grain
            && self.wool >= cost.wool
    }

    /// Subtract a cost, leaving the hand untouched and returning false if
    /// it is insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.brick -= cost.brick;
        self.lumber -= cost.lumber;
        self.ore -= cost.ore;
        self.grain -= cost.grain;
        self.wool -= cost.wool;
        true
    }

    /// Non-zero counts keyed by resource
    pub fn to_map(&self) -> HashMap<Resource, u32> {
        Resource::ALL
            .into_iter()
            .map(|r| (r, self.get(r)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl fmt::Display for ResourceHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Resource::ALL
            .into_iter()
            .filter(|r| self.get(*r) > 0)
            .map(|r| format!("{} {}", self.get(r), r))
            .collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to city: 3 ore, 2 grain
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }
}

/// Pieces each agent may have on the board at once
pub const MAX_ROADS: usize = 15;
pub const MAX_SETTLEMENTS: usize = 5;
pub const MAX_CITIES: usize = 4;

/// A single agent's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Display name
    pub name: String,
    /// Index in the game's agent list
    pub agent_index: PlayerId,
    /// Current resources
    pub resources: ResourceHand,
    /// Vertices holding this agent's settlements, in build order
    pub settlements: Vec<VertexId>,
    /// Edges holding this agent's roads, in build order
    pub roads: Vec<EdgeId>,
    /// Vertices holding this agent's cities, in upgrade order
    pub cities: Vec<VertexId>,
    /// Victory points needed to win
    pub victory_points_to_win: u32,
}

impl Agent {
    pub fn new(name: impl Into<String>, agent_index: PlayerId, victory_points_to_win: u32) -> Self {
        Self {
            name: name.into(),
            agent_index,
            resources: ResourceHand::new(),
            settlements: Vec::new(),
            roads: Vec::new(),
            cities: Vec::new(),
            victory_points_to_win,
        }
    }

    /// 1 point per settlement, 2 per city
    pub fn victory_points(&self) -> u32 {
        (self.settlements.len() + 2 * self.cities.len()) as u32
    }

    pub fn has_won(&self) -> bool {
        self.victory_points() >= self.victory_points_to_win
    }

    /// Can this agent afford a road and has one left?
    pub fn can_build_road(&self) -> bool {
        self.resources.can_afford(&costs::road()) && self.roads.len() < MAX_ROADS
    }

    /// Can this agent afford a settlement and has one left?
    pub fn can_settle(&self) -> bool {
        self.resources.can_afford(&costs::settlement()) && self.settlements.len() < MAX_SETTLEMENTS
    }

    /// Can this agent afford a city upgrade and has one left?
    pub fn can_build_city(&self) -> bool {
        self.resources.can_afford(&costs::city()) && self.cities.len() < MAX_CITIES
    }

    /// Pay for an action and record the new piece.
    ///
    /// Everything is checked before the ledger changes, so an error leaves
    /// the agent as it was. The board is not touched.
    pub fn apply_action(&mut self, action: Action) -> Result<(), GameError> {
        let (cost, pieces_left) = match action {
            Action::Road(_) => (costs::road(), self.roads.len() < MAX_ROADS),
            Action::Settle(_) => (costs::settlement(), self.settlements.len() < MAX_SETTLEMENTS),
            Action::City(vertex) => {
                if !self.settlements.contains(&vertex) {
                    return Err(GameError::NotYourSettlement(vertex));
                }
                (costs::city(), self.cities.len() < MAX_CITIES)
            }
        };
        if !pieces_left {
            return Err(GameError::NoPiecesRemaining);
        }
        if !self.resources.try_subtract(&cost) {
            return Err(GameError::CannotAfford);
        }

        match action {
            Action::Road(edge) => self.roads.push(edge),
            Action::Settle(vertex) => self.settlements.push(vertex),
            Action::City(vertex) => {
                self.settlements.retain(|v| *v != vertex);
                self.cities.push(vertex);
            }
        }
        Ok(())
    }

    /// Collect production for a dice roll and return what was gained.
    ///
    /// Every touching hexagon whose production number matches pays out the
    /// multiplier of the building standing on the board at that vertex.
    pub fn update_resources(&mut self, die_roll: u8, board: &Board) -> ResourceHand {
        let mut gained = ResourceHand::new();

        for &vertex in self.settlements.iter().chain(&self.cities) {
            let amount = match board.vertex(vertex) {
                Some(v) if v.building.owner() == Some(self.agent_index) => {
                    v.building.resource_multiplier()
                }
                _ => continue,
            };
            for hex in board.hexagons_of_vertex(vertex) {
                if let Some(resource) = board.hexagon(*hex).and_then(|h| h.produces_on(die_roll)) {
                    gained.add(resource, amount);
                }
            }
        }

        self.resources.add_hand(&gained);
        gained
    }

    /// One card per hexagon touching each settlement, paid once after the
    /// starting settlements are placed
    pub fn collect_initial_resources(&mut self, board: &Board) -> ResourceHand {
        let mut gained = ResourceHand::new();
        for vertex in &self.settlements {
            for hex in board.hexagons_of_vertex(*vertex) {
                if let Some(resource) = board.hexagon(*hex).and_then(|h| h.resource()) {
                    gained.add(resource, 1);
                }
            }
        }
        self.resources.add_hand(&gained);
        gained
    }

    /// Copy the agent for a copied board.
    ///
    /// Pieces are held as ids, which stay valid on every copy of the board
    /// they came from, so this is a plain value copy.
    pub fn deep_copy(&self) -> Agent {
        self.clone()
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (#{}): {} VP, {} settlements, {} cities, {} roads, holding {}",
            self.name,
            self.agent_index,
            self.victory_points(),
            self.settlements.len(),
            self.cities.len(),
            self.roads.len(),
            self.resources
        )
    }
}
