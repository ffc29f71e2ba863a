//! Game board representation: hexagons, vertices, edges and their adjacency.
//!
//! This module contains:
//! - Resource, tile and harbor types
//! - The board entities (`Hexagon`, `Vertex`, `Edge`) and their build protocol
//! - The `Board` arena with adjacency indices built once from a `Layout`
//! - Query and build-application methods
//!
//! Entities live in contiguous vectors and refer to each other through stable
//! integer ids. The topology never changes after construction, so it is shared
//! between copies; only the ownership fields are duplicated when a board is
//! copied.

use crate::actions::Action;
use crate::hex::{EdgeCoord, HexCoord, VertexCoord};
use crate::layout::{Layout, LayoutError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Player identifier, doubling as the index into the agent list
pub type PlayerId = u8;

/// Resource types produced by hexagons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Brick => "Brick",
            Resource::Lumber => "Lumber",
            Resource::Ore => "Ore",
            Resource::Grain => "Grain",
            Resource::Wool => "Wool",
        };
        f.write_str(name)
    }
}

/// Type of hexagon tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileType {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Never produces
    Desert,
}

/// Harbor types attached to coastal vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Harbor {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

/// Index of a hexagon in its board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexagonId(pub usize);

/// Index of a vertex in its board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub usize);

/// Index of an edge in its board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A place on the board named in an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Site {
    Vertex(VertexCoord),
    Edge(EdgeCoord),
    VertexId(VertexId),
    EdgeId(EdgeId),
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Vertex(coord) => write!(f, "vertex {}", coord),
            Site::Edge(coord) => write!(f, "edge {}", coord),
            Site::VertexId(id) => write!(f, "vertex {}", id),
            Site::EdgeId(id) => write!(f, "edge {}", id),
        }
    }
}

/// Errors from querying or building on the board.
///
/// A failed build never changes the board.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("{0} is already built")]
    AlreadyBuilt(Site),

    #[error("{0} is not on the board")]
    NotFound(Site),

    #[error("player {player} has no settlement at {vertex}")]
    NoSettlement { player: PlayerId, vertex: VertexCoord },

    #[error("vertex {0} is next to another settlement")]
    TooClose(VertexCoord),
}

/// A resource-producing hexagon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hexagon {
    /// Position on the hex grid
    pub coord: HexCoord,
    /// What the hexagon produces
    pub tile_type: TileType,
    /// Dice total that triggers production (2-12, None for the desert)
    pub production_number: Option<u8>,
}

impl Hexagon {
    /// Get the resource this hexagon produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.tile_type {
            TileType::Resource(r) => Some(r),
            TileType::Desert => None,
        }
    }

    /// The resource produced when `roll` comes up
    pub fn produces_on(&self, roll: u8) -> Option<Resource> {
        if self.production_number == Some(roll) {
            self.resource()
        } else {
            None
        }
    }

    /// Number of dice combinations that trigger this hexagon
    pub fn pips(&self) -> u32 {
        match self.production_number {
            Some(6 | 8) => 5,
            Some(5 | 9) => 4,
            Some(4 | 10) => 3,
            Some(3 | 11) => 2,
            Some(2 | 12) => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Hexagon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.tile_type, self.production_number) {
            (TileType::Resource(r), Some(n)) => write!(f, "{} {} {}", r, n, self.coord),
            (TileType::Resource(r), None) => write!(f, "{} {}", r, self.coord),
            (TileType::Desert, _) => write!(f, "Desert {}", self.coord),
        }
    }
}

/// What's built on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VertexBuilding {
    /// Nothing built
    #[default]
    Empty,
    /// Settlement (1 VP, 1 resource per adjacent hexagon)
    Settlement(PlayerId),
    /// City (2 VP, 2 resources per adjacent hexagon)
    City(PlayerId),
}

impl VertexBuilding {
    /// Get the owner of this building, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            VertexBuilding::Empty => None,
            VertexBuilding::Settlement(p) | VertexBuilding::City(p) => Some(*p),
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        match self {
            VertexBuilding::Empty => 0,
            VertexBuilding::Settlement(_) => 1,
            VertexBuilding::City(_) => 2,
        }
    }
}

/// A settlement slot at a board coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub coord: VertexCoord,
    pub building: VertexBuilding,
    pub port: Option<Harbor>,
}

impl Vertex {
    pub fn new(coord: VertexCoord) -> Self {
        Self {
            coord,
            building: VertexBuilding::Empty,
            port: None,
        }
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.building.owner()
    }

    pub fn is_occupied(&self) -> bool {
        self.building != VertexBuilding::Empty
    }

    /// Place a settlement on an empty vertex.
    ///
    /// The distance rule needs the neighbouring vertices and is checked by
    /// [`Board::build_settlement`].
    pub fn build_settlement(&mut self, player: PlayerId) -> Result<(), BoardError> {
        if self.is_occupied() {
            return Err(BoardError::AlreadyBuilt(Site::Vertex(self.coord)));
        }
        self.building = VertexBuilding::Settlement(player);
        Ok(())
    }

    /// Upgrade the player's own settlement to a city
    pub fn build_city(&mut self, player: PlayerId) -> Result<(), BoardError> {
        match self.building {
            VertexBuilding::Settlement(owner) if owner == player => {
                self.building = VertexBuilding::City(player);
                Ok(())
            }
            VertexBuilding::City(_) => Err(BoardError::AlreadyBuilt(Site::Vertex(self.coord))),
            VertexBuilding::Settlement(_) | VertexBuilding::Empty => Err(BoardError::NoSettlement {
                player,
                vertex: self.coord,
            }),
        }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.building {
            VertexBuilding::Empty => write!(f, "Unsettled {}", self.coord),
            VertexBuilding::Settlement(p) => write!(f, "S{} {}", p, self.coord),
            VertexBuilding::City(p) => write!(f, "C{} {}", p, self.coord),
        }
    }
}

/// A road slot between two vertices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub coord: EdgeCoord,
    pub player: Option<PlayerId>,
}

impl Edge {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            coord: EdgeCoord::new(x, y),
            player: None,
        }
    }

    pub fn with_player(x: i32, y: i32, player: PlayerId) -> Self {
        Self {
            coord: EdgeCoord::new(x, y),
            player: Some(player),
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.player.is_some()
    }

    /// Build a road. An edge is built exactly once, so this fails for any
    /// player, including the current owner, once a road is present.
    pub fn build(&mut self, player: PlayerId) -> Result<(), BoardError> {
        if self.is_occupied() {
            return Err(BoardError::AlreadyBuilt(Site::Edge(self.coord)));
        }
        self.player = Some(player);
        Ok(())
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.player {
            Some(p) => write!(f, "R{} {}", p, self.coord),
            None => write!(f, "Unoccupied {}", self.coord),
        }
    }
}

/// Immutable adjacency indices, computed once per layout
#[derive(Debug, PartialEq, Eq)]
struct Topology {
    hexagons: Vec<Hexagon>,
    vertex_index: HashMap<VertexCoord, VertexId>,
    edge_index: HashMap<EdgeCoord, EdgeId>,
    vertex_hexagons: Vec<Vec<HexagonId>>,
    vertex_edges: Vec<Vec<EdgeId>>,
    vertex_neighbors: Vec<Vec<VertexId>>,
    edge_ends: Vec<[VertexId; 2]>,
}

/// The complete game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Ownership state, indexed by `VertexId`
    vertices: Vec<Vertex>,
    /// Ownership state, indexed by `EdgeId`
    edges: Vec<Edge>,
    /// Hexagons and adjacency, shared by every copy of this board
    topology: Arc<Topology>,
}

impl Board {
    /// Build the board graph for a layout.
    ///
    /// Vertices and edges are numbered in the order they are first reached
    /// walking each hexagon's corners clockwise from the top, so ids and
    /// adjacency order are deterministic for a given layout.
    pub fn from_layout(layout: &Layout) -> Result<Self, LayoutError> {
        layout.validate()?;

        let mut vertices: Vec<Vertex> = Vec::new();
        let mut edges: Vec<Edge> = Vec::new();
        let mut topology = Topology {
            hexagons: Vec::with_capacity(layout.hexagons.len()),
            vertex_index: HashMap::new(),
            edge_index: HashMap::new(),
            vertex_hexagons: Vec::new(),
            vertex_edges: Vec::new(),
            vertex_neighbors: Vec::new(),
            edge_ends: Vec::new(),
        };

        for (i, spec) in layout.hexagons.iter().enumerate() {
            let hex_id = HexagonId(i);
            topology.hexagons.push(Hexagon {
                coord: spec.coord,
                tile_type: spec.tile_type,
                production_number: spec.production_number,
            });

            let mut corner_ids = [VertexId(0); 6];
            for (slot, corner) in spec.coord.corners().into_iter().enumerate() {
                let id = *topology.vertex_index.entry(corner).or_insert_with(|| {
                    vertices.push(Vertex::new(corner));
                    VertexId(vertices.len() - 1)
                });
                if topology.vertex_hexagons.len() <= id.0 {
                    topology.vertex_hexagons.push(Vec::new());
                    topology.vertex_edges.push(Vec::new());
                    topology.vertex_neighbors.push(Vec::new());
                }
                topology.vertex_hexagons[id.0].push(hex_id);
                corner_ids[slot] = id;
            }

            for (slot, side) in spec.coord.sides().into_iter().enumerate() {
                if topology.edge_index.contains_key(&side) {
                    continue;
                }
                let a = corner_ids[slot];
                let b = corner_ids[(slot + 1) % 6];
                let edge_id = EdgeId(edges.len());
                edges.push(Edge::new(side.x, side.y));
                topology.edge_index.insert(side, edge_id);
                topology.edge_ends.push([a, b]);
                topology.vertex_edges[a.0].push(edge_id);
                topology.vertex_edges[b.0].push(edge_id);
                topology.vertex_neighbors[a.0].push(b);
                topology.vertex_neighbors[b.0].push(a);
            }
        }

        for port in &layout.ports {
            for end in port.ends {
                if let Some(id) = topology.vertex_index.get(&end) {
                    vertices[id.0].port = Some(port.harbor);
                }
            }
        }

        Ok(Self {
            vertices,
            edges,
            topology: Arc::new(topology),
        })
    }

    // ==================== Query Methods ====================

    /// All hexagons in layout order
    pub fn hexagons(&self) -> &[Hexagon] {
        &self.topology.hexagons
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn hexagon(&self, id: HexagonId) -> Option<&Hexagon> {
        self.topology.hexagons.get(id.0)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// Look up the id of the vertex at a coordinate
    pub fn vertex_id(&self, coord: VertexCoord) -> Result<VertexId, BoardError> {
        self.topology
            .vertex_index
            .get(&coord)
            .copied()
            .ok_or(BoardError::NotFound(Site::Vertex(coord)))
    }

    /// Look up the id of the edge at a coordinate
    pub fn edge_id(&self, coord: EdgeCoord) -> Result<EdgeId, BoardError> {
        self.topology
            .edge_index
            .get(&coord)
            .copied()
            .ok_or(BoardError::NotFound(Site::Edge(coord)))
    }

    /// Get the vertex at `(x, y)`
    pub fn get_vertex(&self, x: i32, y: i32) -> Result<&Vertex, BoardError> {
        let id = self.vertex_id(VertexCoord::new(x, y))?;
        Ok(&self.vertices[id.0])
    }

    /// Get the edge at `(x, y)`
    pub fn get_edge(&self, x: i32, y: i32) -> Result<&Edge, BoardError> {
        let id = self.edge_id(EdgeCoord::new(x, y))?;
        Ok(&self.edges[id.0])
    }

    /// The 1-3 hexagons touching a vertex
    pub fn hexagons_of_vertex(&self, vertex: VertexId) -> &[HexagonId] {
        self.topology
            .vertex_hexagons
            .get(vertex.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The 2-3 edges incident to a vertex
    pub fn edges_of_vertex(&self, vertex: VertexId) -> &[EdgeId] {
        self.topology
            .vertex_edges
            .get(vertex.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The two vertices terminating an edge
    pub fn vertex_ends(&self, edge: EdgeId) -> &[VertexId] {
        self.topology
            .edge_ends
            .get(edge.0)
            .map(|ends| ends.as_slice())
            .unwrap_or(&[])
    }

    /// Vertices one edge away
    pub fn neighbors_of_vertex(&self, vertex: VertexId) -> &[VertexId] {
        self.topology
            .vertex_neighbors
            .get(vertex.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if a vertex satisfies the distance rule (no adjacent buildings)
    pub fn satisfies_distance_rule(&self, vertex: VertexId) -> bool {
        self.neighbors_of_vertex(vertex)
            .iter()
            .all(|n| !self.vertices[n.0].is_occupied())
    }

    /// Whether a settlement could be placed at `vertex`: it must be empty and
    /// no neighbouring vertex may be built on
    pub fn can_settle(&self, vertex: VertexId) -> bool {
        self.vertex(vertex).is_some_and(|v| !v.is_occupied()) && self.satisfies_distance_rule(vertex)
    }

    /// Total dice pips of the hexagons touching a vertex
    pub fn production_score(&self, vertex: VertexId) -> u32 {
        self.hexagons_of_vertex(vertex)
            .iter()
            .map(|h| self.topology.hexagons[h.0].pips())
            .sum()
    }

    /// Harbors reachable from the player's buildings
    pub fn harbors_of(&self, player: PlayerId) -> Vec<Harbor> {
        let mut harbors = Vec::new();
        for vertex in &self.vertices {
            if let (Some(harbor), Some(owner)) = (vertex.port, vertex.owner()) {
                if owner == player && !harbors.contains(&harbor) {
                    harbors.push(harbor);
                }
            }
        }
        harbors
    }

    /// Vertices carrying one of the player's buildings
    pub fn buildings_of(&self, player: PlayerId) -> Vec<VertexId> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.owner() == Some(player))
            .map(|(i, _)| VertexId(i))
            .collect()
    }

    /// Edges carrying one of the player's roads
    pub fn roads_of(&self, player: PlayerId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.player == Some(player))
            .map(|(i, _)| EdgeId(i))
            .collect()
    }

    // ==================== Mutation Methods ====================

    /// Build a road for `player`
    pub fn build_road(&mut self, player: PlayerId, edge: EdgeId) -> Result<(), BoardError> {
        self.edges
            .get_mut(edge.0)
            .ok_or(BoardError::NotFound(Site::EdgeId(edge)))?
            .build(player)
    }

    /// Place a settlement, enforcing the distance rule
    pub fn build_settlement(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), BoardError> {
        let target = self
            .vertices
            .get(vertex.0)
            .ok_or(BoardError::NotFound(Site::VertexId(vertex)))?;
        if target.is_occupied() {
            return Err(BoardError::AlreadyBuilt(Site::Vertex(target.coord)));
        }
        if !self.satisfies_distance_rule(vertex) {
            return Err(BoardError::TooClose(target.coord));
        }
        self.vertices[vertex.0].build_settlement(player)
    }

    /// Upgrade one of the player's settlements to a city
    pub fn build_city(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), BoardError> {
        self.vertices
            .get_mut(vertex.0)
            .ok_or(BoardError::NotFound(Site::VertexId(vertex)))?
            .build_city(player)
    }

    /// Apply a build action to the graph.
    ///
    /// Mutates exactly one edge or vertex on success and nothing on failure.
    /// The acting agent's own bookkeeping is not touched.
    pub fn apply_action(&mut self, player: PlayerId, action: Action) -> Result<(), BoardError> {
        match action {
            Action::Road(edge) => self.build_road(player, edge),
            Action::Settle(vertex) => self.build_settlement(player, vertex),
            Action::City(vertex) => self.build_city(player, vertex),
        }
    }

    /// Copy the board for independent mutation.
    ///
    /// Ownership fields are duplicated; hexagons and adjacency indices are
    /// immutable and shared. Ids stay valid across the copy.
    pub fn deep_copy(&self) -> Board {
        self.clone()
    }

    /// JSON-friendly view of what has been built
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            buildings: self
                .vertices
                .iter()
                .filter(|v| v.is_occupied())
                .map(|v| VertexSnapshot {
                    x: v.coord.x,
                    y: v.coord.y,
                    building: v.building,
                })
                .collect(),
            roads: self
                .edges
                .iter()
                .filter_map(|e| {
                    e.player.map(|player| RoadSnapshot {
                        x: e.coord.x,
                        y: e.coord.y,
                        player,
                    })
                })
                .collect(),
        }
    }
}

/// JSON-friendly board representation listing only built sites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub buildings: Vec<VertexSnapshot>,
    pub roads: Vec<RoadSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexSnapshot {
    pub x: i32,
    pub y: i32,
    pub building: VertexBuilding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadSnapshot {
    pub x: i32,
    pub y: i32,
    pub player: PlayerId,
}
