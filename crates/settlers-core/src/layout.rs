//! Fixed board layouts.
//!
//! A layout assigns a tile type and production number to each hexagon
//! position, names the coastal vertex pairs that carry a harbor, and lists the
//! starting vertices handed out before the first turn. The vertex and edge
//! coordinates follow from the hexagon positions (see [`crate::hex`]).

use crate::board::{Harbor, Resource, TileType};
use crate::hex::{EdgeCoord, HexCoord, VertexCoord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// One hexagon of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexSpec {
    pub coord: HexCoord,
    pub tile_type: TileType,
    pub production_number: Option<u8>,
}

impl HexSpec {
    pub const fn resource(column: i32, row: i32, resource: Resource, number: u8) -> Self {
        Self {
            coord: HexCoord::new(column, row),
            tile_type: TileType::Resource(resource),
            production_number: Some(number),
        }
    }

    pub const fn desert(column: i32, row: i32) -> Self {
        Self {
            coord: HexCoord::new(column, row),
            tile_type: TileType::Desert,
            production_number: None,
        }
    }
}

/// A harbor on the two ends of a coastal side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub ends: [VertexCoord; 2],
    pub harbor: Harbor,
}

impl PortSpec {
    const fn new(a: (i32, i32), b: (i32, i32), harbor: Harbor) -> Self {
        Self {
            ends: [VertexCoord::new(a.0, a.1), VertexCoord::new(b.0, b.1)],
            harbor,
        }
    }
}

/// Errors found while validating or loading a layout
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LayoutError {
    #[error("layout has no hexagons")]
    Empty,

    #[error("hexagon {0} appears more than once")]
    DuplicateHexagon(HexCoord),

    #[error("hexagon {0} is not on the doubled-width grid")]
    MisalignedHexagon(HexCoord),

    #[error("hexagon {coord} has invalid production number {number}")]
    InvalidProductionNumber { coord: HexCoord, number: u8 },

    #[error("resource hexagon {0} has no production number")]
    MissingProductionNumber(HexCoord),

    #[error("desert {0} must not have a production number")]
    UnexpectedProductionNumber(HexCoord),

    #[error("harbor between {0} and {1} is not on a side of the board")]
    PortNotOnBoard(VertexCoord, VertexCoord),

    #[error("starting vertex {0} is not on the board")]
    StartingVertexNotOnBoard(VertexCoord),

    #[error("could not parse layout: {0}")]
    Parse(String),
}

/// A complete board layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub hexagons: Vec<HexSpec>,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default)]
    pub starting_vertices: Vec<VertexCoord>,
}

impl Layout {
    /// The fixed beginner board.
    ///
    /// Rows of 3-4-5-4-3 hexagons with the rulebook's starting resources and
    /// numbers, nine harbors around the coast and three starting vertices.
    pub fn beginner() -> Self {
        use Resource::*;

        let hexagons = vec![
            // Row 0
            HexSpec::resource(2, 0, Ore, 10),
            HexSpec::resource(4, 0, Wool, 2),
            HexSpec::resource(6, 0, Lumber, 9),
            // Row 1
            HexSpec::resource(1, 1, Grain, 12),
            HexSpec::resource(3, 1, Brick, 6),
            HexSpec::resource(5, 1, Wool, 4),
            HexSpec::resource(7, 1, Brick, 10),
            // Row 2
            HexSpec::resource(0, 2, Grain, 9),
            HexSpec::resource(2, 2, Lumber, 11),
            HexSpec::desert(4, 2),
            HexSpec::resource(6, 2, Lumber, 3),
            HexSpec::resource(8, 2, Ore, 8),
            // Row 3
            HexSpec::resource(1, 3, Lumber, 8),
            HexSpec::resource(3, 3, Ore, 3),
            HexSpec::resource(5, 3, Grain, 4),
            HexSpec::resource(7, 3, Wool, 5),
            // Row 4
            HexSpec::resource(2, 4, Brick, 5),
            HexSpec::resource(4, 4, Grain, 6),
            HexSpec::resource(6, 4, Wool, 11),
        ];

        let ports = vec![
            PortSpec::new((3, 0), (4, 0), Harbor::Generic),
            PortSpec::new((6, 0), (7, 0), Harbor::Specific(Wool)),
            PortSpec::new((9, 1), (9, 2), Harbor::Generic),
            PortSpec::new((9, 3), (9, 4), Harbor::Specific(Brick)),
            PortSpec::new((7, 5), (8, 5), Harbor::Generic),
            PortSpec::new((4, 5), (5, 5), Harbor::Specific(Lumber)),
            PortSpec::new((1, 3), (1, 4), Harbor::Generic),
            PortSpec::new((0, 2), (0, 3), Harbor::Specific(Grain)),
            PortSpec::new((1, 1), (2, 1), Harbor::Specific(Ore)),
        ];

        let starting_vertices = vec![
            VertexCoord::new(2, 2),
            VertexCoord::new(4, 4),
            VertexCoord::new(3, 1),
        ];

        Self {
            hexagons,
            ports,
            starting_vertices,
        }
    }

    /// Parse and validate a layout from JSON
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layout: Layout =
            serde_json::from_str(json).map_err(|e| LayoutError::Parse(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Check that the layout describes a consistent board
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.hexagons.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut seen = HashSet::new();
        let mut corners: HashSet<VertexCoord> = HashSet::new();
        let mut sides: HashSet<EdgeCoord> = HashSet::new();

        for hex in &self.hexagons {
            let coord = hex.coord;
            if !seen.insert(coord) {
                return Err(LayoutError::DuplicateHexagon(coord));
            }
            if !coord.is_aligned() {
                return Err(LayoutError::MisalignedHexagon(coord));
            }
            match (hex.tile_type, hex.production_number) {
                (TileType::Resource(_), None) => {
                    return Err(LayoutError::MissingProductionNumber(coord));
                }
                (TileType::Resource(_), Some(number)) if !(2..=12).contains(&number) || number == 7 => {
                    return Err(LayoutError::InvalidProductionNumber { coord, number });
                }
                (TileType::Desert, Some(_)) => {
                    return Err(LayoutError::UnexpectedProductionNumber(coord));
                }
                _ => {}
            }
            corners.extend(coord.corners());
            sides.extend(coord.sides());
        }

        for port in &self.ports {
            let [a, b] = port.ends;
            let on_board = EdgeCoord::between(a, b).is_some_and(|side| sides.contains(&side));
            if !on_board {
                return Err(LayoutError::PortNotOnBoard(a, b));
            }
        }

        for start in &self.starting_vertices {
            if !corners.contains(start) {
                return Err(LayoutError::StartingVertexNotOnBoard(*start));
            }
        }

        Ok(())
    }
}
