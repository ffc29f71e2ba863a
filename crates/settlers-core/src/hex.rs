//! Coordinate system for hexagons, vertices and edges.
//!
//! The board is laid out with pointy-top hexagons in rows, each row shifted by
//! half a hexagon against its neighbours. Three integer coordinate types live
//! on top of that grid:
//! - `HexCoord`: identifies a hexagon (doubled-width column, row)
//! - `VertexCoord`: identifies a corner where settlements and cities are placed
//! - `EdgeCoord`: identifies a side where roads are placed
//!
//! Vertices sit on zig-zag rows. Hexagon row `r` has its three upper corners on
//! vertex row `r` and its three lower corners on vertex row `r + 1`, and `x`
//! counts half-hexagon steps from the west. An edge is named by the sum of its
//! two endpoints, which keeps every edge coordinate unique and lets the
//! endpoints be recovered without a lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hexagon coordinate in doubled-width form.
///
/// `column` is the `x` of the hexagon's west corners on the vertex lattice, so
/// horizontally adjacent hexagons differ by 2 and `column + row` is always even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub column: i32,
    pub row: i32,
}

impl HexCoord {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Whether this coordinate lies on the doubled-width grid
    pub const fn is_aligned(&self) -> bool {
        (self.column + self.row).rem_euclid(2) == 0
    }

    /// The six corners clockwise starting from the top
    pub fn corners(&self) -> [VertexCoord; 6] {
        let (c, r) = (self.column, self.row);
        [
            VertexCoord::new(c + 1, r),
            VertexCoord::new(c + 2, r),
            VertexCoord::new(c + 2, r + 1),
            VertexCoord::new(c + 1, r + 1),
            VertexCoord::new(c, r + 1),
            VertexCoord::new(c, r),
        ]
    }

    /// The six sides, each joining two consecutive corners
    pub fn sides(&self) -> [EdgeCoord; 6] {
        let corners = self.corners();
        std::array::from_fn(|i| EdgeCoord::joining(corners[i], corners[(i + 1) % 6]))
    }

    /// The six neighbouring hexagons clockwise starting from the north-east
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let (c, r) = (self.column, self.row);
        [
            HexCoord::new(c + 1, r - 1),
            HexCoord::new(c + 2, r),
            HexCoord::new(c + 1, r + 1),
            HexCoord::new(c - 1, r + 1),
            HexCoord::new(c - 2, r),
            HexCoord::new(c - 1, r - 1),
        ]
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Vertex coordinate on the zig-zag lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexCoord {
    pub x: i32,
    pub y: i32,
}

impl VertexCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether two vertices are joined by a single side of some hexagon.
    ///
    /// Neighbours in the same row are always joined; vertically a vertex is
    /// joined to the one below it only where the row above points downwards.
    pub fn is_lattice_neighbor(&self, other: &VertexCoord) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        match (dx, dy) {
            (1, 0) => true,
            (0, 1) => {
                let upper = if self.y < other.y { self } else { other };
                // The parity of the downward-pointing corners alternates per row
                (upper.x + upper.y).rem_euclid(2) == 0
            }
            _ => false,
        }
    }
}

impl fmt::Display for VertexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Edge coordinate: the component-wise sum of its two endpoints.
///
/// An even `y` is a slanted side inside one vertex row, an odd `y` is a
/// vertical side between two rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeCoord {
    pub x: i32,
    pub y: i32,
}

impl EdgeCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn joining(a: VertexCoord, b: VertexCoord) -> Self {
        Self::new(a.x + b.x, a.y + b.y)
    }

    /// The edge joining two vertices, if they are lattice neighbours
    pub fn between(a: VertexCoord, b: VertexCoord) -> Option<Self> {
        a.is_lattice_neighbor(&b).then(|| Self::joining(a, b))
    }

    /// Whether this edge runs vertically between two vertex rows
    pub const fn is_vertical(&self) -> bool {
        self.y.rem_euclid(2) == 1
    }

    /// The two endpoints, west/north first.
    ///
    /// Returns `None` for coordinates that cannot be the sum of two
    /// neighbouring vertices.
    pub fn endpoints(&self) -> Option<[VertexCoord; 2]> {
        let (x, y) = (self.x, self.y);
        let ends = if self.is_vertical() {
            if x.rem_euclid(2) != 0 {
                return None;
            }
            [
                VertexCoord::new(x / 2, (y - 1) / 2),
                VertexCoord::new(x / 2, (y + 1) / 2),
            ]
        } else {
            if x.rem_euclid(2) != 1 {
                return None;
            }
            [
                VertexCoord::new((x - 1) / 2, y / 2),
                VertexCoord::new((x + 1) / 2, y / 2),
            ]
        };
        ends[0].is_lattice_neighbor(&ends[1]).then_some(ends)
    }
}

impl fmt::Display for EdgeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
