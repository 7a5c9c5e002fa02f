use std::fmt;

use serde::{Deserialize, Serialize};

/// Bipartite colour of a lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    /// Black cells (right-facing triangles, even squares).
    Black,
    /// White cells (left-facing triangles, odd squares).
    White,
}

impl Color {
    /// Returns the opposite colour.
    pub fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Supported planar lattices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatticeKind {
    /// Unit squares; dimers are dominoes.
    Square,
    /// Unit triangles; dimers are lozenges.
    Triangular,
}

impl LatticeKind {
    /// Number of sides of a single cell.
    pub fn sides(self) -> usize {
        match self {
            LatticeKind::Square => 4,
            LatticeKind::Triangular => 3,
        }
    }
}

/// A lattice cell addressed by integer coordinates and colour.
///
/// On the square lattice the colour is implied by the parity of `x + y`; on the
/// triangular lattice `(x, y)` = `(n, j)` names both a black `R(n,j)` and a
/// white `L(n,j)` triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// First lattice coordinate.
    pub x: i32,
    /// Second lattice coordinate.
    pub y: i32,
    /// Bipartite colour of the cell.
    pub color: Color,
}

impl Cell {
    /// Creates a new cell descriptor.
    pub const fn new(x: i32, y: i32, color: Color) -> Self {
        Self { x, y, color }
    }

    /// Black cell at `(x, y)`.
    pub const fn black(x: i32, y: i32) -> Self {
        Self::new(x, y, Color::Black)
    }

    /// White cell at `(x, y)`.
    pub const fn white(x: i32, y: i32) -> Self {
        Self::new(x, y, Color::White)
    }

    /// Square-lattice cell with the colour implied by coordinate parity.
    pub fn square(x: i32, y: i32) -> Self {
        let color = if (x.rem_euclid(2) + y.rem_euclid(2)) % 2 == 0 {
            Color::Black
        } else {
            Color::White
        };
        Self::new(x, y, color)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.color {
            Color::Black => 'B',
            Color::White => 'W',
        };
        write!(f, "{tag}({},{})", self.x, self.y)
    }
}

/// A lattice point (cell corner) in integer lattice coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    /// First lattice coordinate.
    pub x: i32,
    /// Second lattice coordinate.
    pub y: i32,
}

impl Point {
    /// Creates a new lattice point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A dimer expressed in lattice coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dimer {
    /// The black end of the dimer.
    pub black: Cell,
    /// The white end of the dimer.
    pub white: Cell,
}
