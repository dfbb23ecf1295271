//! The [`Cell`] type: one square of the search grid.

use crate::geom::Point;

/// A grid square.
///
/// `pos` never changes after the grid is built. `wall` is fixed by map
/// generation; `cost` is the price of entering this cell from a neighbour and
/// is rewritten by [`CostModel::refresh`](crate::CostModel::refresh) as the
/// search front moves.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cell {
    pos: Point,
    pub wall: bool,
    pub cost: f64,
}

impl Cell {
    /// A passable cell with zero entry cost.
    #[inline]
    pub const fn new(pos: Point) -> Self {
        Self {
            pos,
            wall: false,
            cost: 0.0,
        }
    }

    /// Set the wall flag (builder).
    #[inline]
    pub const fn with_wall(mut self, wall: bool) -> Self {
        self.wall = wall;
        self
    }

    /// Grid coordinates `(i, j)` as a point.
    #[inline]
    pub const fn pos(&self) -> Point {
        self.pos
    }
}
