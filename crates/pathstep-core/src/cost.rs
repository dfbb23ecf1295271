//! Directional movement costs.

use crate::geom::Point;
use crate::grid::Grid;

/// Two fixed traversal costs: one for moves along a row, one for moves along
/// a column. They need not be equal.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostModel {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            horizontal: 0.5,
            vertical: 1.0,
        }
    }
}

impl CostModel {
    /// Create a cost model.
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Same cost in both directions.
    pub const fn uniform(cost: f64) -> Self {
        Self::new(cost, cost)
    }

    /// Cost of stepping from `from` into the adjacent `to`.
    ///
    /// Returns `None` if the two points share neither row nor column.
    #[inline]
    pub fn between(&self, from: Point, to: Point) -> Option<f64> {
        if from.same_row(to) {
            Some(self.horizontal)
        } else if from.same_column(to) {
            Some(self.vertical)
        } else {
            None
        }
    }

    /// Re-derive the entry cost of every neighbour of the cell at `idx`,
    /// skipping neighbours for which `closed` returns `true`.
    ///
    /// Only ever writes forward from the cell being expanded; costs already
    /// summed into a closed cell's `g` stay as they were.
    pub fn refresh(&self, grid: &mut Grid, idx: usize, closed: impl Fn(usize) -> bool) {
        let from = grid.point(idx);
        for k in 0..grid.neighbours(idx).len() {
            let ni = grid.neighbours(idx)[k];
            if closed(ni) {
                continue;
            }
            let to = grid.point(ni);
            if let Some(cost) = self.between(from, to) {
                grid.cell_mut(ni).cost = cost;
            }
        }
    }
}
