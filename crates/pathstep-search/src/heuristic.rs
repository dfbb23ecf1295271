use pathstep_core::{CostModel, Point};

/// Estimate of the remaining cost between two cells.
///
/// Unlike a textbook A* heuristic this is not required to be admissible; the
/// engine uses whatever it returns.
pub trait Heuristic {
    /// Estimated cost from `from` to `to`.
    fn estimate(&self, from: Point, to: Point) -> f64;
}

/// Manhattan distance with each axis weighted by the matching move cost:
/// `horizontal * |Δi| + vertical * |Δj|`.
///
/// The weighting ignores the direction the path actually travels in, so with
/// unequal weights and the direction-dependent [`CostModel`] it may
/// overestimate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisManhattan {
    pub horizontal: f64,
    pub vertical: f64,
}

impl AxisManhattan {
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

impl From<CostModel> for AxisManhattan {
    fn from(costs: CostModel) -> Self {
        Self::new(costs.horizontal, costs.vertical)
    }
}

impl Heuristic for AxisManhattan {
    #[inline]
    fn estimate(&self, from: Point, to: Point) -> f64 {
        let di = (from.x - to.x).abs() as f64;
        let dj = (from.y - to.y).abs() as f64;
        self.horizontal * di + self.vertical * dj
    }
}

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
