//! Map generation: random walls and goal placement.
//!
//! Generation runs in a fixed order so a given seed always yields the same
//! layout:
//! 1. scatter walls over the interior cells,
//! 2. draw distinct goal cells,
//! 3. force the start and every goal passable.

use log::debug;
use pathstep_core::{Config, ConfigError, Grid, Point};
use rand::{Rng, RngExt};

/// A generated grid together with its route endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub grid: Grid,
    pub start: Point,
    /// Goals in declaration (draw) order.
    pub goals: Vec<Point>,
}

/// Map generator operating on a [`Grid`].
pub struct MapGen<R: Rng> {
    pub rng: R,
    pub grid: Grid,
}

impl<R: Rng> MapGen<R> {
    /// Create a new MapGen with the given grid.
    pub fn with_grid(grid: Grid, rng: R) -> Self {
        Self { rng, grid }
    }

    /// Turn each non-border cell into a wall with probability `p`.
    ///
    /// Border cells are left as they are. Returns the number of walls placed.
    pub fn scatter_walls(&mut self, p: f64) -> usize {
        let bounds = self.grid.bounds();
        let mut placed = 0;
        for pos in bounds.iter() {
            if bounds.on_border(pos) {
                continue;
            }
            let r: f64 = self.rng.random();
            if r < p {
                self.grid.set_wall(pos, true);
                placed += 1;
            }
        }
        placed
    }

    /// Draw `n` distinct goal cells among those with `i ≥ 1` and `j ≥ 1`,
    /// never on `start`.
    ///
    /// Uses a partial Fisher–Yates shuffle over the eligible cells, so the
    /// result is exact and bounded even when `n` equals the number of slots.
    /// Returns fewer than `n` goals only if there are not enough slots.
    pub fn place_goals(&mut self, start: Point, n: usize) -> Vec<Point> {
        let mut slots: Vec<Point> = self
            .grid
            .bounds()
            .iter()
            .filter(|p| p.x >= 1 && p.y >= 1 && *p != start)
            .collect();
        let n = n.min(slots.len());
        for i in 0..n {
            let j = self.rng.random_range(i..slots.len());
            slots.swap(i, j);
        }
        slots.truncate(n);
        slots
    }

    /// Clear the wall flag on every point in `points`.
    pub fn clear_walls(&mut self, points: impl IntoIterator<Item = Point>) {
        for p in points {
            self.grid.set_wall(p, false);
        }
    }
}

/// Build a complete [`Layout`] for `config`, drawing randomness from `rng`.
///
/// The configuration is validated first; an invalid one never produces a
/// grid.
pub fn generate<R: Rng>(config: &Config, rng: R) -> Result<Layout, ConfigError> {
    config.validate()?;

    let mut mg = MapGen::with_grid(Grid::new(config.cols, config.rows), rng);
    let walls = mg.scatter_walls(config.wall_probability);
    let start = Point::ZERO;
    let goals = mg.place_goals(start, config.num_goals);
    mg.clear_walls(std::iter::once(start).chain(goals.iter().copied()));

    debug!(
        "generated {}x{} grid: {} walls scattered, {} left, goals {:?}",
        config.cols,
        config.rows,
        walls,
        mg.grid.count_walls(),
        goals
    );

    Ok(Layout {
        grid: mg.grid,
        start,
        goals,
    })
}
