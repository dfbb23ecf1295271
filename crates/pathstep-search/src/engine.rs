//! One start→goal segment of best-first search, advanced one expansion per
//! call.

use log::{debug, trace};
use pathstep_core::{CostModel, Grid, Point};

use crate::error::Error;
use crate::heuristic::{AxisManhattan, Heuristic};
use crate::state::{Membership, SearchState};

/// Where the current segment stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// No segment has been seeded.
    Idle,
    /// The open set is non-empty and the goal has not been selected yet.
    Running,
    /// The goal was selected from the open set.
    Succeeded,
    /// The open set emptied before the goal was reached.
    Exhausted,
}

/// Result of one [`SearchEngine::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// One cell was expanded; the goal has not been reached yet.
    InProgress,
    /// The goal was reached. Carries the path from the segment start to the
    /// goal, both inclusive.
    SegmentSucceeded(Vec<Point>),
    /// No path exists for this segment.
    SegmentFailed,
}

/// Read-only view of a cell's search attributes in the current segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeView {
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub parent: Option<Point>,
    pub open: bool,
}

/// Incremental best-first search over a [`Grid`], one expansion per
/// [`step`](Self::step).
///
/// The open set is ranked by `f = g + h`; among equal `f` the cell with the
/// larger `g` wins, and among equal `g` the one discovered first. Entry costs
/// are re-derived by the [`CostModel`] as each cell is expanded, so the cost
/// of a cell depends on which neighbour expanded next to it.
pub struct SearchEngine<H: Heuristic = AxisManhattan> {
    costs: CostModel,
    heuristic: H,
    state: SearchState,
    status: SearchStatus,
    start: Option<usize>,
    goal: Option<usize>,
    /// Winner of the most recent step.
    current: Option<usize>,
    expansions: usize,
}

impl SearchEngine<AxisManhattan> {
    /// Engine whose heuristic weights each axis by the matching move cost.
    pub fn with_costs(costs: CostModel) -> Self {
        Self::new(costs, AxisManhattan::from(costs))
    }
}

impl<H: Heuristic> SearchEngine<H> {
    /// Create an idle engine.
    pub fn new(costs: CostModel, heuristic: H) -> Self {
        Self {
            costs,
            heuristic,
            state: SearchState::new(),
            status: SearchStatus::Idle,
            start: None,
            goal: None,
            current: None,
            expansions: 0,
        }
    }

    /// Begin a new segment from `start` to `goal`.
    ///
    /// Forgets the previous segment's open and closed sets, puts `start` in
    /// the open set with `g = 0` and moves to [`SearchStatus::Running`].
    pub fn seed(&mut self, grid: &Grid, start: Point, goal: Point) -> Result<(), Error> {
        let si = grid.idx(start).ok_or(Error::OutOfBounds(start))?;
        let gi = grid.idx(goal).ok_or(Error::OutOfBounds(goal))?;

        self.state.reset(grid.bounds());
        let h = self.heuristic.estimate(start, goal);
        self.state.open(si, 0.0, h, None);

        self.start = Some(si);
        self.goal = Some(gi);
        self.current = None;
        self.status = SearchStatus::Running;
        debug!("segment seeded {start} -> {goal}, h = {h}");
        Ok(())
    }

    /// Perform exactly one expansion.
    ///
    /// Once the segment has finished, repeated calls keep reporting the same
    /// outcome without doing any work.
    pub fn step(&mut self, grid: &mut Grid) -> StepOutcome {
        match self.status {
            SearchStatus::Succeeded => return StepOutcome::SegmentSucceeded(self.current_path()),
            SearchStatus::Exhausted => return StepOutcome::SegmentFailed,
            SearchStatus::Idle | SearchStatus::Running => {}
        }

        let (Some(winner), Some(goal)) = (self.state.peek_best(), self.goal) else {
            self.status = SearchStatus::Exhausted;
            debug!(
                "segment exhausted after {} closed cells, goal {:?} unreachable",
                self.state.closed_len(),
                self.goal.map(|g| self.state.point(g))
            );
            return StepOutcome::SegmentFailed;
        };
        self.current = Some(winner);

        if winner == goal {
            self.status = SearchStatus::Succeeded;
            let path = self.current_path();
            debug!(
                "segment reached {} in {} cells, {} closed",
                self.state.point(goal),
                path.len(),
                self.state.closed_len()
            );
            return StepOutcome::SegmentSucceeded(path);
        }

        self.state.close(winner);
        self.expansions += 1;
        let state = &self.state;
        self.costs.refresh(grid, winner, |i| state.is_closed(i));

        let goal_pos = self.state.point(goal);
        let winner_g = self.state.node(winner).map_or(0.0, |n| n.g);
        for &ni in grid.neighbours(winner) {
            let cell = grid.cell(ni);
            if cell.wall || self.state.is_closed(ni) {
                continue;
            }
            let candidate = winner_g + cell.cost;
            let improves = match self.state.node(ni) {
                Some(n) if n.membership == Membership::Open => candidate < n.g,
                _ => true,
            };
            if improves {
                let h = self.heuristic.estimate(cell.pos(), goal_pos);
                self.state.open(ni, candidate, h, Some(winner));
            }
        }

        trace!(
            "expanded {} (g = {winner_g}), open {}, closed {}",
            self.state.point(winner),
            self.state.open_len(),
            self.state.closed_len()
        );
        StepOutcome::InProgress
    }

    /// Path from the segment start to the winner of the latest step, both
    /// inclusive. Empty before the first step of a segment.
    pub fn current_path(&self) -> Vec<Point> {
        let mut path = Vec::new();
        let mut cursor = self.current;
        while let Some(ci) = cursor {
            path.push(self.state.point(ci));
            cursor = self.state.parent(ci);
        }
        path.reverse();
        path
    }

    /// Sum of entry costs along `path`, not counting its first cell.
    pub fn path_cost(&self, grid: &Grid, path: &[Point]) -> f64 {
        path.iter()
            .skip(1)
            .filter_map(|&p| grid.at(p))
            .map(|c| c.cost)
            .sum()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn start(&self) -> Option<Point> {
        self.start.map(|i| self.state.point(i))
    }

    pub fn goal(&self) -> Option<Point> {
        self.goal.map(|i| self.state.point(i))
    }

    /// Winner of the most recent step: the cell just expanded, or the goal
    /// once the segment has succeeded.
    pub fn current(&self) -> Option<Point> {
        self.current.map(|i| self.state.point(i))
    }

    /// Total number of cells moved to a closed set over the engine's lifetime.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn open_len(&self) -> usize {
        self.state.open_len()
    }

    pub fn closed_len(&self) -> usize {
        self.state.closed_len()
    }

    pub fn is_open(&self, p: Point) -> bool {
        self.state.idx(p).is_some_and(|i| self.state.is_open(i))
    }

    pub fn is_closed(&self, p: Point) -> bool {
        self.state.idx(p).is_some_and(|i| self.state.is_closed(i))
    }

    /// Search attributes of `p`, if it is in the open or closed set of the
    /// current segment.
    pub fn node(&self, p: Point) -> Option<NodeView> {
        let i = self.state.idx(p)?;
        let n = self.state.node(i)?;
        Some(NodeView {
            g: n.g,
            h: n.h,
            f: n.f,
            parent: self.state.parent(i).map(|pi| self.state.point(pi)),
            open: n.membership == Membership::Open,
        })
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn run(engine: &mut SearchEngine, grid: &mut Grid) -> StepOutcome {
        loop {
            match engine.step(grid) {
                StepOutcome::InProgress => continue,
                done => return done,
            }
        }
    }

    #[test]
    fn five_by_five_corner_to_corner() {
        let mut grid = Grid::new(5, 5);
        let mut engine = SearchEngine::with_costs(CostModel::uniform(1.0));
        engine.seed(&grid, Point::new(0, 0), Point::new(4, 4)).unwrap();

        let StepOutcome::SegmentSucceeded(path) = run(&mut engine, &mut grid) else {
            panic!("expected success");
        };
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        assert_eq!(path.last(), Some(&Point::new(4, 4)));
        assert_eq!(engine.path_cost(&grid, &path), 8.0);
        assert_eq!(engine.status(), SearchStatus::Succeeded);
        for w in path.windows(2) {
            assert_eq!(crate::manhattan(w[0], w[1]), 1);
        }
    }

    #[test]
    fn open_grid_cost_is_manhattan() {
        let pairs = [
            (Point::new(0, 0), Point::new(6, 3)),
            (Point::new(5, 5), Point::new(0, 1)),
            (Point::new(2, 7), Point::new(2, 0)),
            (Point::new(7, 4), Point::new(1, 4)),
        ];
        for (from, to) in pairs {
            let mut grid = Grid::new(8, 8);
            let mut engine = SearchEngine::with_costs(CostModel::uniform(2.0));
            engine.seed(&grid, from, to).unwrap();
            let StepOutcome::SegmentSucceeded(path) = run(&mut engine, &mut grid) else {
                panic!("expected success for {from} -> {to}");
            };
            let cost = engine.path_cost(&grid, &path);
            assert_eq!(cost, 2.0 * crate::manhattan(from, to) as f64);
            assert_eq!(path.len() as i32, crate::manhattan(from, to) + 1);
        }
    }

    #[test]
    fn start_equal_to_goal() {
        let mut grid = Grid::new(3, 3);
        let mut engine = SearchEngine::with_costs(CostModel::default());
        engine.seed(&grid, Point::new(1, 1), Point::new(1, 1)).unwrap();
        assert_eq!(
            engine.step(&mut grid),
            StepOutcome::SegmentSucceeded(vec![Point::new(1, 1)])
        );
        assert_eq!(engine.expansions(), 0);
    }

    #[test]
    fn wall_row_exhausts_all_reachable_cells() {
        let mut grid = Grid::from_rows(&[".....", ".....", "#####", ".....", "....."]);
        let mut engine = SearchEngine::with_costs(CostModel::uniform(1.0));
        engine.seed(&grid, Point::new(0, 0), Point::new(4, 4)).unwrap();

        assert_eq!(run(&mut engine, &mut grid), StepOutcome::SegmentFailed);
        assert_eq!(engine.status(), SearchStatus::Exhausted);
        assert_eq!(engine.expansions(), 10);
        assert_eq!(engine.open_len(), 0);

        // Further steps are no-ops.
        assert_eq!(engine.step(&mut grid), StepOutcome::SegmentFailed);
        assert_eq!(engine.expansions(), 10);
    }

    #[test]
    fn equal_f_prefers_larger_g() {
        // After two expansions (0, 1) and (1, 1) are both open with f = 5;
        // (0, 1) was discovered first but (1, 1) has g = 2 > 1.
        let mut grid = Grid::from_rows(&["..#.", "...."]);
        let mut engine = SearchEngine::with_costs(CostModel::uniform(1.0));
        engine.seed(&grid, Point::new(0, 0), Point::new(3, 0)).unwrap();

        assert_eq!(engine.step(&mut grid), StepOutcome::InProgress);
        assert_eq!(engine.step(&mut grid), StepOutcome::InProgress);
        assert_eq!(engine.current(), Some(Point::new(1, 0)));

        let a = engine.node(Point::new(0, 1)).unwrap();
        let b = engine.node(Point::new(1, 1)).unwrap();
        assert!(a.open && b.open);
        assert_eq!(a.f, b.f);
        assert!(b.g > a.g);

        assert_eq!(engine.step(&mut grid), StepOutcome::InProgress);
        assert_eq!(engine.current(), Some(Point::new(1, 1)));
    }

    #[test]
    fn f_is_g_plus_h_and_no_reexpansion() {
        let mut grid = Grid::from_rows(&[
            "..........",
            ".##.####..",
            "...#...#..",
            ".#.#.#.#.#",
            ".#...#....",
            ".#####.##.",
            "..........",
        ]);
        let mut engine = SearchEngine::with_costs(CostModel::new(0.5, 1.0));
        engine.seed(&grid, Point::new(0, 0), Point::new(9, 6)).unwrap();

        let mut expanded = HashSet::new();
        loop {
            let outcome = engine.step(&mut grid);
            for p in grid.bounds() {
                if let Some(n) = engine.node(p) {
                    assert_eq!(n.f, n.g + n.h, "at {p}");
                    assert!(!grid.is_wall(p), "wall {p} entered a set");
                }
            }
            match outcome {
                StepOutcome::InProgress => {
                    let p = engine.current().unwrap();
                    assert!(!grid.is_wall(p));
                    assert!(expanded.insert(p), "{p} expanded twice");
                    assert!(engine.is_closed(p));
                }
                StepOutcome::SegmentSucceeded(path) => {
                    assert_eq!(path.last(), Some(&Point::new(9, 6)));
                    break;
                }
                StepOutcome::SegmentFailed => panic!("goal is reachable"),
            }
        }
        assert_eq!(expanded.len(), engine.expansions());
    }

    #[test]
    fn reseed_forgets_previous_segment() {
        let mut grid = Grid::new(4, 4);
        let mut engine = SearchEngine::with_costs(CostModel::uniform(1.0));
        engine.seed(&grid, Point::new(0, 0), Point::new(3, 0)).unwrap();
        assert!(matches!(run(&mut engine, &mut grid), StepOutcome::SegmentSucceeded(_)));
        let first = engine.expansions();
        assert!(engine.closed_len() > 0);

        engine.seed(&grid, Point::new(3, 0), Point::new(3, 3)).unwrap();
        assert_eq!(engine.status(), SearchStatus::Running);
        assert_eq!(engine.closed_len(), 0);
        assert_eq!(engine.open_len(), 1);
        assert!(!engine.is_closed(Point::new(0, 0)));
        assert_eq!(engine.node(Point::new(3, 0)).map(|n| n.g), Some(0.0));

        let StepOutcome::SegmentSucceeded(path) = run(&mut engine, &mut grid) else {
            panic!("expected success");
        };
        assert_eq!(path.first(), Some(&Point::new(3, 0)));
        assert!(engine.expansions() > first);
    }

    #[test]
    fn anisotropic_costs_follow_expansion_direction() {
        let mut grid = Grid::new(4, 1);
        let mut engine = SearchEngine::with_costs(CostModel::new(0.5, 1.0));
        engine.seed(&grid, Point::new(0, 0), Point::new(3, 0)).unwrap();
        let StepOutcome::SegmentSucceeded(path) = run(&mut engine, &mut grid) else {
            panic!("expected success");
        };
        assert_eq!(engine.path_cost(&grid, &path), 1.5);
    }

    #[test]
    fn idle_step_fails() {
        let mut grid = Grid::new(2, 2);
        let mut engine = SearchEngine::with_costs(CostModel::default());
        assert_eq!(engine.status(), SearchStatus::Idle);
        assert_eq!(engine.step(&mut grid), StepOutcome::SegmentFailed);
        assert_eq!(engine.status(), SearchStatus::Exhausted);
    }

    #[test]
    fn seed_out_of_bounds() {
        let grid = Grid::new(2, 2);
        let mut engine = SearchEngine::with_costs(CostModel::default());
        assert_eq!(
            engine.seed(&grid, Point::new(0, 0), Point::new(2, 0)),
            Err(Error::OutOfBounds(Point::new(2, 0)))
        );
        assert_eq!(engine.status(), SearchStatus::Idle);
    }

    #[test]
    fn current_path_tracks_best_cell() {
        let mut grid = Grid::new(5, 1);
        let mut engine = SearchEngine::with_costs(CostModel::uniform(1.0));
        engine.seed(&grid, Point::new(0, 0), Point::new(4, 0)).unwrap();
        assert!(engine.current_path().is_empty());
        engine.step(&mut grid);
        engine.step(&mut grid);
        assert_eq!(
            engine.current_path(),
            vec![Point::new(0, 0), Point::new(1, 0)]
        );
    }
}
