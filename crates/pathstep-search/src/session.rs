//! The control and query surface a UI layer drives.

use std::collections::HashSet;

use log::{debug, info, warn};
use pathstep_core::{Config, ConfigError, Grid, Point};
use pathstep_gen::{Layout, generate};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::engine::{SearchEngine, SearchStatus, StepOutcome};
use crate::error::Error;
use crate::sequencer::{TargetSequencer, Waypoint};

/// State of the single start / pause / restart control.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Control {
    Paused,
    Running,
    /// The route is solved or failed; the only action left is a restart.
    Finished,
}

impl Control {
    /// Caption of the button that changes this state.
    pub fn label(self) -> &'static str {
        match self {
            Self::Paused => "START",
            Self::Running => "PAUSE",
            Self::Finished => "RESTART",
        }
    }
}

/// Route-level outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteStatus {
    Searching,
    /// Every goal was visited.
    Solved,
    /// A leg had no path; the rest of the route is abandoned.
    Failed(Error),
}

impl RouteStatus {
    /// Status line text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Searching => "",
            Self::Solved => "Solved!",
            Self::Failed(_) => "No solution!",
        }
    }
}

/// What a renderer should show for one cell, in drawing precedence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Empty,
    Wall,
    Start,
    Goal,
    /// A goal that lies on the traversal shown so far.
    ReachedGoal,
    Path,
    Open,
    Closed,
}

/// A complete run: grid, route, engine and the completed part of the
/// traversal.
///
/// `step` advances the current leg by one expansion; `tick` does the same but
/// only while running. When a leg succeeds the next one is seeded before
/// `step` returns, so the caller never needs to touch the sequencer.
pub struct Session {
    config: Config,
    grid: Grid,
    engine: SearchEngine,
    sequencer: TargetSequencer,
    control: Control,
    status: RouteStatus,
    /// Paths of the completed legs, each start→goal inclusive.
    segments: Vec<Vec<Point>>,
    /// Cost of the completed legs, frozen when each leg succeeded.
    completed_cost: f64,
}

impl Session {
    /// Generate a grid and route from `config` and seed the first leg.
    pub fn new(config: Config) -> Result<Self, Error> {
        let layout = generate(&config, StdRng::seed_from_u64(config.seed))?;
        Self::with_layout(config, layout)
    }

    /// Run on a prepared grid and route instead of a generated one.
    ///
    /// Costs come from `config`; its size, wall and goal options only apply
    /// after a [`restart`](Self::restart). Fails before any search starts if
    /// the costs are invalid, the route has no goals, or an endpoint is
    /// outside the grid, a wall, or a goal on the start.
    pub fn with_layout(config: Config, layout: Layout) -> Result<Self, Error> {
        config.validate_costs()?;
        check_layout(&layout)?;
        let mut engine = SearchEngine::with_costs(config.cost_model());
        let mut sequencer = TargetSequencer::new(layout.start, layout.goals);
        let first = sequencer.initial(&mut engine, &layout.grid)?;

        info!(
            "session: {}x{} grid, {} goals, seed {}",
            layout.grid.cols(),
            layout.grid.rows(),
            sequencer.goals().len(),
            config.seed
        );

        let (control, status) = match first {
            Some(_) => (Control::Paused, RouteStatus::Searching),
            None => (Control::Finished, RouteStatus::Solved),
        };
        Ok(Self {
            config,
            grid: layout.grid,
            engine,
            sequencer,
            control,
            status,
            segments: Vec::new(),
            completed_cost: 0.0,
        })
    }

    // -----------------------------------------------------------------------
    // Control
    // -----------------------------------------------------------------------

    /// Let `tick` advance the search. No effect once finished.
    pub fn start(&mut self) {
        if self.control == Control::Paused {
            self.control = Control::Running;
        }
    }

    /// Stop `tick` from advancing the search.
    pub fn pause(&mut self) {
        if self.control == Control::Running {
            self.control = Control::Paused;
        }
    }

    /// The button press: start, pause, or regenerate a finished run with the
    /// next seed.
    pub fn toggle(&mut self) -> Result<(), Error> {
        match self.control {
            Control::Paused => self.start(),
            Control::Running => self.pause(),
            Control::Finished => self.restart_with_seed(self.config.seed.wrapping_add(1))?,
        }
        Ok(())
    }

    /// Discard all search and route state and rebuild from the configured
    /// seed. Restarting twice gives the same state as restarting once.
    pub fn restart(&mut self) -> Result<(), Error> {
        *self = Self::new(self.config.clone())?;
        Ok(())
    }

    /// Like [`restart`](Self::restart), with new randomness.
    pub fn restart_with_seed(&mut self, seed: u64) -> Result<(), Error> {
        let config = self.config.clone().with_seed(seed);
        *self = Self::new(config)?;
        Ok(())
    }

    /// Advance the search by one step if running.
    pub fn tick(&mut self) -> Option<StepOutcome> {
        if self.control != Control::Running {
            return None;
        }
        self.step()
    }

    /// Advance the current leg by one expansion, regardless of pause state.
    ///
    /// Returns `None` once the route is solved or failed.
    pub fn step(&mut self) -> Option<StepOutcome> {
        if self.status != RouteStatus::Searching {
            return None;
        }
        let outcome = self.engine.step(&mut self.grid);
        match &outcome {
            StepOutcome::InProgress => {}
            StepOutcome::SegmentSucceeded(path) => self.complete_leg(path.clone()),
            StepOutcome::SegmentFailed => {
                let err = Error::SegmentUnreachable {
                    from: self.engine.start().unwrap_or(self.sequencer.start()),
                    to: self.engine.goal().unwrap_or(self.sequencer.start()),
                };
                info!("route failed: {err}");
                self.finish(RouteStatus::Failed(err));
            }
        }
        Some(outcome)
    }

    fn complete_leg(&mut self, path: Vec<Point>) {
        let cost = self.engine.path_cost(&self.grid, &path);
        self.completed_cost += cost;
        let Some(&reached) = path.last() else {
            return;
        };
        debug!("leg to {reached} done, cost {cost}, total {}", self.completed_cost);
        self.segments.push(path);

        match self.sequencer.advance(reached, &mut self.engine, &self.grid) {
            Ok(Some(_)) => {}
            Ok(None) => {
                info!(
                    "route solved: cost {}, {} expansions",
                    self.completed_cost,
                    self.engine.expansions()
                );
                self.finish(RouteStatus::Solved);
            }
            Err(e) => {
                warn!("route aborted: {e}");
                self.finish(RouteStatus::Failed(e));
            }
        }
    }

    fn finish(&mut self, status: RouteStatus) {
        self.status = status;
        self.control = Control::Finished;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn status(&self) -> &RouteStatus {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.control == Control::Running
    }

    /// Whether the route is solved or failed.
    pub fn is_finished(&self) -> bool {
        self.status != RouteStatus::Searching
    }

    pub fn start_point(&self) -> Point {
        self.sequencer.start()
    }

    /// Goals in declaration order with their visited flags.
    pub fn goals(&self) -> &[Waypoint] {
        self.sequencer.goals()
    }

    /// Goal of the leg in progress.
    pub fn current_goal(&self) -> Option<Point> {
        self.sequencer.current_goal()
    }

    /// Number of expansions performed since the session was created.
    pub fn expansions(&self) -> usize {
        self.engine.expansions()
    }

    /// The cell expanded (or reached) by the most recent step.
    pub fn last_expanded(&self) -> Option<Point> {
        self.engine.current()
    }

    /// Completed legs followed by the best path of the leg in progress, as
    /// one start→current sequence.
    pub fn traversal(&self) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        let live = (self.engine.status() == SearchStatus::Running)
            .then(|| self.engine.current_path());
        for seg in self.segments.iter().chain(live.iter()) {
            let skip = usize::from(out.last().is_some() && out.last() == seg.first());
            out.extend(seg.iter().skip(skip));
        }
        out
    }

    /// Cumulative cost of the traversal so far.
    pub fn path_cost(&self) -> f64 {
        let live = if self.engine.status() == SearchStatus::Running {
            self.engine
                .path_cost(&self.grid, &self.engine.current_path())
        } else {
            0.0
        };
        self.completed_cost + live
    }

    /// Classification of every cell, row-major.
    pub fn cell_kinds(&self) -> Vec<CellKind> {
        let on_path: HashSet<Point> = self.traversal().into_iter().collect();
        self.grid
            .iter()
            .map(|c| self.classify(c.pos(), &on_path))
            .collect()
    }

    /// Classification of one cell.
    pub fn cell_kind(&self, p: Point) -> CellKind {
        let on_path: HashSet<Point> = self.traversal().into_iter().collect();
        self.classify(p, &on_path)
    }

    fn classify(&self, p: Point, on_path: &HashSet<Point>) -> CellKind {
        if self.grid.is_wall(p) {
            return CellKind::Wall;
        }
        if p == self.sequencer.start() {
            return CellKind::Start;
        }
        if self.sequencer.is_node(p) {
            let reached = on_path.contains(&p)
                || self.goals().iter().any(|w| w.pos == p && w.visited);
            return if reached {
                CellKind::ReachedGoal
            } else {
                CellKind::Goal
            };
        }
        if on_path.contains(&p) {
            CellKind::Path
        } else if self.engine.is_open(p) {
            CellKind::Open
        } else if self.engine.is_closed(p) {
            CellKind::Closed
        } else {
            CellKind::Empty
        }
    }
}

/// Reject a prepared route that could not come out of generation.
fn check_layout(layout: &Layout) -> Result<(), Error> {
    if layout.goals.is_empty() {
        return Err(ConfigError::NoGoals.into());
    }
    for &p in std::iter::once(&layout.start).chain(&layout.goals) {
        if !layout.grid.contains(p) {
            return Err(Error::OutOfBounds(p));
        }
        if layout.grid.is_wall(p) {
            return Err(ConfigError::BlockedEndpoint(p).into());
        }
    }
    if let Some(&g) = layout.goals.iter().find(|&&g| g == layout.start) {
        return Err(ConfigError::GoalAtStart(g).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Heuristic;

    fn small() -> Config {
        Config::default()
            .with_size(12, 12)
            .with_wall_probability(0.0)
            .with_costs(1.0, 1.0)
            .with_goals(3)
            .with_seed(7)
    }

    fn run_to_end(s: &mut Session) -> Vec<StepOutcome> {
        let mut outcomes = Vec::new();
        while let Some(o) = s.step() {
            outcomes.push(o);
        }
        outcomes
    }

    #[test]
    fn invalid_config_prevents_session() {
        let err = Session::new(Config::default().with_size(1, 1)).err();
        assert_eq!(
            err,
            Some(Error::ConfigurationInvalid(ConfigError::GridTooSmall {
                cols: 1,
                rows: 1
            }))
        );
    }

    #[test]
    fn starts_paused_and_tick_waits() {
        let mut s = Session::new(small()).unwrap();
        assert_eq!(s.control(), Control::Paused);
        assert_eq!(s.control().label(), "START");
        assert_eq!(s.tick(), None);
        assert_eq!(s.expansions(), 0);

        s.start();
        assert_eq!(s.control().label(), "PAUSE");
        assert_eq!(s.tick(), Some(StepOutcome::InProgress));
        assert_eq!(s.expansions(), 1);

        s.pause();
        assert_eq!(s.tick(), None);
        assert_eq!(s.expansions(), 1);
    }

    #[test]
    fn open_grid_route_is_solved() {
        let mut s = Session::new(small()).unwrap();
        let outcomes = run_to_end(&mut s);
        let legs = outcomes
            .iter()
            .filter(|o| matches!(o, StepOutcome::SegmentSucceeded(_)))
            .count();
        assert_eq!(legs, 3);
        assert_eq!(s.status(), &RouteStatus::Solved);
        assert_eq!(s.status().label(), "Solved!");
        assert_eq!(s.control(), Control::Finished);
        assert_eq!(s.control().label(), "RESTART");
        assert!(s.goals().iter().all(|w| w.visited));
        assert_eq!(s.step(), None);

        // Unit costs on an open grid: each leg costs its Manhattan length.
        let traversal = s.traversal();
        assert_eq!(traversal.first(), Some(&Point::ZERO));
        assert_eq!(s.path_cost(), (traversal.len() - 1) as f64);
        for w in traversal.windows(2) {
            assert_eq!(crate::manhattan(w[0], w[1]), 1);
        }
    }

    #[test]
    fn visiting_order_is_greedy() {
        let mut s = Session::new(small()).unwrap();
        let goals: Vec<Point> = s.goals().iter().map(|w| w.pos).collect();
        let h = crate::AxisManhattan::new(1.0, 1.0);
        let mut from = Point::ZERO;
        let mut remaining = goals.clone();
        let mut expected = Vec::new();
        while !remaining.is_empty() {
            let mut best = 0;
            for (i, g) in remaining.iter().enumerate() {
                if h.estimate(from, *g) < h.estimate(from, remaining[best]) {
                    best = i;
                }
            }
            from = remaining.remove(best);
            expected.push(from);
        }

        let mut visited = Vec::new();
        while let Some(o) = s.step() {
            if let StepOutcome::SegmentSucceeded(path) = o {
                visited.push(*path.last().unwrap());
            }
        }
        assert_eq!(visited, expected);
    }

    #[test]
    fn blocked_goal_fails_route() {
        let grid = Grid::from_rows(&[".....", ".....", "#####", ".....", "....."]);
        let goal = Point::new(4, 4);
        let layout = Layout {
            grid,
            start: Point::ZERO,
            goals: vec![goal],
        };
        let mut s = Session::with_layout(small(), layout).unwrap();
        let outcomes = run_to_end(&mut s);

        assert_eq!(outcomes.last(), Some(&StepOutcome::SegmentFailed));
        assert_eq!(
            s.status(),
            &RouteStatus::Failed(Error::SegmentUnreachable {
                from: Point::ZERO,
                to: goal
            })
        );
        assert_eq!(s.status().label(), "No solution!");
        // Both rows above the wall, and nothing else, were expanded.
        assert_eq!(s.expansions(), 10);
        assert_eq!(s.control(), Control::Finished);
        assert!(!s.goals()[0].visited);
        assert_eq!(s.step(), None);
    }

    #[test]
    fn same_seed_same_run() {
        let config = Config::default().with_size(20, 20).with_seed(1234);
        let mut a = Session::new(config.clone()).unwrap();
        let mut b = Session::new(config).unwrap();
        assert_eq!(a.grid(), b.grid());

        loop {
            let oa = a.step();
            let ob = b.step();
            assert_eq!(oa, ob);
            assert_eq!(a.last_expanded(), b.last_expanded());
            if oa.is_none() {
                break;
            }
        }
        assert_eq!(a.traversal(), b.traversal());
        assert_eq!(a.expansions(), b.expansions());
        assert_eq!(a.status(), b.status());
    }

    #[test]
    fn restart_is_idempotent() {
        let mut once = Session::new(small()).unwrap();
        let mut twice = Session::new(small()).unwrap();
        for _ in 0..15 {
            once.step();
            twice.step();
        }
        once.restart().unwrap();
        twice.restart().unwrap();
        twice.restart().unwrap();

        assert_eq!(once.grid(), twice.grid());
        assert_eq!(once.goals(), twice.goals());
        assert_eq!(once.expansions(), 0);
        assert_eq!(twice.expansions(), 0);
        assert_eq!(once.cell_kinds(), twice.cell_kinds());
        assert_eq!(once.control(), Control::Paused);
        assert_eq!(once.status(), &RouteStatus::Searching);
        assert!(once.goals().iter().all(|w| !w.visited));
        assert_eq!(once.path_cost(), 0.0);
    }

    #[test]
    fn toggle_cycles_and_restarts_when_finished() {
        let mut s = Session::new(small()).unwrap();
        s.toggle().unwrap();
        assert!(s.is_running());
        s.toggle().unwrap();
        assert_eq!(s.control(), Control::Paused);

        run_to_end(&mut s);
        assert!(s.is_finished());
        s.toggle().unwrap();
        assert_eq!(s.control(), Control::Paused);
        assert_eq!(s.status(), &RouteStatus::Searching);
        assert_eq!(s.expansions(), 0);
        assert_eq!(s.config().seed, small().seed + 1);
    }

    #[test]
    fn restart_button_regenerates_failed_route() {
        let config = Config::default().with_size(20, 20).with_wall_probability(0.45);
        let mut s = (0..200)
            .find_map(|seed| {
                let mut s = Session::new(config.clone().with_seed(seed)).unwrap();
                run_to_end(&mut s);
                matches!(s.status(), RouteStatus::Failed(_)).then_some(s)
            })
            .expect("dense walls block some route");
        let failed_seed = s.config().seed;
        let before = s.grid().clone();

        s.toggle().unwrap();
        assert_eq!(s.config().seed, failed_seed + 1);
        assert_ne!(s.grid(), &before);
        assert_eq!(s.control(), Control::Paused);
        assert_eq!(s.status(), &RouteStatus::Searching);
    }

    fn layout(rows: &[&str], goals: &[Point]) -> Layout {
        Layout {
            grid: Grid::from_rows(rows),
            start: Point::ZERO,
            goals: goals.to_vec(),
        }
    }

    #[test]
    fn prepared_layout_with_bad_costs_is_rejected() {
        let l = layout(&["...", "...", "..."], &[Point::new(2, 2)]);
        let err = Session::with_layout(small().with_costs(-1.0, 0.0), l).err();
        assert_eq!(
            err,
            Some(Error::ConfigurationInvalid(ConfigError::NonPositiveCost(-1.0)))
        );
    }

    #[test]
    fn prepared_layout_endpoints_are_checked() {
        let rows = ["...", ".#.", "..."];
        let cases = [
            (vec![], Error::ConfigurationInvalid(ConfigError::NoGoals)),
            (
                vec![Point::new(1, 1)],
                Error::ConfigurationInvalid(ConfigError::BlockedEndpoint(Point::new(1, 1))),
            ),
            (
                vec![Point::new(2, 2), Point::ZERO],
                Error::ConfigurationInvalid(ConfigError::GoalAtStart(Point::ZERO)),
            ),
            (vec![Point::new(3, 0)], Error::OutOfBounds(Point::new(3, 0))),
        ];
        for (goals, expected) in cases {
            let err = Session::with_layout(small(), layout(&rows, &goals)).err();
            assert_eq!(err, Some(expected));
        }

        let mut walled_start = layout(&rows, &[Point::new(2, 2)]);
        walled_start.grid.set_wall(Point::ZERO, true);
        assert_eq!(
            Session::with_layout(small(), walled_start).err(),
            Some(Error::ConfigurationInvalid(ConfigError::BlockedEndpoint(Point::ZERO)))
        );
    }

    #[test]
    fn restart_with_seed_changes_layout() {
        let mut s = Session::new(Config::default().with_size(20, 20)).unwrap();
        let before = s.grid().clone();
        s.restart_with_seed(s.config().seed + 1).unwrap();
        assert_eq!(s.config().seed, Config::default().seed + 1);
        assert_ne!(s.grid(), &before);
    }

    #[test]
    fn cell_kinds_reflect_search_sets() {
        let mut s = Session::new(small()).unwrap();
        assert_eq!(s.cell_kind(Point::ZERO), CellKind::Start);
        for w in s.goals() {
            assert_eq!(s.cell_kind(w.pos), CellKind::Goal);
        }
        for _ in 0..5 {
            s.step();
        }
        let kinds = s.cell_kinds();
        assert_eq!(kinds.len(), s.grid().len());
        assert!(kinds.contains(&CellKind::Open));
        assert!(kinds.contains(&CellKind::Path) || kinds.contains(&CellKind::Closed));

        for (c, kind) in s.grid().iter().zip(&kinds) {
            let p = c.pos();
            match kind {
                CellKind::Open => assert!(s.engine().is_open(p)),
                CellKind::Closed => assert!(s.engine().is_closed(p)),
                _ => {}
            }
        }
    }

    #[test]
    fn reached_goals_are_highlighted() {
        let mut s = Session::new(small()).unwrap();
        let mut first = None;
        while let Some(o) = s.step() {
            if let StepOutcome::SegmentSucceeded(path) = o {
                first = path.last().copied();
                break;
            }
        }
        let first = first.unwrap();
        assert_eq!(s.cell_kind(first), CellKind::ReachedGoal);
        assert!(s.goals().iter().any(|w| w.pos == first && w.visited));
        assert_eq!(s.current_goal().map(|g| g != first), Some(true));
    }

    #[test]
    fn traversal_concatenates_legs() {
        let mut s = Session::new(small()).unwrap();
        let mut legs: Vec<Vec<Point>> = Vec::new();
        while let Some(o) = s.step() {
            if let StepOutcome::SegmentSucceeded(path) = o {
                legs.push(path);
            }
        }
        let expected_len: usize = legs.iter().map(|l| l.len()).sum::<usize>() - (legs.len() - 1);
        assert_eq!(s.traversal().len(), expected_len);
    }
}
