//! Greedy ordering of a route's goals.

use log::debug;
use pathstep_core::{Grid, Point};

use crate::engine::SearchEngine;
use crate::error::Error;
use crate::heuristic::Heuristic;

/// A goal of the route and whether it has been reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub pos: Point,
    pub visited: bool,
}

/// One start→goal leg handed to the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub from: Point,
    pub to: Point,
}

/// Orders the goals of a route and reseeds the engine between legs.
///
/// The next goal is always the unvisited one with the smallest heuristic
/// estimate from where the last leg ended, ties going to the goal declared
/// first. This is a greedy nearest-neighbour tour, not an optimal one, and a
/// goal is never selected again once it has been visited.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetSequencer {
    start: Point,
    goals: Vec<Waypoint>,
    current: Option<usize>,
    complete: bool,
}

impl TargetSequencer {
    /// Route from `start` through `goals`, kept in declaration order.
    pub fn new(start: Point, goals: impl IntoIterator<Item = Point>) -> Self {
        Self {
            start,
            goals: goals
                .into_iter()
                .map(|pos| Waypoint {
                    pos,
                    visited: false,
                })
                .collect(),
            current: None,
            complete: false,
        }
    }

    /// Pick the goal nearest to the start and seed the first leg.
    ///
    /// Returns `None` (and marks the route complete) when there are no
    /// unvisited goals.
    pub fn initial<H: Heuristic>(
        &mut self,
        engine: &mut SearchEngine<H>,
        grid: &Grid,
    ) -> Result<Option<Leg>, Error> {
        self.begin_leg(self.start, engine, grid)
    }

    /// Mark `reached` visited and seed the leg to the nearest remaining goal.
    ///
    /// Returns `None` once every goal has been visited.
    pub fn advance<H: Heuristic>(
        &mut self,
        reached: Point,
        engine: &mut SearchEngine<H>,
        grid: &Grid,
    ) -> Result<Option<Leg>, Error> {
        for w in self.goals.iter_mut().filter(|w| w.pos == reached) {
            w.visited = true;
        }
        self.begin_leg(reached, engine, grid)
    }

    fn begin_leg<H: Heuristic>(
        &mut self,
        from: Point,
        engine: &mut SearchEngine<H>,
        grid: &Grid,
    ) -> Result<Option<Leg>, Error> {
        let Some(next) = self.nearest(from, engine.heuristic()) else {
            self.current = None;
            self.complete = true;
            debug!("route complete: all {} goals visited", self.goals.len());
            return Ok(None);
        };
        let leg = Leg {
            from,
            to: self.goals[next].pos,
        };
        engine.seed(grid, leg.from, leg.to)?;
        self.current = Some(next);
        Ok(Some(leg))
    }

    /// Index of the unvisited goal closest to `from`; the first declared wins
    /// a tie.
    fn nearest<H: Heuristic>(&self, from: Point, heuristic: &H) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, w) in self.goals.iter().enumerate() {
            if w.visited {
                continue;
            }
            let d = heuristic.estimate(from, w.pos);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Clear every visited flag and forget the current leg.
    pub fn reset(&mut self) {
        for w in &mut self.goals {
            w.visited = false;
        }
        self.current = None;
        self.complete = false;
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Goals in declaration order.
    pub fn goals(&self) -> &[Waypoint] {
        &self.goals
    }

    /// The goal of the leg in progress.
    pub fn current_goal(&self) -> Option<Point> {
        self.current.map(|i| self.goals[i].pos)
    }

    /// Whether a route position is the start or one of the goals.
    pub fn is_node(&self, p: Point) -> bool {
        p == self.start || self.goals.iter().any(|w| w.pos == p)
    }

    /// Whether every goal has been visited.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
