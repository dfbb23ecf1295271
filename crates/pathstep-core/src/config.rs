//! Run configuration and its validation.

use std::fmt;

use crate::cost::CostModel;
use crate::geom::Point;

/// Setup options for one run. Every effect is deterministic given `seed`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub cols: i32,
    pub rows: i32,
    /// Independent per-cell wall probability, in `[0, 1]`.
    pub wall_probability: f64,
    /// Cost of a move along a row; also the heuristic's column weight.
    pub horizontal_cost: f64,
    /// Cost of a move along a column; also the heuristic's row weight.
    pub vertical_cost: f64,
    /// Number of randomly placed goals. The start is always `(0, 0)`.
    pub num_goals: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cols: 40,
            rows: 40,
            wall_probability: 0.2,
            horizontal_cost: 0.5,
            vertical_cost: 1.0,
            num_goals: 4,
            seed: 42,
        }
    }
}

impl Config {
    /// Set the grid dimensions (builder).
    pub fn with_size(mut self, cols: i32, rows: i32) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Set the wall probability (builder).
    pub fn with_wall_probability(mut self, p: f64) -> Self {
        self.wall_probability = p;
        self
    }

    /// Set both directional costs (builder).
    pub fn with_costs(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_cost = horizontal;
        self.vertical_cost = vertical;
        self
    }

    /// Set the goal count (builder).
    pub fn with_goals(mut self, n: usize) -> Self {
        self.num_goals = n;
        self
    }

    /// Set the random seed (builder).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The directional cost model described by this configuration.
    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.horizontal_cost, self.vertical_cost)
    }

    /// Number of cells a goal may be placed on: every cell with `i ≥ 1` and
    /// `j ≥ 1`.
    pub fn goal_slots(&self) -> usize {
        if self.cols < 2 || self.rows < 2 {
            return 0;
        }
        (self.cols as usize - 1) * (self.rows as usize - 1)
    }

    /// Check that a route can be built from this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols < 2 || self.rows < 2 {
            return Err(ConfigError::GridTooSmall {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(0.0..=1.0).contains(&self.wall_probability) {
            return Err(ConfigError::WallProbability(self.wall_probability));
        }
        self.validate_costs()?;
        if self.num_goals == 0 {
            return Err(ConfigError::NoGoals);
        }
        let slots = self.goal_slots();
        if self.num_goals > slots {
            return Err(ConfigError::TooManyGoals {
                goals: self.num_goals,
                slots,
            });
        }
        Ok(())
    }

    /// Check only the traversal costs; the size, wall and goal options do not
    /// apply to a prepared layout.
    pub fn validate_costs(&self) -> Result<(), ConfigError> {
        for cost in [self.horizontal_cost, self.vertical_cost] {
            if !cost.is_finite() || cost <= 0.0 {
                return Err(ConfigError::NonPositiveCost(cost));
            }
        }
        Ok(())
    }
}

/// Reasons a [`Config`] cannot produce a searchable route.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Fewer than two columns or rows: no cell is eligible for a goal.
    GridTooSmall { cols: i32, rows: i32 },
    /// Wall probability outside `[0, 1]` (or NaN).
    WallProbability(f64),
    /// A traversal cost that is zero, negative or not finite.
    NonPositiveCost(f64),
    /// The route needs at least one goal.
    NoGoals,
    /// More goals requested than there are distinct cells to hold them.
    TooManyGoals { goals: usize, slots: usize },
    /// The start or a goal of a prepared layout is a wall.
    BlockedEndpoint(Point),
    /// A goal of a prepared layout sits on the start.
    GoalAtStart(Point),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridTooSmall { cols, rows } => {
                write!(f, "config: grid {cols}x{rows} is too small, need at least 2x2")
            }
            Self::WallProbability(p) => {
                write!(f, "config: wall probability {p} is not in [0, 1]")
            }
            Self::NonPositiveCost(c) => {
                write!(f, "config: traversal cost {c} must be positive and finite")
            }
            Self::NoGoals => f.write_str("config: at least one goal is required"),
            Self::TooManyGoals { goals, slots } => {
                write!(f, "config: {goals} goals requested but only {slots} cells can hold one")
            }
            Self::BlockedEndpoint(p) => write!(f, "config: route endpoint {p} is a wall"),
            Self::GoalAtStart(p) => write!(f, "config: goal {p} is the start cell"),
        }
    }
}

impl std::error::Error for ConfigError {}
