//! **pathstep-core**: grid model for the stepwise search engine.
//!
//! This crate provides the foundational types used across the *pathstep*
//! workspace: geometry primitives, the search [`Grid`] with its fixed 4-way
//! adjacency, the directional [`CostModel`], and run [`Config`]uration.

pub mod cell;
pub mod config;
pub mod cost;
pub mod geom;
pub mod grid;

pub use cell::Cell;
pub use config::{Config, ConfigError};
pub use cost::CostModel;
pub use geom::{Point, Range};
pub use grid::Grid;
