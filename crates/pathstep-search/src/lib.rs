//! Stepwise, multi-goal, cost-weighted grid search.
//!
//! The search is driven one expansion at a time so a caller can animate or
//! pause it:
//!
//! - [`Heuristic`] / [`AxisManhattan`] estimate the remaining cost,
//! - [`SearchEngine`] runs one start→goal segment, one [`SearchEngine::step`]
//!   per call,
//! - [`TargetSequencer`] picks the next goal greedily and reseeds the engine,
//! - [`Session`] ties grid, engine and sequencer together behind the
//!   start / pause / restart / step control surface.

mod engine;
mod error;
mod heuristic;
mod sequencer;
mod session;
mod state;

pub use engine::{NodeView, SearchEngine, SearchStatus, StepOutcome};
pub use error::Error;
pub use heuristic::{AxisManhattan, Heuristic, manhattan};
pub use sequencer::{Leg, TargetSequencer, Waypoint};
pub use session::{CellKind, Control, RouteStatus, Session};
