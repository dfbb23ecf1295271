//! Search-layer error type.

use std::fmt;

use pathstep_core::{ConfigError, Point};

/// Errors surfaced by the search layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The configuration cannot produce a searchable route. Raised at setup;
    /// no search is started.
    ConfigurationInvalid(ConfigError),
    /// The open set ran dry before the goal of the current leg was reached.
    SegmentUnreachable { from: Point, to: Point },
    /// A route endpoint lies outside the grid.
    OutOfBounds(Point),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationInvalid(e) => write!(f, "invalid configuration: {e}"),
            Self::SegmentUnreachable { from, to } => {
                write!(f, "no path from {from} to {to}")
            }
            Self::OutOfBounds(p) => write!(f, "point {p} is outside the grid"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigurationInvalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::ConfigurationInvalid(e)
    }
}
