//! Map generation for pathstep: a seeded wall pass over an already linked
//! grid, and goal placement.

pub mod mapgen;

pub use mapgen::{Layout, MapGen, generate};
