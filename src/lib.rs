//! Any-angle pathfinding on 2-D grids.
//!
//! Paths connect grid points with straight segments in any direction. The
//! crate provides an exact visibility oracle, the optimal interval search
//! Anya, and the Theta* and 2^k A* families on top of one shared
//! best-first search engine.

pub mod algorithms;
pub mod comparison;
pub mod config;
pub mod error;
pub mod grid;
pub mod rational;
pub mod search;
pub mod statistics;
pub mod visibility;

pub use algorithms::{AlgorithmKind, PathfindingAlgorithm, Planner, PlannerOptions};
pub use error::{PlannerError, Result};
pub use grid::{Cell, Grid, Point};
pub use search::{DuplicatePolicy, SearchBudget, SearchResult};
pub use statistics::Stats;
