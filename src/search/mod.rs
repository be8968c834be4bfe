//! Search skeleton shared by every algorithm: frontier, engine loop and
//! path reconstruction.

pub mod engine;
pub mod frontier;
pub mod path;

pub use engine::{Node, Refinement, SearchBudget, SearchEngine, SearchResult, SuccessorGenerator};
pub use frontier::{DuplicatePolicy, NodeId, Priority, SearchFrontier};
pub use path::{path_length, reconstruct, Path};
