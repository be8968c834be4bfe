use thiserror::Error;

use crate::grid::Point;

/// Which dimension of a declared grid size disagreed with the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Rows,
    Columns,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Rows => write!(f, "row count"),
            Dimension::Columns => write!(f, "column count"),
        }
    }
}

/// Configuration errors. A search that finds no path is not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("grid size mismatch: {dimension} is {found}, expected {expected}")]
    SizeMismatch {
        dimension: Dimension,
        expected: usize,
        found: usize,
    },

    #[error("grid is empty")]
    EmptyGrid,

    #[error("unknown grid character {ch:?} at row {row}, column {col}")]
    UnknownCell { ch: char, row: usize, col: usize },

    #[error("2^k search needs 3 <= k <= {max}, got k = {k}")]
    InvalidK { k: u32, max: u32 },

    #[error("unsupported neighborhood size {0}, expected 4, 8 or 16")]
    InvalidNeighborhood(usize),

    #[error("{which} point {point} is outside the grid")]
    OutOfBounds { which: &'static str, point: Point },

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PlannerError {
    fn from(e: std::io::Error) -> Self {
        PlannerError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
