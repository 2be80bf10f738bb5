use thiserror::Error;

/// Error type shared by every StrataML crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrataError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Index out of bounds: ({row}, {col}) for a {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Empty matrix")]
    EmptyMatrix,
}

pub type StrataResult<T> = Result<T, StrataError>;
