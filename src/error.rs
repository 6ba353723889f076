//! Error types shared by the instance readers and matrix constructors.
//!
//! The solvers never fail on a validated [`DistanceMatrix`](crate::matrix::DistanceMatrix);
//! everything that can go wrong happens while building one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TspError {
    #[error("distance matrix is empty")]
    EmptyMatrix,

    #[error("distance matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[error("negative weight {weight} between {from} and {to}")]
    NegativeWeight { from: usize, to: usize, weight: f64 },

    #[error("non-finite weight between {from} and {to}")]
    NonFiniteWeight { from: usize, to: usize },

    #[error("asymmetric weights between {from} and {to}: {forward:?} vs {backward:?}")]
    Asymmetric {
        from: usize,
        to: usize,
        forward: Option<f64>,
        backward: Option<f64>,
    },

    #[error("diagonal entry of vertex {vertex} is {weight}, expected 0")]
    NonZeroDiagonal { vertex: usize, weight: f64 },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unsupported {key}: {value}")]
    Unsupported { key: &'static str, value: String },

    #[error("expected {expected} {what}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TspError>;

impl TspError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        TspError::Parse { line, message: message.into() }
    }
}
