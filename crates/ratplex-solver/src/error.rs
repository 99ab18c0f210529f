use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Basic variables do not form a basis: {0}")]
    InvalidBasis(String),
    #[error("Iteration limit of {limit} pivots exceeded")]
    IterationLimitExceeded { limit: usize },
    #[error("Unknown objective sense: {0}")]
    UnknownSense(String),
    #[error("Unknown constraint operator: {0}")]
    UnknownOperator(String),
}
