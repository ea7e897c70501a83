//! Error types shared by table construction, walk generation and the I/O helpers.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    /// A distribution with no entries, i.e. a node with no out edges
    #[error("cannot build a distribution from zero entries")]
    EmptyDistribution,

    /// Weight or probability that is non-positive, non-finite, or doesn't normalize
    #[error("invalid weight: {0}")]
    InvalidWeight(String),

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("node '{0}' does not exist")]
    UnknownNode(String),

    #[error("walk generation was cancelled")]
    Cancelled,

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WalkError {
    pub(crate) fn parameter(name: &'static str, value: impl ToString) -> Self {
        WalkError::InvalidParameter { name, value: value.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, WalkError>;
