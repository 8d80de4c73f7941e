use thiserror::Error;

// Errors raised by the terrain algorithms themselves.
// File and format problems live in the storage crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("cannot allocate a buffer of {cells} cells")]
    AllocationFailure { cells: usize },
}

impl TerrainError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        TerrainError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
