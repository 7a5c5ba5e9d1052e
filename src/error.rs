//! Error types for identicon creation.

use thiserror::Error;

/// Input-validation and I/O failures raised before (or after) the core runs.
#[derive(Error, Debug)]
pub enum IdenticonError {
    #[error("key is missing or shorter than 16 bytes (got {len})")]
    InvalidKey { len: usize },

    #[error("key is not an even-length hex string: {0:?}")]
    InvalidKeyHex(String),

    #[error("message cannot be absent")]
    InvalidMessage,

    #[error("grid size must be between 4 and 9 (got {0})")]
    InvalidGridSize(i32),

    #[error("invalid {name}: {value}")]
    InvalidDimension { name: &'static str, value: i64 },

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IdenticonError>;
