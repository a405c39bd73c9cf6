//! Error types for the MNIST GAN library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// A tensor did not have the shape a network expects
    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<i64>,
        actual: Vec<i64>,
    },

    /// Condition supplied to a vanilla network, or missing for a conditional one
    #[error("Condition error: {0}")]
    Condition(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error raised by libtorch
    #[error("Tensor error: {0}")]
    Tch(#[from] tch::TchError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Build a shape mismatch error from two tensor sizes
    pub fn shape(what: &'static str, expected: &[i64], actual: &[i64]) -> Self {
        Error::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Check if error comes from a tensor shape or conditioning violation
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Error::ShapeMismatch { .. } | Error::Condition(_))
    }
}
