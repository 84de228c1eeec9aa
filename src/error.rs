//! Error types for labelplot operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or rendering a plot.
///
/// Every error surfaces immediately: nothing is partially rendered when an
/// operation fails.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Mutually exclusive or malformed options.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The array's rank or coordinate layout cannot be drawn with the
    /// requested plot kind.
    #[error("Cannot draw {kind} for a rank-{rank} array: {reason}")]
    Shape {
        /// Requested plot kind.
        kind: String,
        /// Effective rank of the array.
        rank: usize,
        /// Why the combination is unsupported.
        reason: String,
    },

    /// No finite values to infer a scale or range from.
    #[error("Empty data: no finite values")]
    EmptyData,

    /// Invalid dimensions for framebuffer or axes.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Data length does not match the declared shape or coordinate extent.
    #[error("Data length mismatch: expected {expected} elements, got {actual}")]
    DataLengthMismatch {
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },

    /// A dimension or coordinate name that the array does not carry.
    #[error("Unknown dimension or coordinate: {0}")]
    UnknownDimension(String),

    /// Scale domain error (e.g., equal bounds).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// YAML option file could not be parsed.
    #[cfg(feature = "config")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] error.
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Shorthand for a [`Error::Shape`] error.
    pub(crate) fn shape(kind: impl ToString, rank: usize, reason: impl Into<String>) -> Self {
        Self::Shape {
            kind: kind.to_string(),
            rank,
            reason: reason.into(),
        }
    }
}
