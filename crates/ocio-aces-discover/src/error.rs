//! Error types for transform discovery and classification.
//!
//! This module provides error handling for:
//! - Transform identifier parsing (`ACEStransformID`, `CLFtransformID`)
//! - Transform file header extraction (CTL comments, CLF XML)
//! - Directory traversal

use std::path::PathBuf;
use thiserror::Error;

/// Result type for discovery operations.
pub type DiscoverResult<T> = Result<T, DiscoverError>;

/// Errors that can occur while discovering and classifying transforms.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The identifier string violates the identifier grammar.
    #[error("malformed transform identifier '{id}': {reason}")]
    MalformedIdentifier {
        /// Offending identifier string.
        id: String,
        /// What part of the grammar was violated.
        reason: String,
    },

    /// A transform file does not declare any identifier.
    #[error("transform file has no identifier: {path}")]
    MissingIdentifier {
        /// Path of the transform file.
        path: PathBuf,
    },

    /// I/O error reading a transform file.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// CLF document could not be parsed.
    #[error("XML error in {path}: {reason}")]
    Xml {
        /// Path of the CLF file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid description substitution pattern.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl DiscoverError {
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
