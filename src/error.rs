//! Error types and handling infrastructure for zseq.
//!
//! This module provides a centralized error handling system using `thiserror`
//! for custom error types, with constructor helpers and a crate-wide `Result`
//! alias used by every other module.
//!
//! Note that a missing external decompressor is *not* represented here:
//! executable resolution reports absence as `Option::None`, because callers
//! use it to feature-detect optional acceleration paths.

use thiserror::Error;

/// The main error type for zseq operations.
///
/// This enum covers all error conditions that can occur while opening,
/// reading, writing, or tearing down a stream.
#[derive(Error, Debug)]
pub enum ZseqError {
    /// Caller passed an unsupported value (mode string, empty argv, ...).
    /// Raised synchronously, before any resource is touched.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The external decompressor process could not be started.
    #[error("Failed to start external process: {message}")]
    Spawn {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File system related errors (open, read, write, metadata).
    #[error("File operation failed: {message}")]
    File {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A read or write was attempted on a stream after `close()`.
    ///
    /// Distinct from end-of-stream: an empty read result is a valid outcome
    /// mid-lifecycle, while this variant signals a programming error.
    #[error("Stream is closed")]
    StreamClosed,

    /// Requested functionality that is deliberately unsupported
    /// (compressing through an external process).
    #[error("Not implemented: {message}")]
    NotImplemented { message: String },

    /// Malformed byte sequence encountered while decoding text-mode data
    /// under the strict error policy.
    #[error("Malformed {encoding} byte sequence in stream")]
    Decode { encoding: &'static str },
}

/// Standard Result type for zseq operations.
pub type Result<T> = std::result::Result<T, ZseqError>;

impl ZseqError {
    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a Spawn error from an io::Error with additional context
    pub fn spawn(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            message: message.into(),
            source,
        }
    }

    /// Create a File error from an io::Error with additional context
    pub fn file(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::File {
            message: message.into(),
            source,
        }
    }

    /// Create a NotImplemented error with a descriptive message
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented {
            message: message.into(),
        }
    }
}

// Automatic conversion from io::Error for `?` on stream operations
impl From<std::io::Error> for ZseqError {
    fn from(err: std::io::Error) -> Self {
        Self::File {
            message: "IO operation failed".to_string(),
            source: err,
        }
    }
}
