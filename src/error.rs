//! Error types for the request layer.
//!
//! Lower-level transport failures are always forwarded upward unmodified;
//! this crate only adds abort-on-timeout and redirect-chaining behavior on
//! top of them. A timed-out operation is aborted and then reports through
//! the transport's normal error path, so callers observe `Aborted` rather
//! than a distinct timeout kind.

use std::io;

/// A `Result` alias where the `Err` case is [`HttpError`].
pub type Result<T> = std::result::Result<T, HttpError>;

/// Errors surfaced by the request layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    /// The request could not be constructed or rewritten before dispatch.
    #[error("builder error: {0}")]
    Builder(String),

    /// An error reported by the underlying transport, forwarded verbatim.
    #[error("transport error {code}: {message}")]
    Transport {
        /// Transport-specific error code.
        code: i32,
        /// Human-readable description from the transport.
        message: String,
    },

    /// The operation was aborted, either externally or by a deadline.
    #[error("operation aborted")]
    Aborted,

    /// A redirect target could not be followed.
    #[error("error following redirect: {0}")]
    Redirect(String),

    /// The cache store failed at the I/O level. Cache misses are not
    /// errors; they are represented as `Ok(None)` read results.
    #[error("cache error: {0}")]
    Cache(String),
}

impl HttpError {
    /// Builder-phase error with a message.
    pub fn builder<T: Into<String>>(message: T) -> Self {
        HttpError::Builder(message.into())
    }

    /// Transport error with a code and message.
    pub fn transport<T: Into<String>>(code: i32, message: T) -> Self {
        HttpError::Transport {
            code,
            message: message.into(),
        }
    }

    /// Redirect-following error with a message.
    pub fn redirect<T: Into<String>>(message: T) -> Self {
        HttpError::Redirect(message.into())
    }

    /// Wrap a cache store I/O failure.
    pub fn cache(err: io::Error) -> Self {
        HttpError::Cache(err.to_string())
    }

    /// Whether this error came from an abort.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, HttpError::Aborted)
    }
}
