//! Error type for the transport layer.
//!
//! # Design
//! Every failure that prevents an HTTP exchange from completing (DNS,
//! connection refused, timeout, malformed URI, an unregistered response
//! class) surfaces as one `TransportError`. A completed exchange with a
//! non-OK status is never an error here; it is an `Outcome::Error` value.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, TransportError>;

/// A transport-level failure.
///
/// Keeps the message and numeric code of whatever raised it, and chains the
/// original error as `source()`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    code: i32,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Wrap `source`, keeping its message and the given code.
    pub fn wrap(source: impl Into<BoxError>, code: i32) -> Self {
        let source = source.into();
        Self {
            message: source.to_string(),
            code,
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Numeric code of the original failure, 0 when it had none.
    pub fn code(&self) -> i32 {
        self.code
    }
}
