//! Error types for the LuxWS exporter.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use luxws_exporter::{Client, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     let nav = client.login("password").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Transport-fatal | [`Error::ConnectionClosed`], [`Error::Connection`], [`Error::NotRunning`], [`Error::WebSocket`], [`Error::Io`] |
//! | Transport-busy | [`Error::Busy`] |
//! | Deadline | [`Error::Timeout`] |
//! | Protocol | [`Error::ItemNotFound`], [`Error::Xml`] |
//! | Value parsing | [`Error::Measurement`], [`Error::DurationFormat`], [`Error::Timestamp`] |
//! | Configuration | [`Error::UnknownLanguage`] |
//! | Time check | [`Error::Http`], [`Error::MissingDateHeader`] |
//! | Exposition | [`Error::Prometheus`] |
//! | Aggregation | [`Error::Aggregate`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Another round trip is already in flight on this connection.
    ///
    /// The session stays usable; retry once the active round trip finishes.
    #[error("connection is busy")]
    Busy,

    /// The connection has been closed.
    ///
    /// Returned by every round trip after `close()`, and by a second
    /// `close()` call.
    #[error("connection closed")]
    ConnectionClosed,

    /// The receiver task exited without a specific error.
    #[error("receiver not running")]
    NotRunning,

    /// Connection-level failure.
    ///
    /// Returned when the dial or a socket operation fails.
    #[error("connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Operation deadline expired.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// A named node is absent from a navigation or content tree.
    ///
    /// Fatal to the issuing pipeline step only.
    #[error("item with name {name:?} not found")]
    ItemNotFound {
        /// The name that was looked up.
        name: String,
    },

    // ========================================================================
    // Value Parsing Errors
    // ========================================================================
    /// A measurement string does not match `<number>[ <unit>]`.
    #[error("unable to parse measurement {text:?}")]
    Measurement {
        /// The offending input.
        text: String,
    },

    /// A duration string does not match `H:MM[:SS]` or `<hours>h`.
    #[error("unable to parse duration {text:?}")]
    DurationFormat {
        /// The offending input.
        text: String,
    },

    /// A timestamp string does not match the locale format.
    #[error("unable to parse timestamp {text:?}")]
    Timestamp {
        /// The offending input.
        text: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Unknown controller interface language.
    #[error("unsupported language {id:?}")]
    UnknownLanguage {
        /// The requested language identifier.
        id: String,
    },

    // ========================================================================
    // HTTP Time Check Errors
    // ========================================================================
    /// The controller's HTTP response carried no `Date` header.
    #[error("HTTP header missing server time")]
    MissingDateHeader,

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // Aggregation
    // ========================================================================
    /// Multiple step errors from one scrape, none discarded.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Aggregate(Vec<Error>),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// XML decoding error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Metrics registry or encoding error.
    #[error("metrics error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates an item-not-found error.
    #[inline]
    pub fn item_not_found(name: impl Into<String>) -> Self {
        Self::ItemNotFound { name: name.into() }
    }

    /// Creates a measurement parse error.
    #[inline]
    pub fn measurement(text: impl Into<String>) -> Self {
        Self::Measurement { text: text.into() }
    }

    /// Creates a duration parse error.
    #[inline]
    pub fn duration_format(text: impl Into<String>) -> Self {
        Self::DurationFormat { text: text.into() }
    }

    /// Creates a timestamp parse error.
    #[inline]
    pub fn timestamp(text: impl Into<String>) -> Self {
        Self::Timestamp { text: text.into() }
    }

    /// Creates an unknown-language error.
    #[inline]
    pub fn unknown_language(id: impl Into<String>) -> Self {
        Self::UnknownLanguage { id: id.into() }
    }

    /// Combines step errors into a single error.
    ///
    /// Returns `None` when the list is empty and unwraps a single error
    /// rather than nesting it.
    pub fn aggregate(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate(errors)),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the session is unusable after this error.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::NotRunning | Self::Connection { .. } | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a value-parse error.
    #[inline]
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Measurement { .. } | Self::DurationFormat { .. } | Self::Timestamp { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
