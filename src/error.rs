//! Error types for the LiveReload agent.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use livereload_agent::{Error, Result};
//!
//! async fn example(agent: &Agent<MyPage>, page: MyPage) -> Result<()> {
//!     agent.enable_page(page).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Usage / invariant | [`Error::AlreadyEnabled`], [`Error::AlreadyConnected`], [`Error::NoActivePage`], [`Error::NoPagesRegistered`] |
//! | Protocol | [`Error::VersionMismatch`] |
//! | Connection | [`Error::CannotConnect`], [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Configuration | [`Error::Config`], [`Error::Url`] |
//! | External | [`Error::Json`], [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Usage / Invariant Errors
    // ========================================================================
    /// Page is already registered.
    ///
    /// Returned by `enable_page` when the page is already enabled.
    #[error("Page already enabled: {url}")]
    AlreadyEnabled {
        /// URL of the page at the time of the call.
        url: String,
    },

    /// A transport handle already exists.
    ///
    /// Returned when a new connection is requested while the previous
    /// one has not delivered its close event yet.
    #[error("WebSocket already opened: {endpoint}")]
    AlreadyConnected {
        /// Endpoint of the existing connection.
        endpoint: String,
    },

    /// Connection opened with no page to announce.
    #[error("No active page")]
    NoActivePage,

    /// Reload data arrived while no page is registered.
    #[error("No pages")]
    NoPagesRegistered,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Server and client protocol versions are incompatible.
    ///
    /// `server` is `None` when the server sent no version token at all.
    #[error("Version mismatch: client={client}, server={}", .server.as_deref().unwrap_or("unknown"))]
    VersionMismatch {
        /// Client API version.
        client: String,
        /// Version token reported by the server.
        server: Option<String>,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// The LiveReload server could not be reached.
    ///
    /// Its display text is the alert shown when a connection never opens.
    #[error("Cannot connect to LiveReload server:\n{endpoint}")]
    CannotConnect {
        /// Endpoint that was tried.
        endpoint: String,
    },

    /// Transport could not be created.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Transport is already closed.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Endpoint URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Agent event loop is gone.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an already enabled error.
    #[inline]
    pub fn already_enabled(url: impl Into<String>) -> Self {
        Self::AlreadyEnabled { url: url.into() }
    }

    /// Creates an already connected error.
    #[inline]
    pub fn already_connected(endpoint: impl Into<String>) -> Self {
        Self::AlreadyConnected {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a version mismatch error.
    #[inline]
    pub fn version_mismatch(client: impl Into<String>, server: Option<String>) -> Self {
        Self::VersionMismatch {
            client: client.into(),
            server,
        }
    }

    /// Creates a cannot connect error.
    #[inline]
    pub fn cannot_connect(endpoint: impl Into<String>) -> Self {
        Self::CannotConnect {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the public contract or an internal invariant was violated.
    ///
    /// These indicate a bug in the caller or the agent and never succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyEnabled { .. }
                | Self::AlreadyConnected { .. }
                | Self::NoActivePage
                | Self::NoPagesRegistered
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::CannotConnect { .. }
                | Self::Connection { .. }
                | Self::ConnectionClosed
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on a later manual attempt.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CannotConnect { .. } | Self::Connection { .. } | Self::ConnectionClosed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::cannot_connect("ws://localhost:35729/websocket");
        assert_eq!(
            err.to_string(),
            "Cannot connect to LiveReload server:\nws://localhost:35729/websocket"
        );
    }

    #[test]
    fn test_version_mismatch_display() {
        let err = Error::version_mismatch("1.6", Some("1.7".into()));
        assert_eq!(err.to_string(), "Version mismatch: client=1.6, server=1.7");

        let legacy = Error::version_mismatch("1.6", None);
        assert_eq!(legacy.to_string(), "Version mismatch: client=1.6, server=unknown");
    }

    #[test]
    fn test_is_usage_error() {
        assert!(Error::already_enabled("http://a").is_usage_error());
        assert!(Error::already_connected("ws://x").is_usage_error());
        assert!(Error::NoActivePage.is_usage_error());
        assert!(Error::NoPagesRegistered.is_usage_error());
        assert!(!Error::cannot_connect("ws://x").is_usage_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::cannot_connect("ws://x").is_connection_error());
        assert!(Error::connection("no runtime").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("bad").is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::cannot_connect("ws://x").is_recoverable());
        assert!(!Error::NoPagesRegistered.is_recoverable());
        assert!(!Error::version_mismatch("1.6", None).is_recoverable());
    }

    #[test]
    fn test_from_url_error() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
