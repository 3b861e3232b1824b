//! Agent configuration.
//!
//! Describes where the LiveReload server listens and which protocol
//! version this agent speaks.
//!
//! # Example
//!
//! ```ignore
//! use livereload_agent::AgentOptions;
//!
//! let options = AgentOptions::new()
//!     .with_host("127.0.0.1")
//!     .with_port(35729);
//!
//! assert_eq!(options.endpoint()?.as_str(), "ws://127.0.0.1:35729/websocket");
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{DEFAULT_API_VERSION, ProtocolVersion};

// ============================================================================
// Constants
// ============================================================================

/// Port the LiveReload server listens on.
pub const DEFAULT_PORT: u16 = 35729;

/// WebSocket path on the server.
pub const DEFAULT_PATH: &str = "/websocket";

/// Host the server is reached at on this platform.
///
/// `localhost` is unreliable on Linux and `0.0.0.0` does not work on Windows.
#[must_use]
pub const fn default_host() -> &'static str {
    if cfg!(target_os = "linux") {
        "0.0.0.0"
    } else {
        "localhost"
    }
}

// ============================================================================
// AgentOptions
// ============================================================================

/// Server endpoint and protocol configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentOptions {
    /// Server host.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// WebSocket path, starting with `/`.
    pub path: String,

    /// Protocol version this agent speaks.
    pub api_version: String,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            host: default_host().to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl AgentOptions {
    /// Creates options with the platform defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl AgentOptions {
    /// Sets the server host.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the WebSocket path.
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the protocol version.
    #[inline]
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl AgentOptions {
    /// Returns the server endpoint, `ws://<host>:<port><path>`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the path does not start with `/`
    /// - [`Error::Url`] if the result is not a valid URL
    pub fn endpoint(&self) -> Result<Url> {
        if !self.path.starts_with('/') {
            return Err(Error::config(format!(
                "path must start with '/': {}",
                self.path
            )));
        }
        Ok(Url::parse(&format!(
            "ws://{}:{}{}",
            self.host, self.port, self.path
        ))?)
    }

    /// Parses the configured protocol version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the version is not `major.minor[.patch]`.
    pub fn protocol_version(&self) -> Result<ProtocolVersion> {
        self.api_version.parse()
    }
}

// ============================================================================
// Tests
// ============================================================================
