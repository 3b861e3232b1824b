//! LiveReload agent - keeps browser pages in sync with a local dev server.
//!
//! This library implements the browser-side half of the LiveReload
//! protocol: it tracks which pages want reloads, keeps a single WebSocket
//! connection to the LiveReload server while at least one page is
//! enabled, validates the server's protocol version and forwards reload
//! instructions to every enabled page.
//!
//! # Architecture
//!
//! - **PageRegistry**: ordered set of enabled pages
//! - **ConnectionManager**: connection state machine, version handshake and
//!   reload dispatch, driven by registry transitions
//! - **Agent**: tokio task that serializes host commands and transport
//!   events into the manager
//!
//! Key design principles:
//!
//! - The first enabled page opens the connection, the last disabled page closes it
//! - No reload is trusted before the server's `!!ver:` token matches
//! - Pages are notified most recently enabled first
//! - Rendering and alerts stay with the host, behind [`AgentHooks`]
//!
//! # Quick Start
//!
//! ```no_run
//! use livereload_agent::{Agent, AgentHooks, AgentOptions, Page, Result};
//!
//! #[derive(Clone, PartialEq)]
//! struct Tab {
//!     id: u32,
//!     url: String,
//! }
//!
//! impl Page for Tab {
//!     fn url(&self) -> String {
//!         self.url.clone()
//!     }
//! }
//!
//! struct Reloader;
//!
//! impl AgentHooks<Tab> for Reloader {
//!     fn reload_page(&mut self, tab: &Tab, data: &str) {
//!         println!("tab {}: {data}", tab.id);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let agent = Agent::spawn(AgentOptions::new(), Reloader)?;
//!
//!     let tab = Tab { id: 1, url: "http://localhost:8080/".into() };
//!     agent.toggle_page(tab.clone()).await?;
//!
//!     println!("{:?}", agent.status().await?);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`agent`] | [`Agent`] handle and [`AgentOptions`] |
//! | [`connection`] | [`ConnectionManager`] state machine |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | Version handshake |
//! | [`registry`] | [`Page`] trait and [`PageRegistry`] |
//! | [`transport`] | WebSocket transport |

// ============================================================================
// Modules
// ============================================================================

/// Agent runtime.
///
/// Use [`Agent::spawn()`] to start an agent.
pub mod agent;

/// Connection state machine.
pub mod connection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// LiveReload wire protocol.
pub mod protocol;

/// Enabled page tracking.
pub mod registry;

/// WebSocket transport layer.
///
/// Abstracts the socket behind [`Connector`](transport::Connector) and
/// [`Transport`](transport::Transport) so the state machine can run against
/// any event source.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Agent types
pub use agent::{Agent, AgentOptions};

// Connection types
pub use connection::{
    AgentHooks, AgentStatus, ConnectionManager, ConnectionState, DisconnectReason,
    HandshakeState,
};

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::{ProtocolVersion, VersionCheck};

// Registry types
pub use registry::{Page, PageRegistry};

// Transport types
pub use transport::{Connector, Transport, TransportEvent};
