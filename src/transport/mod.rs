//! WebSocket transport layer.
//!
//! This module separates the connection state machine from the socket
//! itself. A [`Connector`] opens a [`Transport`]; the transport reports
//! everything that happens to it as [`TransportEvent`]s on a channel that
//! the agent event loop drains one at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Agent (Rust)   │                              │  LiveReload     │
//! │                 │         WebSocket            │  server         │
//! │  WsConnector    │─────────────────────────────►│                 │
//! │  → WsTransport  │   ws://host:35729/websocket  │                 │
//! │                 │◄─────────────────────────────│                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Event Contract
//!
//! 1. `Opened` at most once, when the socket becomes usable
//! 2. `Message` for every inbound text frame
//! 3. `Error` is informational only and is always followed by `Closed`
//! 4. `Closed` exactly once, as the last event of every connection
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | tokio-tungstenite client transport |

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use url::Url;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// tokio-tungstenite client transport.
pub mod websocket;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::{WsConnector, WsTransport};

// ============================================================================
// Types
// ============================================================================

/// Sender half of the transport event channel.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Receiver half of the transport event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Something that happened to the live transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Socket is open and can send.
    Opened,
    /// Inbound text message.
    Message(String),
    /// Transport-level error. A `Closed` event always follows.
    Error(String),
    /// Socket is gone, whichever side closed it.
    Closed,
}

// ============================================================================
// Traits
// ============================================================================

/// A single live connection to the server.
pub trait Transport: Send {
    /// Returns the URL this transport connects to.
    fn url(&self) -> &str;

    /// Queues a text message for sending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed)
    /// if the socket task is gone.
    fn send(&self, text: String) -> Result<()>;

    /// Requests the socket to close.
    ///
    /// Closing is asynchronous: the `Closed` event arrives later.
    fn close(&self);
}

/// Opens transports to an endpoint.
pub trait Connector: Send {
    /// Starts opening a transport.
    ///
    /// Returns as soon as the attempt is underway; the outcome is reported
    /// through the event channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot even be started.
    fn open(&mut self, endpoint: &Url) -> Result<Box<dyn Transport>>;
}
