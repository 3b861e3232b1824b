//! Connection lifecycle and reload dispatch.
//!
//! # State Machine
//!
//! ```text
//! Disconnected ──enable_page──► Connecting ──open──► HandshakePending
//!      ▲                            │                      │ !!ver ok
//!      │                            │                      ▼
//!      └──────────close─────────────┴──── Closing ◄─── Active
//! ```
//!
//! Any state returns to `Disconnected` on the transport close event. The
//! [`DisconnectReason`] recorded beforehand decides whether the user is
//! alerted.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `hooks` | Host callbacks |
//! | `manager` | The state machine |
//! | `state` | State enums and status snapshot |

// ============================================================================
// Submodules
// ============================================================================

/// Host callbacks.
pub mod hooks;

/// Connection state machine.
pub mod manager;

/// State enums and status snapshot.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use hooks::AgentHooks;
pub use manager::ConnectionManager;
pub use state::{AgentStatus, ConnectionState, DisconnectReason, HandshakeState};
