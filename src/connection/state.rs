//! Connection state enums and status snapshot.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle of the single server connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    /// No transport exists.
    #[default]
    Disconnected,
    /// Transport created, waiting for it to open.
    Connecting,
    /// Open, waiting for the server's version token.
    HandshakePending,
    /// Version validated; inbound messages are reloads.
    Active,
    /// Close requested, waiting for the close event.
    Closing,
}

impl ConnectionState {
    /// Returns `true` if the socket is open and can send.
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::HandshakePending | Self::Active)
    }
}

// ============================================================================
// HandshakeState
// ============================================================================

/// Progress of the version handshake on the current connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandshakeState {
    /// Socket not open yet.
    #[default]
    NotStarted,
    /// Waiting for the first inbound message.
    AwaitingVersion,
    /// Versions matched.
    Validated,
}

// ============================================================================
// DisconnectReason
// ============================================================================

/// Cause recorded ahead of a close, read by the close handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisconnectReason {
    /// Nothing recorded yet.
    #[default]
    Unexpected,
    /// Transport never reached open.
    CannotConnect,
    /// Handshake rejected the server version.
    VersionMismatch,
    /// Closed on request.
    Manual,
    /// Open connection dropped.
    Broken,
}

impl DisconnectReason {
    /// Returns the kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unexpected => "unexpected",
            Self::CannotConnect => "cannot-connect",
            Self::VersionMismatch => "version-mismatch",
            Self::Manual => "manual",
            Self::Broken => "broken",
        }
    }

    /// Returns `true` if the close handler alerts for this reason.
    ///
    /// Only connection failures alert. Version mismatches alert at
    /// detection time instead.
    #[inline]
    #[must_use]
    pub const fn alerts_on_close(self) -> bool {
        matches!(self, Self::CannotConnect)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// AgentStatus
// ============================================================================

/// Point-in-time view of the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    /// Connection lifecycle state.
    pub state: ConnectionState,
    /// Handshake progress.
    pub handshake: HandshakeState,
    /// Last recorded disconnect reason.
    pub disconnect_reason: DisconnectReason,
    /// Number of enabled pages.
    pub pages: usize,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_open() {
        assert!(!ConnectionState::Disconnected.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(ConnectionState::HandshakePending.is_open());
        assert!(ConnectionState::Active.is_open());
        assert!(!ConnectionState::Closing.is_open());
    }

    #[test]
    fn test_only_cannot_connect_alerts_on_close() {
        assert!(DisconnectReason::CannotConnect.alerts_on_close());
        assert!(!DisconnectReason::Manual.alerts_on_close());
        assert!(!DisconnectReason::Broken.alerts_on_close());
        assert!(!DisconnectReason::VersionMismatch.alerts_on_close());
        assert!(!DisconnectReason::Unexpected.alerts_on_close());
    }

    #[test]
    fn test_status_serialization() {
        let status = AgentStatus {
            state: ConnectionState::HandshakePending,
            handshake: HandshakeState::AwaitingVersion,
            disconnect_reason: DisconnectReason::CannotConnect,
            pages: 2,
        };
        let json = serde_json::to_string(&status).expect("serialize");

        assert!(json.contains(r#""state":"handshake-pending""#));
        assert!(json.contains(r#""disconnectReason":"cannot-connect""#));
        assert!(json.contains(r#""pages":2"#));
    }
}
