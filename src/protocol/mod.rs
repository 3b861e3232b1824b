//! LiveReload wire protocol.
//!
//! All messages are plain text frames.
//!
//! | Message | Direction | Content |
//! |---------|-----------|---------|
//! | Page announce | Agent → Server | Absolute URL of the most recently enabled page |
//! | Handshake | Server → Agent | First message, contains `!!ver:<major>.<minor>[.<patch>]` |
//! | Reload | Server → Agent | Opaque payload, passed to every page unchanged |

// ============================================================================
// Submodules
// ============================================================================

/// Version token parsing and compatibility check.
pub mod version;

// ============================================================================
// Re-exports
// ============================================================================

pub use version::{
    DEFAULT_API_VERSION, ProtocolVersion, VersionCheck, check_version, find_version_token,
};
