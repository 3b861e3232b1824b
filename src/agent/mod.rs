//! Agent runtime: configuration and the event loop.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Agent`] | Cloneable handle to the running agent |
//! | [`AgentOptions`] | Server endpoint and protocol configuration |
//!
//! # Example
//!
//! ```no_run
//! use livereload_agent::{Agent, AgentHooks, AgentOptions, Page, Result};
//!
//! #[derive(Clone, PartialEq)]
//! struct Tab(String);
//!
//! impl Page for Tab {
//!     fn url(&self) -> String {
//!         self.0.clone()
//!     }
//! }
//!
//! struct Reloader;
//!
//! impl AgentHooks<Tab> for Reloader {
//!     fn reload_page(&mut self, page: &Tab, data: &str) {
//!         println!("reload {} with {data}", page.0);
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let agent = Agent::spawn(AgentOptions::new(), Reloader)?;
//! agent.enable_page(Tab("http://localhost:8080/".into())).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Agent handle and event loop.
pub mod core;

/// Agent configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Agent;
pub use options::AgentOptions;
