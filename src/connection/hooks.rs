//! Collaborators injected into the connection manager.

use tracing::warn;

/// Host callbacks invoked by the connection manager.
///
/// Only [`reload_page`](Self::reload_page) is required. Every callback
/// runs on the agent event loop and must not block.
pub trait AgentHooks<P>: Send {
    /// Applies a reload instruction to a page.
    ///
    /// `data` is passed through verbatim from the server.
    fn reload_page(&mut self, page: &P, data: &str);

    /// Called after a page was enabled.
    fn on_enable_page(&mut self, _page: &P) {}

    /// Called when a page stops receiving reloads.
    fn on_disable_page(&mut self, _page: &P) {}

    /// Presents a message to the user.
    fn alert(&mut self, message: &str) {
        warn!(alert = message, "User alert");
    }
}
