//! Watches a single page and prints every reload instruction.
//!
//! Start a LiveReload server, then run:
//!
//! ```bash
//! cargo run --example watch_page -- http://localhost:8080/
//! RUST_LOG=debug cargo run --example watch_page -- http://localhost:8080/ 127.0.0.1
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use livereload_agent::{Agent, AgentHooks, AgentOptions, Page};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Page & Hooks
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct WatchedPage {
    url: String,
}

impl Page for WatchedPage {
    fn url(&self) -> String {
        self.url.clone()
    }
}

struct PrintHooks;

impl AgentHooks<WatchedPage> for PrintHooks {
    fn reload_page(&mut self, page: &WatchedPage, data: &str) {
        info!(page = %page.url, data, "Reload");
    }

    fn on_enable_page(&mut self, page: &WatchedPage) {
        info!(page = %page.url, "Enabled");
    }

    fn on_disable_page(&mut self, page: &WatchedPage) {
        info!(page = %page.url, "Disabled");
    }

    fn alert(&mut self, message: &str) {
        warn!("{message}");
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "http://localhost:8080/".to_string());

    let mut options = AgentOptions::new();
    if let Some(host) = args.next() {
        options = options.with_host(host);
    }

    info!(endpoint = %options.endpoint()?, "Starting agent");

    let agent = Agent::spawn(options, PrintHooks)?;
    agent.enable_page(WatchedPage { url }).await?;

    tokio::signal::ctrl_c().await?;

    agent.disconnect().await?;
    agent.shutdown();

    // The loop exits once the close event has disabled every page.
    let stopped = tokio::time::timeout(Duration::from_secs(5), async {
        while agent.status().await.is_ok() {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    if stopped.is_err() {
        warn!("Agent did not stop within 5s");
    }

    Ok(())
}
