//! Agent handle and event loop.
//!
//! The agent owns one [`ConnectionManager`] inside a spawned tokio task.
//! Page operations from the host and events from the transport are both
//! funneled into that task and applied one at a time, so the manager never
//! sees overlapping callbacks.
//!
//! # Event Loop
//!
//! ```text
//! Agent handle ──AgentCommand──┐
//!                              ├──► select! ──► ConnectionManager
//! Transport    ──TransportEvent┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::connection::{AgentHooks, AgentStatus, ConnectionManager};
use crate::error::{Error, Result};
use crate::registry::Page;
use crate::transport::{Connector, EventReceiver, EventSender, TransportEvent, WsConnector};

use super::options::AgentOptions;

// ============================================================================
// AgentCommand
// ============================================================================

/// Internal commands for the event loop.
enum AgentCommand<P> {
    Enable {
        page: P,
        reply: oneshot::Sender<Result<()>>,
    },
    Disable {
        page: P,
        reply: oneshot::Sender<()>,
    },
    Toggle {
        page: P,
        reply: oneshot::Sender<Result<()>>,
    },
    DisableAll {
        reply: oneshot::Sender<()>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    Status {
        reply: oneshot::Sender<AgentStatus>,
    },
    /// Disconnect and stop the event loop.
    Shutdown,
}

// ============================================================================
// Agent
// ============================================================================

/// Handle to a running LiveReload agent.
///
/// Cloning the handle is cheap; all clones talk to the same event loop.
/// When the last handle is dropped the agent disconnects and stops.
pub struct Agent<P: Page> {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<AgentCommand<P>>,
    /// Status mirror (updated by the event loop after every step).
    status: Arc<Mutex<AgentStatus>>,
}

impl<P: Page> Clone for Agent<P> {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            status: Arc::clone(&self.status),
        }
    }
}

impl<P: Page> Agent<P> {
    /// Starts an agent that connects over WebSocket.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::Url`] if the options are invalid.
    pub fn spawn(options: AgentOptions, hooks: impl AgentHooks<P> + 'static) -> Result<Self> {
        Self::spawn_with(options, hooks, WsConnector::new)
    }

    /// Starts an agent with a custom connector.
    ///
    /// `make_connector` receives the channel the connector must report
    /// transport events to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::Url`] if the options are invalid.
    pub fn spawn_with<C, F>(
        options: AgentOptions,
        hooks: impl AgentHooks<P> + 'static,
        make_connector: F,
    ) -> Result<Self>
    where
        C: Connector + 'static,
        F: FnOnce(EventSender) -> C,
    {
        let endpoint = options.endpoint()?;
        let api_version = options.protocol_version()?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let manager = ConnectionManager::new(endpoint, api_version, make_connector(event_tx), hooks);

        let status = Arc::new(Mutex::new(manager.status()));

        debug!(url = %manager.endpoint(), version = %api_version, "Agent started");

        tokio::spawn(run_event_loop(
            manager,
            command_rx,
            event_rx,
            Arc::clone(&status),
        ));

        Ok(Self { command_tx, status })
    }

    /// Enables reloads for a page, connecting if needed.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyEnabled`] if the page is already enabled
    /// - [`Error::AlreadyConnected`] if the previous connection is still closing
    /// - [`Error::Connection`] if the connection could not be started
    /// - [`Error::ConnectionClosed`] if the agent has stopped
    pub async fn enable_page(&self, page: P) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(AgentCommand::Enable { page, reply })?;
        rx.await?
    }

    /// Disables reloads for a page. Disabling the last page disconnects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the agent has stopped.
    pub async fn disable_page(&self, page: P) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(AgentCommand::Disable { page, reply })?;
        Ok(rx.await?)
    }

    /// Enables the page if disabled, disables it otherwise.
    ///
    /// # Errors
    ///
    /// See [`enable_page`](Self::enable_page).
    pub async fn toggle_page(&self, page: P) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(AgentCommand::Toggle { page, reply })?;
        rx.await?
    }

    /// Disables every page without touching the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the agent has stopped.
    pub async fn disable_all_pages(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(AgentCommand::DisableAll { reply })?;
        Ok(rx.await?)
    }

    /// Closes the connection. No alert is raised.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the agent has stopped.
    pub async fn disconnect(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(AgentCommand::Disconnect { reply })?;
        Ok(rx.await?)
    }

    /// Returns a snapshot of the connection state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the agent has stopped.
    pub async fn status(&self) -> Result<AgentStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(AgentCommand::Status { reply })?;
        Ok(rx.await?)
    }

    /// Returns the status as of the last processed command or event.
    ///
    /// Does not wait for the event loop, so it may lag behind
    /// [`status`](Self::status).
    #[inline]
    #[must_use]
    pub fn current_status(&self) -> AgentStatus {
        *self.status.lock()
    }

    /// Disconnects and stops the event loop.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(AgentCommand::Shutdown);
    }

    fn send(&self, command: AgentCommand<P>) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::ConnectionClosed)
    }
}

// ============================================================================
// Event Loop
// ============================================================================

async fn run_event_loop<P: Page>(
    mut manager: ConnectionManager<P>,
    mut command_rx: mpsc::UnboundedReceiver<AgentCommand<P>>,
    mut event_rx: EventReceiver,
    status: Arc<Mutex<AgentStatus>>,
) {
    loop {
        tokio::select! {
            // Page operations from the host
            command = command_rx.recv() => {
                match command {
                    Some(AgentCommand::Shutdown) | None => {
                        debug!("Shutdown requested");
                        manager.disconnect();
                        break;
                    }
                    Some(command) => handle_command(&mut manager, command),
                }
                *status.lock() = manager.status();
            }

            // Transport events
            event = event_rx.recv() => {
                match event {
                    Some(event) => apply_event(&mut manager, event),
                    None => {
                        debug!("Event channel closed");
                        break;
                    }
                }
                *status.lock() = manager.status();
            }
        }
    }

    // Let the closing transport report back so pages see their disable hook
    while manager.has_transport() {
        match event_rx.recv().await {
            Some(event) => apply_event(&mut manager, event),
            None => break,
        }
    }
    *status.lock() = manager.status();

    debug!("Event loop terminated");
}

fn handle_command<P: Page>(manager: &mut ConnectionManager<P>, command: AgentCommand<P>) {
    match command {
        AgentCommand::Enable { page, reply } => {
            let _ = reply.send(manager.enable_page(page));
        }
        AgentCommand::Disable { page, reply } => {
            manager.disable_page(&page);
            let _ = reply.send(());
        }
        AgentCommand::Toggle { page, reply } => {
            let _ = reply.send(manager.toggle_page(page));
        }
        AgentCommand::DisableAll { reply } => {
            manager.disable_all_pages();
            let _ = reply.send(());
        }
        AgentCommand::Disconnect { reply } => {
            manager.disconnect();
            let _ = reply.send(());
        }
        AgentCommand::Status { reply } => {
            let _ = reply.send(manager.status());
        }
        AgentCommand::Shutdown => manager.disconnect(),
    }
}

fn apply_event<P: Page>(manager: &mut ConnectionManager<P>, event: TransportEvent) {
    if let Err(e) = manager.handle_event(event) {
        error!(error = %e, "Failed to handle transport event");
    }
}

// ============================================================================
// Tests
// ============================================================================
