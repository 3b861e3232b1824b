//! Connection manager state machine.
//!
//! Owns at most one transport, runs the version handshake and forwards
//! validated reload messages to every enabled page.
//!
//! The manager is synchronous and single-threaded: public operations and
//! [`ConnectionManager::handle_event`] must be called from one event loop,
//! one at a time. [`Agent`](crate::Agent) provides that loop.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{ProtocolVersion, check_version};
use crate::registry::{Page, PageRegistry};
use crate::transport::{Connector, Transport, TransportEvent};

use super::hooks::AgentHooks;
use super::state::{AgentStatus, ConnectionState, DisconnectReason, HandshakeState};

// ============================================================================
// Constants
// ============================================================================

/// Prefix for every user-facing alert.
const ALERT_PREFIX: &str = "LiveReload";

// ============================================================================
// ConnectionManager
// ============================================================================

/// Connection state machine for one agent session.
///
/// Registry changes drive the connection: the first enabled page opens
/// it, disabling the last page closes it.
pub struct ConnectionManager<P: Page> {
    /// Server endpoint.
    endpoint: Url,
    /// Protocol version spoken by this agent.
    api_version: ProtocolVersion,
    /// Enabled pages.
    registry: PageRegistry<P>,
    /// Opens new transports.
    connector: Box<dyn Connector>,
    /// Host callbacks.
    hooks: Box<dyn AgentHooks<P>>,
    /// The live transport, if any.
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
    handshake: HandshakeState,
    disconnect_reason: DisconnectReason,
}

// ============================================================================
// ConnectionManager - Constructor & Accessors
// ============================================================================

impl<P: Page> ConnectionManager<P> {
    /// Creates a disconnected manager with no pages.
    pub fn new(
        endpoint: Url,
        api_version: ProtocolVersion,
        connector: impl Connector + 'static,
        hooks: impl AgentHooks<P> + 'static,
    ) -> Self {
        Self {
            endpoint,
            api_version,
            registry: PageRegistry::new(),
            connector: Box::new(connector),
            hooks: Box::new(hooks),
            transport: None,
            state: ConnectionState::Disconnected,
            handshake: HandshakeState::NotStarted,
            disconnect_reason: DisconnectReason::Unexpected,
        }
    }

    /// Returns the server endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the enabled pages.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &PageRegistry<P> {
        &self.registry
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the handshake state.
    #[inline]
    #[must_use]
    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake
    }

    /// Returns the last recorded disconnect reason.
    #[inline]
    #[must_use]
    pub fn disconnect_reason(&self) -> DisconnectReason {
        self.disconnect_reason
    }

    /// Returns `true` while a transport handle exists.
    #[inline]
    #[must_use]
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            state: self.state,
            handshake: self.handshake,
            disconnect_reason: self.disconnect_reason,
            pages: self.registry.len(),
        }
    }
}

// ============================================================================
// ConnectionManager - Page Operations
// ============================================================================

impl<P: Page> ConnectionManager<P> {
    /// Enables the page if disabled, disables it otherwise.
    ///
    /// # Errors
    ///
    /// See [`enable_page`](Self::enable_page).
    pub fn toggle_page(&mut self, page: P) -> Result<()> {
        if self.registry.contains(&page) {
            self.disable_page(&page);
            Ok(())
        } else {
            self.enable_page(page)
        }
    }

    /// Registers a page for reloads.
    ///
    /// With an open connection the page URL is announced right away;
    /// otherwise a new connection is started. If the connection cannot
    /// be started the user is alerted and the page stays registered.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyEnabled`] if the page is already registered
    /// - [`Error::AlreadyConnected`] if the previous transport has not closed yet
    /// - [`Error::Connection`] if the transport could not be started
    pub fn enable_page(&mut self, page: P) -> Result<()> {
        if self.registry.contains(&page) {
            return Err(Error::already_enabled(page.url()));
        }

        self.registry.add(page.clone());

        if self.state.is_open() {
            self.send_page_url()?;
        } else if let Err(e) = self.connect() {
            self.alert(&format!("Failed to establish connection {e}"));
            return Err(e);
        }

        self.hooks.on_enable_page(&page);
        Ok(())
    }

    /// Stops reloads for a page.
    ///
    /// Disabling the only page disconnects; the close event then disables it.
    /// Unknown pages are ignored.
    pub fn disable_page(&mut self, page: &P) {
        if !self.registry.contains(page) {
            return;
        }

        if self.registry.len() == 1 {
            self.disconnect();
        } else {
            self.registry.remove(page);
            self.hooks.on_disable_page(page);
        }
    }

    /// Disables every page, most recently enabled first.
    ///
    /// Leaves the connection untouched.
    pub fn disable_all_pages(&mut self) {
        let hooks = &mut self.hooks;
        self.registry.remove_all(|page| hooks.on_disable_page(page));
    }

    /// Closes the connection on request.
    ///
    /// No alert is raised for a manual disconnect. Without a transport
    /// the pages are disabled immediately.
    pub fn disconnect(&mut self) {
        self.disconnect_reason = DisconnectReason::Manual;

        if self.transport.is_some() {
            self.close_transport();
        } else {
            self.disable_all_pages();
        }
    }
}

// ============================================================================
// ConnectionManager - Transport Events
// ============================================================================

impl<P: Page> ConnectionManager<P> {
    /// Applies one transport event.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActivePage`] if the socket opens with no page enabled
    /// - [`Error::NoPagesRegistered`] if a message arrives with no page enabled
    /// - [`Error::ConnectionClosed`] if announcing the page URL fails
    pub fn handle_event(&mut self, event: TransportEvent) -> Result<()> {
        if self.transport.is_none() {
            debug!(?event, "Ignoring event without live connection");
            return Ok(());
        }

        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Message(data) => self.on_message(&data),
            TransportEvent::Error(message) => {
                warn!(url = %self.endpoint, error = %message, "Transport error");
                Ok(())
            }
            TransportEvent::Closed => {
                self.on_close();
                Ok(())
            }
        }
    }

    fn on_open(&mut self) -> Result<()> {
        if self.state == ConnectionState::Closing {
            debug!(url = %self.endpoint, "Opened while closing");
            return Ok(());
        }

        info!(url = %self.endpoint, "Connected");

        self.disconnect_reason = DisconnectReason::Broken;
        self.state = ConnectionState::HandshakePending;
        self.handshake = HandshakeState::AwaitingVersion;

        self.send_page_url()
    }

    fn on_message(&mut self, data: &str) -> Result<()> {
        if self.state == ConnectionState::Closing {
            debug!(data, "Dropping message received while closing");
            return Ok(());
        }

        if self.registry.is_empty() {
            return Err(Error::NoPagesRegistered);
        }

        debug!(data, "Received");

        if self.handshake == HandshakeState::Validated {
            self.reload_pages(data);
        } else {
            self.validate_handshake(data);
        }
        Ok(())
    }

    fn on_close(&mut self) {
        let url = self
            .transport
            .take()
            .map_or_else(|| self.endpoint.to_string(), |t| t.url().to_owned());

        info!(url = %url, reason = %self.disconnect_reason, "Disconnected");

        if self.disconnect_reason.alerts_on_close() {
            let message = Error::cannot_connect(url).to_string();
            self.alert(&message);
        }

        self.state = ConnectionState::Disconnected;
        self.handshake = HandshakeState::NotStarted;

        self.disable_all_pages();
    }
}

// ============================================================================
// ConnectionManager - Internals
// ============================================================================

impl<P: Page> ConnectionManager<P> {
    fn connect(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(Error::already_connected(self.endpoint.as_str()));
        }

        let transport = self.connector.open(&self.endpoint)?;
        self.transport = Some(transport);

        self.disconnect_reason = DisconnectReason::CannotConnect;
        self.state = ConnectionState::Connecting;
        self.handshake = HandshakeState::NotStarted;

        debug!(url = %self.endpoint, "Connecting");
        Ok(())
    }

    fn close_transport(&mut self) {
        if let Some(transport) = &self.transport {
            transport.close();
            self.state = ConnectionState::Closing;
        }
    }

    /// Announces the most recently enabled page to the server.
    fn send_page_url(&mut self) -> Result<()> {
        let url = self
            .registry
            .most_recent()
            .map(Page::url)
            .ok_or(Error::NoActivePage)?;

        match &self.transport {
            Some(transport) => {
                debug!(page = %url, "Announcing page");
                transport.send(url)
            }
            None => Ok(()),
        }
    }

    fn validate_handshake(&mut self, data: &str) {
        let check = check_version(&self.api_version, data);

        if check.is_compatible() {
            self.handshake = HandshakeState::Validated;
            if self.state == ConnectionState::HandshakePending {
                self.state = ConnectionState::Active;
            }
            info!(version = %self.api_version, "Handshake completed");
            return;
        }

        if let Some(err) = check.to_error(&self.api_version) {
            warn!(error = %err, "Handshake rejected");
        }
        if let Some(message) = check.alert_message() {
            self.alert(&message);
        }

        self.disconnect_reason = DisconnectReason::VersionMismatch;
        self.close_transport();
    }

    fn reload_pages(&mut self, data: &str) {
        let hooks = &mut self.hooks;
        for page in self.registry.iter_recent_first() {
            hooks.reload_page(page, data);
        }
    }

    fn alert(&mut self, message: &str) {
        self.hooks.alert(&format!("{ALERT_PREFIX} {message}"));
    }
}

// ============================================================================
// Tests
// ============================================================================
