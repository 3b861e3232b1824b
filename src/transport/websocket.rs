//! WebSocket client transport.
//!
//! Each connection runs in its own tokio task that handles:
//!
//! - Connecting to the server (abortable by a close request)
//! - Incoming text frames from the server
//! - Outgoing messages queued by the agent
//! - Reporting every state change as a [`TransportEvent`]

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::{Connector, EventSender, Transport, TransportEvent};

// ============================================================================
// SocketCommand
// ============================================================================

/// Internal commands for the socket task.
enum SocketCommand {
    /// Send a text frame.
    Send(String),
    /// Close the socket.
    Close,
}

// ============================================================================
// WsConnector
// ============================================================================

/// Opens tokio-tungstenite client connections.
///
/// Every transport it opens reports to the same event channel.
pub struct WsConnector {
    events: EventSender,
}

impl WsConnector {
    /// Creates a connector reporting to `events`.
    #[inline]
    #[must_use]
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }
}

impl Connector for WsConnector {
    fn open(&mut self, endpoint: &Url) -> Result<Box<dyn Transport>> {
        if endpoint.scheme() != "ws" {
            return Err(Error::connection(format!(
                "unsupported scheme: {}",
                endpoint.scheme()
            )));
        }

        let runtime = Handle::try_current().map_err(|e| Error::connection(e.to_string()))?;

        let url = endpoint.to_string();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        runtime.spawn(run_socket(url.clone(), command_rx, self.events.clone()));

        debug!(url = %url, "WebSocket connecting");

        Ok(Box::new(WsTransport { url, command_tx }))
    }
}

// ============================================================================
// WsTransport
// ============================================================================

/// Handle to one socket task.
pub struct WsTransport {
    url: String,
    command_tx: mpsc::UnboundedSender<SocketCommand>,
}

impl Transport for WsTransport {
    fn url(&self) -> &str {
        &self.url
    }

    fn send(&self, text: String) -> Result<()> {
        self.command_tx
            .send(SocketCommand::Send(text))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&self) {
        let _ = self.command_tx.send(SocketCommand::Close);
    }
}

// ============================================================================
// Socket Task
// ============================================================================

/// Connects, then pumps frames until either side closes.
///
/// Always finishes by emitting exactly one `Closed` event.
async fn run_socket(
    url: String,
    mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
    events: EventSender,
) {
    let mut connect = Box::pin(connect_async(url.as_str()));

    let ws_stream = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok((ws_stream, _response)) => break ws_stream,
                Err(e) => {
                    warn!(url = %url, error = %e, "WebSocket connect failed");
                    emit(&events, TransportEvent::Error(e.to_string()));
                    emit(&events, TransportEvent::Closed);
                    return;
                }
            },

            command = command_rx.recv() => match command {
                Some(SocketCommand::Send(_)) => {
                    warn!(url = %url, "Dropping message sent before socket opened");
                }
                Some(SocketCommand::Close) | None => {
                    debug!(url = %url, "Connect aborted");
                    emit(&events, TransportEvent::Closed);
                    return;
                }
            },
        }
    };

    emit(&events, TransportEvent::Opened);

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            // Incoming frames from the server
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        emit(&events, TransportEvent::Message(text.as_str().to_owned()));
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!(url = %url, "WebSocket closed by remote");
                        break;
                    }

                    Some(Err(e)) => {
                        warn!(url = %url, error = %e, "WebSocket error");
                        emit(&events, TransportEvent::Error(e.to_string()));
                        break;
                    }

                    None => {
                        debug!(url = %url, "WebSocket stream ended");
                        break;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            // Commands from the agent
            command = command_rx.recv() => {
                match command {
                    Some(SocketCommand::Send(text)) => {
                        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                            warn!(url = %url, error = %e, "Failed to send message");
                            emit(&events, TransportEvent::Error(e.to_string()));
                            break;
                        }
                        trace!(url = %url, "Message sent");
                    }

                    Some(SocketCommand::Close) | None => {
                        debug!(url = %url, "Close requested");
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }

    emit(&events, TransportEvent::Closed);

    debug!(url = %url, "Socket task terminated");
}

/// Forwards an event to the agent, ignoring a dropped receiver.
fn emit(events: &EventSender, event: TransportEvent) {
    if events.send(event).is_err() {
        trace!("Event receiver dropped");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::net::TcpListener;
    use tokio::time::timeout;

    use crate::transport::EventReceiver;

    const WAIT: Duration = Duration::from_secs(5);

    async fn next_event(rx: &mut EventReceiver) -> TransportEvent {
        timeout(WAIT, rx.recv())
            .await
            .expect("event in time")
            .expect("channel open")
    }

    #[test]
    fn test_open_outside_runtime_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut connector = WsConnector::new(tx);
        let url = Url::parse("ws://localhost:35729/websocket").expect("url");

        let err = connector.open(&url).err().expect("no runtime");
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn test_open_rejects_non_ws_scheme() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut connector = WsConnector::new(tx);
        let url = Url::parse("http://localhost:35729/websocket").expect("url");

        assert!(connector.open(&url).is_err());
    }

    #[tokio::test]
    async fn test_connect_refused_emits_error_then_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut connector = WsConnector::new(tx);
        let url = Url::parse(&format!("ws://127.0.0.1:{port}/websocket")).expect("url");
        let _transport = connector.open(&url).expect("open starts");

        assert!(matches!(next_event(&mut rx).await, TransportEvent::Error(_)));
        assert_eq!(next_event(&mut rx).await, TransportEvent::Closed);
    }

    #[tokio::test]
    async fn test_send_receive_and_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut connector = WsConnector::new(tx);
        let url = Url::parse(&format!("ws://127.0.0.1:{port}/websocket")).expect("url");
        let transport = connector.open(&url).expect("open starts");
        assert_eq!(transport.url(), url.as_str());

        let (stream, _) = listener.accept().await.expect("accept");
        let mut server = tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade");

        assert_eq!(next_event(&mut rx).await, TransportEvent::Opened);

        transport.send("http://localhost/".into()).expect("send");
        let frame = timeout(WAIT, server.next())
            .await
            .expect("frame in time")
            .expect("frame")
            .expect("ok frame");
        assert_eq!(frame.into_text().expect("text").as_str(), "http://localhost/");

        server
            .send(Message::Text("!!ver:1.6".into()))
            .await
            .expect("server send");
        assert_eq!(
            next_event(&mut rx).await,
            TransportEvent::Message("!!ver:1.6".into())
        );

        transport.close();
        assert_eq!(next_event(&mut rx).await, TransportEvent::Closed);
    }
}
