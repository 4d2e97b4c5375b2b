//! Lifecycle of the single WebSocket connection behind a chat view.
//!
//! The socket itself lives inside a spawned transport task. The manager talks
//! to it over a command channel and hears back over an event channel, which
//! the owner drains with [`ConnectionManager::next_event`] on its own task.
//! State transitions are applied as events are received, so what the owner
//! observes through [`ConnectionManager::state`] always matches the events it
//! has already seen.

use crate::core::frame::OutboundFrame;
use futures_util::{SinkExt, StreamExt};
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Close code reported when the peer closed without a status.
pub const CLOSE_NO_STATUS: u16 = 1005;
/// Close code reported when the stream ended without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Errored => "errored",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Handshake(String),
    Read(String),
    Write(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Handshake(msg) => write!(f, "connection failed: {msg}"),
            TransportError::Read(msg) => write!(f, "connection lost: {msg}"),
            TransportError::Write(msg) => write!(f, "failed to send frame: {msg}"),
        }
    }
}

impl Error for TransportError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    NotConnected,
    Empty,
    Encode,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::NotConnected => write!(f, "not connected"),
            SendError::Empty => write!(f, "message is empty"),
            SendError::Encode => write!(f, "message could not be encoded"),
        }
    }
}

impl Error for SendError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Ready,
    Message(String),
    Error(TransportError),
    Closed { code: u16, reason: String },
}

pub struct ConnectionManager {
    endpoint: String,
    state: ConnectionState,
    commands: Option<mpsc::UnboundedSender<String>>,
    events: Option<mpsc::UnboundedReceiver<ConnectionEvent>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Start connecting to `endpoint`. Must be called inside a tokio runtime.
    ///
    /// The outcome arrives later through [`next_event`](Self::next_event) as
    /// either [`ConnectionEvent::Ready`] or [`ConnectionEvent::Error`].
    pub fn open(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        debug!(endpoint = %endpoint, "opening chat connection");
        let task = tokio::spawn(run_transport(
            endpoint.clone(),
            command_rx,
            event_tx,
            cancel.clone(),
        ));

        Self {
            endpoint,
            state: ConnectionState::Connecting,
            commands: Some(command_tx),
            events: Some(event_rx),
            cancel,
            task: Some(task),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Queue `text` for delivery. Never waits on the socket; write failures
    /// come back later as [`ConnectionEvent::Error`].
    pub fn send(&self, text: &str) -> Result<(), SendError> {
        if self.state != ConnectionState::Open {
            return Err(SendError::NotConnected);
        }
        if text.trim().is_empty() {
            return Err(SendError::Empty);
        }

        let payload = OutboundFrame::now(text).encode().map_err(|err| {
            warn!(%err, "outbound frame did not serialize");
            SendError::Encode
        })?;
        let commands = self.commands.as_ref().ok_or(SendError::NotConnected)?;
        commands
            .send(payload)
            .map_err(|_| SendError::NotConnected)?;
        debug!(bytes = text.len(), "queued outbound frame");
        Ok(())
    }

    /// Next lifecycle or message event, in arrival order. Returns `None` once
    /// the connection has been torn down locally or the transport has exited
    /// and every event has been drained.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        let event = self.events.as_mut()?.recv().await?;
        self.observe(&event);
        Some(event)
    }

    fn observe(&mut self, event: &ConnectionEvent) {
        match event {
            ConnectionEvent::Ready => {
                if self.state == ConnectionState::Connecting {
                    self.state = ConnectionState::Open;
                    debug!(endpoint = %self.endpoint, "chat connection open");
                }
            }
            ConnectionEvent::Message(_) => {}
            ConnectionEvent::Error(cause) => {
                if !self.state.is_terminal() {
                    self.state = ConnectionState::Errored;
                    self.commands = None;
                    debug!(%cause, "chat connection errored");
                }
            }
            ConnectionEvent::Closed { code, reason } => {
                if !self.state.is_terminal() {
                    self.state = ConnectionState::Closed;
                    self.commands = None;
                    debug!(code, reason = %reason, "chat connection closed by peer");
                }
            }
        }
    }

    /// Tear the connection down. Sends a close frame when open, abandons the
    /// handshake when still connecting, and does nothing on a second call.
    /// Events still in flight are discarded.
    pub fn close(&mut self) {
        if self.events.is_none() {
            return;
        }

        self.cancel.cancel();
        self.commands = None;
        self.events = None;
        if !self.state.is_terminal() {
            self.state = ConnectionState::Closed;
        }
        debug!(endpoint = %self.endpoint, "chat connection released");
    }

    /// [`close`](Self::close), then wait briefly for the transport task to
    /// flush the close frame.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(task) = self.task.take() {
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, task).await;
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_transport(
    endpoint: String,
    mut commands: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    cancel: CancellationToken,
) {
    let connected = tokio::select! {
        result = connect_async(endpoint.as_str()) => result,
        _ = cancel.cancelled() => return,
    };

    let stream = match connected {
        Ok((stream, _response)) => stream,
        Err(err) => {
            let _ = events.send(ConnectionEvent::Error(TransportError::Handshake(
                err.to_string(),
            )));
            return;
        }
    };

    let (mut sink, mut source) = stream.split();
    if events.send(ConnectionEvent::Ready).is_err() {
        return;
    }

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                let _ = sink.close().await;
                return;
            }
            command = commands.recv() => {
                let Some(payload) = command else {
                    let _ = sink.send(Message::Close(None)).await;
                    let _ = sink.close().await;
                    return;
                };
                if let Err(err) = sink.send(Message::Text(payload.into())).await {
                    let _ = events.send(ConnectionEvent::Error(TransportError::Write(
                        err.to_string(),
                    )));
                    return;
                }
            }
            incoming = source.next() => {
                let event = match incoming {
                    Some(Ok(Message::Text(text))) => ConnectionEvent::Message(text.as_str().to_owned()),
                    Some(Ok(Message::Binary(bytes))) => {
                        ConnectionEvent::Message(String::from_utf8_lossy(&bytes).into_owned())
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = match frame {
                            Some(frame) => (u16::from(frame.code), frame.reason.as_str().to_owned()),
                            None => (CLOSE_NO_STATUS, String::new()),
                        };
                        // Flushes the close reply tungstenite queued on receipt.
                        let _ = sink.close().await;
                        let _ = events.send(ConnectionEvent::Closed { code, reason });
                        return;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        let _ = events.send(ConnectionEvent::Error(TransportError::Read(
                            err.to_string(),
                        )));
                        return;
                    }
                    None => {
                        let _ = events.send(ConnectionEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: String::new(),
                        });
                        return;
                    }
                };
                if events.send(event).is_err() {
                    return;
                }
            }
        }
    }
}
