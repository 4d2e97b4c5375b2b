//! Binds connection events to transcript mutations.
//!
//! Contract: every parsed reply appends exactly one assistant entry, and every
//! malformed frame, transport error, or close clears the awaiting flag exactly
//! once, so the view can never be left waiting on a connection that cannot
//! answer.

use crate::core::connection::{
    ConnectionEvent, ConnectionManager, ConnectionState, SendError, TransportError,
};
use crate::core::frame::{decode_inbound, DecodedFrame, MalformedFrame};
use crate::core::message::EntryId;
use crate::core::transcript::{Transcript, TranscriptError};
use crate::utils::logging::LoggingState;
use std::error::Error;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    Rejected(TranscriptError),
    Send(SendError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Rejected(err) => write!(f, "{err}"),
            SubmitError::Send(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubmitError {}

impl From<TranscriptError> for SubmitError {
    fn from(err: TranscriptError) -> Self {
        SubmitError::Rejected(err)
    }
}

impl From<SendError> for SubmitError {
    fn from(err: SendError) -> Self {
        SubmitError::Send(err)
    }
}

/// What a connection event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Handshake finished. Carries the probe entry when one was sent.
    Connected { probe: Option<EntryId> },
    Reply(EntryId),
    DroppedFrame(MalformedFrame),
    Failed(TransportError),
    Closed { code: u16, reason: String },
}

#[derive(Default)]
pub struct SessionOptions {
    /// Sent as an ordinary user message as soon as the connection opens.
    pub probe_message: Option<String>,
    pub logging: Option<LoggingState>,
}

pub struct ChatSession {
    transcript: Transcript,
    connection: ConnectionManager,
    logging: Option<LoggingState>,
    probe_message: Option<String>,
}

impl ChatSession {
    /// Mount a chat session: an empty transcript and a fresh connection
    /// attempt to `endpoint`.
    pub fn open(endpoint: impl Into<String>, options: SessionOptions) -> Self {
        let SessionOptions {
            probe_message,
            logging,
        } = options;

        Self {
            transcript: Transcript::new(),
            connection: ConnectionManager::open(endpoint),
            logging,
            probe_message: probe_message.filter(|probe| !probe.trim().is_empty()),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn endpoint(&self) -> &str {
        self.connection.endpoint()
    }

    pub fn logging(&self) -> Option<&LoggingState> {
        self.logging.as_ref()
    }

    /// True when a submission would currently be accepted, ignoring its text.
    pub fn accepts_input(&self) -> bool {
        self.connection.is_open() && !self.transcript.is_awaiting_response()
    }

    /// Append `text` as a user entry and send it. Refused submissions leave
    /// the transcript untouched.
    pub fn submit(&mut self, text: &str) -> Result<EntryId, SubmitError> {
        if let Err(err) = self.transcript.check_user_append(text) {
            debug!(%err, "submission refused");
            return Err(err.into());
        }
        if !self.connection.is_open() {
            debug!(state = %self.connection.state(), "submission refused");
            return Err(SubmitError::Send(SendError::NotConnected));
        }

        let id = self.transcript.append_user(text)?;
        self.log_entry(id);

        if let Err(err) = self.connection.send(text) {
            // The transport is already gone; its terminal event is on the way.
            warn!(%err, "outbound frame was not queued");
            self.transcript.clear_awaiting();
        }

        Ok(id)
    }

    /// Wait for the next connection event and apply it. `None` once the
    /// connection has been torn down and every event has been drained.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let event = self.connection.next_event().await?;
        Some(self.apply(event))
    }

    pub(crate) fn apply(&mut self, event: ConnectionEvent) -> SessionUpdate {
        match event {
            ConnectionEvent::Ready => {
                let probe = self.send_probe();
                SessionUpdate::Connected { probe }
            }
            ConnectionEvent::Message(raw) => match decode_inbound(&raw) {
                DecodedFrame::Reply(payload) => {
                    let id = self.transcript.append_assistant(payload.response);
                    self.log_entry(id);
                    SessionUpdate::Reply(id)
                }
                DecodedFrame::Malformed(frame) => {
                    warn!(reason = %frame, raw = %frame.raw, "dropping inbound frame");
                    self.transcript.clear_awaiting();
                    SessionUpdate::DroppedFrame(frame)
                }
            },
            ConnectionEvent::Error(cause) => {
                warn!(%cause, "chat connection failed");
                self.transcript.clear_awaiting();
                SessionUpdate::Failed(cause)
            }
            ConnectionEvent::Closed { code, reason } => {
                debug!(code, reason = %reason, "chat connection closed");
                self.transcript.clear_awaiting();
                SessionUpdate::Closed { code, reason }
            }
        }
    }

    fn send_probe(&mut self) -> Option<EntryId> {
        let probe = self.probe_message.clone()?;
        match self.submit(&probe) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "probe message was not sent");
                None
            }
        }
    }

    fn log_entry(&self, id: EntryId) {
        let (Some(logging), Some(entry)) = (&self.logging, self.transcript.get(id)) else {
            return;
        };
        if let Err(err) = logging.log_entry(entry) {
            warn!(%err, "failed to write transcript log");
        }
    }

    /// Unmount: release the connection. Late events are discarded.
    pub fn close(&mut self) {
        self.connection.close();
    }

    pub async fn shutdown(self) {
        self.connection.shutdown().await;
    }
}
