//! Ordered, append-only chat transcript.
//!
//! The transcript is the single source of truth for what the view renders. It
//! has no transport dependency: callers decide what to send once a user entry
//! has been accepted.

use crate::core::message::{ChatEntry, EntryId, Origin};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AwaitingResponse,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptError {
    Rejected(RejectReason),
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::Rejected(RejectReason::AwaitingResponse) => {
                write!(f, "still waiting for a reply to the previous message")
            }
            TranscriptError::Rejected(RejectReason::Blank) => write!(f, "message is empty"),
        }
    }
}

impl Error for TranscriptError {}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
    awaiting_response: bool,
    next_sequence: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user entry and mark the transcript as awaiting a reply.
    pub fn append_user(&mut self, text: &str) -> Result<EntryId, TranscriptError> {
        self.check_user_append(text)?;
        let id = self.push(Origin::User, text);
        self.awaiting_response = true;
        Ok(id)
    }

    /// Validates a user append without mutating anything.
    pub fn check_user_append(&self, text: &str) -> Result<(), TranscriptError> {
        if self.awaiting_response {
            return Err(TranscriptError::Rejected(RejectReason::AwaitingResponse));
        }
        if text.trim().is_empty() {
            return Err(TranscriptError::Rejected(RejectReason::Blank));
        }
        Ok(())
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) -> EntryId {
        let id = self.push(Origin::Assistant, text);
        self.awaiting_response = false;
        id
    }

    pub fn clear_awaiting(&mut self) {
        self.awaiting_response = false;
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&ChatEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, origin: Origin, content: impl Into<String>) -> EntryId {
        self.next_sequence += 1;
        let id = EntryId::from_sequence(self.next_sequence);
        self.entries.push(ChatEntry::new(id, origin, content));
        id
    }
}
