//! Wire format for the chat endpoint.
//!
//! Outbound frames carry the user's text and the moment it was sent:
//! `{"message": "...", "timestamp": "2024-05-01T12:00:00.000Z"}`.
//! Inbound frames must carry a `response` string; anything else on the
//! object is ignored.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub message: String,
    pub timestamp: String,
}

impl OutboundFrame {
    pub fn new(message: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            timestamp: format_timestamp(sent_at),
        }
    }

    pub fn now(message: impl Into<String>) -> Self {
        Self::new(message, Utc::now())
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// ISO-8601 in UTC with millisecond precision and a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    InvalidJson(String),
    NotAnObject,
    MissingResponse,
    ResponseNotText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFrame {
    pub reason: MalformedReason,
    pub raw: String,
}

impl fmt::Display for MalformedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            MalformedReason::InvalidJson(err) => write!(f, "frame is not valid JSON: {err}"),
            MalformedReason::NotAnObject => write!(f, "frame is not a JSON object"),
            MalformedReason::MissingResponse => write!(f, "frame has no `response` field"),
            MalformedReason::ResponseNotText => write!(f, "frame `response` is not a string"),
        }
    }
}

impl Error for MalformedFrame {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame {
    Reply(ReplyPayload),
    Malformed(MalformedFrame),
}

pub fn decode_inbound(raw: &str) -> DecodedFrame {
    let malformed = |reason| {
        DecodedFrame::Malformed(MalformedFrame {
            reason,
            raw: raw.to_string(),
        })
    };

    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => value,
        Err(err) => return malformed(MalformedReason::InvalidJson(err.to_string())),
    };

    let Some(object) = value.as_object() else {
        return malformed(MalformedReason::NotAnObject);
    };

    match object.get("response") {
        None => malformed(MalformedReason::MissingResponse),
        Some(serde_json::Value::String(text)) => DecodedFrame::Reply(ReplyPayload {
            response: text.clone(),
        }),
        Some(_) => malformed(MalformedReason::ResponseNotText),
    }
}
