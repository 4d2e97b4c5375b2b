use chrono::{DateTime, Utc};
use std::fmt;

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    User,
    Assistant,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::User => "user",
            Origin::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Origin::User
    }

    pub fn is_assistant(self) -> bool {
        self == Origin::Assistant
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque, creation-ordered identifier of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn from_sequence(sequence: u64) -> Self {
        Self(sequence)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One transcript entry. Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    id: EntryId,
    content: String,
    origin: Origin,
    created_at: DateTime<Utc>,
}

impl ChatEntry {
    pub(crate) fn new(id: EntryId, origin: Origin, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            origin,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.origin.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.origin.is_assistant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_displays_its_name() {
        assert_eq!(Origin::User.to_string(), "user");
        assert_eq!(Origin::Assistant.to_string(), "assistant");
        assert!(Origin::User.is_user() && !Origin::User.is_assistant());
    }

    #[test]
    fn entry_ids_order_by_sequence() {
        assert!(EntryId::from_sequence(1) < EntryId::from_sequence(2));
        assert_eq!(EntryId::from_sequence(7).to_string(), "#7");
    }
}
