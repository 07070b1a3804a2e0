//! Message domain types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier of a message within a conversation
///
/// Identifiers are assigned in send order, so comparing two ids compares
/// their positions in the conversation's total order. This is also what
/// makes the numeric-adjacency continuity test possible: two messages are
/// neighbors in the store exactly when their ids differ by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Absolute numeric distance to another id
    pub fn distance(self, other: MessageId) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuthorId(pub u64);

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user{}", self.0)
    }
}

/// An immutable chat message
///
/// Messages never change after creation; edits and deletions are modeled
/// upstream as new store states, not as mutation of an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    author: AuthorId,
    created_at: i64,
    content: String,
}

impl Message {
    /// Create a new message
    pub fn new(
        id: MessageId,
        author: AuthorId,
        created_at: i64,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author,
            created_at,
            content: content.into(),
        }
    }

    /// Get the message identifier
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Get the author identifier
    pub fn author(&self) -> AuthorId {
        self.author
    }

    /// Get the creation time as unix seconds
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Get the creation time as a UTC datetime, if representable
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    /// Get the message content
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.id, self.author, self.content)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_test_message(id: u64) -> Message {
        Message::new(
            MessageId(id),
            AuthorId(id % 3),
            1_700_000_000 + id as i64,
            format!("message {id}"),
        )
    }

    #[test]
    fn test_message_id_ordering_follows_send_order() {
        let earlier = MessageId(10);
        let later = MessageId(42);

        assert!(earlier < later);
        assert_eq!(earlier.distance(later), 32);
        assert_eq!(later.distance(earlier), 32);
    }

    #[test]
    fn test_message_id_distance_of_neighbors_is_one() {
        assert_eq!(MessageId(7).distance(MessageId(8)), 1);
        assert_eq!(MessageId(8).distance(MessageId(7)), 1);
        assert_eq!(MessageId(8).distance(MessageId(8)), 0);
    }

    #[test]
    fn test_message_accessors() {
        let message = create_test_message(5);

        assert_eq!(message.id(), MessageId(5));
        assert_eq!(message.author(), AuthorId(2));
        assert_eq!(message.created_at(), 1_700_000_005);
        assert_eq!(message.content(), "message 5");
    }

    #[test]
    fn test_message_created_at_utc() {
        let message = create_test_message(0);
        let datetime = message.created_at_utc().expect("timestamp in range");

        assert_eq!(datetime.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_message_display() {
        let message = create_test_message(12);

        assert_eq!(format!("{message}"), "#12 user0: message 12");
    }

    #[test]
    fn test_message_serde_roundtrip() -> serde_json::Result<()> {
        let message = create_test_message(99);

        let json = serde_json::to_string(&message)?;
        let decoded: Message = serde_json::from_str(&json)?;

        assert_eq!(decoded, message);
        Ok(())
    }
}
