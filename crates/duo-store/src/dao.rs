use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

/// Kind of a chat message, stored as its upper-case tag in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum MessageType {
    /// Conversational message written by a participant.
    #[strum(serialize = "CHAT")]
    Chat,
    /// System or control message (joins, notices, ...).
    #[strum(serialize = "SYSTEM")]
    System,
}

/// A single row in the `chat_messages` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Assigned by the store on insert.
    pub id: i64,
    /// Set by the producer, never by the store.
    pub timestamp: DateTime<Utc>,
    pub message_type: MessageType,
    pub sender: String,
    pub content: String,
}

/// A message that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub timestamp: DateTime<Utc>,
    pub message_type: MessageType,
    pub sender: String,
    pub content: String,
}

impl NewChatMessage {
    pub fn chat(
        sender: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            message_type: MessageType::Chat,
            sender: sender.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            message_type: MessageType::System,
            sender: "system".to_owned(),
            content: content.into(),
        }
    }

    pub(crate) fn with_id(self, id: i64) -> ChatMessage {
        ChatMessage {
            id,
            timestamp: self.timestamp,
            message_type: self.message_type,
            sender: self.sender,
            content: self.content,
        }
    }
}

/// A row in the `pets` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn message_type_tags() {
        assert_eq!(MessageType::Chat.to_string(), "CHAT");
        assert_eq!(MessageType::System.to_string(), "SYSTEM");
        assert_eq!(MessageType::from_str("SYSTEM").unwrap(), MessageType::System);
        assert!(MessageType::from_str("chat").is_err());
    }
}
