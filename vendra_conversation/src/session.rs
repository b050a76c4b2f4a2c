//! Per-session conversation history.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use vendra_core::{ChatMessage, Role};

/// One customer's ongoing conversation: identifier, full transcript, and
/// bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create an empty session with a fresh time-sortable id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7())
    }

    /// Create an empty session under a known id.
    #[must_use]
    pub fn with_id(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message to the transcript.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
        self.updated_at = Utc::now();
    }

    /// Completed user/assistant exchanges in the transcript.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
