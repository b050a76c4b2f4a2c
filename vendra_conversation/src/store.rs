//! Session storage behind an async trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use vendra_core::Role;

use crate::session::ConversationSession;

/// Storage for conversation sessions. Reads hand back a snapshot; writes
/// append one message at a time. Callers are expected not to run two turns
/// for the same session concurrently.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot the session, creating an empty one under `id` if absent.
    async fn get_or_create(&self, id: &Uuid) -> anyhow::Result<ConversationSession>;

    /// Append a message to the session, creating it if absent.
    async fn add_message(&self, id: &Uuid, role: Role, content: &str) -> anyhow::Result<()>;
}

/// Process-local session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, ConversationSession>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: &Uuid) -> anyhow::Result<ConversationSession> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                return Ok(session.clone());
            }
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(*id)
            .or_insert_with(|| ConversationSession::with_id(*id));

        debug!("created session: {id}");
        Ok(session.clone())
    }

    async fn add_message(&self, id: &Uuid, role: Role, content: &str) -> anyhow::Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(*id)
            .or_insert_with(|| ConversationSession::with_id(*id));

        session.add_message(role, content);
        Ok(())
    }
}
