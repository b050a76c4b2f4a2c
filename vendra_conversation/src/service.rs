//! One-turn chat service over the workflow engine.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use vendra_core::{Candidate, ChatMessage, Role, Route};
use vendra_workflow::{TurnWorkflow, WorkflowError, mention};

use crate::store::SessionStore;

/// Reply used when a run terminates without producing one (for example a
/// message no intent matched).
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process that request.";

/// Errors for a whole turn. The workflow's non-fatal degradations never
/// reach this type; anything here means the turn produced nothing.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("workflow failed: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("session storage failed: {0}")]
    Store(#[source] anyhow::Error),
}

/// What one turn hands back to the caller.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session_id: Uuid,
    pub reply: String,
    /// Products actually offered in the reply. Always empty for FAQ turns.
    pub products: Vec<Candidate>,
}

/// Runs turns against the engine and keeps the session history current.
///
/// The stored history is only written after a successful run, so a fatal
/// turn leaves the session exactly as it was.
pub struct ChatService {
    workflow: TurnWorkflow,
    store: Arc<dyn SessionStore>,
}

impl ChatService {
    #[must_use]
    pub fn new(workflow: TurnWorkflow, store: Arc<dyn SessionStore>) -> Self {
        Self { workflow, store }
    }

    /// Process one user message, creating a fresh session when none is
    /// given.
    pub async fn process_turn(
        &self,
        session_id: Option<Uuid>,
        message: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let session_id = session_id.unwrap_or_else(Uuid::now_v7);
        info!("processing turn for session: {session_id}");

        let session = self
            .store
            .get_or_create(&session_id)
            .await
            .map_err(ChatError::Store)?;

        let mut messages = session.messages;
        messages.push(ChatMessage::user(message));

        let state = self.workflow.run(messages).await?;

        let reply = state
            .reply()
            .map_or_else(|| FALLBACK_REPLY.to_string(), str::to_string);

        let products = if state.route == Some(Route::Faq) {
            Vec::new()
        } else {
            mention::correlate(&reply, state.accepted.as_deref().unwrap_or(&[]))
        };

        self.store
            .add_message(&session_id, Role::User, message)
            .await
            .map_err(ChatError::Store)?;
        if let Some(assistant_reply) = state.reply() {
            self.store
                .add_message(&session_id, Role::Assistant, assistant_reply)
                .await
                .map_err(ChatError::Store)?;
        }

        debug!(
            "turn complete: {} products surfaced, reply {} chars",
            products.len(),
            reply.len()
        );

        Ok(TurnOutcome {
            session_id,
            reply,
            products,
        })
    }

    /// Snapshot a session's transcript.
    pub async fn history(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        let session = self
            .store
            .get_or_create(session_id)
            .await
            .map_err(ChatError::Store)?;

        Ok(session.messages)
    }
}
