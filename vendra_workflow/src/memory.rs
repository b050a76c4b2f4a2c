//! Working-memory window over the conversation transcript.
//!
//! The window is a flat text block of labelled lines, rebuilt at the start
//! of a turn and folded forward at the end of it. Both operations are pure;
//! the graph invokes the update exactly once per turn, as the last step
//! before the sink.

use async_trait::async_trait;
use tracing::debug;
use vendra_core::{ChatMessage, Role};

use crate::engine::WorkflowStep;
use crate::error::WorkflowError;
use crate::state::{StateUpdate, TurnState};

/// Messages rendered when loading context at the start of a turn.
pub const LOAD_WINDOW_MESSAGES: usize = 4;

/// Line ceiling kept when folding a finished exchange into the context.
pub const CONTEXT_MAX_LINES: usize = 8;

const USER_LABEL: &str = "HUMAN";
const ASSISTANT_LABEL: &str = "AI";

fn label(role: Role) -> &'static str {
    match role {
        Role::User => USER_LABEL,
        Role::Assistant => ASSISTANT_LABEL,
    }
}

/// Render the most recent portion of the transcript as labelled lines,
/// oldest first.
#[must_use]
pub fn load(messages: &[ChatMessage]) -> String {
    let start = messages.len().saturating_sub(LOAD_WINDOW_MESSAGES);
    messages[start..]
        .iter()
        .map(|m| format!("{}: {}", label(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fold a completed exchange into the context, trimming from the front to
/// keep at most [`CONTEXT_MAX_LINES`] lines.
#[must_use]
pub fn update(recent_context: &str, user_text: &str, assistant_text: &str) -> String {
    let combined = format!(
        "{recent_context}\n{USER_LABEL}: {user_text}\n{ASSISTANT_LABEL}: {assistant_text}"
    );
    let combined = combined.trim();

    let lines: Vec<&str> = combined.lines().collect();
    let start = lines.len().saturating_sub(CONTEXT_MAX_LINES);
    lines[start..].join("\n")
}

/// Entry step: materialize `recent_context` from the transcript.
pub struct LoadMemory;

#[async_trait]
impl WorkflowStep for LoadMemory {
    fn name(&self) -> &'static str {
        "load_memory"
    }

    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError> {
        let recent_context = load(&state.messages);
        debug!(
            "loaded conversation context from {} messages",
            state.messages.len().min(LOAD_WINDOW_MESSAGES)
        );

        Ok(StateUpdate {
            recent_context: Some(recent_context),
            ..StateUpdate::default()
        })
    }
}

/// Terminal step: fold the finished exchange back into `recent_context`.
pub struct UpdateMemory;

#[async_trait]
impl WorkflowStep for UpdateMemory {
    fn name(&self) -> &'static str {
        "update_memory"
    }

    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError> {
        let [.., user, assistant] = state.messages.as_slice() else {
            return Ok(StateUpdate::default());
        };

        if user.role != Role::User || assistant.role != Role::Assistant {
            return Ok(StateUpdate::default());
        }

        let recent_context = update(&state.recent_context, &user.content, &assistant.content);
        debug!("working memory updated with latest exchange");

        Ok(StateUpdate {
            recent_context: Some(recent_context),
            ..StateUpdate::default()
        })
    }
}
