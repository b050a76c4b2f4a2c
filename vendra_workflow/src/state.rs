//! Per-turn conversation state and the partial updates steps produce.
//!
//! Every step consumes the current [`TurnState`] and returns a
//! [`StateUpdate`]; the engine merges the update before following the next
//! edge. Merging is append-only for messages and replace-wholesale for the
//! candidate fields, so a step can never rewrite history it did not produce.

use vendra_core::{Candidate, ChatMessage, Judgment, Role, Route};

/// Ceiling on evaluation attempts per turn. Once `attempts` reaches this
/// value the retry loop is forced into the response step.
pub const MAX_ATTEMPTS: u32 = 2;

/// State threaded through one workflow run.
#[derive(Debug, Clone, Default)]
pub struct TurnState {
    /// Conversation so far, ending with the new user message. Append-only
    /// within a run.
    pub messages: Vec<ChatMessage>,
    /// Intent selected by the router. Written once per turn.
    pub route: Option<Route>,
    /// Candidates from the most recent retrieval attempt.
    pub candidates: Option<Vec<Candidate>>,
    /// Candidates that passed evaluation. `Some(vec![])` means "evaluated,
    /// nothing to show"; `None` means "not yet evaluated".
    pub accepted: Option<Vec<Candidate>>,
    /// Most recent evaluation verdict.
    pub judgment: Option<Judgment>,
    /// Evaluation attempts consumed so far.
    pub attempts: u32,
    /// Bounded working-memory rendering of prior turns.
    pub recent_context: String,
}

impl TurnState {
    /// Start a run from the session history plus the new user message.
    #[must_use]
    pub fn for_turn(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// The user message this turn is answering.
    #[must_use]
    pub fn latest_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// The assistant reply, once the response step has run.
    #[must_use]
    pub fn reply(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Merge a step's partial update into the state.
    ///
    /// The route is written only while unset; later steps cannot move a turn
    /// onto a different branch.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.append_messages);
        if self.route.is_none() {
            self.route = update.route;
        }
        if let Some(candidates) = update.candidates {
            self.candidates = Some(candidates);
        }
        if let Some(accepted) = update.accepted {
            self.accepted = Some(accepted);
        }
        if let Some(judgment) = update.judgment {
            self.judgment = Some(judgment);
        }
        if let Some(attempts) = update.attempts {
            self.attempts = attempts;
        }
        if let Some(recent_context) = update.recent_context {
            self.recent_context = recent_context;
        }
    }
}

/// Partial state produced by one step. Unset fields leave the state as-is;
/// `append_messages` extends the transcript rather than replacing it.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub append_messages: Vec<ChatMessage>,
    pub route: Option<Route>,
    pub candidates: Option<Vec<Candidate>>,
    pub accepted: Option<Vec<Candidate>>,
    pub judgment: Option<Judgment>,
    pub attempts: Option<u32>,
    pub recent_context: Option<String>,
}
