//! FAQ lookup branch.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use vendra_core::Retriever;

use crate::engine::WorkflowStep;
use crate::error::WorkflowError;
use crate::state::{StateUpdate, TurnState};

/// Result-count ceiling passed to the FAQ retriever.
pub const FAQ_SEARCH_LIMIT: usize = 3;

/// Retrieves FAQ entries for the user's question and hands them straight to
/// the response step. FAQ answers skip the evaluation loop; a failing
/// backend degrades to an empty answer set.
pub struct FaqStep {
    retriever: Arc<dyn Retriever>,
}

impl FaqStep {
    #[must_use]
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl WorkflowStep for FaqStep {
    fn name(&self) -> &'static str {
        "faq"
    }

    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError> {
        let query = state.latest_user_text().ok_or(WorkflowError::EmptyTurn)?;

        let answers = match self.retriever.retrieve(query, FAQ_SEARCH_LIMIT).await {
            Ok(answers) => answers,
            Err(e) => {
                warn!("FAQ retrieval failed, continuing with no answers: {e}");
                Vec::new()
            }
        };

        info!("retrieved {} FAQ entries", answers.len());

        Ok(StateUpdate {
            candidates: Some(answers.clone()),
            accepted: Some(answers),
            ..StateUpdate::default()
        })
    }
}
