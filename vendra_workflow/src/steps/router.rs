//! Intent routing for the latest user message.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use vendra_core::{IntentClassifier, Route};

use crate::engine::WorkflowStep;
use crate::error::WorkflowError;
use crate::state::{StateUpdate, TurnState};

/// Classifies the user's message into a [`Route`] exactly once per turn.
///
/// There is no retry and no fallback intent: a classifier failure aborts
/// the turn.
pub struct RouterStep {
    classifier: Arc<dyn IntentClassifier>,
}

impl RouterStep {
    #[must_use]
    pub fn new(classifier: Arc<dyn IntentClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl WorkflowStep for RouterStep {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError> {
        let question = state.latest_user_text().ok_or(WorkflowError::EmptyTurn)?;

        let route = self
            .classifier
            .classify(question)
            .await
            .map_err(WorkflowError::Classification)?;

        info!("intent determined: {}", route.as_str());

        Ok(StateUpdate {
            route: Some(route),
            ..StateUpdate::default()
        })
    }
}

/// Post-router edge decision: which branch handles this turn.
#[must_use]
pub fn route_outcome(state: &TurnState) -> &'static str {
    match state.route.unwrap_or_default() {
        Route::ProductSearch => "search",
        Route::Faq => "faq",
        Route::None => "end",
    }
}
