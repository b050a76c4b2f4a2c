//! Relevance evaluation of retrieved candidates.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use vendra_core::{Judgment, ResultJudge};

use crate::engine::WorkflowStep;
use crate::error::WorkflowError;
use crate::state::{MAX_ATTEMPTS, StateUpdate, TurnState};

/// Candidates passed to the judge are capped at this many to bound prompt
/// size.
pub const JUDGE_CANDIDATE_CAP: usize = 10;

/// Asks the judge whether the current candidates satisfy the request.
///
/// Every run consumes exactly one attempt. An empty candidate set is
/// rejected without calling the judge at all, and a judge failure fails
/// closed as a rejection carrying the error text - neither aborts the turn.
pub struct EvaluateStep {
    judge: Arc<dyn ResultJudge>,
}

impl EvaluateStep {
    #[must_use]
    pub fn new(judge: Arc<dyn ResultJudge>) -> Self {
        Self { judge }
    }
}

#[async_trait]
impl WorkflowStep for EvaluateStep {
    fn name(&self) -> &'static str {
        "evaluator"
    }

    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError> {
        let query = state.latest_user_text().ok_or(WorkflowError::EmptyTurn)?;
        let candidates = state.candidates.as_deref().unwrap_or(&[]);
        let attempts = state.attempts + 1;

        if candidates.is_empty() {
            info!("no candidates to evaluate, rejecting (attempt {attempts})");
            return Ok(StateUpdate {
                judgment: Some(Judgment::rejected("no results to evaluate")),
                accepted: Some(Vec::new()),
                attempts: Some(attempts),
                ..StateUpdate::default()
            });
        }

        let capped = &candidates[..candidates.len().min(JUDGE_CANDIDATE_CAP)];
        let judgment = match self
            .judge
            .judge(query, &state.recent_context, capped)
            .await
        {
            Ok(judgment) => judgment,
            Err(e) => {
                warn!("judgment failed, rejecting candidates: {e}");
                Judgment::rejected(format!("evaluation failed: {e}"))
            }
        };

        info!(
            "evaluation verdict: accepted={} (attempt {attempts})",
            judgment.accepted
        );

        let accepted = if judgment.accepted {
            candidates.to_vec()
        } else {
            Vec::new()
        };

        Ok(StateUpdate {
            judgment: Some(judgment),
            accepted: Some(accepted),
            attempts: Some(attempts),
            ..StateUpdate::default()
        })
    }
}

/// Post-evaluation edge decision: accept (or give up) into the response
/// step, otherwise loop back to retrieval.
#[must_use]
pub fn evaluation_outcome(state: &TurnState) -> &'static str {
    let accepted = state.judgment.as_ref().is_some_and(|j| j.accepted);

    if accepted || state.attempts >= MAX_ATTEMPTS {
        "generate"
    } else {
        "search"
    }
}
