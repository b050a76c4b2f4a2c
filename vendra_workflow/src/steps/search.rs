//! Context-aware product retrieval.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use vendra_core::{Retriever, TextGenerator};

use crate::engine::WorkflowStep;
use crate::error::WorkflowError;
use crate::prompts::QUERY_REWRITE_PROMPT;
use crate::query::VagueQueryMatcher;
use crate::state::{StateUpdate, TurnState};

/// Result-count ceiling passed to the product retriever.
pub const PRODUCT_SEARCH_LIMIT: usize = 10;

/// Generic query used when a rewrite is needed but the rewriter fails.
const FALLBACK_QUERY: &str = "منتجات مشابهة";

/// Retrieves product candidates for the user's query, rewriting vague
/// follow-ups ("something else", "غيرها") with conversation context first.
///
/// The rewrite runs only on the first attempt of a turn; retries re-issue
/// the original query so the loop stays deterministic. A failing retrieval
/// backend degrades to an empty candidate list instead of aborting the
/// turn.
pub struct SearchStep {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn TextGenerator>,
    matcher: VagueQueryMatcher,
}

impl SearchStep {
    #[must_use]
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn TextGenerator>,
        matcher: VagueQueryMatcher,
    ) -> Self {
        Self {
            retriever,
            generator,
            matcher,
        }
    }

    async fn rewrite(&self, query: &str, recent_context: &str) -> anyhow::Result<String> {
        let prompt = QUERY_REWRITE_PROMPT
            .replace("{conversation_history}", recent_context)
            .replace("{query}", query);

        let rewritten = self.generator.generate(&prompt).await?;
        Ok(rewritten.trim().to_string())
    }

    async fn search_query(&self, state: &TurnState, query: &str) -> String {
        let needs_context =
            state.attempts == 0 && self.matcher.is_vague(query) && !state.recent_context.is_empty();

        if !needs_context {
            return query.to_string();
        }

        match self.rewrite(query, &state.recent_context).await {
            Ok(rewritten) => {
                info!("rewrote vague query: '{query}' -> '{rewritten}'");
                rewritten
            }
            Err(e) => {
                warn!("query rewrite failed, using generic fallback: {e}");
                FALLBACK_QUERY.to_string()
            }
        }
    }
}

#[async_trait]
impl WorkflowStep for SearchStep {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError> {
        let query = state.latest_user_text().ok_or(WorkflowError::EmptyTurn)?;
        let search_query = self.search_query(state, query).await;

        let candidates = match self
            .retriever
            .retrieve(&search_query, PRODUCT_SEARCH_LIMIT)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("product retrieval failed, continuing with no candidates: {e}");
                Vec::new()
            }
        };

        info!("retrieved {} product candidates", candidates.len());

        Ok(StateUpdate {
            candidates: Some(candidates),
            ..StateUpdate::default()
        })
    }
}
