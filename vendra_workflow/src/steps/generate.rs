//! Final response rendering.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use vendra_core::{Candidate, ChatMessage, Route, TextGenerator};

use crate::engine::WorkflowStep;
use crate::error::WorkflowError;
use crate::prompts::{FAQ_RESPONSE_PROMPT, PRODUCT_RESPONSE_PROMPT};
use crate::state::{StateUpdate, TurnState};

const NO_PRODUCTS_PLACEHOLDER: &str = "No products found.";
const NO_FAQ_PLACEHOLDER: &str = "No relevant FAQ information found.";

/// Renders the grounded reply for the turn and appends it to the
/// transcript.
///
/// The accepted candidates (or FAQ answers) become the context block of the
/// prompt; which template is used follows the route. Generation failure is
/// turn-fatal - there is no safe text to substitute for a reply.
pub struct GenerateStep {
    generator: Arc<dyn TextGenerator>,
}

impl GenerateStep {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn product_block(accepted: &[Candidate]) -> String {
        if accepted.is_empty() {
            return NO_PRODUCTS_PLACEHOLDER.to_string();
        }

        let mut block = String::new();
        for (i, candidate) in accepted.iter().enumerate() {
            let title = candidate
                .metadata_display("title")
                .unwrap_or_else(|| "N/A".to_string());
            let price = candidate
                .metadata_display("sale_price")
                .unwrap_or_else(|| "N/A".to_string());
            let currency = candidate.metadata_display("currency").unwrap_or_default();

            block.push_str(&format!(
                "{}. Title: {title}, Price: {currency} {price}\n",
                i + 1
            ));
        }
        block
    }

    fn faq_block(accepted: &[Candidate]) -> String {
        if accepted.is_empty() {
            return NO_FAQ_PLACEHOLDER.to_string();
        }

        accepted
            .iter()
            .map(|a| a.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl WorkflowStep for GenerateStep {
    fn name(&self) -> &'static str {
        "generate"
    }

    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError> {
        let query = state.latest_user_text().ok_or(WorkflowError::EmptyTurn)?;
        let accepted = state.accepted.as_deref().unwrap_or(&[]);

        let prompt = match state.route {
            Some(Route::ProductSearch) => PRODUCT_RESPONSE_PROMPT
                .replace("{user_query}", query)
                .replace("{product_list}", &Self::product_block(accepted))
                .replace("{prior_conversation}", &state.recent_context),
            Some(Route::Faq) => FAQ_RESPONSE_PROMPT
                .replace("{user_query}", query)
                .replace("{faq_list}", &Self::faq_block(accepted))
                .replace("{prior_conversation}", &state.recent_context),
            Some(Route::None) | None => return Err(WorkflowError::MissingRoute),
        };

        let reply = self
            .generator
            .generate(&prompt)
            .await
            .map_err(WorkflowError::Generation)?;

        info!("generated reply ({} chars)", reply.len());

        Ok(StateUpdate {
            append_messages: vec![ChatMessage::assistant(reply)],
            ..StateUpdate::default()
        })
    }
}
