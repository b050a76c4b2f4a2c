use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use vendra_core::{Embedder, IntentClassifier, Judgment, ResultJudge, Route, TextGenerator};

use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
const EMBEDDING_MODEL: &str = "text-embedding-004";

const MAX_ATTEMPTS: usize = 4;
const BASE_DELAY: Duration = Duration::from_secs(2);
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Classification prompt; the model must answer with a JSON object carrying
/// a `route` label from the closed set.
const CLASSIFY_PROMPT: &str = r#"You are the intent router of an online-store assistant. Classify the
customer message into exactly one intent:

- "product_search": the customer wants to find, compare or buy products
- "faq": the customer asks about policies, shipping, returns, payments or
  the store itself
- "none": anything else

Customer message: "{user_question}"

Respond with a JSON object: {"route": "<intent>"}"#;

/// Judgment prompt; the model must answer with a JSON verdict.
const JUDGE_PROMPT: &str = r#"You are reviewing search results for an online-store assistant. Decide
whether the results below satisfy the customer's request, taking the
conversation into account.

Conversation so far:
{prior_conversation}

Customer request: {user_query}

Search results:
{search_results}

Respond with a JSON object:
{"accepted": true or false, "rationale": "<one short sentence>"}"#;

#[derive(Deserialize)]
struct RouteVerdict {
    route: Route,
}

/// Gemini-backed implementation of the LLM-facing collaborator seams.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Convert f64 to f32 for embedding values
    /// Precision loss is acceptable for ML embeddings
    #[expect(clippy::cast_possible_truncation, reason = "ML embeddings use f32")]
    const fn f64_to_f32(x: f64) -> f32 {
        x as f32
    }

    pub fn new(api_key: String) -> Self {
        info!("Creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Helper method to send a single generateContent request
    async fn try_generate(&self, request: &Value) -> anyhow::Result<String> {
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let text = response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing text"))?
            .to_string();

        Ok(text)
    }

    async fn generate_text(&self, prompt: &str) -> anyhow::Result<String> {
        let request = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        });

        info!("Sending request to Gemini API: model={}", self.model);

        let text =
            retry_with_backoff(|| self.try_generate(&request), MAX_ATTEMPTS, BASE_DELAY, MAX_DELAY)
                .await?;

        Ok(text)
    }

    /// Generate with JSON output mode and parse the result.
    async fn generate_json(&self, prompt: &str) -> anyhow::Result<Value> {
        let request = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"responseMimeType": "application/json"},
        });

        info!("Sending structured request to Gemini API: model={}", self.model);

        let text =
            retry_with_backoff(|| self.try_generate(&request), MAX_ATTEMPTS, BASE_DELAY, MAX_DELAY)
                .await?;

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IntentClassifier for GeminiProvider {
    async fn classify(&self, text: &str) -> anyhow::Result<Route> {
        let prompt = CLASSIFY_PROMPT.replace("{user_question}", text);
        let value = self.generate_json(&prompt).await?;
        let verdict: RouteVerdict = serde_json::from_value(value)?;

        Ok(verdict.route)
    }
}

#[async_trait]
impl ResultJudge for GeminiProvider {
    async fn judge(
        &self,
        query: &str,
        recent_context: &str,
        candidates: &[vendra_core::Candidate],
    ) -> anyhow::Result<Judgment> {
        let rendered = serde_json::to_string_pretty(candidates)?;
        let prompt = JUDGE_PROMPT
            .replace("{user_query}", query)
            .replace("{prior_conversation}", recent_context)
            .replace("{search_results}", &rendered);

        let value = self.generate_json(&prompt).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.generate_text(prompt).await
    }
}

#[async_trait]
impl Embedder for GeminiProvider {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let response = self
            .client
            .post(format!(
                "{}/models/{EMBEDDING_MODEL}:embedContent",
                self.base_url
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "content": {"parts": [{"text": text}]},
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let embedding = response["embedding"]["values"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing embedding"))?
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(Self::f64_to_f32)
                    .ok_or_else(|| anyhow::anyhow!("Invalid embedding value"))
            })
            .collect::<Result<Vec<f32>, _>>()?;

        Ok(embedding)
    }
}
