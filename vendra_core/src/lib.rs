#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Shared types and collaborator interfaces for the vendra assistant.
//!
//! Everything that crosses a crate boundary lives here: the chat message
//! types, the retrieved-candidate record, the intent route, the evaluator
//! verdict, and the async traits behind which the external collaborators
//! (classification, retrieval, judgment, generation, embedding) sit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The intent selected for a turn.
///
/// Classifier output is deserialized directly into this enum; any label
/// outside the closed set collapses to `Route::None`, which routes the turn
/// to the terminal no-op branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    ProductSearch,
    Faq,
    #[default]
    #[serde(other)]
    None,
}

impl Route {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductSearch => "product_search",
            Self::Faq => "faq",
            Self::None => "none",
        }
    }
}

/// A retrieved item: opaque content plus a metadata map.
///
/// Product candidates carry `title`, `sale_price` and `currency` keys in
/// their metadata; FAQ candidates are consumed through `content` alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Candidate {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata entry, builder style.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The item's title, when the metadata carries one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }

    /// Render a metadata value for display, whatever its JSON type.
    #[must_use]
    pub fn metadata_display(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Verdict produced by evaluating a candidate set against the user's request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Judgment {
    pub accepted: bool,
    pub rationale: String,
}

impl Judgment {
    #[must_use]
    pub fn rejected(rationale: impl Into<String>) -> Self {
        Self {
            accepted: false,
            rationale: rationale.into(),
        }
    }
}

/// Classifies a user message into a [`Route`]. One-shot; a failure here has
/// no safe default and aborts the turn.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> anyhow::Result<Route>;
}

/// Semantic search over a backing store. Returns an empty list for "no
/// results"; an `Err` means the backend itself failed.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Candidate>>;
}

/// Judges whether a candidate set satisfies the user's request.
#[async_trait]
pub trait ResultJudge: Send + Sync {
    async fn judge(
        &self,
        query: &str,
        recent_context: &str,
        candidates: &[Candidate],
    ) -> anyhow::Result<Judgment>;
}

/// Free-form text generation from a fully rendered prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Text to vector, for retrievers that search by embedding.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}
