use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use vendra_core::{Candidate, Embedder, Retriever};

/// Qdrant-backed semantic search over one collection.
///
/// The query is embedded through the injected [`Embedder`] and sent as a
/// points search; each hit's payload becomes a [`Candidate`] (`content`
/// text plus the `metadata` map).
pub struct QdrantRetriever {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl QdrantRetriever {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        collection: String,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        info!("Creating QdrantRetriever for collection: {collection}");
        Self {
            client: Client::new(),
            base_url,
            api_key,
            collection,
            embedder,
        }
    }

    fn candidate_from_hit(hit: &Value) -> Candidate {
        let payload = &hit["payload"];
        Candidate {
            content: payload["content"].as_str().unwrap_or_default().to_string(),
            metadata: payload["metadata"]
                .as_object()
                .cloned()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Retriever for QdrantRetriever {
    async fn retrieve(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Candidate>> {
        let vector = self.embedder.embed(query).await?;

        let mut request = self
            .client
            .post(format!(
                "{}/collections/{}/points/search",
                self.base_url, self.collection
            ))
            .json(&json!({
                "vector": vector,
                "limit": limit,
                "with_payload": true,
            }));

        if let Some(api_key) = &self.api_key {
            request = request.header("api-key", api_key);
        }

        let response = request
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let hits = response["result"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing result"))?;

        let candidates: Vec<Candidate> = hits.iter().map(Self::candidate_from_hit).collect();

        info!(
            "Qdrant search on {} returned {} hits",
            self.collection,
            candidates.len()
        );

        Ok(candidates)
    }
}
