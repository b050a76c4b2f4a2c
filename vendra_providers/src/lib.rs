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

//! Concrete collaborator implementations over HTTP.
//!
//! [`GeminiProvider`] backs the LLM-facing seams (classification, judgment,
//! generation, embeddings); [`QdrantRetriever`] backs semantic search over a
//! named collection.

mod gemini;
mod qdrant;
pub mod retry;

pub use gemini::GeminiProvider;
pub use qdrant::QdrantRetriever;
