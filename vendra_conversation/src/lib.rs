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

//! The session boundary around the turn workflow.
//!
//! This crate owns what the engine deliberately does not: per-session
//! message history, the store it lives in, and the [`ChatService`] that
//! turns one user message into a reply plus the products actually offered
//! in it. The engine itself stays stateless; a turn is assembled from the
//! stored history, run to completion, and only then written back.

mod service;
mod session;
mod store;

pub use service::{ChatError, ChatService, FALLBACK_REPLY, TurnOutcome};
pub use session::ConversationSession;
pub use store::{InMemorySessionStore, SessionStore};
