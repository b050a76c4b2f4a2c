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

//! Turn orchestration for the vendra shopping assistant.
//!
//! A user turn flows through a small directed graph of steps: load the
//! working-memory context, classify intent, retrieve candidates, judge them
//! (with a bounded retry loop), render a grounded reply, and fold the
//! exchange back into the working memory. The graph executor, the typed turn
//! state, and the steps themselves all live in this crate; the collaborators
//! they call (classification, retrieval, judgment, generation) are injected
//! behind the `vendra_core` traits.
//!
//! # Key pieces
//! - [`TurnState`] / [`StateUpdate`] - state threaded through the steps
//! - [`engine::WorkflowGraph`] - validated step graph with conditional edges
//! - [`TurnWorkflow`] - the assembled product-search / FAQ workflow
//! - [`mention::correlate`] - post-generation candidate surfacing

pub mod engine;
pub mod error;
pub mod memory;
pub mod mention;
pub mod prompts;
pub mod query;
pub mod state;
pub mod steps;
mod turn;

pub use engine::{Edge, Target, WorkflowGraph, WorkflowGraphBuilder, WorkflowStep};
pub use error::{GraphError, WorkflowError};
pub use query::{VagueMatcherConfig, VagueQueryMatcher, default_vague_patterns};
pub use state::{MAX_ATTEMPTS, StateUpdate, TurnState};
pub use turn::{Collaborators, TurnWorkflow};
