//! The assembled shopping-assistant workflow.

use std::sync::Arc;

use vendra_core::{ChatMessage, IntentClassifier, ResultJudge, Retriever, TextGenerator};

use crate::engine::{Target, WorkflowGraph, WorkflowGraphBuilder};
use crate::error::{GraphError, WorkflowError};
use crate::memory::{LoadMemory, UpdateMemory};
use crate::query::VagueQueryMatcher;
use crate::state::TurnState;
use crate::steps::{
    EvaluateStep, FaqStep, GenerateStep, RouterStep, SearchStep, evaluation_outcome, route_outcome,
};

/// The external collaborators a workflow run depends on. All of them are
/// injected, so tests can substitute deterministic doubles.
pub struct Collaborators {
    pub classifier: Arc<dyn IntentClassifier>,
    pub product_retriever: Arc<dyn Retriever>,
    pub faq_retriever: Arc<dyn Retriever>,
    pub judge: Arc<dyn ResultJudge>,
    pub generator: Arc<dyn TextGenerator>,
}

/// The standard turn workflow:
///
/// ```text
/// load_memory -> router -+-> search -> evaluator -+-> generate -> update_memory -> End
///                        |      ^-----(retry)-----+
///                        +-> faq ----------------/
///                        +-> End (no recognised intent)
/// ```
pub struct TurnWorkflow {
    graph: WorkflowGraph,
}

impl TurnWorkflow {
    /// Assemble the workflow with the default vague-query patterns.
    pub fn new(collaborators: Collaborators) -> Result<Self, GraphError> {
        Self::with_matcher(collaborators, VagueQueryMatcher::with_defaults())
    }

    /// Assemble the workflow with a custom vague-query matcher.
    pub fn with_matcher(
        collaborators: Collaborators,
        matcher: VagueQueryMatcher,
    ) -> Result<Self, GraphError> {
        let Collaborators {
            classifier,
            product_retriever,
            faq_retriever,
            judge,
            generator,
        } = collaborators;

        let graph = WorkflowGraphBuilder::new("load_memory")
            .step(Box::new(LoadMemory))
            .step(Box::new(RouterStep::new(classifier)))
            .step(Box::new(SearchStep::new(
                product_retriever,
                Arc::clone(&generator),
                matcher,
            )))
            .step(Box::new(EvaluateStep::new(judge)))
            .step(Box::new(FaqStep::new(faq_retriever)))
            .step(Box::new(GenerateStep::new(generator)))
            .step(Box::new(UpdateMemory))
            .edge("load_memory", "router")
            .conditional(
                "router",
                route_outcome,
                &["search", "faq", "end"],
                &[
                    ("search", Target::Step("search")),
                    ("faq", Target::Step("faq")),
                    ("end", Target::End),
                ],
            )
            .edge("search", "evaluator")
            .conditional(
                "evaluator",
                evaluation_outcome,
                &["generate", "search"],
                &[
                    ("generate", Target::Step("generate")),
                    ("search", Target::Step("search")),
                ],
            )
            .edge("faq", "generate")
            .edge("generate", "update_memory")
            .edge_to_end("update_memory")
            .build()?;

        Ok(Self { graph })
    }

    /// Run one turn over the session history (which must end with the new
    /// user message) and return the final state.
    pub async fn run(&self, messages: Vec<ChatMessage>) -> Result<TurnState, WorkflowError> {
        self.graph.run(TurnState::for_turn(messages)).await
    }
}
