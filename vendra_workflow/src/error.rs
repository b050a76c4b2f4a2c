use thiserror::Error;

/// Configuration errors raised while assembling a workflow graph.
///
/// All of these are detected when the graph builder validates, before a
/// graph can run.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("step registered twice: {0}")]
    DuplicateStep(&'static str),

    #[error("entry step is not registered: {0}")]
    UnknownEntry(&'static str),

    #[error("edge leaves unregistered step: {0}")]
    EdgeFromUnknownStep(&'static str),

    #[error("step {0} has more than one outgoing edge")]
    DuplicateEdge(&'static str),

    #[error("step {0} has no outgoing edge")]
    MissingEdge(&'static str),

    #[error("edge from {from} targets unregistered step: {to}")]
    UnknownTarget {
        from: &'static str,
        to: &'static str,
    },

    #[error("conditional edge from {from} leaves outcome unmapped: {outcome}")]
    UnmappedOutcome {
        from: &'static str,
        outcome: &'static str,
    },

    #[error("conditional edge from {from} maps undeclared outcome: {outcome}")]
    UndeclaredOutcome {
        from: &'static str,
        outcome: &'static str,
    },
}

/// Errors surfaced by running a turn through the workflow.
///
/// Only classification and final-response generation abort a turn; every
/// other collaborator failure is absorbed by the owning step.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("intent classification failed: {0}")]
    Classification(#[source] anyhow::Error),

    #[error("response generation failed: {0}")]
    Generation(#[source] anyhow::Error),

    #[error("turn carries no user message")]
    EmptyTurn,

    #[error("response step reached without a renderable route")]
    MissingRoute,

    #[error("no step registered under name: {0}")]
    MissingStep(&'static str),

    #[error("step {step} produced outcome with no mapped target: {outcome}")]
    UnhandledOutcome {
        step: &'static str,
        outcome: &'static str,
    },
}
