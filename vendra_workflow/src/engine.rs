//! Directed step graph with validated conditional edges.
//!
//! A graph is a set of named steps, one entry point, and exactly one
//! outgoing edge per step. Edges are either unconditional or conditional: a
//! conditional edge carries a pure selector over the merged state together
//! with the full set of outcome labels the selector can produce and a target
//! for each. Exhaustiveness is checked when the graph is built, so an
//! unmapped outcome is a configuration error rather than a runtime surprise.
//!
//! Execution is sequential: run the current step, merge its
//! [`StateUpdate`], follow the edge, repeat until a terminal edge is
//! reached. The graph itself holds no mutable state; concurrent turns each
//! own their [`TurnState`].

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{GraphError, WorkflowError};
use crate::state::{StateUpdate, TurnState};

/// A single unit of work in the graph.
#[async_trait]
pub trait WorkflowStep: Send + Sync {
    /// Stable name this step is registered and addressed under.
    fn name(&self) -> &'static str;

    /// Execute against the current state, producing a partial update.
    async fn run(&self, state: &TurnState) -> Result<StateUpdate, WorkflowError>;
}

/// Where a conditional outcome leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Step(&'static str),
    End,
}

/// Pure decision function over the merged state.
pub type OutcomeSelector = fn(&TurnState) -> &'static str;

/// Outgoing edge of a step.
pub enum Edge {
    /// Always continue with the named step.
    To(&'static str),
    /// Terminate the run.
    End,
    /// Pick the next step from the selector's outcome.
    Conditional {
        selector: OutcomeSelector,
        targets: HashMap<&'static str, Target>,
    },
}

/// Builder collecting steps and edges; all validation happens in
/// [`Self::build`].
#[derive(Default)]
pub struct WorkflowGraphBuilder {
    entry: Option<&'static str>,
    steps: Vec<Box<dyn WorkflowStep>>,
    edges: Vec<(&'static str, EdgeSpec)>,
}

enum EdgeSpec {
    To(&'static str),
    End,
    Conditional {
        selector: OutcomeSelector,
        outcomes: Vec<&'static str>,
        targets: Vec<(&'static str, Target)>,
    },
}

impl WorkflowGraphBuilder {
    #[must_use]
    pub fn new(entry: &'static str) -> Self {
        Self {
            entry: Some(entry),
            ..Self::default()
        }
    }

    /// Register a step under its own name.
    #[must_use]
    pub fn step(mut self, step: Box<dyn WorkflowStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Unconditional edge between two steps.
    #[must_use]
    pub fn edge(mut self, from: &'static str, to: &'static str) -> Self {
        self.edges.push((from, EdgeSpec::To(to)));
        self
    }

    /// Mark a step as flowing into the terminal sink.
    #[must_use]
    pub fn edge_to_end(mut self, from: &'static str) -> Self {
        self.edges.push((from, EdgeSpec::End));
        self
    }

    /// Conditional edge: `outcomes` declares every label the selector can
    /// produce, `targets` maps each label to its destination.
    #[must_use]
    pub fn conditional(
        mut self,
        from: &'static str,
        selector: OutcomeSelector,
        outcomes: &[&'static str],
        targets: &[(&'static str, Target)],
    ) -> Self {
        self.edges.push((
            from,
            EdgeSpec::Conditional {
                selector,
                outcomes: outcomes.to_vec(),
                targets: targets.to_vec(),
            },
        ));
        self
    }

    /// Validate the configuration and produce a runnable graph.
    pub fn build(self) -> Result<WorkflowGraph, GraphError> {
        let mut steps: HashMap<&'static str, Box<dyn WorkflowStep>> = HashMap::new();
        for step in self.steps {
            let name = step.name();
            if steps.insert(name, step).is_some() {
                return Err(GraphError::DuplicateStep(name));
            }
        }

        let entry = self.entry.unwrap_or("");
        if !steps.contains_key(entry) {
            return Err(GraphError::UnknownEntry(entry));
        }

        let mut edges: HashMap<&'static str, Edge> = HashMap::new();
        for (from, spec) in self.edges {
            if !steps.contains_key(from) {
                return Err(GraphError::EdgeFromUnknownStep(from));
            }

            let edge = match spec {
                EdgeSpec::To(to) => {
                    if !steps.contains_key(to) {
                        return Err(GraphError::UnknownTarget { from, to });
                    }
                    Edge::To(to)
                }
                EdgeSpec::End => Edge::End,
                EdgeSpec::Conditional {
                    selector,
                    outcomes,
                    targets,
                } => {
                    let mut mapped: HashMap<&'static str, Target> = HashMap::new();
                    for (outcome, target) in targets {
                        if !outcomes.contains(&outcome) {
                            return Err(GraphError::UndeclaredOutcome { from, outcome });
                        }
                        if let Target::Step(to) = target {
                            if !steps.contains_key(to) {
                                return Err(GraphError::UnknownTarget { from, to });
                            }
                        }
                        mapped.insert(outcome, target);
                    }
                    for outcome in outcomes {
                        if !mapped.contains_key(outcome) {
                            return Err(GraphError::UnmappedOutcome { from, outcome });
                        }
                    }
                    Edge::Conditional {
                        selector,
                        targets: mapped,
                    }
                }
            };

            if edges.insert(from, edge).is_some() {
                return Err(GraphError::DuplicateEdge(from));
            }
        }

        for name in steps.keys() {
            if !edges.contains_key(name) {
                return Err(GraphError::MissingEdge(*name));
            }
        }

        Ok(WorkflowGraph {
            entry,
            steps,
            edges,
        })
    }
}

/// A validated, runnable step graph.
pub struct WorkflowGraph {
    entry: &'static str,
    steps: HashMap<&'static str, Box<dyn WorkflowStep>>,
    edges: HashMap<&'static str, Edge>,
}

impl WorkflowGraph {
    /// Run one turn to completion, returning the final merged state.
    pub async fn run(&self, mut state: TurnState) -> Result<TurnState, WorkflowError> {
        let mut current = self.entry;

        loop {
            let step = self
                .steps
                .get(current)
                .ok_or(WorkflowError::MissingStep(current))?;

            debug!("running step: {current}");
            let update = step.run(&state).await?;
            state.apply(update);

            let edge = self
                .edges
                .get(current)
                .ok_or(WorkflowError::MissingStep(current))?;

            match edge {
                Edge::End => return Ok(state),
                Edge::To(next) => current = *next,
                Edge::Conditional { selector, targets } => {
                    let outcome = selector(&state);
                    debug!("step {current} decided: {outcome}");
                    match targets.get(outcome).copied() {
                        Some(Target::Step(next)) => current = next,
                        Some(Target::End) => return Ok(state),
                        None => {
                            return Err(WorkflowError::UnhandledOutcome {
                                step: current,
                                outcome,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Name of the entry step.
    #[must_use]
    pub const fn entry(&self) -> &'static str {
        self.entry
    }
}
