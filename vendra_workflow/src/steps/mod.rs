//! Workflow steps for the product-search and FAQ branches.
//!
//! Each step holds its collaborators behind `Arc<dyn Trait>` and implements
//! [`WorkflowStep`](crate::engine::WorkflowStep). The two conditional
//! decision functions the graph uses (`route_outcome`,
//! `evaluation_outcome`) live next to the steps whose output they consume.

mod evaluate;
mod faq;
mod generate;
mod router;
mod search;

pub use evaluate::{EvaluateStep, JUDGE_CANDIDATE_CAP, evaluation_outcome};
pub use faq::{FAQ_SEARCH_LIMIT, FaqStep};
pub use generate::GenerateStep;
pub use router::{RouterStep, route_outcome};
pub use search::{PRODUCT_SEARCH_LIMIT, SearchStep};
