//! Domain logic for the wooza plan catalogue: payload validation, list
//! filters, the store abstraction and the plan service.

pub mod choices;
pub mod plan;
pub mod store;

pub use choices::Choices;
pub use plan::{PlanError, PlanService};
pub use store::PlanStore;
