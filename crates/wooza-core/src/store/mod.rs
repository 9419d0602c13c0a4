//! The `PlanStore` trait -- the persistence seam behind the plan service.
//!
//! [`PgPlanStore`] is the production backend. [`MemoryPlanStore`] keeps
//! plans in process memory for tests and `wooza serve --in-memory`.
//!
//! Stores do not enforce `plan_code` uniqueness; the service checks
//! [`PlanStore::code_exists`] before writing, without holding a lock.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;

use wooza_db::filter::PlanFilter;
use wooza_db::models::{NewPlan, Plan};

pub use memory::MemoryPlanStore;
pub use postgres::PgPlanStore;

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persist a new plan and return it with its assigned id.
    async fn insert(&self, plan: &NewPlan) -> Result<Plan>;

    async fn get(&self, id: i32) -> Result<Option<Plan>>;

    /// Overwrite an existing plan. `None` if the id is unknown.
    async fn update(&self, id: i32, plan: &NewPlan) -> Result<Option<Plan>>;

    /// Remove a plan. `false` if the id is unknown.
    async fn delete(&self, id: i32) -> Result<bool>;

    /// Plans ordered by id, narrowed by `filter` when given.
    async fn list(&self, filter: Option<&PlanFilter>) -> Result<Vec<Plan>>;

    async fn code_exists(&self, plan_code: &str) -> Result<bool>;
}
