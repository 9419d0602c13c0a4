use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use wooza_db::filter::PlanFilter;
use wooza_db::models::{NewPlan, Plan};
use wooza_db::queries::plans as plan_db;

use super::PlanStore;

/// [`PlanStore`] backed by the `plans` table.
#[derive(Debug, Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn insert(&self, plan: &NewPlan) -> Result<Plan> {
        plan_db::insert_plan(&self.pool, plan).await
    }

    async fn get(&self, id: i32) -> Result<Option<Plan>> {
        plan_db::get_plan(&self.pool, id).await
    }

    async fn update(&self, id: i32, plan: &NewPlan) -> Result<Option<Plan>> {
        plan_db::update_plan(&self.pool, id, plan).await
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        plan_db::delete_plan(&self.pool, id).await
    }

    async fn list(&self, filter: Option<&PlanFilter>) -> Result<Vec<Plan>> {
        plan_db::list_plans(&self.pool, filter).await
    }

    async fn code_exists(&self, plan_code: &str) -> Result<bool> {
        plan_db::plan_code_exists(&self.pool, plan_code).await
    }
}
