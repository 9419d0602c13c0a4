//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::filter::PlanFilter;
use crate::models::{NewPlan, Plan};

const PLAN_COLUMNS: &str = "id, plan_code, minutes, internet, price, plan_type, operator, ddds";

/// Insert a new plan row. Returns the inserted plan with its assigned id.
pub async fn insert_plan(pool: &PgPool, new: &NewPlan) -> Result<Plan> {
    let plan = sqlx::query_as::<_, Plan>(&format!(
        "INSERT INTO plans (plan_code, minutes, internet, price, plan_type, operator, ddds) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {PLAN_COLUMNS}"
    ))
    .bind(&new.plan_code)
    .bind(new.minutes)
    .bind(&new.internet)
    .bind(new.price)
    .bind(&new.plan_type)
    .bind(&new.operator)
    .bind(&new.ddds)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert plan {:?}", new.plan_code))?;

    Ok(plan)
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &PgPool, id: i32) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch plan")?;

    Ok(plan)
}

/// Overwrite every column of an existing plan.
///
/// Returns `None` when no row has the given id.
pub async fn update_plan(pool: &PgPool, id: i32, new: &NewPlan) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>(&format!(
        "UPDATE plans \
         SET plan_code = $1, minutes = $2, internet = $3, price = $4, \
             plan_type = $5, operator = $6, ddds = $7 \
         WHERE id = $8 \
         RETURNING {PLAN_COLUMNS}"
    ))
    .bind(&new.plan_code)
    .bind(new.minutes)
    .bind(&new.internet)
    .bind(new.price)
    .bind(&new.plan_type)
    .bind(&new.operator)
    .bind(&new.ddds)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update plan {id}"))?;

    Ok(plan)
}

/// Delete a plan. Returns `true` if a row was removed.
pub async fn delete_plan(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete plan {id}"))?;

    Ok(result.rows_affected() > 0)
}

/// List plans ordered by id, optionally narrowed by a filter.
pub async fn list_plans(pool: &PgPool, filter: Option<&PlanFilter>) -> Result<Vec<Plan>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {PLAN_COLUMNS} FROM plans"));
    if let Some(filter) = filter {
        filter.push_sql(&mut qb);
    }
    qb.push(" ORDER BY id");

    let plans = qb
        .build_query_as::<Plan>()
        .fetch_all(pool)
        .await
        .context("failed to list plans")?;

    Ok(plans)
}

/// Whether any plan already uses `plan_code`.
pub async fn plan_code_exists(pool: &PgPool, plan_code: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM plans WHERE plan_code = $1)")
        .bind(plan_code)
        .fetch_one(pool)
        .await
        .context("failed to check plan code")?;

    Ok(exists)
}
