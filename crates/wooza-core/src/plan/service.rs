//! Plan service layer.
//!
//! Orchestrates validation, the `plan_code` uniqueness check and the store
//! for the four catalogue operations. All checks run before any write.

use std::sync::Arc;

use tracing::{debug, info};

use wooza_db::models::{NewPlan, Plan};

use super::error::PlanError;
use super::filter::{QueryParams, build_filter};
use super::payload::PlanPayload;
use super::validate::{parse_changes, parse_new_plan};
use crate::choices::Choices;
use crate::store::PlanStore;

/// Entry point for plan operations. Cheap to clone.
#[derive(Clone)]
pub struct PlanService {
    store: Arc<dyn PlanStore>,
    choices: Arc<Choices>,
}

impl PlanService {
    pub fn new(store: Arc<dyn PlanStore>, choices: Arc<Choices>) -> Self {
        Self { store, choices }
    }

    /// Validate and persist a new plan.
    ///
    /// Fails with [`PlanError::Invalid`] on field errors and with
    /// [`PlanError::CodeExists`] when another plan already uses the code.
    pub async fn create(&self, payload: &PlanPayload) -> Result<Plan, PlanError> {
        let new = parse_new_plan(payload, &self.choices).map_err(PlanError::Invalid)?;

        if self.store.code_exists(&new.plan_code).await? {
            return Err(PlanError::CodeExists(new.plan_code));
        }

        let plan = self.store.insert(&new).await?;
        info!(id = plan.id, plan_code = %plan.plan_code, "plan created");
        Ok(plan)
    }

    /// Apply a partial update to plan `id`.
    ///
    /// Supplied fields replace stored ones; everything else is kept. A
    /// changed `plan_code` must not be in use by another plan.
    pub async fn update(&self, id: i32, payload: &PlanPayload) -> Result<Plan, PlanError> {
        let current = self.store.get(id).await?.ok_or(PlanError::NotFound(id))?;

        let changes = parse_changes(payload, &self.choices).map_err(PlanError::Invalid)?;

        if let Some(code) = changes.plan_code.as_deref() {
            if code != current.plan_code && self.store.code_exists(code).await? {
                return Err(PlanError::CodeExists(code.to_owned()));
            }
        }

        let candidate = changes.apply_to(NewPlan::from(current));
        let plan = self
            .store
            .update(id, &candidate)
            .await?
            // Deleted between the read and the write.
            .ok_or(PlanError::NotFound(id))?;

        info!(id, plan_code = %plan.plan_code, "plan updated");
        Ok(plan)
    }

    /// Delete plan `id`, returning the record as it was before deletion.
    pub async fn delete(&self, id: i32) -> Result<Plan, PlanError> {
        let snapshot = self.store.get(id).await?.ok_or(PlanError::NotFound(id))?;

        if !self.store.delete(id).await? {
            return Err(PlanError::NotFound(id));
        }

        info!(id, plan_code = %snapshot.plan_code, "plan deleted");
        Ok(snapshot)
    }

    /// List plans matching the query parameters (see [`build_filter`]).
    pub async fn list(&self, params: &QueryParams) -> Result<Vec<Plan>, PlanError> {
        let filter = build_filter(params)?;
        debug!(filtered = filter.is_some(), "listing plans");
        Ok(self.store.list(filter.as_ref()).await?)
    }

    /// Whether any plan already uses `plan_code`.
    pub async fn code_exists(&self, plan_code: &str) -> Result<bool, PlanError> {
        Ok(self.store.code_exists(plan_code).await?)
    }
}
