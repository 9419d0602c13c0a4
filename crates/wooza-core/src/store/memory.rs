use std::collections::BTreeMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;

use wooza_db::filter::PlanFilter;
use wooza_db::models::{NewPlan, Plan};

use super::PlanStore;

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    plans: BTreeMap<i32, Plan>,
}

/// In-process [`PlanStore`]. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    inner: RwLock<Inner>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.plans.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn insert(&self, plan: &NewPlan) -> Result<Plan> {
        let mut inner = self.inner.write().await;
        let Some(id) = inner.next_id.checked_add(1) else {
            bail!("plan id space exhausted");
        };
        inner.next_id = id;
        let stored = Plan::from_new(id, plan.clone());
        inner.plans.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i32) -> Result<Option<Plan>> {
        Ok(self.inner.read().await.plans.get(&id).cloned())
    }

    async fn update(&self, id: i32, plan: &NewPlan) -> Result<Option<Plan>> {
        let mut inner = self.inner.write().await;
        Ok(inner.plans.get_mut(&id).map(|slot| {
            *slot = Plan::from_new(id, plan.clone());
            slot.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        Ok(self.inner.write().await.plans.remove(&id).is_some())
    }

    async fn list(&self, filter: Option<&PlanFilter>) -> Result<Vec<Plan>> {
        let inner = self.inner.read().await;
        Ok(inner
            .plans
            .values()
            .filter(|plan| filter.is_none_or(|f| f.matches(plan)))
            .cloned()
            .collect())
    }

    async fn code_exists(&self, plan_code: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.plans.values().any(|plan| plan.plan_code == plan_code))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use wooza_db::filter::Predicate;

    use super::*;

    fn new_plan(code: &str, ddds: &[i32]) -> NewPlan {
        NewPlan {
            plan_code: code.to_owned(),
            minutes: 100,
            internet: "10GB".to_owned(),
            price: Decimal::new(2975, 2),
            plan_type: "pós".to_owned(),
            operator: "oi".to_owned(),
            ddds: ddds.to_vec(),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused() {
        let store = MemoryPlanStore::new();
        let a = store.insert(&new_plan("a", &[21])).await.unwrap();
        let b = store.insert(&new_plan("b", &[21])).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete(b.id).await.unwrap());
        let c = store.insert(&new_plan("c", &[21])).await.unwrap();
        assert_eq!(c.id, 3);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let store = MemoryPlanStore::new();
        assert!(store.update(9, &new_plan("x", &[])).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn list_applies_filter() {
        let store = MemoryPlanStore::new();
        store.insert(&new_plan("a", &[21, 22])).await.unwrap();
        store.insert(&new_plan("b", &[11])).await.unwrap();

        let filter = PlanFilter::new(vec![Predicate::DddsContain(vec![22])]);
        let found = store.list(Some(&filter)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].plan_code, "a");
        assert_eq!(store.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn code_exists_is_exact() {
        let store = MemoryPlanStore::new();
        store.insert(&new_plan("OiPro100", &[21])).await.unwrap();
        assert!(store.code_exists("OiPro100").await.unwrap());
        assert!(!store.code_exists("oipro100").await.unwrap());
    }
}
