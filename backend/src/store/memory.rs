//! In-process plan store

use std::sync::Arc;

use async_trait::async_trait;
use shared::TreatmentPlan;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PlanStore, StoreError, StoreResult};

/// Plans kept in memory in creation order; lost on restart
#[derive(Clone, Default)]
pub struct InMemoryPlanStore {
    plans: Arc<RwLock<Vec<TreatmentPlan>>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, plan: &TreatmentPlan) -> StoreResult<Uuid> {
        let mut plans = self.plans.write().await;
        if plans.iter().any(|p| p.id == plan.id) {
            return Err(StoreError::Duplicate(plan.id));
        }
        plans.push(plan.clone());
        Ok(plan.id)
    }

    async fn load(&self, id: Uuid) -> StoreResult<Option<TreatmentPlan>> {
        let plans = self.plans.read().await;
        Ok(plans.iter().find(|p| p.id == id).cloned())
    }

    async fn load_all(&self) -> StoreResult<Vec<TreatmentPlan>> {
        Ok(self.plans.read().await.clone())
    }

    async fn update(&self, plan: &TreatmentPlan) -> StoreResult<()> {
        let mut plans = self.plans.write().await;
        let slot = plans
            .iter_mut()
            .find(|p| p.id == plan.id)
            .ok_or(StoreError::Missing(plan.id))?;
        *slot = plan.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::StepTemplate;

    fn plan(disease: &str) -> TreatmentPlan {
        TreatmentPlan::generate(
            Uuid::new_v4(),
            disease,
            &[StepTemplate::new("Apply fungicide", 1)],
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryPlanStore::new();
        let plan = plan("early_blight");

        let id = store.save(&plan).await.unwrap();
        assert_eq!(id, plan.id);
        assert_eq!(store.load(id).await.unwrap(), Some(plan));
        assert_eq!(store.load(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_all_keeps_creation_order() {
        let store = InMemoryPlanStore::new();
        let first = plan("early_blight");
        let second = plan("late_blight");
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn test_update_missing_plan_fails() {
        let store = InMemoryPlanStore::new();
        let result = store.update(&plan("early_blight")).await;
        assert!(matches!(result, Err(StoreError::Missing(_))));
    }

    #[tokio::test]
    async fn test_duplicate_save_rejected() {
        let store = InMemoryPlanStore::new();
        let plan = plan("early_blight");
        store.save(&plan).await.unwrap();
        assert!(matches!(
            store.save(&plan).await,
            Err(StoreError::Duplicate(_))
        ));
    }
}
