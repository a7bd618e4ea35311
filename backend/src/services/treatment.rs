//! Treatment plan service: plan generation and step completion

use std::sync::Arc;

use shared::{Diagnosis, PlanProgress, ReferenceData, TreatmentPlan};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::store::PlanStore;

/// Treatment service for managing treatment plans
#[derive(Clone)]
pub struct TreatmentService {
    store: Arc<dyn PlanStore>,
    reference: Arc<ReferenceData>,
    clock: Arc<dyn Clock>,
}

impl TreatmentService {
    /// Create a new TreatmentService instance
    pub fn new(
        store: Arc<dyn PlanStore>,
        reference: Arc<ReferenceData>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            reference,
            clock,
        }
    }

    /// Generate and persist a plan for a diagnosis.
    ///
    /// A disease missing from the catalog yields a plan with no steps.
    pub async fn create_plan(&self, diagnosis: &Diagnosis) -> AppResult<TreatmentPlan> {
        let templates = self.reference.treatment_steps(&diagnosis.disease_type);
        if templates.is_empty() {
            tracing::warn!(
                "No treatment catalog entry for disease '{}'; creating empty plan",
                diagnosis.disease_type
            );
        }

        let plan = TreatmentPlan::generate(
            Uuid::new_v4(),
            diagnosis.disease_type.trim(),
            templates,
            self.clock.now(),
        );

        self.store.save(&plan).await?;

        tracing::info!(
            "Created treatment plan {} for '{}' with {} steps",
            plan.id,
            plan.disease_type,
            plan.steps.len()
        );

        Ok(plan)
    }

    /// Mark a step completed.
    ///
    /// Completing an already completed step changes nothing and writes
    /// nothing. Store failures are returned to the caller.
    pub async fn complete_step(&self, plan_id: Uuid, step_id: &str) -> AppResult<TreatmentPlan> {
        let mut plan = self
            .store
            .load(plan_id)
            .await?
            .ok_or(AppError::PlanNotFound(plan_id))?;

        let now = self.clock.now();
        let step = plan
            .step_mut(step_id)
            .ok_or_else(|| AppError::StepNotFound {
                plan_id,
                step_id: step_id.to_string(),
            })?;

        if !step.complete(now) {
            tracing::debug!("Step {} of plan {} already completed", step_id, plan_id);
            return Ok(plan);
        }

        self.store.update(&plan).await?;

        tracing::info!("Completed step {} of treatment plan {}", step_id, plan_id);

        Ok(plan)
    }

    /// All plans in creation order; empty when the store cannot be read
    pub async fn list_plans(&self) -> Vec<TreatmentPlan> {
        match self.store.load_all().await {
            Ok(plans) => plans,
            Err(e) => {
                tracing::warn!("Failed to load treatment plans, returning none: {}", e);
                Vec::new()
            }
        }
    }

    /// Get a treatment plan by ID
    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<TreatmentPlan> {
        self.store
            .load(plan_id)
            .await?
            .ok_or(AppError::PlanNotFound(plan_id))
    }

    /// Most recently created plan, if any
    pub async fn latest_plan(&self) -> Option<TreatmentPlan> {
        self.list_plans().await.pop()
    }

    /// Completion summary for a plan
    pub async fn plan_progress(&self, plan_id: Uuid) -> AppResult<PlanProgress> {
        Ok(self.get_plan(plan_id).await?.progress())
    }
}
