//! Treatment plan models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Disease diagnosis handed over by the image classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnosis {
    #[serde(rename = "type", alias = "disease_type")]
    pub disease_type: String,
}

impl Diagnosis {
    pub fn new(disease_type: impl Into<String>) -> Self {
        Self {
            disease_type: disease_type.into(),
        }
    }
}

/// Catalog entry for one remediation step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepTemplate {
    pub title: String,
    pub duration_days: u32,
}

impl StepTemplate {
    pub fn new(title: impl Into<String>, duration_days: u32) -> Self {
        Self {
            title: title.into(),
            duration_days,
        }
    }
}

/// Ordered remediation steps for one disease
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseTreatment {
    pub disease_type: String,
    pub steps: Vec<StepTemplate>,
}

/// Completion state of a treatment step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Completed,
}

/// One dated step of a treatment plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentStep {
    pub id: String,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: StepStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TreatmentStep {
    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    /// Mark the step completed at `at`.
    ///
    /// Returns `false` without touching `completed_at` when the step was
    /// already completed.
    pub fn complete(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_completed() {
            return false;
        }
        self.status = StepStatus::Completed;
        self.completed_at = Some(at);
        true
    }
}

/// Treatment plan generated for one diagnosed disease occurrence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentPlan {
    pub id: Uuid,
    pub disease_type: String,
    pub created_at: DateTime<Utc>,
    pub steps: Vec<TreatmentStep>,
}

impl TreatmentPlan {
    /// Build a plan with steps laid out from `created_at`
    pub fn generate(
        id: Uuid,
        disease_type: impl Into<String>,
        templates: &[StepTemplate],
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            disease_type: disease_type.into(),
            created_at,
            steps: lay_out_steps(templates, created_at),
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&TreatmentStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_mut(&mut self, step_id: &str) -> Option<&mut TreatmentStep> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    pub fn progress(&self) -> PlanProgress {
        let completed_steps = self.steps.iter().filter(|s| s.is_completed()).count();
        PlanProgress {
            total_steps: self.steps.len(),
            completed_steps,
            next_pending_step: self
                .steps
                .iter()
                .find(|s| !s.is_completed())
                .map(|s| s.id.clone()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.steps.iter().all(TreatmentStep::is_completed)
    }
}

/// Completion summary of a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanProgress {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub next_pending_step: Option<String>,
}

/// Lay out steps back to back starting at `start`.
///
/// Each step ends `duration_days` after it starts and the next one starts the
/// day after that. Ids are `step-1`, `step-2`, ... in catalog order.
pub fn lay_out_steps(templates: &[StepTemplate], start: DateTime<Utc>) -> Vec<TreatmentStep> {
    let mut cursor = start;
    templates
        .iter()
        .enumerate()
        .map(|(index, template)| {
            let start_date = cursor;
            let end_date = start_date + Duration::days(i64::from(template.duration_days));
            cursor = end_date + Duration::days(1);
            TreatmentStep {
                id: format!("step-{}", index + 1),
                title: template.title.clone(),
                start_date,
                end_date,
                status: StepStatus::Pending,
                completed_at: None,
            }
        })
        .collect()
}
