//! Treatment plan persistence
//!
//! The treatment service only talks to [`PlanStore`]; the adapters below are
//! interchangeable backing stores selected by configuration.

pub mod file;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use shared::TreatmentPlan;
use thiserror::Error;
use uuid::Uuid;

pub use file::JsonFilePlanStore;
pub use memory::InMemoryPlanStore;
pub use postgres::PgPlanStore;

/// Plan store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Plan {0} does not exist")]
    Missing(Uuid),

    #[error("Plan {0} already exists")]
    Duplicate(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt plan record {id}: {reason}")]
    Corrupt { id: Uuid, reason: &'static str },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage for treatment plans.
///
/// Each call is a single request/response and is atomic from the caller's
/// point of view: a plan is either fully written or not at all.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Short adapter name for health reporting
    fn backend_name(&self) -> &'static str;

    /// Persist a new plan and return its id
    async fn save(&self, plan: &TreatmentPlan) -> StoreResult<Uuid>;

    /// Fetch one plan
    async fn load(&self, id: Uuid) -> StoreResult<Option<TreatmentPlan>>;

    /// Fetch every plan in creation order
    async fn load_all(&self) -> StoreResult<Vec<TreatmentPlan>>;

    /// Replace an existing plan
    async fn update(&self, plan: &TreatmentPlan) -> StoreResult<()>;
}
