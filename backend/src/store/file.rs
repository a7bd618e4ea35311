//! JSON document plan store
//!
//! All plans live in one JSON array on disk. Every write rewrites the whole
//! document through a temporary file and a rename, so a crash leaves either
//! the old or the new document, never a partial one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::{validate_plan, TreatmentPlan};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{PlanStore, StoreError, StoreResult};

/// Plan store backed by a single JSON file
pub struct JsonFilePlanStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFilePlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StoreResult<Vec<TreatmentPlan>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let plans: Vec<TreatmentPlan> = serde_json::from_slice(&bytes)?;
        for plan in &plans {
            validate_plan(plan).map_err(|reason| StoreError::Corrupt {
                id: plan.id,
                reason,
            })?;
        }
        Ok(plans)
    }

    async fn write_all(&self, plans: &[TreatmentPlan]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(plans)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(&json).await?;
        // contents must be durable before the rename publishes them
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PlanStore for JsonFilePlanStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn save(&self, plan: &TreatmentPlan) -> StoreResult<Uuid> {
        let _guard = self.lock.lock().await;
        let mut plans = self.read_all().await?;
        if plans.iter().any(|p| p.id == plan.id) {
            return Err(StoreError::Duplicate(plan.id));
        }
        plans.push(plan.clone());
        self.write_all(&plans).await?;
        Ok(plan.id)
    }

    async fn load(&self, id: Uuid) -> StoreResult<Option<TreatmentPlan>> {
        let _guard = self.lock.lock().await;
        let plans = self.read_all().await?;
        Ok(plans.into_iter().find(|p| p.id == id))
    }

    async fn load_all(&self) -> StoreResult<Vec<TreatmentPlan>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn update(&self, plan: &TreatmentPlan) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut plans = self.read_all().await?;
        let slot = plans
            .iter_mut()
            .find(|p| p.id == plan.id)
            .ok_or(StoreError::Missing(plan.id))?;
        *slot = plan.clone();
        self.write_all(&plans).await
    }
}
