//! PostgreSQL plan store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{TreatmentPlan, TreatmentStep};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{PlanStore, StoreError, StoreResult};

/// Plan store backed by the `treatment_plans` table.
///
/// Steps are kept as one JSONB document per plan so a plan is always written
/// by a single statement.
#[derive(Clone)]
pub struct PgPlanStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct PlanRow {
    id: Uuid,
    disease_type: String,
    created_at: DateTime<Utc>,
    steps: Json<Vec<TreatmentStep>>,
}

impl From<PlanRow> for TreatmentPlan {
    fn from(row: PlanRow) -> Self {
        TreatmentPlan {
            id: row.id,
            disease_type: row.disease_type,
            created_at: row.created_at,
            steps: row.steps.0,
        }
    }
}

impl PgPlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn save(&self, plan: &TreatmentPlan) -> StoreResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO treatment_plans (id, disease_type, created_at, steps)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(plan.id)
        .bind(&plan.disease_type)
        .bind(plan.created_at)
        .bind(Json(&plan.steps))
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let duplicate =
                matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                StoreError::Duplicate(plan.id)
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(id)
    }

    async fn load(&self, id: Uuid) -> StoreResult<Option<TreatmentPlan>> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, disease_type, created_at, steps
            FROM treatment_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(TreatmentPlan::from))
    }

    async fn load_all(&self) -> StoreResult<Vec<TreatmentPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, disease_type, created_at, steps
            FROM treatment_plans
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(TreatmentPlan::from).collect())
    }

    async fn update(&self, plan: &TreatmentPlan) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE treatment_plans
            SET disease_type = $2, steps = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(plan.id)
        .bind(&plan.disease_type)
        .bind(Json(&plan.steps))
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(plan.id));
        }

        Ok(())
    }
}
