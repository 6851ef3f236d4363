/// Diesel-based implementation of ExportJobRepository
///
/// Counter updates and lifecycle transitions are single UPDATE statements so
/// nothing is lost when multiple writers touch the same job.
use crate::modules::export::domain::entities::{ExportJob, ExportJobStatus, NewExportJob};
use crate::modules::export::domain::repository::ExportJobRepository;
use crate::modules::export::infrastructure::models::{ExportJobModel, NewExportJobModel};
use crate::schema::mal_export_jobs;
use crate::shared::database::{DbConnection, DbPool};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

pub struct ExportJobRepositoryImpl {
    pool: DbPool,
}

impl ExportJobRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }
}

#[async_trait]
impl ExportJobRepository for ExportJobRepositoryImpl {
    async fn create(&self, job: NewExportJob) -> AppResult<ExportJob> {
        let new_job = NewExportJobModel::from(job);
        let mut conn = self.get_conn()?;

        let inserted: ExportJobModel = diesel::insert_into(mal_export_jobs::table)
            .values(&new_job)
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create export job: {}", e)))?;

        Ok(inserted.into_domain())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<ExportJob>> {
        let mut conn = self.get_conn()?;

        let job: Option<ExportJobModel> = mal_export_jobs::table
            .find(id)
            .select(ExportJobModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get export job: {}", e)))?;

        Ok(job.map(|j| j.into_domain()))
    }

    async fn get_active_by_user(&self, user_id: Uuid) -> AppResult<Option<ExportJob>> {
        let mut conn = self.get_conn()?;

        let job: Option<ExportJobModel> = mal_export_jobs::table
            .filter(mal_export_jobs::user_id.eq(user_id))
            .filter(mal_export_jobs::status.eq_any(vec![
                ExportJobStatus::Pending,
                ExportJobStatus::Processing,
            ]))
            .order(mal_export_jobs::created_at.desc())
            .select(ExportJobModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to get active export job: {}", e))
            })?;

        Ok(job.map(|j| j.into_domain()))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ExportJob>> {
        let mut conn = self.get_conn()?;

        let jobs: Vec<ExportJobModel> = mal_export_jobs::table
            .filter(mal_export_jobs::user_id.eq(user_id))
            .order(mal_export_jobs::created_at.desc())
            .select(ExportJobModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to list export jobs: {}", e)))?;

        Ok(jobs.into_iter().map(|j| j.into_domain()).collect())
    }

    async fn set_total(&self, id: Uuid, total: i32) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(
            "UPDATE mal_export_jobs
             SET total_anime = $2,
                 status = 'processing',
                 started_at = NOW(),
                 updated_at = NOW()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind::<diesel::sql_types::Uuid, _>(id)
        .bind::<diesel::sql_types::Integer, _>(total)
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to set export job total: {}", e)))?;

        Ok(())
    }

    async fn increment_counters(
        &self,
        id: Uuid,
        loaded: i32,
        skipped: i32,
        failed: i32,
    ) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        // processed is kept as the sum in the same statement; a terminal
        // parent (completed, failed or cancelled) matches zero rows, which
        // is how late child increments are ignored after cancellation.
        diesel::sql_query(
            "UPDATE mal_export_jobs
             SET processed_anime = processed_anime + $2 + $3 + $4,
                 loaded_anime = loaded_anime + $2,
                 skipped_anime = skipped_anime + $3,
                 failed_anime = failed_anime + $4,
                 updated_at = NOW()
             WHERE id = $1 AND status IN ('pending', 'processing')",
        )
        .bind::<diesel::sql_types::Uuid, _>(id)
        .bind::<diesel::sql_types::Integer, _>(loaded)
        .bind::<diesel::sql_types::Integer, _>(skipped)
        .bind::<diesel::sql_types::Integer, _>(failed)
        .execute(&mut conn)
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to increment export counters: {}", e))
        })?;

        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ExportJobStatus) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        if status.is_terminal() {
            diesel::sql_query(
                "UPDATE mal_export_jobs
                 SET status = $2::export_status,
                     completed_at = NOW(),
                     updated_at = NOW()
                 WHERE id = $1 AND status IN ('pending', 'processing')",
            )
            .bind::<diesel::sql_types::Uuid, _>(id)
            .bind::<diesel::sql_types::Text, _>(status.to_string())
            .execute(&mut conn)
        } else {
            diesel::sql_query(
                "UPDATE mal_export_jobs
                 SET status = $2::export_status,
                     updated_at = NOW()
                 WHERE id = $1",
            )
            .bind::<diesel::sql_types::Uuid, _>(id)
            .bind::<diesel::sql_types::Text, _>(status.to_string())
            .execute(&mut conn)
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to update export status: {}", e)))?;

        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(
            "UPDATE mal_export_jobs
             SET status = 'failed',
                 error_message = $2,
                 completed_at = NOW(),
                 updated_at = NOW()
             WHERE id = $1 AND status IN ('pending', 'processing')",
        )
        .bind::<diesel::sql_types::Uuid, _>(id)
        .bind::<diesel::sql_types::Text, _>(message)
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to set export error: {}", e)))?;

        Ok(())
    }
}
