/// Diesel-based implementation of TaskRepository
///
/// Uses PostgreSQL with FOR UPDATE SKIP LOCKED polling and compare-and-swap
/// claims so that concurrent workers never process the same task twice.
use crate::modules::tasks::domain::entities::{
    AnimeLoadTask, NewAnimeLoadTask, ResolutionMethod, TaskStats, TaskStatus,
};
use crate::modules::tasks::domain::repository::TaskRepository;
use crate::modules::tasks::infrastructure::models::{AnimeLoadTaskModel, NewTaskModel};
use crate::schema::anime_load_tasks;
use crate::shared::database::{DbConnection, DbPool};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, export_job_id, user_id, mal_id, mal_title, \
     mal_title_japanese, mal_title_english, status, priority, attempt_count, \
     max_attempts, last_error, next_retry_at, resolved_shikimori_id, \
     resolved_anime_id, resolution_method, created_at, updated_at";

/// Helper struct for COUNT queries
#[derive(QueryableByName)]
struct StatusCount {
    #[diesel(sql_type = diesel::sql_types::Text)]
    status: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

pub struct TaskRepositoryImpl {
    pool: DbPool,
}

impl TaskRepositoryImpl {
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
impl TaskRepository for TaskRepositoryImpl {
    async fn create_batch(&self, tasks: Vec<NewAnimeLoadTask>) -> AppResult<usize> {
        if tasks.is_empty() {
            return Ok(0);
        }

        let rows: Vec<NewTaskModel> = tasks.into_iter().map(NewTaskModel::from).collect();
        let mut conn = self.get_conn()?;

        // Conflicts against the active-mal_id unique index are dropped, so a
        // re-submitted list never duplicates queued work.
        let inserted = diesel::insert_into(anime_load_tasks::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create tasks: {}", e)))?;

        Ok(inserted)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<AnimeLoadTask>> {
        let mut conn = self.get_conn()?;

        let task: Option<AnimeLoadTaskModel> = anime_load_tasks::table
            .find(id)
            .select(AnimeLoadTaskModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get task by id: {}", e)))?;

        Ok(task.map(|t| t.into_domain()))
    }

    async fn get_next_pending(&self, now: DateTime<Utc>) -> AppResult<Option<AnimeLoadTask>> {
        let mut conn = self.get_conn()?;

        // Priority tiers first, FIFO by updated_at inside a tier. updated_at
        // is bumped on claim and retry, which pushes re-tried tasks behind
        // fresh ones and gives round-robin fairness across users.
        let task: Option<AnimeLoadTaskModel> = diesel::sql_query(format!(
            "SELECT {TASK_COLUMNS}
             FROM anime_load_tasks
             WHERE status = 'pending'
               AND (next_retry_at IS NULL OR next_retry_at <= $1)
             ORDER BY priority DESC, updated_at ASC
             LIMIT 1
             FOR UPDATE SKIP LOCKED"
        ))
        .bind::<diesel::sql_types::Timestamptz, _>(now)
        .get_result(&mut conn)
        .optional()
        .map_err(|e| AppError::DatabaseError(format!("Failed to get next pending task: {}", e)))?;

        Ok(task.map(|t| t.into_domain()))
    }

    async fn claim(&self, id: Uuid) -> AppResult<Option<AnimeLoadTask>> {
        let mut conn = self.get_conn()?;

        // CAS from pending to processing; losing a race returns no row.
        // LEAST keeps attempt_count within max_attempts when reset_stuck
        // re-queues a task that crashed mid final attempt.
        let task: Option<AnimeLoadTaskModel> = diesel::sql_query(format!(
            "UPDATE anime_load_tasks
             SET status = 'processing',
                 attempt_count = LEAST(attempt_count + 1, max_attempts),
                 updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {TASK_COLUMNS}"
        ))
        .bind::<diesel::sql_types::Uuid, _>(id)
        .get_result(&mut conn)
        .optional()
        .map_err(|e| AppError::DatabaseError(format!("Failed to claim task: {}", e)))?;

        Ok(task.map(|t| t.into_domain()))
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        shikimori_id: &str,
        anime_id: Uuid,
        method: ResolutionMethod,
    ) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(
            "UPDATE anime_load_tasks
             SET status = 'completed',
                 resolved_shikimori_id = $2,
                 resolved_anime_id = $3,
                 resolution_method = $4,
                 last_error = NULL,
                 updated_at = NOW()
             WHERE id = $1 AND status = 'processing'",
        )
        .bind::<diesel::sql_types::Uuid, _>(id)
        .bind::<diesel::sql_types::Text, _>(shikimori_id)
        .bind::<diesel::sql_types::Uuid, _>(anime_id)
        .bind::<diesel::sql_types::Text, _>(method.to_string())
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark task completed: {}", e)))?;

        Ok(())
    }

    async fn mark_skipped(&self, id: Uuid, anime_id: Uuid) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(
            "UPDATE anime_load_tasks
             SET status = 'skipped',
                 resolved_anime_id = $2,
                 updated_at = NOW()
             WHERE id = $1 AND status = 'processing'",
        )
        .bind::<diesel::sql_types::Uuid, _>(id)
        .bind::<diesel::sql_types::Uuid, _>(anime_id)
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark task skipped: {}", e)))?;

        Ok(())
    }

    async fn mark_manual(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(
            "UPDATE anime_load_tasks
             SET status = 'manual', updated_at = NOW()
             WHERE id = $1 AND status = 'processing'",
        )
        .bind::<diesel::sql_types::Uuid, _>(id)
        .execute(&mut conn)
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to mark task for manual resolution: {}", e))
        })?;

        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        error: &str,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        // attempt_count was already incremented by claim; once it reaches
        // max_attempts the failure is terminal. A NULL next_retry_at is also
        // terminal: the caller withholds a retry time for permanent errors.
        diesel::sql_query(
            "UPDATE anime_load_tasks
             SET status = CASE
                     WHEN attempt_count >= max_attempts OR $3 IS NULL THEN 'failed'::task_status
                     ELSE 'pending'::task_status
                 END,
                 next_retry_at = CASE
                     WHEN attempt_count >= max_attempts THEN NULL
                     ELSE $3
                 END,
                 last_error = $2,
                 updated_at = NOW()
             WHERE id = $1 AND status = 'processing'",
        )
        .bind::<diesel::sql_types::Uuid, _>(id)
        .bind::<diesel::sql_types::Text, _>(error)
        .bind::<diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>, _>(next_retry_at)
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark task failed: {}", e)))?;

        Ok(())
    }

    async fn get_stats(&self, export_job_id: Uuid) -> AppResult<TaskStats> {
        let mut conn = self.get_conn()?;

        let counts: Vec<StatusCount> = diesel::sql_query(
            "SELECT status::text AS status, COUNT(*) AS count
             FROM anime_load_tasks
             WHERE export_job_id = $1
             GROUP BY status",
        )
        .bind::<diesel::sql_types::Uuid, _>(export_job_id)
        .load(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to get task stats: {}", e)))?;

        let mut stats = TaskStats::default();
        for row in counts {
            stats.total += row.count;
            match row.status.parse::<TaskStatus>() {
                Ok(TaskStatus::Pending) => stats.pending = row.count,
                Ok(TaskStatus::Processing) => stats.processing = row.count,
                Ok(TaskStatus::Completed) => stats.completed = row.count,
                Ok(TaskStatus::Failed) => stats.failed = row.count,
                Ok(TaskStatus::Skipped) | Ok(TaskStatus::Manual) => {
                    stats.skipped += row.count;
                }
                Err(_) => {
                    return Err(AppError::DatabaseError(format!(
                        "Unknown task status in stats: {}",
                        row.status
                    )))
                }
            }
        }

        Ok(stats)
    }

    async fn get_pending_count(&self) -> AppResult<i64> {
        let mut conn = self.get_conn()?;

        let count = anime_load_tasks::table
            .filter(anime_load_tasks::status.eq(TaskStatus::Pending))
            .count()
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to count pending tasks: {}", e)))?;

        Ok(count)
    }

    async fn reset_stuck(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let mut conn = self.get_conn()?;

        // attempt_count is left as-is: a crash is not the task's fault.
        let reset = diesel::sql_query(
            "UPDATE anime_load_tasks
             SET status = 'pending', updated_at = NOW()
             WHERE status = 'processing' AND updated_at < $1",
        )
        .bind::<diesel::sql_types::Timestamptz, _>(cutoff)
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to reset stuck tasks: {}", e)))?;

        Ok(reset)
    }

    async fn delete_by_mal_id(&self, mal_id: i32) -> AppResult<usize> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::delete(
            anime_load_tasks::table
                .filter(anime_load_tasks::mal_id.eq(mal_id))
                .filter(
                    anime_load_tasks::status
                        .eq_any(vec![TaskStatus::Pending, TaskStatus::Processing]),
                ),
        )
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete task: {}", e)))?;

        Ok(deleted)
    }
}
