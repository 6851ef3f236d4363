/// Repository trait for the durable task queue
///
/// Every operation is atomic and safe under concurrent workers. The default
/// deployment runs a single dispatcher, but the contract is the stricter one:
/// `get_next_pending` + `claim` must never hand the same row to two callers.
use crate::modules::tasks::domain::entities::{
    AnimeLoadTask, NewAnimeLoadTask, ResolutionMethod, TaskStats,
};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a batch of tasks. Conflicts against the active-task unique
    /// index (one pending/processing row per mal_id) are silently dropped,
    /// so re-requesting the same work is a no-op. Returns the number of rows
    /// actually inserted.
    async fn create_batch(&self, tasks: Vec<NewAnimeLoadTask>) -> AppResult<usize>;

    /// Get a task by ID
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<AnimeLoadTask>>;

    /// Return the highest-priority eligible task: `pending` with no retry
    /// hold, or a retry hold that has elapsed at `now`. Within a priority
    /// tier, ordering is FIFO by `updated_at`. Rows locked by a concurrent
    /// poller are skipped.
    async fn get_next_pending(&self, now: DateTime<Utc>) -> AppResult<Option<AnimeLoadTask>>;

    /// Atomically move a task from `pending` to `processing`, incrementing
    /// `attempt_count` (clamped to `max_attempts`, which a task reclaimed by
    /// `reset_stuck` mid final attempt would otherwise exceed). Returns the
    /// claimed row, or `None` if the task was no longer pending (another
    /// worker won the race).
    async fn claim(&self, id: Uuid) -> AppResult<Option<AnimeLoadTask>>;

    /// Terminal transition: resolved and present in the catalog
    async fn mark_completed(
        &self,
        id: Uuid,
        shikimori_id: &str,
        anime_id: Uuid,
        method: ResolutionMethod,
    ) -> AppResult<()>;

    /// Terminal transition: the anime already existed locally
    async fn mark_skipped(&self, id: Uuid, anime_id: Uuid) -> AppResult<()>;

    /// Terminal transition: no exact match, user must resolve by hand
    async fn mark_manual(&self, id: Uuid) -> AppResult<()>;

    /// Record a failure. With attempts left and a `next_retry_at` given, the
    /// task goes back to `pending` holding until that time. With no retry
    /// time, or once `attempt_count` reaches `max_attempts`, the task is
    /// terminally `failed`.
    async fn mark_failed(
        &self,
        id: Uuid,
        error: &str,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Per-export-job status counts
    async fn get_stats(&self, export_job_id: Uuid) -> AppResult<TaskStats>;

    /// Queue depth across all jobs (worker health)
    async fn get_pending_count(&self) -> AppResult<i64>;

    /// Crash recovery: move every `processing` task not touched since
    /// `cutoff` back to `pending`. Returns the number of tasks reset.
    async fn reset_stuck(&self, cutoff: DateTime<Utc>) -> AppResult<usize>;

    /// Remove queued work for a MAL id ("load now" support). Only
    /// `pending`/`processing` rows are removed; terminal history stays.
    async fn delete_by_mal_id(&self, mal_id: i32) -> AppResult<usize>;
}
