/// Repository trait for export job persistence
use crate::modules::export::domain::entities::{ExportJob, ExportJobStatus, NewExportJob};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExportJobRepository: Send + Sync {
    /// Create a new job in `pending`
    async fn create(&self, job: NewExportJob) -> AppResult<ExportJob>;

    /// Get a job by ID
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<ExportJob>>;

    /// The user's job currently in `pending` or `processing`, if any.
    /// The coordinator uses this to keep at most one active job per user.
    async fn get_active_by_user(&self, user_id: Uuid) -> AppResult<Option<ExportJob>>;

    /// All jobs for a user, newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ExportJob>>;

    /// Set `total_anime` and move the job from `pending` to `processing`
    /// in one statement, stamping `started_at`.
    async fn set_total(&self, id: Uuid, total: i32) -> AppResult<()>;

    /// Atomic counter add; `processed` is maintained as the sum of the three
    /// deltas in the same UPDATE so concurrent dispatchers cannot lose
    /// updates. Writes against a job already in a terminal state (including
    /// `cancelled`) affect zero rows.
    async fn increment_counters(
        &self,
        id: Uuid,
        loaded: i32,
        skipped: i32,
        failed: i32,
    ) -> AppResult<()>;

    /// Transition to `status`. Terminal transitions stamp `completed_at`
    /// and only apply to jobs still active.
    async fn update_status(&self, id: Uuid, status: ExportJobStatus) -> AppResult<()>;

    /// Record a pre-task failure: status `failed`, message stored,
    /// `completed_at` stamped.
    async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()>;
}
