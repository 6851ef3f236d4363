/// Export coordination and status projections
///
/// The coordinator turns one user's MAL watch-list into a parent export job
/// plus one durable load task per entry. Submission is idempotent: while a
/// user has an active job, re-submitting returns that job untouched.
use crate::modules::export::domain::entities::{
    CreateExportJobRequest, CreateTasksRequest, ExportJob, ExportJobResponse, ExportJobStatus,
    NewExportJob,
};
use crate::modules::export::domain::repository::ExportJobRepository;
use crate::modules::tasks::domain::entities::{NewAnimeLoadTask, TaskStats, DEFAULT_MAX_ATTEMPTS};
use crate::modules::tasks::domain::repository::TaskRepository;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};
use std::sync::Arc;
use uuid::Uuid;

pub struct ExportService {
    export_job_repo: Arc<dyn ExportJobRepository>,
    task_repo: Arc<dyn TaskRepository>,
}

impl ExportService {
    pub fn new(
        export_job_repo: Arc<dyn ExportJobRepository>,
        task_repo: Arc<dyn TaskRepository>,
    ) -> Self {
        Self {
            export_job_repo,
            task_repo,
        }
    }

    /// Create a new export job, or return the user's active one unchanged.
    pub async fn create_export_job(&self, req: CreateExportJobRequest) -> AppResult<ExportJob> {
        if req.mal_username.trim().is_empty() {
            return Err(AppError::ValidationError(
                "mal_username is required".to_string(),
            ));
        }

        if let Some(existing) = self.export_job_repo.get_active_by_user(req.user_id).await? {
            log_info!(
                "User {} already has active export job {}, returning it",
                req.user_id,
                existing.id
            );
            return Ok(existing);
        }

        let job = self
            .export_job_repo
            .create(NewExportJob {
                user_id: req.user_id,
                mal_username: req.mal_username.clone(),
            })
            .await?;

        log_info!(
            "Created export job {} for user {} (mal_username: {})",
            job.id,
            req.user_id,
            req.mal_username
        );

        Ok(job)
    }

    /// Queue the anime load tasks for a job and set its total, moving it to
    /// `processing`. An empty list completes the job on the spot. Returns
    /// the number of tasks actually queued (duplicates are dropped).
    pub async fn create_tasks(&self, req: CreateTasksRequest) -> AppResult<usize> {
        let job = self
            .export_job_repo
            .get_by_id(req.export_job_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Export job {} not found", req.export_job_id))
            })?;

        if req.tasks.is_empty() {
            // Nothing to import; the job is done before it started.
            self.export_job_repo.set_total(job.id, 0).await?;
            self.export_job_repo
                .update_status(job.id, ExportJobStatus::Completed)
                .await?;
            log_info!("Export job {} has no entries, completed immediately", job.id);
            return Ok(0);
        }

        let total = req.tasks.len();
        let tasks: Vec<NewAnimeLoadTask> = req
            .tasks
            .into_iter()
            .map(|input| NewAnimeLoadTask {
                export_job_id: Some(req.export_job_id),
                user_id: req.user_id,
                mal_id: input.mal_id,
                mal_title: input.title,
                mal_title_japanese: input.title_japanese,
                mal_title_english: input.title_english,
                priority: req.priority,
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            })
            .collect();

        let created = match self.task_repo.create_batch(tasks).await {
            Ok(created) => created,
            Err(e) => {
                // Leave a diagnosable job behind rather than one stuck pending.
                let message = format!("Failed to queue load tasks: {}", e);
                if let Err(store_err) = self
                    .export_job_repo
                    .set_error(req.export_job_id, &message)
                    .await
                {
                    log_warn!(
                        "Failed to record error on export job {}: {}",
                        req.export_job_id,
                        store_err
                    );
                }
                return Err(e);
            }
        };
        if created < total {
            log_warn!(
                "Export job {}: {} of {} tasks were already queued",
                req.export_job_id,
                total - created,
                total
            );
        }

        self.export_job_repo
            .set_total(req.export_job_id, total as i32)
            .await?;

        log_info!(
            "Created {} anime load tasks for export job {}",
            created,
            req.export_job_id
        );

        Ok(created)
    }

    /// Status projection for polling callers: job snapshot plus task stats.
    pub async fn get_export_status(
        &self,
        export_job_id: Uuid,
    ) -> AppResult<(ExportJobResponse, TaskStats)> {
        let job = self
            .export_job_repo
            .get_by_id(export_job_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Export job {} not found", export_job_id))
            })?;

        let stats = self.task_repo.get_stats(export_job_id).await?;

        Ok((job.to_response(), stats))
    }

    /// All of a user's export jobs, newest first.
    pub async fn list_user_exports(&self, user_id: Uuid) -> AppResult<Vec<ExportJob>> {
        self.export_job_repo.list_by_user(user_id).await
    }

    /// Cancel the user's export. Cancellation is advisory: queued children
    /// keep draining, but the terminal parent ignores their counters.
    pub async fn cancel_export(&self, user_id: Uuid, export_job_id: Uuid) -> AppResult<()> {
        let job = self
            .export_job_repo
            .get_by_id(export_job_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Export job {} not found", export_job_id))
            })?;

        if job.user_id != user_id {
            return Err(AppError::NotFound(format!(
                "Export job {} not found",
                export_job_id
            )));
        }

        if !job.is_active() {
            return Ok(());
        }

        self.export_job_repo
            .update_status(export_job_id, ExportJobStatus::Cancelled)
            .await?;

        log_info!("Cancelled export job {} for user {}", export_job_id, user_id);

        Ok(())
    }

    /// Remove queued work for a MAL id ("load now" support). Terminal task
    /// history is never deleted.
    pub async fn delete_pending_task(&self, mal_id: i32) -> AppResult<usize> {
        let deleted = self.task_repo.delete_by_mal_id(mal_id).await?;
        if deleted > 0 {
            log_info!("Removed {} queued task(s) for MAL id {}", deleted, mal_id);
        }
        Ok(deleted)
    }
}
