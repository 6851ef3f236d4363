/// Per-task processing: resolve, load, record the outcome
///
/// Every outcome is a terminal transition or a scheduled retry; the task row
/// and the parent job's counters are the only state touched. Transient
/// failures back off exponentially (30s, 60s, 120s); permanent failures and
/// exhausted retries are terminal and bump the parent's failed counter.
use crate::modules::export::domain::entities::ExportJobStatus;
use crate::modules::export::domain::repository::ExportJobRepository;
use crate::modules::mapping::domain::entities::MappingSource;
use crate::modules::resolver::application::MalResolver;
use crate::modules::tasks::domain::entities::{AnimeLoadTask, ResolutionMethod};
use crate::modules::tasks::domain::repository::TaskRepository;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::Clock;
use crate::{log_info, log_warn};
use std::sync::Arc;
use uuid::Uuid;

const RETRY_BASE_SECONDS: i64 = 30;

fn retry_backoff(attempt: i32) -> chrono::Duration {
    // attempt is post-increment: 1 -> 30s, 2 -> 60s, 3 -> 120s
    let exp = (attempt.max(1) - 1).min(6) as u32;
    chrono::Duration::seconds(RETRY_BASE_SECONDS << exp)
}

pub struct TaskProcessor {
    task_repo: Arc<dyn TaskRepository>,
    export_job_repo: Arc<dyn ExportJobRepository>,
    resolver: Arc<MalResolver>,
    clock: Arc<dyn Clock>,
}

impl TaskProcessor {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        export_job_repo: Arc<dyn ExportJobRepository>,
        resolver: Arc<MalResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            task_repo,
            export_job_repo,
            resolver,
            clock,
        }
    }

    pub async fn process_task(&self, task: &AnimeLoadTask) -> AppResult<()> {
        log_info!(
            "Processing task {} (mal_id={}, attempt {}/{})",
            task.id,
            task.mal_id,
            task.attempt_count,
            task.max_attempts
        );

        let resolution = match self.resolver.resolve(task).await {
            Ok(r) => r,
            Err(e) => return self.handle_error(task, e).await,
        };

        match resolution.method {
            ResolutionMethod::Cached => match (resolution.anime_id, resolution.shikimori_id) {
                (Some(anime_id), _) => self.skip(task, anime_id).await,
                (None, Some(shikimori_id)) => {
                    self.load_and_complete(
                        task,
                        &shikimori_id,
                        ResolutionMethod::Cached,
                        MappingSource::RemoteApi,
                    )
                    .await
                }
                (None, None) => {
                    self.handle_error(
                        task,
                        AppError::InternalError(
                            "Cached resolution carried no shikimori id".to_string(),
                        ),
                    )
                    .await
                }
            },
            ResolutionMethod::ExactJapanese | ResolutionMethod::ExactRomanized => {
                match resolution.shikimori_id {
                    Some(shikimori_id) => {
                        self.load_and_complete(
                            task,
                            &shikimori_id,
                            resolution.method,
                            MappingSource::TitleSearch,
                        )
                        .await
                    }
                    None => {
                        self.handle_error(
                            task,
                            AppError::InternalError(
                                "Exact match carried no shikimori id".to_string(),
                            ),
                        )
                        .await
                    }
                }
            }
            ResolutionMethod::NotFound => self.mark_manual(task).await,
            ResolutionMethod::UserSelected => {
                // user picks happen out of band, never inside the queue
                self.handle_error(
                    task,
                    AppError::InternalError("Unexpected resolution method".to_string()),
                )
                .await
            }
        }
    }

    /// Close out the parent once no child has work left.
    pub async fn check_completion(&self, export_job_id: Uuid) -> AppResult<()> {
        let stats = self.task_repo.get_stats(export_job_id).await?;

        if stats.unfinished() == 0 {
            log_info!(
                "All tasks for export job {} are done, marking completed",
                export_job_id
            );
            self.export_job_repo
                .update_status(export_job_id, ExportJobStatus::Completed)
                .await?;
        }

        Ok(())
    }

    /// Record a processing failure, scheduling a retry when the error is
    /// transient and attempts remain.
    pub async fn handle_error(&self, task: &AnimeLoadTask, err: AppError) -> AppResult<()> {
        let exhausted = task.attempt_count >= task.max_attempts;
        let retryable = err.is_transient() && !exhausted;

        log_warn!(
            "Task {} failed on attempt {}/{}: {}",
            task.id,
            task.attempt_count,
            task.max_attempts,
            err
        );

        let next_retry_at = if retryable {
            let backoff = retry_backoff(task.attempt_count);
            log_info!(
                "Scheduling retry for task {} in {}s",
                task.id,
                backoff.num_seconds()
            );
            Some(self.clock.now() + backoff)
        } else {
            None
        };

        self.task_repo
            .mark_failed(task.id, &err.to_string(), next_retry_at)
            .await?;

        if !retryable {
            self.bump_counters(task, 0, 0, 1).await?;
        }

        Ok(())
    }

    async fn load_and_complete(
        &self,
        task: &AnimeLoadTask,
        shikimori_id: &str,
        method: ResolutionMethod,
        source: MappingSource,
    ) -> AppResult<()> {
        let anime_id = match self.resolver.load_anime(task.mal_id, shikimori_id, source).await {
            Ok(id) => id,
            Err(e) => return self.handle_error(task, e).await,
        };

        log_info!(
            "Loaded anime {} for task {} (shikimori_id={})",
            anime_id,
            task.id,
            shikimori_id
        );

        self.task_repo
            .mark_completed(task.id, shikimori_id, anime_id, method)
            .await?;
        self.bump_counters(task, 1, 0, 0).await
    }

    async fn skip(&self, task: &AnimeLoadTask, anime_id: Uuid) -> AppResult<()> {
        log_info!(
            "Anime already in catalog for task {} (anime_id={}), skipping",
            task.id,
            anime_id
        );

        self.task_repo.mark_skipped(task.id, anime_id).await?;
        self.bump_counters(task, 0, 1, 0).await
    }

    async fn mark_manual(&self, task: &AnimeLoadTask) -> AppResult<()> {
        log_info!(
            "Task {} (mal_id={}, title={}) needs manual resolution",
            task.id,
            task.mal_id,
            task.mal_title
        );

        self.task_repo.mark_manual(task.id).await?;
        self.bump_counters(task, 0, 1, 0).await
    }

    async fn bump_counters(
        &self,
        task: &AnimeLoadTask,
        loaded: i32,
        skipped: i32,
        failed: i32,
    ) -> AppResult<()> {
        if let Some(job_id) = task.export_job_id {
            self.export_job_repo
                .increment_counters(job_id, loaded, skipped, failed)
                .await?;
        }
        Ok(())
    }
}
