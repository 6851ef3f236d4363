/// The dispatch loop: one cooperative worker draining the task queue
///
/// Ticks at most three times per second, matching the remote catalog's rate
/// budget. All state lives in the task store, so a crash loses nothing; the
/// startup `reset_stuck` pass reclaims tasks a dead worker left behind in
/// `processing`.
use crate::modules::tasks::domain::repository::TaskRepository;
use crate::modules::worker::processor::TaskProcessor;
use crate::shared::config::WorkerConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{Clock, RateLimiter};
use crate::{log_debug, log_error, log_info, log_warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub pending_tasks: i64,
}

pub struct AnimeLoadWorker {
    task_repo: Arc<dyn TaskRepository>,
    processor: Arc<TaskProcessor>,
    rate_limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    config: WorkerConfig,
    shutdown: CancellationToken,
    running: AtomicBool,
}

impl AnimeLoadWorker {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        processor: Arc<TaskProcessor>,
        rate_limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            task_repo,
            processor,
            rate_limiter,
            clock,
            config,
            shutdown: CancellationToken::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Run until `stop` is called. An in-flight task is always finished
    /// before the loop exits.
    pub async fn run(&self) {
        let threshold = chrono::Duration::from_std(self.config.stuck_task_threshold)
            .unwrap_or_else(|_| chrono::Duration::minutes(5));
        let cutoff = self.clock.now() - threshold;

        match self.task_repo.reset_stuck(cutoff).await {
            Ok(0) => log_info!("No stuck tasks found at startup"),
            Ok(count) => log_warn!("Reset {} stuck task(s) back to pending", count),
            Err(e) => log_error!("Failed to reset stuck tasks: {}", e),
        }

        self.running.store(true, Ordering::SeqCst);
        log_info!("Anime load worker started");

        let mut tick = tokio::time::interval(self.config.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tick.tick() => {
                    if let Err(e) = self.run_tick().await {
                        log_error!("Dispatch tick failed: {}", e);
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        log_info!("Anime load worker stopped");
    }

    /// Signal the loop to exit after the current task.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> AppResult<WorkerStatus> {
        Ok(WorkerStatus {
            running: self.is_running(),
            pending_tasks: self.task_repo.get_pending_count().await?,
        })
    }

    async fn run_tick(&self) -> AppResult<()> {
        self.rate_limiter.acquire().await;

        let Some(task) = self.task_repo.get_next_pending(self.clock.now()).await? else {
            return Ok(());
        };

        let Some(claimed) = self.task_repo.claim(task.id).await? else {
            // another worker won the race; nothing to do
            log_debug!("Lost claim race for task {}", task.id);
            return Ok(());
        };

        let outcome = tokio::time::timeout(
            self.config.task_timeout,
            self.processor.process_task(&claimed),
        )
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log_error!("Task {} processing error: {}", claimed.id, e),
            Err(_) => {
                let err = AppError::ExternalServiceError(format!(
                    "Task exceeded the {}s deadline",
                    self.config.task_timeout.as_secs()
                ));
                if let Err(e) = self.processor.handle_error(&claimed, err).await {
                    log_error!("Failed to record task {} timeout: {}", claimed.id, e);
                }
            }
        }

        if let Some(job_id) = claimed.export_job_id {
            if let Err(e) = self.processor.check_completion(job_id).await {
                log_error!("Completion check failed for export job {}: {}", job_id, e);
            }
        }

        Ok(())
    }
}
