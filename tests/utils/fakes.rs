/// In-memory fakes for the persistent stores and remote collaborators.
///
/// The fakes implement the same contracts as the diesel repositories and the
/// HTTP clients, so end-to-end flows run without Postgres or a network.
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mal_export_scheduler::modules::export::domain::entities::{
    ExportJob, ExportJobStatus, NewExportJob,
};
use mal_export_scheduler::modules::export::domain::repository::ExportJobRepository;
use mal_export_scheduler::modules::mapping::domain::entities::{MalShikimoriMapping, MappingUpsert};
use mal_export_scheduler::modules::mapping::domain::repository::MappingRepository;
use mal_export_scheduler::modules::resolver::domain::catalog::{InternalCatalog, RemoteCatalog};
use mal_export_scheduler::modules::resolver::domain::entities::{CatalogAnime, RemoteSearchResult};
use mal_export_scheduler::modules::tasks::domain::entities::{
    AnimeLoadTask, NewAnimeLoadTask, ResolutionMethod, TaskStats, TaskStatus,
};
use mal_export_scheduler::modules::tasks::domain::repository::TaskRepository;
use mal_export_scheduler::shared::errors::{AppError, AppResult};
use mal_export_scheduler::shared::utils::Clock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Manually advanced clock so retry schedules can be observed without
/// sleeping.
pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

fn is_active(status: TaskStatus) -> bool {
    matches!(status, TaskStatus::Pending | TaskStatus::Processing)
}

#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<HashMap<Uuid, AnimeLoadTask>>,
    create_failing: Mutex<bool>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_create_failing(&self, failing: bool) {
        *self.create_failing.lock().unwrap() = failing;
    }

    pub fn get(&self, id: Uuid) -> Option<AnimeLoadTask> {
        self.tasks.lock().unwrap().get(&id).cloned()
    }

    pub fn all(&self) -> Vec<AnimeLoadTask> {
        self.tasks.lock().unwrap().values().cloned().collect()
    }

    pub fn insert(&self, task: AnimeLoadTask) {
        self.tasks.lock().unwrap().insert(task.id, task);
    }

    pub fn set_updated_at(&self, id: Uuid, at: DateTime<Utc>) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(&id) {
            task.updated_at = at;
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create_batch(&self, tasks: Vec<NewAnimeLoadTask>) -> AppResult<usize> {
        if *self.create_failing.lock().unwrap() {
            return Err(AppError::DatabaseError("insert rejected".to_string()));
        }
        let mut store = self.tasks.lock().unwrap();
        let now = Utc::now();
        let mut inserted = 0;

        for new_task in tasks {
            let duplicate = store
                .values()
                .any(|t| t.mal_id == new_task.mal_id && is_active(t.status));
            if duplicate {
                continue;
            }

            let task = AnimeLoadTask {
                id: Uuid::new_v4(),
                export_job_id: new_task.export_job_id,
                user_id: new_task.user_id,
                mal_id: new_task.mal_id,
                mal_title: new_task.mal_title,
                mal_title_japanese: new_task.mal_title_japanese,
                mal_title_english: new_task.mal_title_english,
                status: TaskStatus::Pending,
                priority: new_task.priority,
                attempt_count: 0,
                max_attempts: new_task.max_attempts,
                last_error: None,
                next_retry_at: None,
                resolved_shikimori_id: None,
                resolved_anime_id: None,
                resolution_method: None,
                created_at: now,
                updated_at: now,
            };
            store.insert(task.id, task);
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<AnimeLoadTask>> {
        Ok(self.tasks.lock().unwrap().get(&id).cloned())
    }

    async fn get_next_pending(&self, now: DateTime<Utc>) -> AppResult<Option<AnimeLoadTask>> {
        let store = self.tasks.lock().unwrap();
        let mut eligible: Vec<&AnimeLoadTask> = store
            .values()
            .filter(|t| t.should_process(now))
            .collect();
        eligible.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.updated_at.cmp(&b.updated_at))
        });
        Ok(eligible.first().map(|t| (*t).clone()))
    }

    async fn claim(&self, id: Uuid) -> AppResult<Option<AnimeLoadTask>> {
        let mut store = self.tasks.lock().unwrap();
        match store.get_mut(&id) {
            Some(task) if task.status == TaskStatus::Pending => {
                task.status = TaskStatus::Processing;
                // clamped so a reclaimed final attempt stays within the limit
                task.attempt_count = (task.attempt_count + 1).min(task.max_attempts);
                task.updated_at = Utc::now();
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        shikimori_id: &str,
        anime_id: Uuid,
        method: ResolutionMethod,
    ) -> AppResult<()> {
        let mut store = self.tasks.lock().unwrap();
        if let Some(task) = store.get_mut(&id) {
            if task.status == TaskStatus::Processing {
                task.status = TaskStatus::Completed;
                task.resolved_shikimori_id = Some(shikimori_id.to_string());
                task.resolved_anime_id = Some(anime_id);
                task.resolution_method = Some(method.to_string());
                task.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn mark_skipped(&self, id: Uuid, anime_id: Uuid) -> AppResult<()> {
        let mut store = self.tasks.lock().unwrap();
        if let Some(task) = store.get_mut(&id) {
            if task.status == TaskStatus::Processing {
                task.status = TaskStatus::Skipped;
                task.resolved_anime_id = Some(anime_id);
                task.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn mark_manual(&self, id: Uuid) -> AppResult<()> {
        let mut store = self.tasks.lock().unwrap();
        if let Some(task) = store.get_mut(&id) {
            if task.status == TaskStatus::Processing {
                task.status = TaskStatus::Manual;
                task.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        error: &str,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut store = self.tasks.lock().unwrap();
        if let Some(task) = store.get_mut(&id) {
            if task.status == TaskStatus::Processing {
                task.last_error = Some(error.to_string());
                task.updated_at = Utc::now();
                if task.attempt_count >= task.max_attempts || next_retry_at.is_none() {
                    task.status = TaskStatus::Failed;
                    task.next_retry_at = None;
                } else {
                    task.status = TaskStatus::Pending;
                    task.next_retry_at = next_retry_at;
                }
            }
        }
        Ok(())
    }

    async fn get_stats(&self, export_job_id: Uuid) -> AppResult<TaskStats> {
        let store = self.tasks.lock().unwrap();
        let mut stats = TaskStats::default();
        for task in store
            .values()
            .filter(|t| t.export_job_id == Some(export_job_id))
        {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Processing => stats.processing += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Failed => stats.failed += 1,
                TaskStatus::Skipped | TaskStatus::Manual => stats.skipped += 1,
            }
        }
        Ok(stats)
    }

    async fn get_pending_count(&self) -> AppResult<i64> {
        let store = self.tasks.lock().unwrap();
        Ok(store
            .values()
            .filter(|t| t.status == TaskStatus::Pending)
            .count() as i64)
    }

    async fn reset_stuck(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let mut store = self.tasks.lock().unwrap();
        let mut reset = 0;
        for task in store.values_mut() {
            if task.status == TaskStatus::Processing && task.updated_at < cutoff {
                task.status = TaskStatus::Pending;
                task.updated_at = Utc::now();
                reset += 1;
            }
        }
        Ok(reset)
    }

    async fn delete_by_mal_id(&self, mal_id: i32) -> AppResult<usize> {
        let mut store = self.tasks.lock().unwrap();
        let doomed: Vec<Uuid> = store
            .values()
            .filter(|t| t.mal_id == mal_id && is_active(t.status))
            .map(|t| t.id)
            .collect();
        for id in &doomed {
            store.remove(id);
        }
        Ok(doomed.len())
    }
}

#[derive(Default)]
pub struct InMemoryExportJobRepository {
    jobs: Mutex<HashMap<Uuid, ExportJob>>,
}

impl InMemoryExportJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<ExportJob> {
        self.jobs.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ExportJobRepository for InMemoryExportJobRepository {
    async fn create(&self, job: NewExportJob) -> AppResult<ExportJob> {
        let now = Utc::now();
        let created = ExportJob {
            id: Uuid::new_v4(),
            user_id: job.user_id,
            mal_username: job.mal_username,
            status: ExportJobStatus::Pending,
            total_anime: 0,
            processed_anime: 0,
            loaded_anime: 0,
            skipped_anime: 0,
            failed_anime: 0,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.lock().unwrap().insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<ExportJob>> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn get_active_by_user(&self, user_id: Uuid) -> AppResult<Option<ExportJob>> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs
            .values()
            .filter(|j| j.user_id == user_id && j.is_active())
            .max_by_key(|j| j.created_at)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ExportJob>> {
        let jobs = self.jobs.lock().unwrap();
        let mut list: Vec<ExportJob> = jobs
            .values()
            .filter(|j| j.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn set_total(&self, id: Uuid, total: i32) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.status == ExportJobStatus::Pending {
                job.total_anime = total;
                job.status = ExportJobStatus::Processing;
                job.started_at = Some(Utc::now());
                job.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn increment_counters(
        &self,
        id: Uuid,
        loaded: i32,
        skipped: i32,
        failed: i32,
    ) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.is_active() {
                job.processed_anime += loaded + skipped + failed;
                job.loaded_anime += loaded;
                job.skipped_anime += skipped;
                job.failed_anime += failed;
                job.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ExportJobStatus) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if status.is_terminal() {
                if job.is_active() {
                    job.status = status;
                    job.completed_at = Some(Utc::now());
                    job.updated_at = Utc::now();
                }
            } else {
                job.status = status;
                job.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.is_active() {
                job.status = ExportJobStatus::Failed;
                job.error_message = Some(message.to_string());
                job.completed_at = Some(Utc::now());
                job.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMappingRepository {
    mappings: Mutex<HashMap<i32, MalShikimoriMapping>>,
}

impl InMemoryMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, mapping: MalShikimoriMapping) {
        self.mappings.lock().unwrap().insert(mapping.mal_id, mapping);
    }

    pub fn get_sync(&self, mal_id: i32) -> Option<MalShikimoriMapping> {
        self.mappings.lock().unwrap().get(&mal_id).cloned()
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappingRepository {
    async fn get(&self, mal_id: i32) -> AppResult<Option<MalShikimoriMapping>> {
        Ok(self.mappings.lock().unwrap().get(&mal_id).cloned())
    }

    async fn get_batch(&self, mal_ids: &[i32]) -> AppResult<Vec<MalShikimoriMapping>> {
        let store = self.mappings.lock().unwrap();
        Ok(mal_ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn upsert(&self, mapping: MappingUpsert) -> AppResult<()> {
        let mut store = self.mappings.lock().unwrap();
        let created_at = store
            .get(&mapping.mal_id)
            .map(|m| m.created_at)
            .unwrap_or_else(Utc::now);
        store.insert(
            mapping.mal_id,
            MalShikimoriMapping {
                mal_id: mapping.mal_id,
                shikimori_id: mapping.shikimori_id,
                anime_id: mapping.anime_id,
                confidence: mapping.confidence,
                source: mapping.source,
                created_at,
            },
        );
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.mappings.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct FakeRemoteCatalog {
    results: Mutex<Vec<RemoteSearchResult>>,
    failing: Mutex<bool>,
    stalled: Mutex<bool>,
    pub search_calls: AtomicUsize,
}

impl FakeRemoteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_results(&self, results: Vec<RemoteSearchResult>) {
        *self.results.lock().unwrap() = results;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Make `search` hang forever, like a remote that accepts the
    /// connection and never answers.
    pub fn set_stalled(&self, stalled: bool) {
        *self.stalled.lock().unwrap() = stalled;
    }
}

#[async_trait]
impl RemoteCatalog for FakeRemoteCatalog {
    async fn search(&self, _query: &str, _limit: u32) -> AppResult<Vec<RemoteSearchResult>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if *self.stalled.lock().unwrap() {
            std::future::pending::<()>().await;
        }
        if *self.failing.lock().unwrap() {
            return Err(AppError::ExternalServiceError(
                "Remote catalog search returned status 500".to_string(),
            ));
        }
        Ok(self.results.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBehavior {
    Succeed,
    NotFound,
    ServerError,
}

pub struct FakeInternalCatalog {
    by_mal_id: Mutex<HashMap<i32, CatalogAnime>>,
    load_ids: Mutex<HashMap<String, Uuid>>,
    load_behavior: Mutex<LoadBehavior>,
    pub load_calls: AtomicUsize,
}

impl Default for FakeInternalCatalog {
    fn default() -> Self {
        Self {
            by_mal_id: Mutex::new(HashMap::new()),
            load_ids: Mutex::new(HashMap::new()),
            load_behavior: Mutex::new(LoadBehavior::Succeed),
            load_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeInternalCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_mal_lookup(&self, mal_id: i32, anime: CatalogAnime) {
        self.by_mal_id.lock().unwrap().insert(mal_id, anime);
    }

    pub fn seed_load(&self, shikimori_id: &str, anime_id: Uuid) {
        self.load_ids
            .lock()
            .unwrap()
            .insert(shikimori_id.to_string(), anime_id);
    }

    pub fn set_load_behavior(&self, behavior: LoadBehavior) {
        *self.load_behavior.lock().unwrap() = behavior;
    }
}

#[async_trait]
impl InternalCatalog for FakeInternalCatalog {
    async fn get_by_mal_id(&self, mal_id: i32) -> AppResult<Option<CatalogAnime>> {
        Ok(self.by_mal_id.lock().unwrap().get(&mal_id).cloned())
    }

    async fn load_by_shikimori_id(&self, shikimori_id: &str) -> AppResult<Uuid> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        match *self.load_behavior.lock().unwrap() {
            LoadBehavior::NotFound => Err(AppError::NotFound(format!(
                "Catalog has no record for shikimori id {}",
                shikimori_id
            ))),
            LoadBehavior::ServerError => Err(AppError::ExternalServiceError(
                "Catalog load returned status 500".to_string(),
            )),
            LoadBehavior::Succeed => self
                .load_ids
                .lock()
                .unwrap()
                .get(shikimori_id)
                .copied()
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Catalog has no record for shikimori id {}",
                        shikimori_id
                    ))
                }),
        }
    }
}
