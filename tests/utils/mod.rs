#![allow(dead_code)]

pub mod db;
pub mod fakes;

use fakes::{
    FakeInternalCatalog, FakeRemoteCatalog, InMemoryExportJobRepository, InMemoryMappingRepository,
    InMemoryTaskRepository, TestClock,
};
use mal_export_scheduler::modules::export::application::ExportService;
use mal_export_scheduler::modules::resolver::application::MalResolver;
use mal_export_scheduler::modules::worker::TaskProcessor;
use std::sync::Arc;

/// Everything wired together the way the process entry point does it, with
/// in-memory stores and scripted collaborators.
pub struct Harness {
    pub clock: Arc<TestClock>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub jobs: Arc<InMemoryExportJobRepository>,
    pub mappings: Arc<InMemoryMappingRepository>,
    pub remote: Arc<FakeRemoteCatalog>,
    pub catalog: Arc<FakeInternalCatalog>,
    pub service: ExportService,
    pub processor: Arc<TaskProcessor>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(TestClock::new());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let jobs = Arc::new(InMemoryExportJobRepository::new());
        let mappings = Arc::new(InMemoryMappingRepository::new());
        let remote = Arc::new(FakeRemoteCatalog::new());
        let catalog = Arc::new(FakeInternalCatalog::new());

        let resolver = Arc::new(MalResolver::new(
            mappings.clone(),
            remote.clone(),
            catalog.clone(),
        ));
        let processor = Arc::new(TaskProcessor::new(
            tasks.clone(),
            jobs.clone(),
            resolver,
            clock.clone(),
        ));
        let service = ExportService::new(jobs.clone(), tasks.clone());

        Self {
            clock,
            tasks,
            jobs,
            mappings,
            remote,
            catalog,
            service,
            processor,
        }
    }

    /// One dispatcher tick without the rate gate: poll, claim, process,
    /// completion check. Returns false when no task was eligible.
    pub async fn tick(&self) -> bool {
        use mal_export_scheduler::modules::tasks::domain::repository::TaskRepository;
        use mal_export_scheduler::shared::utils::Clock;

        let Some(task) = self.tasks.get_next_pending(self.clock.now()).await.unwrap() else {
            return false;
        };
        let Some(claimed) = self.tasks.claim(task.id).await.unwrap() else {
            return true;
        };

        let _ = self.processor.process_task(&claimed).await;

        if let Some(job_id) = claimed.export_job_id {
            self.processor.check_completion(job_id).await.unwrap();
        }
        true
    }

    /// Tick until the queue has nothing eligible right now.
    pub async fn drain(&self) {
        while self.tick().await {}
    }
}
