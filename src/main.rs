use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use mal_export_scheduler::modules::export::infrastructure::ExportJobRepositoryImpl;
use mal_export_scheduler::modules::mapping::infrastructure::MappingRepositoryImpl;
use mal_export_scheduler::modules::resolver::domain::{InternalCatalog, RemoteCatalog};
use mal_export_scheduler::modules::resolver::infrastructure::{CatalogClient, ShikimoriClient};
use mal_export_scheduler::modules::tasks::infrastructure::TaskRepositoryImpl;
use mal_export_scheduler::modules::worker::{AnimeLoadWorker, TaskProcessor};
use mal_export_scheduler::shared::errors::{AppError, AppResult};
use mal_export_scheduler::shared::utils::logger::init_logger;
use mal_export_scheduler::shared::utils::{Clock, RateLimiter, SystemClock};
use mal_export_scheduler::{
    Config, Database, ExportJobRepository, MalResolver, MappingRepository, TaskRepository,
};
use mal_export_scheduler::{log_error, log_info};
use std::sync::Arc;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        log_error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let config = Config::from_env();

    let database = Database::new(&config.database_url)?;
    run_migrations(&database)?;

    let pool = database.pool().clone();
    let task_repo: Arc<dyn TaskRepository> = Arc::new(TaskRepositoryImpl::new(pool.clone()));
    let export_job_repo: Arc<dyn ExportJobRepository> =
        Arc::new(ExportJobRepositoryImpl::new(pool.clone()));
    let mapping_repo: Arc<dyn MappingRepository> = Arc::new(MappingRepositoryImpl::new(pool));

    let rate_limiter = Arc::new(RateLimiter::new(
        config.worker.rate_limit_capacity,
        config.worker.rate_limit_interval,
    ));
    let remote_catalog: Arc<dyn RemoteCatalog> = Arc::new(ShikimoriClient::new(
        &config.remote_catalog,
        rate_limiter.clone(),
    )?);
    let internal_catalog: Arc<dyn InternalCatalog> =
        Arc::new(CatalogClient::new(&config.internal_catalog_url)?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let resolver = Arc::new(MalResolver::new(
        mapping_repo,
        remote_catalog,
        internal_catalog,
    ));
    let processor = Arc::new(TaskProcessor::new(
        task_repo.clone(),
        export_job_repo,
        resolver,
        clock.clone(),
    ));

    let worker = Arc::new(AnimeLoadWorker::new(
        task_repo,
        processor,
        rate_limiter,
        clock,
        config.worker.clone(),
    ));

    let runner = worker.clone();
    let handle = tokio::spawn(async move { runner.run().await });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to listen for shutdown: {}", e)))?;

    log_info!("Shutdown signal received, draining worker");
    worker.stop();
    if let Err(e) = handle.await {
        log_error!("Worker task did not shut down cleanly: {}", e);
    }

    Ok(())
}

fn run_migrations(database: &Database) -> AppResult<()> {
    let mut conn = database.get_connection()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;

    if !applied.is_empty() {
        log_info!("Applied {} database migration(s)", applied.len());
    }

    Ok(())
}
