/// Database test utilities
///
/// Backed by `TEST_DATABASE_URL`; tests that use this module are ignored by
/// default and expect the scheduler migrations to be applied already.
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, Pool};
use std::sync::{Arc, Mutex, OnceLock};

type PgPool = Pool<ConnectionManager<PgConnection>>;

static DB_POOL: OnceLock<Arc<PgPool>> = OnceLock::new();

/// Get or create the singleton database pool for tests
pub fn get_test_db_pool() -> Arc<PgPool> {
    DB_POOL
        .get_or_init(|| {
            dotenvy::dotenv().ok();
            let test_db_url = std::env::var("TEST_DATABASE_URL")
                .expect("TEST_DATABASE_URL must be set for database tests");

            let manager = ConnectionManager::<PgConnection>::new(test_db_url);
            let pool = r2d2::Pool::builder()
                .max_size(5)
                .build(manager)
                .expect("Failed to create test database pool");

            Arc::new(pool)
        })
        .clone()
}

/// Clean all scheduler tables - use at the start of each test
pub fn clean_test_db() {
    let pool = get_test_db_pool();
    let mut conn = pool.get().expect("Failed to get DB connection");

    diesel::sql_query("TRUNCATE TABLE anime_load_tasks CASCADE")
        .execute(&mut conn)
        .expect("Failed to clean anime_load_tasks");

    diesel::sql_query("TRUNCATE TABLE mal_export_jobs CASCADE")
        .execute(&mut conn)
        .expect("Failed to clean mal_export_jobs");

    diesel::sql_query("TRUNCATE TABLE mal_shikimori_mapping CASCADE")
        .execute(&mut conn)
        .expect("Failed to clean mal_shikimori_mapping");
}

/// Global test mutex so database tests run serially
static TEST_LOCK: Mutex<()> = Mutex::new(());

pub fn acquire_test_lock() -> std::sync::MutexGuard<'static, ()> {
    match TEST_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
