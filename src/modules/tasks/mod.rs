/// Durable anime load task queue
///
/// PostgreSQL-backed queue with atomic claims, retry-time ordering and
/// crash recovery. The dispatcher in `modules::worker` drains it; the
/// export coordinator in `modules::export` fills it.
pub mod domain;
pub mod infrastructure;

pub use domain::{
    AnimeLoadTask, NewAnimeLoadTask, ResolutionMethod, TaskRepository, TaskStats, TaskStatus,
};
pub use infrastructure::TaskRepositoryImpl;
