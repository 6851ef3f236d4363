pub mod modules;
pub mod schema;
pub mod shared;

pub use modules::export::{ExportJobRepository, ExportService};
pub use modules::mapping::MappingRepository;
pub use modules::resolver::MalResolver;
pub use modules::tasks::domain::repository::TaskRepository;
pub use modules::worker::{AnimeLoadWorker, TaskProcessor, WorkerStatus};
pub use shared::{Config, Database};
