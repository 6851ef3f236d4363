pub mod dispatcher;
pub mod processor;

pub use dispatcher::{AnimeLoadWorker, WorkerStatus};
pub use processor::TaskProcessor;
