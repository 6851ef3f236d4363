pub mod entities;
pub mod repository;

pub use entities::{
    AnimeTaskInput, CreateExportJobRequest, CreateTasksRequest, ExportJob, ExportJobResponse,
    ExportJobStatus, NewExportJob,
};
pub use repository::ExportJobRepository;
