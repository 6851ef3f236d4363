pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::ExportService;
pub use domain::{
    AnimeTaskInput, CreateExportJobRequest, CreateTasksRequest, ExportJob, ExportJobRepository,
    ExportJobResponse, ExportJobStatus, NewExportJob,
};
pub use infrastructure::ExportJobRepositoryImpl;
