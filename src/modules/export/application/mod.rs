pub mod service;

pub use service::ExportService;
