pub mod domain;
pub mod infrastructure;

pub use domain::{MalShikimoriMapping, MappingRepository, MappingSource, MappingUpsert};
pub use infrastructure::MappingRepositoryImpl;
