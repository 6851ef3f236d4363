pub mod entities;
pub mod repository;

pub use entities::{MalShikimoriMapping, MappingSource, MappingUpsert};
pub use repository::MappingRepository;
