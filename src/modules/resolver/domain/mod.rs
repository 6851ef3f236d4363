pub mod catalog;
pub mod entities;
pub mod title;

pub use catalog::{InternalCatalog, RemoteCatalog};
pub use entities::{CatalogAnime, RemoteSearchResult, ResolutionResult};
pub use title::{normalize_title, titles_match};
