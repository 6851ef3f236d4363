pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::MalResolver;
pub use domain::{
    normalize_title, CatalogAnime, InternalCatalog, RemoteCatalog, RemoteSearchResult,
    ResolutionResult,
};
pub use infrastructure::{CatalogClient, ShikimoriClient};
