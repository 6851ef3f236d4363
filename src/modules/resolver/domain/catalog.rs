/// Capability traits for the two remote collaborators
///
/// The resolver depends only on these; concrete HTTP clients are injected at
/// wiring time and tests substitute mocks or fakes.
use crate::modules::resolver::domain::entities::{CatalogAnime, RemoteSearchResult};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

/// The remote catalog's search surface (rate-limited per IP)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<RemoteSearchResult>>;
}

/// The internal catalog service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InternalCatalog: Send + Sync {
    /// Probe by MAL id. `None` when the catalog has no resolved record.
    async fn get_by_mal_id(&self, mal_id: i32) -> AppResult<Option<CatalogAnime>>;

    /// Materialize a record by shikimori id, returning the internal anime id.
    /// A 404 from the catalog is a permanent failure, not a retry candidate.
    async fn load_by_shikimori_id(&self, shikimori_id: &str) -> AppResult<Uuid>;
}
