/// Repository trait for the MAL to Shikimori mapping cache
use crate::modules::mapping::domain::entities::{MalShikimoriMapping, MappingUpsert};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Look up a single mapping by MAL id
    async fn get(&self, mal_id: i32) -> AppResult<Option<MalShikimoriMapping>>;

    /// Look up many mappings at once; missing ids are simply absent
    /// from the result.
    async fn get_batch(&self, mal_ids: &[i32]) -> AppResult<Vec<MalShikimoriMapping>>;

    /// Insert or replace the mapping for `mapping.mal_id`. An existing row
    /// gets its shikimori_id, anime_id, confidence and source overwritten.
    async fn upsert(&self, mapping: MappingUpsert) -> AppResult<()>;

    /// Total number of cached mappings
    async fn count(&self) -> AppResult<i64>;
}
