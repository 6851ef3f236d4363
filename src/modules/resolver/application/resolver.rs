/// MAL id resolution pipeline
///
/// Resolution stops at the first success: mapping cache, catalog probe by
/// MAL id, exact Japanese title match, exact romanized title match. Search
/// failures propagate so the task is retried; a probe failure only skips
/// the probe step.
use crate::modules::mapping::domain::entities::{MappingSource, MappingUpsert};
use crate::modules::mapping::domain::repository::MappingRepository;
use crate::modules::resolver::domain::catalog::{InternalCatalog, RemoteCatalog};
use crate::modules::resolver::domain::entities::ResolutionResult;
use crate::modules::resolver::domain::title::normalize_title;
use crate::modules::tasks::domain::entities::{AnimeLoadTask, ResolutionMethod};
use crate::shared::errors::AppResult;
use crate::{log_debug, log_info, log_warn};
use std::sync::Arc;
use uuid::Uuid;

const SEARCH_LIMIT: u32 = 10;

pub struct MalResolver {
    mapping_repo: Arc<dyn MappingRepository>,
    remote_catalog: Arc<dyn RemoteCatalog>,
    internal_catalog: Arc<dyn InternalCatalog>,
}

impl MalResolver {
    pub fn new(
        mapping_repo: Arc<dyn MappingRepository>,
        remote_catalog: Arc<dyn RemoteCatalog>,
        internal_catalog: Arc<dyn InternalCatalog>,
    ) -> Self {
        Self {
            mapping_repo,
            remote_catalog,
            internal_catalog,
        }
    }

    pub async fn resolve(&self, task: &AnimeLoadTask) -> AppResult<ResolutionResult> {
        // Step 1: mapping cache
        if let Some(mapping) = self.mapping_repo.get(task.mal_id).await? {
            log_debug!(
                "Found cached mapping: mal_id={} shikimori_id={}",
                task.mal_id,
                mapping.shikimori_id
            );
            return Ok(ResolutionResult::cached(
                mapping.shikimori_id,
                mapping.anime_id,
                mapping.confidence,
            ));
        }

        // Step 2: catalog probe by MAL id. Failures here are not fatal,
        // the title search below can still resolve the task.
        match self.internal_catalog.get_by_mal_id(task.mal_id).await {
            Ok(Some(anime)) if !anime.shikimori_id.is_empty() => {
                log_debug!(
                    "Found anime in catalog by MAL id: mal_id={} anime_id={}",
                    task.mal_id,
                    anime.id
                );
                self.cache_mapping(MappingUpsert {
                    mal_id: task.mal_id,
                    shikimori_id: anime.shikimori_id.clone(),
                    anime_id: Some(anime.id),
                    confidence: 1.0,
                    source: MappingSource::RemoteApi,
                })
                .await;
                return Ok(ResolutionResult::cached(
                    anime.shikimori_id,
                    Some(anime.id),
                    1.0,
                ));
            }
            Ok(_) => {}
            Err(e) => {
                log_warn!("Catalog probe failed for MAL id {}: {}", task.mal_id, e);
            }
        }

        // Step 3: exact Japanese title match
        if let Some(japanese) = task
            .mal_title_japanese
            .as_deref()
            .filter(|t| !t.is_empty())
        {
            if let Some(result) = self
                .search_exact(japanese, ResolutionMethod::ExactJapanese)
                .await?
            {
                log_info!(
                    "Exact Japanese title match: mal_id={} shikimori_id={:?}",
                    task.mal_id,
                    result.shikimori_id
                );
                return Ok(result);
            }
        }

        // Step 4: exact romanized title match
        if let Some(result) = self
            .search_exact(&task.mal_title, ResolutionMethod::ExactRomanized)
            .await?
        {
            log_info!(
                "Exact romanized title match: mal_id={} shikimori_id={:?}",
                task.mal_id,
                result.shikimori_id
            );
            return Ok(result);
        }

        log_warn!(
            "No exact match for MAL id {} ({}), manual resolution required",
            task.mal_id,
            task.mal_title
        );
        Ok(ResolutionResult::not_found())
    }

    /// Materialize a resolved anime in the catalog and cache the mapping.
    /// Returns the internal anime id.
    pub async fn load_anime(
        &self,
        mal_id: i32,
        shikimori_id: &str,
        source: MappingSource,
    ) -> AppResult<Uuid> {
        let anime_id = self
            .internal_catalog
            .load_by_shikimori_id(shikimori_id)
            .await?;

        self.cache_mapping(MappingUpsert {
            mal_id,
            shikimori_id: shikimori_id.to_string(),
            anime_id: Some(anime_id),
            confidence: 1.0,
            source,
        })
        .await;

        Ok(anime_id)
    }

    /// Record an out-of-band user pick at reduced confidence.
    pub async fn save_user_selection(
        &self,
        mal_id: i32,
        shikimori_id: &str,
        anime_id: Option<Uuid>,
    ) -> AppResult<()> {
        self.mapping_repo
            .upsert(MappingUpsert {
                mal_id,
                shikimori_id: shikimori_id.to_string(),
                anime_id,
                confidence: MappingSource::Manual.default_confidence(),
                source: MappingSource::Manual,
            })
            .await
    }

    async fn search_exact(
        &self,
        title: &str,
        method: ResolutionMethod,
    ) -> AppResult<Option<ResolutionResult>> {
        let results = self.remote_catalog.search(title, SEARCH_LIMIT).await?;
        let wanted = normalize_title(title);

        for result in results {
            let candidate = match method {
                ResolutionMethod::ExactJapanese => result.japanese.as_deref().unwrap_or(""),
                _ => result.name.as_str(),
            };
            if !candidate.is_empty() && normalize_title(candidate) == wanted {
                return Ok(Some(ResolutionResult::exact(method, result.id)));
            }
        }

        Ok(None)
    }

    // The mapping is a cache; failing to write it never fails the task.
    async fn cache_mapping(&self, mapping: MappingUpsert) {
        let mal_id = mapping.mal_id;
        if let Err(e) = self.mapping_repo.upsert(mapping).await {
            log_warn!("Failed to cache mapping for MAL id {}: {}", mal_id, e);
        }
    }
}
