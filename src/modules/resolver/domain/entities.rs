/// Resolution results and catalog collaborator records
use crate::modules::tasks::domain::entities::ResolutionMethod;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One search hit from the remote catalog's search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSearchResult {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub russian: Option<String>,
}

/// An anime record as known to the internal catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogAnime {
    pub id: Uuid,
    pub shikimori_id: String,
    pub name: String,
    #[serde(default)]
    pub name_japanese: Option<String>,
    #[serde(default)]
    pub mal_id: Option<i32>,
}

/// Outcome of resolving one MAL id.
///
/// `exact_*` results carry only the shikimori id; the anime still has to be
/// loaded into the catalog before the task can complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub shikimori_id: Option<String>,
    pub anime_id: Option<Uuid>,
    pub method: ResolutionMethod,
    pub confidence: f64,
}

impl ResolutionResult {
    pub fn cached(shikimori_id: String, anime_id: Option<Uuid>, confidence: f64) -> Self {
        Self {
            shikimori_id: Some(shikimori_id),
            anime_id,
            method: ResolutionMethod::Cached,
            confidence,
        }
    }

    pub fn exact(method: ResolutionMethod, shikimori_id: String) -> Self {
        Self {
            shikimori_id: Some(shikimori_id),
            anime_id: None,
            method,
            confidence: 1.0,
        }
    }

    pub fn not_found() -> Self {
        Self {
            shikimori_id: None,
            anime_id: None,
            method: ResolutionMethod::NotFound,
            confidence: 0.0,
        }
    }
}
