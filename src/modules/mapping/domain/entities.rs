/// MAL to Shikimori id mapping cache entries
///
/// Mappings are advisory and long-lived: they survive across export jobs and
/// the resolver re-resolves whenever a cached internal id turns out to be
/// missing from the catalog.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Where a mapping came from. Confidence follows provenance: catalog hits
/// are certain, exact title matches are certain, manual picks are 0.9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    RemoteApi,
    TitleSearch,
    Manual,
}

impl MappingSource {
    pub fn default_confidence(&self) -> f64 {
        match self {
            MappingSource::RemoteApi => 1.0,
            MappingSource::TitleSearch => 1.0,
            MappingSource::Manual => 0.9,
        }
    }
}

impl fmt::Display for MappingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MappingSource::RemoteApi => "remote_api",
            MappingSource::TitleSearch => "title_search",
            MappingSource::Manual => "manual",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MappingSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote_api" => Ok(MappingSource::RemoteApi),
            "title_search" => Ok(MappingSource::TitleSearch),
            "manual" => Ok(MappingSource::Manual),
            _ => Err(format!("Unknown mapping source: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MalShikimoriMapping {
    pub mal_id: i32,
    pub shikimori_id: String,
    pub anime_id: Option<Uuid>,
    pub confidence: f64,
    pub source: MappingSource,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload; `created_at` is owned by the store.
#[derive(Debug, Clone)]
pub struct MappingUpsert {
    pub mal_id: i32,
    pub shikimori_id: String,
    pub anime_id: Option<Uuid>,
    pub confidence: f64,
    pub source: MappingSource,
}
