/// Diesel models for the mal_shikimori_mapping table
use crate::modules::mapping::domain::entities::{MalShikimoriMapping, MappingSource, MappingUpsert};
use crate::schema::mal_shikimori_mapping;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = mal_shikimori_mapping)]
pub struct MappingUpsertModel {
    pub mal_id: i32,
    pub shikimori_id: String,
    pub anime_id: Option<Uuid>,
    pub confidence: f64,
    pub source: String,
}

impl From<MappingUpsert> for MappingUpsertModel {
    fn from(m: MappingUpsert) -> Self {
        Self {
            mal_id: m.mal_id,
            shikimori_id: m.shikimori_id,
            anime_id: m.anime_id,
            confidence: m.confidence,
            source: m.source.to_string(),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = mal_shikimori_mapping)]
pub struct MappingModel {
    pub mal_id: i32,
    pub shikimori_id: String,
    pub anime_id: Option<Uuid>,
    pub confidence: f64,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl MappingModel {
    pub fn into_domain(self) -> MalShikimoriMapping {
        // Unknown source strings degrade to manual rather than failing the read.
        let source =
            MappingSource::from_str(&self.source).unwrap_or(MappingSource::Manual);
        MalShikimoriMapping {
            mal_id: self.mal_id,
            shikimori_id: self.shikimori_id,
            anime_id: self.anime_id,
            confidence: self.confidence,
            source,
            created_at: self.created_at,
        }
    }
}
