/// Diesel-based implementation of MappingRepository
use crate::modules::mapping::domain::entities::{MalShikimoriMapping, MappingUpsert};
use crate::modules::mapping::domain::repository::MappingRepository;
use crate::modules::mapping::infrastructure::models::{MappingModel, MappingUpsertModel};
use crate::schema::mal_shikimori_mapping;
use crate::shared::database::{DbConnection, DbPool};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use diesel::prelude::*;

pub struct MappingRepositoryImpl {
    pool: DbPool,
}

impl MappingRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }
}

#[async_trait]
impl MappingRepository for MappingRepositoryImpl {
    async fn get(&self, mal_id: i32) -> AppResult<Option<MalShikimoriMapping>> {
        let mut conn = self.get_conn()?;

        let mapping: Option<MappingModel> = mal_shikimori_mapping::table
            .find(mal_id)
            .select(MappingModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get mapping: {}", e)))?;

        Ok(mapping.map(|m| m.into_domain()))
    }

    async fn get_batch(&self, mal_ids: &[i32]) -> AppResult<Vec<MalShikimoriMapping>> {
        if mal_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_conn()?;

        let mappings: Vec<MappingModel> = mal_shikimori_mapping::table
            .filter(mal_shikimori_mapping::mal_id.eq_any(mal_ids))
            .select(MappingModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to get mappings: {}", e)))?;

        Ok(mappings.into_iter().map(|m| m.into_domain()).collect())
    }

    async fn upsert(&self, mapping: MappingUpsert) -> AppResult<()> {
        let model = MappingUpsertModel::from(mapping);
        let mut conn = self.get_conn()?;

        diesel::insert_into(mal_shikimori_mapping::table)
            .values(&model)
            .on_conflict(mal_shikimori_mapping::mal_id)
            .do_update()
            .set((
                mal_shikimori_mapping::shikimori_id.eq(&model.shikimori_id),
                mal_shikimori_mapping::anime_id.eq(model.anime_id),
                mal_shikimori_mapping::confidence.eq(model.confidence),
                mal_shikimori_mapping::source.eq(&model.source),
            ))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to upsert mapping: {}", e)))?;

        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let mut conn = self.get_conn()?;

        mal_shikimori_mapping::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to count mappings: {}", e)))
    }
}
