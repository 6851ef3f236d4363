/// HTTP client for the internal catalog service
use crate::modules::resolver::domain::catalog::InternalCatalog;
use crate::modules::resolver::domain::entities::CatalogAnime;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct MalLookupEnvelope {
    data: MalLookupData,
}

#[derive(Deserialize)]
struct MalLookupData {
    status: String,
    #[serde(default)]
    anime: Option<CatalogAnime>,
}

#[derive(Deserialize)]
struct LoadEnvelope {
    data: LoadData,
}

#[derive(Deserialize)]
struct LoadData {
    id: Uuid,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl InternalCatalog for CatalogClient {
    async fn get_by_mal_id(&self, mal_id: i32) -> AppResult<Option<CatalogAnime>> {
        let url = format!("{}/api/anime/mal/{}", self.base_url, mal_id);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Catalog MAL lookup returned status {}",
                status
            )));
        }

        let envelope = response.json::<MalLookupEnvelope>().await?;

        // An ambiguous lookup carries no usable id; the caller falls back
        // to title search.
        if envelope.data.status == "resolved" {
            Ok(envelope.data.anime)
        } else {
            Ok(None)
        }
    }

    async fn load_by_shikimori_id(&self, shikimori_id: &str) -> AppResult<Uuid> {
        let url = format!("{}/api/anime/shikimori/{}", self.base_url, shikimori_id);

        let response = self.client.post(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "Catalog has no record for shikimori id {}",
                shikimori_id
            )));
        }
        if !status.is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Catalog load returned status {}",
                status
            )));
        }

        let envelope = response.json::<LoadEnvelope>().await?;
        Ok(envelope.data.id)
    }
}
