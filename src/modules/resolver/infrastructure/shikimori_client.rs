/// HTTP client for the remote catalog (Shikimori)
///
/// Every search goes through the shared process-wide rate limiter; the
/// remote service's budget is per IP, so one bucket covers all call paths.
use crate::modules::resolver::domain::catalog::RemoteCatalog;
use crate::modules::resolver::domain::entities::RemoteSearchResult;
use crate::shared::config::RemoteCatalogConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::RateLimiter;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ShikimoriClient {
    client: reqwest::Client,
    base_url: String,
    app_name: String,
    rate_limiter: Arc<RateLimiter>,
}

impl ShikimoriClient {
    pub fn new(config: &RemoteCatalogConfig, rate_limiter: Arc<RateLimiter>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_name: config.app_name.clone(),
            rate_limiter,
        })
    }
}

#[async_trait]
impl RemoteCatalog for ShikimoriClient {
    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<RemoteSearchResult>> {
        self.rate_limiter.acquire().await;

        let url = format!(
            "{}/api/anime?search={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.app_name)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimitError(
                "Remote catalog rate limit exceeded".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Remote catalog search returned status {}",
                status
            )));
        }

        Ok(response.json::<Vec<RemoteSearchResult>>().await?)
    }
}
