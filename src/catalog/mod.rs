//! Catalog module for talking to the external manga metadata service
//!
//! This module provides an HTTP transport with timeouts and bounded retries,
//! and a [`CatalogClient`] that builds catalog URLs and reshapes responses.

#[cfg(test)]
pub(crate) mod stub;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::constants::endpoints;
use crate::parser::{find_genre_id, parse_manga_list, MangaSummary};

/// Errors that can occur while calling the catalog service
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport failure (timeout, DNS, refused) or an unexpected status such as 5xx
    #[error("Failed to reach catalog service: {0}")]
    UpstreamUnavailable(String),

    /// The requested entry does not exist upstream
    #[error("Not found in catalog: {0}")]
    NotFound(String),

    /// Body was not the JSON shape we expect
    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    /// Rate limited by the catalog service
    #[error("Rate limited by catalog service")]
    RateLimited,
}

impl CatalogError {
    /// Whether another attempt may succeed
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::RateLimited | CatalogError::UpstreamUnavailable(_)
        )
    }
}

/// Fetches JSON documents from catalog URLs
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, CatalogError>;
}

/// Retry behaviour for [`RetryingTransport`]
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum attempts per request
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Exponential backoff with jitter
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = self.backoff_base_ms.saturating_mul(2u64.saturating_pow(attempt));
        let jitter = rand::thread_rng().gen_range(0..250);
        Duration::from_millis(delay.saturating_add(jitter))
    }
}

const USER_AGENT: &str = concat!("manga-gateway/", env!("CARGO_PKG_VERSION"));

/// Map an HTTP status to the catalog error it represents, if any
fn classify_status(status: StatusCode) -> Option<CatalogError> {
    if status.is_success() {
        return None;
    }

    Some(match status {
        StatusCode::NOT_FOUND => CatalogError::NotFound("catalog entry".to_string()),
        StatusCode::TOO_MANY_REQUESTS => CatalogError::RateLimited,
        other => CatalogError::UpstreamUnavailable(format!("HTTP {}", other.as_u16())),
    })
}

/// reqwest-backed transport; one request per call
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::UpstreamUnavailable("Connection timeout".to_string())
                } else if e.is_connect() {
                    CatalogError::UpstreamUnavailable("Failed to connect to server".to_string())
                } else {
                    CatalogError::UpstreamUnavailable(e.to_string())
                }
            })?;

        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::UpstreamUnavailable(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| CatalogError::MalformedResponse(e.to_string()))
    }
}

/// Wraps a transport with exponential backoff on 429, 5xx and transport failures
pub struct RetryingTransport<T> {
    inner: T,
    config: RetryConfig,
}

impl<T: CatalogTransport> RetryingTransport<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<T: CatalogTransport> CatalogTransport for RetryingTransport<T> {
    async fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                sleep(self.config.backoff_delay(attempt)).await;
            }

            match self.inner.get_json(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() => {
                    warn!("{} on attempt {}, retrying...", e, attempt + 1);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| CatalogError::UpstreamUnavailable("Max retries exceeded".to_string())))
    }
}

/// Client for the manga catalog service
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn CatalogTransport>,
    base_url: String,
}

impl CatalogClient {
    pub fn new(transport: Arc<dyn CatalogTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, url: String) -> Result<Value, CatalogError> {
        info!("Fetching catalog URL: {}", url);
        self.transport.get_json(&url).await
    }

    /// Raw search payload for a free-text term
    pub async fn search(&self, term: &str) -> Result<Value, CatalogError> {
        self.fetch(endpoints::search(&self.base_url, term)).await
    }

    /// Raw detail payload for a catalog identifier
    pub async fn manga_by_id(&self, id: u64) -> Result<Value, CatalogError> {
        self.fetch(endpoints::manga(&self.base_url, id)).await
    }

    /// Identifier of the best match for a search term
    pub async fn top_manga_id(&self, term: &str) -> Result<u64, CatalogError> {
        let payload = self.search(term).await?;
        parse_manga_list(&payload)?
            .first()
            .map(|manga| manga.mal_id)
            .ok_or_else(|| CatalogError::NotFound(format!("no manga matches '{}'", term)))
    }

    /// Full details of the best match for a search term
    ///
    /// Two sequential calls: search, then detail lookup of the first hit.
    pub async fn top_match(&self, term: &str) -> Result<Value, CatalogError> {
        let id = self.top_manga_id(term).await?;
        self.manga_by_id(id).await
    }

    /// Top-ranked manga
    pub async fn recommendations(&self, limit: u32) -> Result<Vec<MangaSummary>, CatalogError> {
        let payload = self.fetch(endpoints::top_manga(&self.base_url, limit)).await?;
        parse_manga_list(&payload)
    }

    /// Manga tagged with the named genre (case-insensitive)
    pub async fn by_genre(&self, genre_name: &str) -> Result<Vec<MangaSummary>, CatalogError> {
        let genres = self.fetch(endpoints::manga_genres(&self.base_url)).await?;
        let genre_id = find_genre_id(&genres, genre_name)?
            .ok_or_else(|| CatalogError::NotFound(format!("genre '{}'", genre_name)))?;

        let payload = self
            .fetch(endpoints::manga_by_genre(&self.base_url, genre_id))
            .await?;
        parse_manga_list(&payload)
    }

    /// Currently publishing manga, newest first
    pub async fn recent(&self, limit: u32) -> Result<Vec<MangaSummary>, CatalogError> {
        let payload = self.fetch(endpoints::recent(&self.base_url, limit)).await?;
        parse_manga_list(&payload)
    }

    /// Upcoming manga
    pub async fn upcoming(&self, limit: u32) -> Result<Vec<MangaSummary>, CatalogError> {
        let payload = self.fetch(endpoints::upcoming(&self.base_url, limit)).await?;
        parse_manga_list(&payload)
    }
}
