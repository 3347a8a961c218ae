use crate::core::criteria::FilterCriteria;
use crate::domain::model::{decode_catalog, ApplicationAck, ApplicationRequest, CatalogItem};
use crate::domain::ports::CatalogService;
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

const LISTING_PATH: &str = "universities";
const FILTER_PATH: &str = "universities/filter";
const APPLICATIONS_PATH: &str = "universities/applications";

/// reqwest-backed client for the remote catalog service.
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    client: Client,
    base_url: Url,
}

impl HttpCatalogService {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| FinderError::InvalidConfigValue {
            field: "service.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FinderError::Config {
                message: format!("Cannot build endpoint '{}': {}", path, e),
            })
    }

    async fn fetch_catalog(&self, request: RequestBuilder) -> Result<Vec<CatalogItem>> {
        let response = request.send().await?;
        tracing::debug!("📡 Catalog response status: {}", response.status());

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let payload: serde_json::Value = response.json().await?;
        decode_catalog(payload)
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn list_all(&self) -> Result<Vec<CatalogItem>> {
        let url = self.endpoint(LISTING_PATH)?;
        tracing::debug!("📡 Fetching full catalog: {}", url);
        self.fetch_catalog(self.client.get(url)).await
    }

    async fn query(&self, criteria: &FilterCriteria) -> Result<Vec<CatalogItem>> {
        let url = self.endpoint(FILTER_PATH)?;
        let params = criteria.query_pairs();
        tracing::debug!("📡 Querying catalog: {} {:?}", url, params);
        self.fetch_catalog(self.client.get(url).query(&params)).await
    }

    async fn submit_application(&self, request: &ApplicationRequest) -> Result<ApplicationAck> {
        request.validate()?;

        let url = self.endpoint(APPLICATIONS_PATH)?;
        tracing::info!(
            "📨 Submitting application to {} for {}",
            request.university_name,
            request.full_name
        );

        let response = self.client.post(url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = read_json_lenient(response).await;
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Application submitted successfully!")
            .to_string();

        Ok(ApplicationAck {
            university_id: request.university_id,
            message,
            received_at: chrono::Utc::now(),
        })
    }
}

/// Builds a [`FinderError::ServiceStatus`] using the body's `error` field when present.
async fn status_error(response: Response) -> FinderError {
    let status = response.status();
    let body = read_json_lenient(response).await;
    let message = body
        .get("error")
        .and_then(|e| e.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| "Something went wrong".to_string());

    tracing::warn!("⚠️ Catalog service returned {}: {}", status, message);
    FinderError::ServiceStatus {
        status: status.as_u16(),
        message,
    }
}

async fn read_json_lenient(response: Response) -> serde_json::Value {
    match response.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(serde_json::Value::Null),
        Err(_) => serde_json::Value::Null,
    }
}
