use crate::core::criteria::FilterCriteria;
use crate::domain::model::{decode_catalog, ApplicationAck, ApplicationRequest, CatalogItem};
use crate::domain::ports::CatalogService;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use std::sync::Mutex;

/// Catalog held in memory, filtered with the same rules as the remote service.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
    applications: Mutex<Vec<ApplicationRequest>>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            applications: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json(payload: serde_json::Value) -> Result<Self> {
        Ok(Self::new(decode_catalog(payload)?))
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<CatalogItem> {
        self.items
            .iter()
            .filter(|item| criteria.matches(item))
            .cloned()
            .collect()
    }

    pub fn applications(&self) -> Vec<ApplicationRequest> {
        self.applications
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn list_all(&self) -> Result<Vec<CatalogItem>> {
        Ok(self.items.clone())
    }

    async fn query(&self, criteria: &FilterCriteria) -> Result<Vec<CatalogItem>> {
        Ok(self.filter(criteria))
    }

    async fn submit_application(&self, request: &ApplicationRequest) -> Result<ApplicationAck> {
        request.validate()?;

        if let Ok(mut received) = self.applications.lock() {
            received.push(request.clone());
        }
        Ok(ApplicationAck {
            university_id: request.university_id,
            message: "Application submitted successfully!".to_string(),
            received_at: chrono::Utc::now(),
        })
    }
}
