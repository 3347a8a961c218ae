use crate::core::criteria::FilterCriteria;
use crate::domain::model::{ApplicationAck, ApplicationRequest, CatalogItem, ItemId};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote catalog collaborator.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// `GET /universities`
    async fn list_all(&self) -> Result<Vec<CatalogItem>>;

    /// `GET /universities/filter?...`
    async fn query(&self, criteria: &FilterCriteria) -> Result<Vec<CatalogItem>>;

    /// `POST /universities/applications`
    async fn submit_application(&self, request: &ApplicationRequest) -> Result<ApplicationAck>;
}

/// Parent-facing notification for comparison changes.
pub trait ComparisonObserver: Send {
    fn comparison_changed(&mut self, selection: &[ItemId]);
}

impl<F> ComparisonObserver for F
where
    F: FnMut(&[ItemId]) + Send,
{
    fn comparison_changed(&mut self, selection: &[ItemId]) {
        self(selection)
    }
}
