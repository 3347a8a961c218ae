use crate::core::coalescer::QuerySeq;
use crate::core::criteria::FilterCriteria;
use crate::core::eligibility::{evaluate, EligibilityVerdict};
use crate::domain::model::CatalogItem;
use crate::utils::error::FinderError;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedItem {
    pub item: CatalogItem,
    pub eligibility: EligibilityVerdict,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsView {
    pub items: Vec<AnnotatedItem>,
    pub count: usize,
    pub loading: bool,
    pub error: Option<String>,
    /// Sequence number of the query whose results are shown.
    pub seq: Option<QuerySeq>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResultsView {
    pub fn catalog_items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().map(|annotated| &annotated.item)
    }

    pub fn eligible_count(&self) -> usize {
        self.items
            .iter()
            .filter(|a| a.eligibility == EligibilityVerdict::Eligible)
            .count()
    }

    /// Settled means nothing is loading and at least one query was answered.
    pub fn is_settled(&self) -> bool {
        !self.loading && (self.seq.is_some() || self.error.is_some())
    }
}

/// Applies published query results and broadcasts the annotated view.
#[derive(Debug)]
pub struct ResultsController {
    view: ResultsView,
    publisher: watch::Sender<ResultsView>,
}

impl ResultsController {
    pub fn new() -> (Self, watch::Receiver<ResultsView>) {
        let (publisher, receiver) = watch::channel(ResultsView::default());
        let controller = Self {
            view: ResultsView::default(),
            publisher,
        };
        (controller, receiver)
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    pub fn mark_loading(&mut self) {
        if !self.view.loading {
            self.view.loading = true;
            self.publish();
        }
    }

    /// Applies the outcome of a non-stale query, annotating every item against
    /// `criteria`. Failures keep the previous items on screen.
    pub fn apply(
        &mut self,
        seq: QuerySeq,
        outcome: Result<Vec<CatalogItem>, FinderError>,
        criteria: &FilterCriteria,
    ) {
        match outcome {
            Ok(items) => {
                let items: Vec<AnnotatedItem> = items
                    .into_iter()
                    .map(|item| {
                        let eligibility = evaluate(&item, criteria.user_gpa, criteria.user_ielts);
                        AnnotatedItem { item, eligibility }
                    })
                    .collect();

                self.view.count = items.len();
                self.view.items = items;
                self.view.error = None;
                self.view.seq = Some(seq);
                tracing::info!(
                    "✅ Query {} published {} universities ({} eligible)",
                    seq,
                    self.view.count,
                    self.view.eligible_count()
                );
            }
            Err(e) => {
                tracing::warn!(
                    "❌ Query {} failed: {} (severity: {:?})",
                    seq,
                    e,
                    e.severity()
                );
                self.view.error = Some(e.user_friendly_message());
            }
        }

        self.view.loading = false;
        self.view.updated_at = Some(Utc::now());
        self.publish();
    }

    fn publish(&self) {
        self.publisher.send_replace(self.view.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::{CriteriaStore, CriteriaUpdate};
    use crate::domain::model::fixtures::item;
    use crate::domain::model::DegreeLevel;

    fn catalog() -> Vec<CatalogItem> {
        let mut strict = item(1, "USA", DegreeLevel::Master, 52_000.0);
        strict.required_gpa = 3.8;
        let relaxed = item(2, "UK", DegreeLevel::Bachelor, 9_000.0);
        vec![strict, relaxed]
    }

    #[test]
    fn test_apply_annotates_with_publish_time_criteria() {
        let (mut controller, receiver) = ResultsController::new();
        let mut store = CriteriaStore::default();
        store.update(CriteriaUpdate::UserGpa("3.5".to_string()));

        controller.mark_loading();
        assert!(receiver.borrow().loading);

        controller.apply(QuerySeq(1), Ok(catalog()), store.current());

        let view = receiver.borrow().clone();
        assert!(!view.loading);
        assert!(view.is_settled());
        assert_eq!(view.count, 2);
        assert_eq!(view.seq, Some(QuerySeq(1)));
        assert_eq!(view.items[0].eligibility, EligibilityVerdict::Ineligible);
        assert_eq!(view.items[1].eligibility, EligibilityVerdict::Eligible);
        assert_eq!(view.eligible_count(), 1);
    }

    #[test]
    fn test_no_scores_leaves_verdicts_unknown() {
        let (mut controller, _receiver) = ResultsController::new();
        controller.apply(QuerySeq(1), Ok(catalog()), &FilterCriteria::default());
        assert!(controller
            .view()
            .items
            .iter()
            .all(|a| a.eligibility == EligibilityVerdict::Unknown));
    }

    #[test]
    fn test_failure_keeps_previous_items_and_sets_error() {
        let (mut controller, receiver) = ResultsController::new();
        controller.apply(QuerySeq(1), Ok(catalog()), &FilterCriteria::default());

        controller.mark_loading();
        controller.apply(
            QuerySeq(2),
            Err(FinderError::ServiceStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            }),
            &FilterCriteria::default(),
        );

        let view = receiver.borrow().clone();
        assert!(!view.loading);
        assert_eq!(view.count, 2);
        assert_eq!(view.seq, Some(QuerySeq(1)));
        assert_eq!(view.error.as_deref(), Some("Error: Service Unavailable"));

        // The next successful result clears the error.
        controller.apply(QuerySeq(3), Ok(vec![]), &FilterCriteria::default());
        assert!(controller.view().error.is_none());
        assert_eq!(controller.view().count, 0);
    }
}
