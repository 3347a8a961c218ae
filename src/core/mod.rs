pub mod coalescer;
pub mod comparison;
pub mod criteria;
pub mod eligibility;
pub mod results;
pub mod session;

pub use crate::domain::model::{CatalogItem, DegreeLevel, ItemId};
pub use crate::domain::ports::{CatalogService, ComparisonObserver};
pub use crate::utils::error::Result;
