pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::FinderConfig;

pub use adapters::{HttpCatalogService, InMemoryCatalog};
pub use core::comparison::{ComparisonSelector, ComparisonTable};
pub use core::criteria::{CriteriaStore, CriteriaUpdate, FilterCriteria};
pub use core::eligibility::{evaluate, EligibilityVerdict};
pub use core::session::{FinderSession, SessionHandle, SessionOptions};
pub use domain::model::{ApplicationRequest, CatalogItem, DegreeLevel, ItemId};
pub use domain::ports::CatalogService;
pub use utils::error::{FinderError, Result};
