// Adapters layer: concrete catalog service implementations.

pub mod http;
pub mod memory;

pub use http::HttpCatalogService;
pub use memory::InMemoryCatalog;
