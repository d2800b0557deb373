//! Infrastructure layer: catalog stores, the query service, and configuration.

pub mod config;
pub mod query;
pub mod store;


pub use config::{CatalogConfig, ConfigError};
pub use query::CatalogQueryService;
pub use store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, StoreError};
