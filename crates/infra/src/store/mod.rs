//! Catalog store boundary.
//!
//! The query service depends only on the `CatalogStore` contract; the two
//! bundled implementations are an in-memory store (dev/tests) and a Postgres
//! store (production).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::{CatalogStore, ItemFilter, ScanOrder, StoreError, StoreResult};
