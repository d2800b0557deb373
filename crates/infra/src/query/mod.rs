//! Catalog query and pagination engine.

pub mod service;

pub use service::{parse_id_list, CatalogQueryService};
