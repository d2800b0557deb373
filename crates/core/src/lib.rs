//! `catalog-core`: shared building blocks for the catalog service.
//!
//! This crate contains identifiers and the error taxonomy (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{CatalogError, CatalogResult};
pub use id::{ItemId, ItemTypeId};
