//! Catalog error model.

use thiserror::Error;

/// Result type used across the catalog service.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-level error.
///
/// Callers branch on the variant, never on the message text. The first four
/// variants describe client-side problems; `StoreUnavailable` is the only
/// infrastructure failure and is surfaced as-is (no retries here).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Malformed or out-of-range caller input (non-numeric id, non-positive id, bad paging).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A referential or field rule was broken on write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A syntactically valid id-list filter matched nothing.
    #[error("no items matched the requested ids")]
    EmptyResult,

    /// Transient storage failure.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CatalogError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::ConstraintViolation(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }
}
