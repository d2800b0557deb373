use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use catalog_core::{CatalogError, ItemId, ItemTypeId};
use catalog_items::{Item, ItemType, NewItem};

/// Store operation error.
///
/// These are the only failure modes a store reports to the query service.
/// Field-rule problems detected by the store (e.g. a name that is too long for
/// the column) are reported as `ConstraintViolation`, the same as a dangling
/// type reference.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    /// Transient I/O failure. Never retried by the store itself.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => CatalogError::NotFound(msg),
            StoreError::ConstraintViolation(msg) => CatalogError::ConstraintViolation(msg),
            StoreError::Unavailable(msg) => CatalogError::StoreUnavailable(msg),
        }
    }
}

/// Ordering applied by `CatalogStore::scan_ordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// Name ascending (byte-wise), id ascending as tie-break.
    Name,
    /// Whatever order the store keeps records in natively (primary key ascending
    /// for both bundled stores).
    Native,
}

/// Composable item predicate.
///
/// An empty filter matches every item. Both predicates must hold when both are
/// set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub type_id: Option<ItemTypeId>,
    pub name_prefix: Option<String>,
}

impl ItemFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(type_id: ItemTypeId) -> Self {
        Self {
            type_id: Some(type_id),
            name_prefix: None,
        }
    }

    /// Prefix filter. An empty prefix matches every name.
    pub fn name_prefix(prefix: impl Into<String>) -> Self {
        Self {
            type_id: None,
            name_prefix: Some(prefix.into()),
        }
    }

    pub fn and_type(mut self, type_id: Option<ItemTypeId>) -> Self {
        self.type_id = type_id;
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(type_id) = self.type_id {
            if item.type_id != type_id {
                return false;
            }
        }
        match &self.name_prefix {
            Some(prefix) => item.name_starts_with(prefix),
            None => true,
        }
    }
}

/// Persistent collection of items and item types.
///
/// No business logic lives behind this boundary: pagination, id-list parsing and
/// input validation belong to the query service. Implementations must:
/// - assign item ids on insert (callers never choose them)
/// - reject items whose `type_id` does not reference an existing type
/// - make insert/update/delete atomic single-record operations
/// - bound every call by their own I/O timeout
///
/// A scan is a point-in-time snapshot; it is not required to observe writes that
/// happen after it starts, and `count` followed by `scan_ordered` is not required
/// to be consistent under concurrent writers.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Total number of items.
    async fn count(&self) -> StoreResult<u64>;

    /// Number of items matching `filter`.
    async fn count_where(&self, filter: &ItemFilter) -> StoreResult<u64>;

    /// Items matching `filter`, sorted by `order`, skipping `offset`, at most `limit`.
    async fn scan_ordered(
        &self,
        order: ScanOrder,
        offset: u64,
        limit: u64,
        filter: &ItemFilter,
    ) -> StoreResult<Vec<Item>>;

    async fn get_by_id(&self, id: ItemId) -> StoreResult<Item>;

    /// Items whose id is in `ids`, in store iteration order. Missing ids are
    /// silently omitted.
    async fn get_by_id_set(&self, ids: &BTreeSet<ItemId>) -> StoreResult<Vec<Item>>;

    /// Filter selecting items whose name starts with `prefix`, for use with
    /// `count_where` / `scan_ordered`.
    fn by_name_prefix(&self, prefix: &str) -> ItemFilter {
        ItemFilter::name_prefix(prefix)
    }

    /// Persist a new item and return the id assigned to it.
    async fn insert(&self, item: NewItem) -> StoreResult<ItemId>;

    /// Replace every field of the item with `item.id`.
    async fn update(&self, item: Item) -> StoreResult<()>;

    async fn delete(&self, id: ItemId) -> StoreResult<()>;

    async fn list_types(&self) -> StoreResult<Vec<ItemType>>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn count(&self) -> StoreResult<u64> {
        (**self).count().await
    }

    async fn count_where(&self, filter: &ItemFilter) -> StoreResult<u64> {
        (**self).count_where(filter).await
    }

    async fn scan_ordered(
        &self,
        order: ScanOrder,
        offset: u64,
        limit: u64,
        filter: &ItemFilter,
    ) -> StoreResult<Vec<Item>> {
        (**self).scan_ordered(order, offset, limit, filter).await
    }

    async fn get_by_id(&self, id: ItemId) -> StoreResult<Item> {
        (**self).get_by_id(id).await
    }

    async fn get_by_id_set(&self, ids: &BTreeSet<ItemId>) -> StoreResult<Vec<Item>> {
        (**self).get_by_id_set(ids).await
    }

    fn by_name_prefix(&self, prefix: &str) -> ItemFilter {
        (**self).by_name_prefix(prefix)
    }

    async fn insert(&self, item: NewItem) -> StoreResult<ItemId> {
        (**self).insert(item).await
    }

    async fn update(&self, item: Item) -> StoreResult<()> {
        (**self).update(item).await
    }

    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        (**self).delete(id).await
    }

    async fn list_types(&self) -> StoreResult<Vec<ItemType>> {
        (**self).list_types().await
    }
}
