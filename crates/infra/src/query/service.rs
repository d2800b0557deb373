use std::collections::BTreeSet;

use tracing::debug;

use catalog_core::{CatalogError, CatalogResult, ItemId, ItemTypeId};
use catalog_items::{Item, ItemType, NewItem, PageRequest, PaginatedItems};

use crate::store::{CatalogStore, ItemFilter, ScanOrder};

/// Query and pagination engine over a `CatalogStore`.
///
/// Holds nothing but the store handle, so it can be cloned per request or
/// shared between handlers. It adds input validation in front of the store and
/// otherwise passes store errors through unchanged.
#[derive(Debug, Clone)]
pub struct CatalogQueryService<S> {
    store: S,
}

impl<S> CatalogQueryService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every item, name ascending, one page at a time.
    ///
    /// A page past the end is empty, not an error; `count` still reports the
    /// full total.
    pub async fn list_paged(&self, page: PageRequest) -> CatalogResult<PaginatedItems<Item>> {
        let total = self.store.count().await?;
        let data = self
            .store
            .scan_ordered(ScanOrder::Name, page.offset(), page.limit(), &ItemFilter::all())
            .await?;

        debug!(
            page_size = page.page_size(),
            page_index = page.page_index(),
            total,
            returned = data.len(),
            "list_paged"
        );
        Ok(PaginatedItems::new(page, total, data))
    }

    /// Items whose ids appear in a comma-separated list.
    ///
    /// Parsing is all-or-nothing: one malformed token fails the whole request.
    /// Ids that parse but do not exist are skipped; if none of them exist the
    /// result is `EmptyResult`.
    pub async fn list_by_ids(&self, ids_csv: &str) -> CatalogResult<Vec<Item>> {
        let ids = parse_id_list(ids_csv)?;
        let items = self.store.get_by_id_set(&ids).await?;

        debug!(requested = ids.len(), returned = items.len(), "list_by_ids");
        if items.is_empty() {
            return Err(CatalogError::EmptyResult);
        }
        Ok(items)
    }

    /// Items of one type (or all items), in store-native order.
    pub async fn list_by_type(
        &self,
        type_id: Option<ItemTypeId>,
        page: PageRequest,
    ) -> CatalogResult<PaginatedItems<Item>> {
        let filter = ItemFilter::all().and_type(type_id);
        let total = self.store.count_where(&filter).await?;
        let data = self
            .store
            .scan_ordered(ScanOrder::Native, page.offset(), page.limit(), &filter)
            .await?;

        debug!(
            type_id = type_id.map(i64::from),
            total,
            returned = data.len(),
            "list_by_type"
        );
        Ok(PaginatedItems::new(page, total, data))
    }

    /// Items whose name starts with `prefix`, name ascending.
    ///
    /// An empty prefix matches every item; callers are expected to reject it
    /// before getting here.
    pub async fn list_by_name_prefix(
        &self,
        prefix: &str,
        page: PageRequest,
    ) -> CatalogResult<PaginatedItems<Item>> {
        let filter = self.store.by_name_prefix(prefix);
        let total = self.store.count_where(&filter).await?;
        let data = self
            .store
            .scan_ordered(ScanOrder::Name, page.offset(), page.limit(), &filter)
            .await?;

        debug!(prefix, total, returned = data.len(), "list_by_name_prefix");
        Ok(PaginatedItems::new(page, total, data))
    }

    pub async fn get_by_id(&self, id: i64) -> CatalogResult<Item> {
        let id = ItemId::positive(id)?;
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn list_types(&self) -> CatalogResult<Vec<ItemType>> {
        Ok(self.store.list_types().await?)
    }

    pub async fn create_item(&self, fields: NewItem) -> CatalogResult<ItemId> {
        fields.validate()?;
        let id = self.store.insert(fields).await?;
        debug!(item_id = %id, "create_item");
        Ok(id)
    }

    /// Replace every field of an existing item with the submitted values.
    pub async fn update_item(&self, item: Item) -> CatalogResult<ItemId> {
        item.validate()?;
        // Existence check first so a missing id never reaches the write path.
        self.store.get_by_id(item.id).await?;

        let id = item.id;
        self.store.update(item).await?;
        debug!(item_id = %id, "update_item");
        Ok(id)
    }

    pub async fn delete_item(&self, id: i64) -> CatalogResult<()> {
        let id = ItemId::positive(id)?;
        self.store.delete(id).await?;
        debug!(item_id = %id, "delete_item");
        Ok(())
    }
}

/// Parse a comma-separated id list.
///
/// Tokens are trimmed; any token that is not a 64-bit integer (including an
/// empty token, so `""` and `"1,,2"` both fail) rejects the whole list.
pub fn parse_id_list(ids_csv: &str) -> CatalogResult<BTreeSet<ItemId>> {
    ids_csv
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<i64>()
                .map(ItemId::from_raw)
                .map_err(|_| CatalogError::invalid_argument("malformed id list"))
        })
        .collect()
}
