use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use rust_decimal::Decimal;

use catalog_core::{Entity, ItemId, ItemTypeId};
use catalog_items::{Item, ItemType, NewItem};

use super::r#trait::{CatalogStore, ItemFilter, ScanOrder, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    items: BTreeMap<ItemId, Item>,
    types: BTreeMap<ItemTypeId, ItemType>,
    next_item_id: i64,
}

impl Tables {
    fn check_type_exists(&self, type_id: ItemTypeId) -> StoreResult<()> {
        if self.types.contains_key(&type_id) {
            Ok(())
        } else {
            Err(StoreError::ConstraintViolation(format!(
                "item type {type_id} does not exist"
            )))
        }
    }

    fn matching<'a>(&'a self, filter: &'a ItemFilter) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.values().filter(move |item| filter.matches(item))
    }
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Items are kept in primary-key order, which is the
/// store-native scan order. Every call takes the lock once, so a scan is a
/// consistent snapshot and writes are atomic per record.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-provisioned with the given item types.
    ///
    /// Every type must have a positive id and a name of 1..=100 characters.
    pub fn with_types(types: impl IntoIterator<Item = ItemType>) -> StoreResult<Self> {
        let store = Self::new();
        {
            let mut tables = store.write()?;
            for t in types {
                t.validate()
                    .map_err(|e| StoreError::ConstraintViolation(e.to_string()))?;
                tables.types.insert(t.id(), t);
            }
        }
        Ok(store)
    }

    /// Store with a handful of demo types and items, for local development.
    pub fn seed_demo_catalog() -> StoreResult<Self> {
        let types = ["Mug", "T-Shirt", "Sheet", "USB Memory Stick"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| ItemType::new(ItemTypeId::from_raw(i as i64 + 1), name));
        let store = Self::with_types(types)?;

        let demo = [
            (".NET Bot Black Hoodie", 1950, 2),
            (".NET Black & White Mug", 850, 1),
            ("Prism White T-Shirt", 1200, 2),
            (".NET Foundation T-shirt", 1200, 2),
            ("Roslyn Red Sheet", 850, 3),
            (".NET Blue Hoodie", 1200, 2),
            ("Roslyn Red T-Shirt", 1200, 2),
            ("Kudu Purple Hoodie", 850, 2),
            ("Cup<T> White Mug", 1200, 1),
            (".NET Foundation Sheet", 1200, 3),
            ("Cup<T> Sheet", 850, 3),
            ("Prism White TShirt", 1200, 2),
        ];
        let mut tables = store.write()?;
        for (name, cents, type_id) in demo {
            let item = NewItem::new(name, Decimal::new(cents, 2), ItemTypeId::from_raw(type_id));
            insert_locked(&mut tables, item)?;
        }
        drop(tables);
        Ok(store)
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

fn insert_locked(tables: &mut Tables, item: NewItem) -> StoreResult<ItemId> {
    item.validate()
        .map_err(|e| StoreError::ConstraintViolation(e.to_string()))?;
    tables.check_type_exists(item.type_id)?;

    tables.next_item_id += 1;
    let id = ItemId::from_raw(tables.next_item_id);
    tables.items.insert(id, item.into_item(id));
    Ok(id)
}

fn clamp(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count(&self) -> StoreResult<u64> {
        Ok(self.read()?.items.len() as u64)
    }

    async fn count_where(&self, filter: &ItemFilter) -> StoreResult<u64> {
        let tables = self.read()?;
        Ok(tables.matching(filter).count() as u64)
    }

    async fn scan_ordered(
        &self,
        order: ScanOrder,
        offset: u64,
        limit: u64,
        filter: &ItemFilter,
    ) -> StoreResult<Vec<Item>> {
        let (offset, limit) = (clamp(offset), clamp(limit));
        let tables = self.read()?;

        let page = match order {
            ScanOrder::Native => tables
                .matching(filter)
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            ScanOrder::Name => {
                let mut sorted: Vec<&Item> = tables.matching(filter).collect();
                // BTreeMap iteration is id-ascending and the sort is stable,
                // so equal names stay in id order.
                sorted.sort_by(|a, b| a.name.cmp(&b.name));
                sorted.into_iter().skip(offset).take(limit).cloned().collect()
            }
        };
        Ok(page)
    }

    async fn get_by_id(&self, id: ItemId) -> StoreResult<Item> {
        self.read()?
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    async fn get_by_id_set(&self, ids: &BTreeSet<ItemId>) -> StoreResult<Vec<Item>> {
        let tables = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.items.get(id).cloned())
            .collect())
    }

    async fn insert(&self, item: NewItem) -> StoreResult<ItemId> {
        let mut tables = self.write()?;
        insert_locked(&mut tables, item)
    }

    async fn update(&self, item: Item) -> StoreResult<()> {
        item.validate()
            .map_err(|e| StoreError::ConstraintViolation(e.to_string()))?;

        let mut tables = self.write()?;
        tables.check_type_exists(item.type_id)?;
        match tables.items.get_mut(&item.id()) {
            Some(existing) => {
                *existing = item;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("item {}", item.id()))),
        }
    }

    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    async fn list_types(&self) -> StoreResult<Vec<ItemType>> {
        Ok(self.read()?.types.values().cloned().collect())
    }
}
