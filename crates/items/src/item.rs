use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{CatalogError, CatalogResult, Entity, ItemId, ItemTypeId};

/// Maximum length of an item name, in characters.
pub const ITEM_NAME_MAX_CHARS: usize = 50;

/// Maximum length of an item type name, in characters.
pub const ITEM_TYPE_NAME_MAX_CHARS: usize = 100;

/// Prices are stored as `NUMERIC(18, 2)`: at most two decimal places.
pub const PRICE_MAX_SCALE: u32 = 2;

/// Largest price a `NUMERIC(18, 2)` column holds.
pub const PRICE_MAX: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 2);

/// A named category referenced by items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemType {
    pub id: ItemTypeId,
    pub name: String,
}

impl ItemType {
    pub fn new(id: ItemTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Positive id and a name of 1..=100 characters.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.id.get() <= 0 {
            return Err(CatalogError::invalid_argument(format!(
                "item type id must be positive, got {}",
                self.id
            )));
        }
        check_name("item type name", &self.name, ITEM_TYPE_NAME_MAX_CHARS)
    }
}

impl Entity for ItemType {
    type Id = ItemTypeId;

    fn id(&self) -> ItemTypeId {
        self.id
    }
}

/// Fields of an item that has not been persisted yet.
///
/// The id is always assigned by the store on insert, so it is not part of
/// this payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(alias = "catalogTypeId")]
    pub type_id: ItemTypeId,
}

impl NewItem {
    pub fn new(name: impl Into<String>, price: Decimal, type_id: ItemTypeId) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            type_id,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check field rules (name length, non-negative price).
    ///
    /// Referential integrity of `type_id` is checked by the store, which is the
    /// only component that knows which types exist.
    pub fn validate(&self) -> CatalogResult<()> {
        validate_fields(&self.name, self.price)
    }

    /// Attach the store-assigned id.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            type_id: self.type_id,
        }
    }
}

/// A persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(alias = "catalogTypeId")]
    pub type_id: ItemTypeId,
}

impl Item {
    pub fn validate(&self) -> CatalogResult<()> {
        validate_fields(&self.name, self.price)
    }

    /// Whether `prefix` is a prefix of the item name (case-sensitive).
    pub fn name_starts_with(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

fn validate_fields(name: &str, price: Decimal) -> CatalogResult<()> {
    check_name("item name", name, ITEM_NAME_MAX_CHARS)?;
    if price < Decimal::ZERO {
        return Err(CatalogError::invalid_argument(format!(
            "price must not be negative, got {price}"
        )));
    }
    if price.normalize().scale() > PRICE_MAX_SCALE {
        return Err(CatalogError::invalid_argument(format!(
            "price must have at most {PRICE_MAX_SCALE} decimal places, got {price}"
        )));
    }
    if price > PRICE_MAX {
        return Err(CatalogError::invalid_argument(format!(
            "price must not exceed {PRICE_MAX}, got {price}"
        )));
    }
    Ok(())
}

fn check_name(what: &str, name: &str, max_chars: usize) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::invalid_argument(format!("{what} is required")));
    }
    let len = name.chars().count();
    if len > max_chars {
        return Err(CatalogError::invalid_argument(format!(
            "{what} must be at most {max_chars} characters, got {len}"
        )));
    }
    Ok(())
}
