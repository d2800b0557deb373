use rust_decimal::Decimal;
use serde::Deserialize;

use catalog_core::{ItemId, ItemTypeId};
use catalog_items::{Item, NewItem};

pub const CATALOG_BASE_PATH: &str = "/api/v1/catalog";

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /items` and the other paged listings.
///
/// When `ids` is present the paging parameters are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    pub page_size: Option<i64>,
    pub page_index: Option<i64>,
    pub ids: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(alias = "catalogTypeId")]
    pub type_id: i64,
}

impl CreateItemRequest {
    pub fn into_new_item(self) -> NewItem {
        NewItem {
            name: self.name,
            description: self.description,
            price: self.price,
            type_id: ItemTypeId::from_raw(self.type_id),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(alias = "catalogTypeId")]
    pub type_id: i64,
}

impl UpdateItemRequest {
    pub fn into_item(self) -> Item {
        Item {
            id: ItemId::from_raw(self.id),
            name: self.name,
            description: self.description,
            price: self.price,
            type_id: ItemTypeId::from_raw(self.type_id),
        }
    }
}

// -------------------------
// Response helpers
// -------------------------

pub fn item_location(id: ItemId) -> String {
    format!("{CATALOG_BASE_PATH}/items/{id}")
}

pub fn created_json(id: ItemId) -> serde_json::Value {
    serde_json::json!({ "id": id.get() })
}
