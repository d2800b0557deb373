//! Catalog domain module.
//!
//! Items, item types and the pagination vocabulary shared by stores and the
//! query service. Pure data + field rules (no IO, no HTTP, no storage).

pub mod item;
pub mod page;

pub use item::{
    Item, ItemType, NewItem, ITEM_NAME_MAX_CHARS, ITEM_TYPE_NAME_MAX_CHARS, PRICE_MAX,
    PRICE_MAX_SCALE,
};
pub use page::{PageRequest, PaginatedItems, DEFAULT_PAGE_SIZE};
