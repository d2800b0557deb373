//! Strongly-typed identifiers used across the catalog.
//!
//! Ids are assigned by the store and are 64-bit so item cardinality is never
//! bounded by a 32-bit range.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Identifier of a catalog item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

/// Identifier of an item type (category).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTypeId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw value without checking it.
            ///
            /// Stores use this when reading back ids they assigned themselves.
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// Wrap a caller-supplied value, rejecting non-positive ids.
            pub fn positive(raw: i64) -> Result<Self, CatalogError> {
                if raw <= 0 {
                    return Err(CatalogError::invalid_argument(format!(
                        "{} must be positive, got {}",
                        $name, raw
                    )));
                }
                Ok(Self(raw))
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = CatalogError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| CatalogError::invalid_argument(format!("{}: {}", $name, e)))?;
                Self::positive(raw)
            }
        }
    };
}

impl_int_newtype!(ItemId, "ItemId");
impl_int_newtype!(ItemTypeId, "ItemTypeId");
