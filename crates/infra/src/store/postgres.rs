//! Postgres-backed catalog store.
//!
//! Expects the following (externally provisioned) schema:
//!
//! ```sql
//! CREATE TABLE catalog_type (
//!     id   BIGSERIAL PRIMARY KEY,
//!     name VARCHAR(100) NOT NULL
//! );
//!
//! CREATE TABLE catalog (
//!     id              BIGSERIAL PRIMARY KEY,
//!     name            VARCHAR(50) NOT NULL,
//!     description     TEXT,
//!     price           NUMERIC(18, 2) NOT NULL CHECK (price >= 0),
//!     catalog_type_id BIGINT NOT NULL REFERENCES catalog_type (id)
//! );
//! CREATE INDEX catalog_name_idx ON catalog (name COLLATE "C", id);
//! CREATE INDEX catalog_type_idx ON catalog (catalog_type_id, id);
//! ```
//!
//! Name ordering uses the `"C"` collation so it compares bytes, matching the
//! in-memory store whatever the database default collation is.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (foreign key violation) | `23503` | `ConstraintViolation` |
//! | Database (check constraint violation) | `23514` | `ConstraintViolation` |
//! | Database (not null violation) | `23502` | `ConstraintViolation` |
//! | Database (string data right truncation) | `22001` | `ConstraintViolation` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolTimedOut / PoolClosed / Io / other | N/A | `Unavailable` |
//! | call exceeded `timeout` | N/A | `Unavailable` |

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::{instrument, Span};

use catalog_core::{ItemId, ItemTypeId};
use catalog_items::{Item, ItemType, NewItem};

use super::r#trait::{CatalogStore, ItemFilter, ScanOrder, StoreError, StoreResult};

const ITEM_COLUMNS: &str = "id, name, description, price, catalog_type_id";

// Nullable binds: $1 = type id, $2 = name prefix.
const FILTER_CLAUSE: &str = "($1::bigint IS NULL OR catalog_type_id = $1) \
     AND ($2::text IS NULL OR starts_with(name, $2))";

/// Postgres-backed catalog store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool which is thread-safe; the store is cheap to
/// clone and share.
///
/// ## Timeouts
///
/// Every call is bounded by `timeout`. An elapsed timeout drops the in-flight
/// query future; single-statement writes are atomic, so nothing is partially
/// applied.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self {
            pool: Arc::new(pool),
            timeout,
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool, timeout))
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| map_sqlx_error(operation, e)),
            Err(_) => Err(StoreError::Unavailable(format!(
                "{operation} timed out after {:?}",
                self.timeout
            ))),
        }
    }

    async fn count_filtered(&self, operation: &'static str, filter: &ItemFilter) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) AS total FROM catalog WHERE {FILTER_CLAUSE}");
        let row = self
            .bounded(
                operation,
                sqlx::query(&sql)
                    .bind(filter.type_id.map(i64::from))
                    .bind(filter.name_prefix.as_deref())
                    .fetch_one(&*self.pool),
            )
            .await?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(total.max(0) as u64)
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn count(&self) -> StoreResult<u64> {
        self.count_filtered("count", &ItemFilter::all()).await
    }

    #[instrument(skip(self), err)]
    async fn count_where(&self, filter: &ItemFilter) -> StoreResult<u64> {
        self.count_filtered("count_where", filter).await
    }

    #[instrument(skip(self), fields(returned = tracing::field::Empty), err)]
    async fn scan_ordered(
        &self,
        order: ScanOrder,
        offset: u64,
        limit: u64,
        filter: &ItemFilter,
    ) -> StoreResult<Vec<Item>> {
        let order_by = order_by_clause(order);
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM catalog WHERE {FILTER_CLAUSE} \
             ORDER BY {order_by} LIMIT $3 OFFSET $4"
        );

        let rows = self
            .bounded(
                "scan_ordered",
                sqlx::query(&sql)
                    .bind(filter.type_id.map(i64::from))
                    .bind(filter.name_prefix.as_deref())
                    .bind(to_sql_i64(limit))
                    .bind(to_sql_i64(offset))
                    .fetch_all(&*self.pool),
            )
            .await?;

        let items = rows_to_items("scan_ordered", rows)?;
        Span::current().record("returned", items.len());
        Ok(items)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get_by_id(&self, id: ItemId) -> StoreResult<Item> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM catalog WHERE id = $1");
        let row = self
            .bounded(
                "get_by_id",
                sqlx::query(&sql)
                    .bind(id.get())
                    .fetch_optional(&*self.pool),
            )
            .await?;

        match row {
            Some(row) => ItemRow::from_row(&row)
                .map(Item::from)
                .map_err(|e| map_sqlx_error("get_by_id", e)),
            None => Err(StoreError::NotFound(format!("item {id}"))),
        }
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()), err)]
    async fn get_by_id_set(&self, ids: &BTreeSet<ItemId>) -> StoreResult<Vec<Item>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let sql = format!("SELECT {ITEM_COLUMNS} FROM catalog WHERE id = ANY($1)");
        let rows = self
            .bounded(
                "get_by_id_set",
                sqlx::query(&sql).bind(raw).fetch_all(&*self.pool),
            )
            .await?;
        rows_to_items("get_by_id_set", rows)
    }

    #[instrument(skip(self, item), fields(type_id = %item.type_id), err)]
    async fn insert(&self, item: NewItem) -> StoreResult<ItemId> {
        let row = self
            .bounded(
                "insert",
                sqlx::query(
                    r#"
                    INSERT INTO catalog (name, description, price, catalog_type_id)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(&item.name)
                .bind(item.description.as_deref())
                .bind(item.price)
                .bind(item.type_id.get())
                .fetch_one(&*self.pool),
            )
            .await?;

        let id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("insert", e))?;
        Ok(ItemId::from_raw(id))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn update(&self, item: Item) -> StoreResult<()> {
        let result = self
            .bounded(
                "update",
                sqlx::query(
                    r#"
                    UPDATE catalog
                    SET name = $2, description = $3, price = $4, catalog_type_id = $5
                    WHERE id = $1
                    "#,
                )
                .bind(item.id.get())
                .bind(&item.name)
                .bind(item.description.as_deref())
                .bind(item.price)
                .bind(item.type_id.get())
                .execute(&*self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("item {}", item.id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        let result = self
            .bounded(
                "delete",
                sqlx::query("DELETE FROM catalog WHERE id = $1")
                    .bind(id.get())
                    .execute(&*self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("item {id}")));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_types(&self) -> StoreResult<Vec<ItemType>> {
        let rows = self
            .bounded(
                "list_types",
                sqlx::query("SELECT id, name FROM catalog_type ORDER BY id")
                    .fetch_all(&*self.pool),
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<ItemType, sqlx::Error> {
                Ok(ItemType::new(
                    ItemTypeId::from_raw(row.try_get("id")?),
                    row.try_get::<String, _>("name")?,
                ))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("list_types", e))
    }
}

fn order_by_clause(order: ScanOrder) -> &'static str {
    match order {
        ScanOrder::Name => r#"name COLLATE "C" ASC, id ASC"#,
        ScanOrder::Native => "id ASC",
    }
}

fn to_sql_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn rows_to_items(operation: &str, rows: Vec<PgRow>) -> StoreResult<Vec<Item>> {
    rows.iter()
        .map(|row| ItemRow::from_row(row).map(Item::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_sqlx_error(operation, e))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // FK, check, not-null, value too long for column.
                Some("23503") | Some("23514") | Some("23502") | Some("22001") => {
                    StoreError::ConstraintViolation(msg)
                }
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            StoreError::NotFound(format!("row in {operation}"))
        }
        other => StoreError::Unavailable(format!("{} failed: {}", operation, other)),
    }
}

// SQLx row types

#[derive(Debug)]
struct ItemRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: Decimal,
    catalog_type_id: i64,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            catalog_type_id: row.try_get("catalog_type_id")?,
        })
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: ItemId::from_raw(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            type_id: ItemTypeId::from_raw(row.catalog_type_id),
        }
    }
}
