//! redb-based storage for scopes and ordered items
//!
//! Layout:
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `scopes` | `"{kind}:{parent}"` | JSON [`ScopeRecord`] |
//! | `items` | item id | JSON [`OrderedItem`] |
//! | `items_by_scope` | `("{kind}:{parent}", item id)` | `()` |
//!
//! redb serialises write transactions, so everything done inside one
//! [`WriteTransaction`] (read max order then insert, verify a plan then
//! rewrite orders) is atomic with respect to every other writer.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::ordering::next_order_for;
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, OrderedItem, ScopeKey, ScopeRecord};
use thiserror::Error;

/// Scope ownership: key = scope text form, value = JSON
const SCOPES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("scopes");

/// Items: key = item id, value = JSON
const ITEMS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("items");

/// Index: (scope, item id) -> ()
const ITEMS_BY_SCOPE_TABLE: TableDefinition<(&str, i64), ()> =
    TableDefinition::new("items_by_scope");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No order value left in scope {scope}")]
    OrderSpaceExhausted { scope: String },

    #[error("Scope {scope} is already claimed")]
    ScopeClaimed { scope: String },

    #[error("Item not found: {0}")]
    ItemNotFound(i64),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OrderSpaceExhausted { scope } => AppError::with_message(
                shared::ErrorCode::OrderSpaceExhausted,
                format!("No order value left in scope {}", scope),
            )
            .with_detail("scope", scope),
            StorageError::ScopeClaimed { scope } => AppError::with_message(
                shared::ErrorCode::ScopeAlreadyClaimed,
                format!("Scope {} is already claimed", scope),
            )
            .with_detail("scope", scope),
            StorageError::ItemNotFound(id) => AppError::item_not_found(id),
            other => AppError::database(other.to_string()),
        }
    }
}

/// Scope and item storage
#[derive(Clone)]
pub struct ItemStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for ItemStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStorage").finish_non_exhaustive()
    }
}

impl ItemStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (tests, throwaway servers)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SCOPES_TABLE)?;
            let _ = write_txn.open_table(ITEMS_TABLE)?;
            let _ = write_txn.open_table(ITEMS_BY_SCOPE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Scopes ==========

    /// Claim a scope for `owner_id`
    ///
    /// Claiming a scope the caller already owns returns the existing record.
    pub fn claim_scope(&self, scope: &ScopeKey, owner_id: &str) -> StorageResult<ScopeRecord> {
        let key = scope.to_string();
        let txn = self.db.begin_write()?;
        let record = {
            let mut table = txn.open_table(SCOPES_TABLE)?;

            let existing = match table.get(key.as_str())? {
                Some(guard) => Some(serde_json::from_slice::<ScopeRecord>(guard.value())?),
                None => None,
            };

            match existing {
                Some(record) if record.is_owned_by(owner_id) => record,
                Some(_) => return Err(StorageError::ScopeClaimed { scope: key }),
                None => {
                    let record = ScopeRecord {
                        scope: scope.clone(),
                        owner_id: owner_id.to_string(),
                        created_at: now_millis(),
                    };
                    let value = serde_json::to_vec(&record)?;
                    table.insert(key.as_str(), value.as_slice())?;
                    record
                }
            }
        };
        txn.commit()?;

        Ok(record)
    }

    pub fn get_scope(&self, scope: &ScopeKey) -> StorageResult<Option<ScopeRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SCOPES_TABLE)?;

        match table.get(scope.to_string().as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ========== Items ==========

    /// Items of a scope sorted by order (ties broken by id)
    pub fn list_items(&self, scope: &ScopeKey) -> StorageResult<Vec<OrderedItem>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(ITEMS_BY_SCOPE_TABLE)?;
        let data_table = read_txn.open_table(ITEMS_TABLE)?;

        read_scope_items(&idx_table, &data_table, &scope.to_string())
    }

    /// Same as [`Self::list_items`], seen from inside a write transaction
    pub fn list_items_in(
        &self,
        txn: &WriteTransaction,
        scope: &ScopeKey,
    ) -> StorageResult<Vec<OrderedItem>> {
        let idx_table = txn.open_table(ITEMS_BY_SCOPE_TABLE)?;
        let data_table = txn.open_table(ITEMS_TABLE)?;

        read_scope_items(&idx_table, &data_table, &scope.to_string())
    }

    /// Append a new item at `max(order) + 1`
    ///
    /// The max is read and the item written in the same transaction.
    pub fn create_item(&self, scope: &ScopeKey, title: &str) -> StorageResult<OrderedItem> {
        let txn = self.db.begin_write()?;
        let existing = self.list_items_in(&txn, scope)?;
        let order = next_order_for(&existing).ok_or_else(|| StorageError::OrderSpaceExhausted {
            scope: scope.to_string(),
        })?;

        let item = {
            let mut data_table = txn.open_table(ITEMS_TABLE)?;
            let mut id = snowflake_id();
            while data_table.get(id)?.is_some() {
                id = snowflake_id();
            }

            let now = now_millis();
            let item = OrderedItem {
                id,
                scope: scope.clone(),
                order,
                title: title.to_string(),
                created_at: now,
                updated_at: now,
            };
            let value = serde_json::to_vec(&item)?;
            data_table.insert(item.id, value.as_slice())?;

            let mut idx_table = txn.open_table(ITEMS_BY_SCOPE_TABLE)?;
            idx_table.insert((scope.to_string().as_str(), item.id), ())?;
            item
        };
        txn.commit()?;

        tracing::debug!(scope = %scope, id = item.id, order = item.order, "Item created");
        Ok(item)
    }

    /// Change an item's title; its order is left alone
    pub fn rename_item(
        &self,
        scope: &ScopeKey,
        id: i64,
        title: &str,
    ) -> StorageResult<OrderedItem> {
        let txn = self.db.begin_write()?;
        let item = {
            let mut table = txn.open_table(ITEMS_TABLE)?;
            let mut item = read_item(&table, id)?
                .filter(|item| &item.scope == scope)
                .ok_or(StorageError::ItemNotFound(id))?;

            item.title = title.to_string();
            item.updated_at = now_millis();
            let value = serde_json::to_vec(&item)?;
            table.insert(id, value.as_slice())?;
            item
        };
        txn.commit()?;

        Ok(item)
    }

    /// Remove an item; surrounding orders are not compacted
    pub fn delete_item(&self, scope: &ScopeKey, id: i64) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ITEMS_TABLE)?;
            let belongs = read_item(&table, id)?.is_some_and(|item| &item.scope == scope);
            if !belongs {
                return Err(StorageError::ItemNotFound(id));
            }
            table.remove(id)?;

            let mut idx_table = txn.open_table(ITEMS_BY_SCOPE_TABLE)?;
            idx_table.remove((scope.to_string().as_str(), id))?;
        }
        txn.commit()?;

        Ok(())
    }

    /// Rewrite the order of each `(id, order)` pair
    ///
    /// Does not commit: the caller decides, so a batch either lands whole or
    /// is dropped with the transaction.
    pub fn write_orders(
        &self,
        txn: &WriteTransaction,
        scope: &ScopeKey,
        changes: &[(i64, i32)],
    ) -> StorageResult<()> {
        let mut table = txn.open_table(ITEMS_TABLE)?;
        let now = now_millis();

        for &(id, order) in changes {
            let mut item = read_item(&table, id)?
                .filter(|item| &item.scope == scope)
                .ok_or(StorageError::ItemNotFound(id))?;

            item.order = order;
            item.updated_at = now;
            let value = serde_json::to_vec(&item)?;
            table.insert(id, value.as_slice())?;
        }

        Ok(())
    }
}

fn read_item(
    table: &impl ReadableTable<i64, &'static [u8]>,
    id: i64,
) -> StorageResult<Option<OrderedItem>> {
    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

fn read_scope_items(
    idx_table: &impl ReadableTable<(&'static str, i64), ()>,
    data_table: &impl ReadableTable<i64, &'static [u8]>,
    scope_key: &str,
) -> StorageResult<Vec<OrderedItem>> {
    let range_start: (&str, i64) = (scope_key, i64::MIN);
    let range_end: (&str, i64) = (scope_key, i64::MAX);

    let mut items = Vec::new();
    for result in idx_table.range(range_start..=range_end)? {
        let (key, _) = result?;
        let (_, id) = key.value();
        if let Some(item) = read_item(data_table, id)? {
            items.push(item);
        }
    }

    items.sort_by_key(|item| (item.order, item.id));
    Ok(items)
}
