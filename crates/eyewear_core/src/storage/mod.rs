//! Durable catalog storage: two segregated key-value regions over SQLite.
//!
//! # Responsibility
//! - Own the per-region [`DurableMap`] handles injected into services.
//! - Provide one commit boundary for writes spanning both regions.
//!
//! # Invariants
//! - Region `0` holds stores, region `1` holds items; rows never mix.
//! - Handles are only built on connections at the latest schema version.

use crate::config::CatalogConfig;
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::Item;
use crate::model::store::Store;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod durable_map;

pub use durable_map::DurableMap;

pub type StorageResult<T> = Result<T, StorageError>;

/// Numeric namespace tag separating map regions inside `map_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapRegion(pub u8);

impl MapRegion {
    pub const STORES: Self = Self(0);
    pub const ITEMS: Self = Self(1);
}

impl Display for MapRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from durable map persistence and encoding.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Key exceeds the region's byte bound.
    KeyTooLarge {
        region: MapRegion,
        len: usize,
        max: usize,
    },
    /// Encoded value exceeds the region's byte bound.
    ValueTooLarge {
        region: MapRegion,
        len: usize,
        max: usize,
    },
    /// Value could not be encoded or a stored value could not be decoded.
    Codec {
        region: MapRegion,
        message: String,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::KeyTooLarge { region, len, max } => write!(
                f,
                "key of {len} bytes exceeds bound of {max} bytes in region {region}"
            ),
            Self::ValueTooLarge { region, len, max } => write!(
                f,
                "encoded value of {len} bytes exceeds bound of {max} bytes in region {region}"
            ),
            Self::Codec { region, message } => {
                write!(f, "value codec failure in region {region}: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog storage requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog storage requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog storage requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store and item maps sharing one migrated connection.
#[derive(Clone)]
pub struct CatalogStorage<'conn> {
    conn: &'conn Connection,
    stores: DurableMap<'conn, Store>,
    items: DurableMap<'conn, Item>,
}

impl<'conn> CatalogStorage<'conn> {
    /// Builds both region handles after checking the connection schema.
    pub fn try_new(conn: &'conn Connection, config: &CatalogConfig) -> StorageResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            stores: DurableMap::new_unchecked(conn, MapRegion::STORES, config.store_bounds),
            items: DurableMap::new_unchecked(conn, MapRegion::ITEMS, config.item_bounds),
        })
    }

    pub fn stores(&self) -> &DurableMap<'conn, Store> {
        &self.stores
    }

    pub fn items(&self) -> &DurableMap<'conn, Item> {
        &self.items
    }

    /// Runs `operation` inside one immediate transaction.
    ///
    /// Any error rolls back every write made by `operation`, in both regions.
    pub fn atomically<T, E>(&self, operation: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;
        let value = operation(self)?;
        tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> StorageResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "map_entries")? {
        return Err(StorageError::MissingRequiredTable("map_entries"));
    }
    for column in ["region", "key", "value"] {
        if !table_has_column(conn, "map_entries", column)? {
            return Err(StorageError::MissingRequiredColumn {
                table: "map_entries",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StorageResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
