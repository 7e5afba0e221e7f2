//! Generic bounded key-value map persisted in one storage region.
//!
//! # Invariants
//! - Keys longer than `max_key_bytes` can never be stored.
//! - Encoded values longer than `max_value_bytes` are rejected, not truncated.
//! - `values()` follows ascending key order, not insertion order.

use super::{ensure_connection_ready, MapRegion, StorageError, StorageResult};
use crate::config::MapBounds;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Handle to one region of the `map_entries` table holding values of type `V`.
pub struct DurableMap<'conn, V> {
    conn: &'conn Connection,
    region: MapRegion,
    bounds: MapBounds,
    _value: PhantomData<fn() -> V>,
}

impl<V> Clone for DurableMap<'_, V> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn,
            region: self.region,
            bounds: self.bounds,
            _value: PhantomData,
        }
    }
}

impl<'conn, V> DurableMap<'conn, V>
where
    V: Serialize + DeserializeOwned,
{
    /// Opens a region handle on a migrated connection.
    pub fn try_new(
        conn: &'conn Connection,
        region: MapRegion,
        bounds: MapBounds,
    ) -> StorageResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self::new_unchecked(conn, region, bounds))
    }

    pub(crate) fn new_unchecked(
        conn: &'conn Connection,
        region: MapRegion,
        bounds: MapBounds,
    ) -> Self {
        Self {
            conn,
            region,
            bounds,
            _value: PhantomData,
        }
    }

    pub fn region(&self) -> MapRegion {
        self.region
    }

    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<V>> {
        if !self.key_fits(key) {
            return Ok(None);
        }
        let raw: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM map_entries WHERE region = ?1 AND key = ?2;",
                params![self.region.0, key],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|bytes| self.decode(&bytes)).transpose()
    }

    pub fn contains_key(&self, key: &str) -> StorageResult<bool> {
        if !self.key_fits(key) {
            return Ok(false);
        }
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM map_entries WHERE region = ?1 AND key = ?2);",
            params![self.region.0, key],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Creates or replaces the value stored under `key`.
    pub fn insert(&self, key: &str, value: &V) -> StorageResult<()> {
        if !self.key_fits(key) {
            return Err(StorageError::KeyTooLarge {
                region: self.region,
                len: key.len(),
                max: self.bounds.max_key_bytes,
            });
        }
        let encoded = self.encode(value)?;
        self.conn.execute(
            "INSERT INTO map_entries (region, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (region, key) DO UPDATE SET value = excluded.value;",
            params![self.region.0, key, encoded],
        )?;
        Ok(())
    }

    /// Deletes `key`, returning the value it held.
    pub fn remove(&self, key: &str) -> StorageResult<Option<V>> {
        let Some(previous) = self.get(key)? else {
            return Ok(None);
        };
        self.conn.execute(
            "DELETE FROM map_entries WHERE region = ?1 AND key = ?2;",
            params![self.region.0, key],
        )?;
        Ok(Some(previous))
    }

    pub fn values(&self) -> StorageResult<Vec<V>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM map_entries WHERE region = ?1 ORDER BY key ASC;")?;
        let mut rows = stmt.query([self.region.0])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            let bytes: Vec<u8> = row.get(0)?;
            values.push(self.decode(&bytes)?);
        }
        Ok(values)
    }

    pub fn len(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM map_entries WHERE region = ?1;",
            [self.region.0],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    fn key_fits(&self, key: &str) -> bool {
        let fits = key.len() <= self.bounds.max_key_bytes;
        if !fits {
            debug!(
                "event=map_key_oversized module=storage region={} len={} max={}",
                self.region,
                key.len(),
                self.bounds.max_key_bytes
            );
        }
        fits
    }

    fn encode(&self, value: &V) -> StorageResult<Vec<u8>> {
        let bytes = serde_json::to_vec(value).map_err(|err| StorageError::Codec {
            region: self.region,
            message: err.to_string(),
        })?;
        if bytes.len() > self.bounds.max_value_bytes {
            error!(
                "event=map_insert module=storage status=error error_code=value_too_large region={} len={} max={}",
                self.region,
                bytes.len(),
                self.bounds.max_value_bytes
            );
            return Err(StorageError::ValueTooLarge {
                region: self.region,
                len: bytes.len(),
                max: self.bounds.max_value_bytes,
            });
        }
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> StorageResult<V> {
        serde_json::from_slice(bytes).map_err(|err| StorageError::Codec {
            region: self.region,
            message: err.to_string(),
        })
    }
}
