// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Memoization of metric results, keyed by [`CacheKey`].
//!
//! Payloads are stored as JSON values so that one cache instance can hold every
//! metric shape. Decimals serialize as strings, so reads are exact.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;
use moka::Expiry;
use moka::sync::Cache;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

const MEMORY_CAPACITY: u64 = 10_000;

/// Every cacheable metric. `Display` yields the storage key; read sites and
/// invalidation sites both derive keys from here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    TotalInvested,
    AppliedByCurrency,
    AppliedByBroker,
    ChartCategoryInvested,
    CategoryInvested(String),
    DividendsCategory(String),
    AppliedValue(String),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::TotalInvested => f.write_str("total_invested"),
            CacheKey::AppliedByCurrency => f.write_str("total_applied_by_currency"),
            CacheKey::AppliedByBroker => f.write_str("total_applied_by_broker"),
            CacheKey::ChartCategoryInvested => f.write_str("chart_category_invested"),
            CacheKey::CategoryInvested(title) => write!(f, "category_invested_{}", title),
            CacheKey::DividendsCategory(title) => write!(f, "dividends_category_{}", title),
            CacheKey::AppliedValue(code) => write!(f, "applied_value_{}", code),
        }
    }
}

impl CacheKey {
    /// Keys a ledger mutation can make stale: the global aggregates, both
    /// per-category entries for each title and the monthly series per currency.
    pub fn invalidation_set<'a, C, K>(categories: C, currencies: K) -> Vec<CacheKey>
    where
        C: IntoIterator<Item = &'a str>,
        K: IntoIterator<Item = &'a str>,
    {
        let mut keys = vec![
            CacheKey::TotalInvested,
            CacheKey::AppliedByCurrency,
            CacheKey::AppliedByBroker,
            CacheKey::ChartCategoryInvested,
        ];
        for title in categories {
            keys.push(CacheKey::CategoryInvested(title.to_string()));
            keys.push(CacheKey::DividendsCategory(title.to_string()));
        }
        for code in currencies {
            let key = CacheKey::AppliedValue(code.to_string());
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// get / set-with-ttl / delete-many over JSON payloads.
pub trait MetricsCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Value>>;

    fn set(&self, key: CacheKey, value: Value, ttl: Duration) -> Result<()>;

    fn delete_many(&self, keys: &[CacheKey]) -> Result<()>;
}

/// Returns the cached value for `key`, or computes, stores and returns it.
///
/// A payload that no longer deserializes into `T` counts as a miss.
pub fn get_or_compute<T, F>(
    cache: &dyn MetricsCache,
    key: CacheKey,
    ttl: Duration,
    compute: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    if let Some(payload) = cache.get(&key)? {
        match serde_json::from_value::<T>(payload) {
            Ok(hit) => {
                tracing::trace!(key = %key, "metric cache hit");
                return Ok(hit);
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "discarding unreadable cache entry"),
        }
    }
    tracing::trace!(key = %key, "metric cache miss");
    let fresh = compute()?;
    cache.set(key, serde_json::to_value(&fresh)?, ttl)?;
    Ok(fresh)
}

#[derive(Clone)]
struct Entry {
    payload: Value,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache. Entries expire after the ttl they were stored with.
pub struct MemoryMetricsCache {
    inner: Cache<String, Entry>,
}

impl MemoryMetricsCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MEMORY_CAPACITY)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryMetricsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCache for MemoryMetricsCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Value>> {
        Ok(self.inner.get(&key.to_string()).map(|e| e.payload))
    }

    fn set(&self, key: CacheKey, value: Value, ttl: Duration) -> Result<()> {
        self.inner.insert(
            key.to_string(),
            Entry {
                payload: value,
                ttl,
            },
        );
        Ok(())
    }

    fn delete_many(&self, keys: &[CacheKey]) -> Result<()> {
        for key in keys {
            self.inner.invalidate(&key.to_string());
        }
        tracing::debug!(count = keys.len(), "invalidated metric cache entries");
        Ok(())
    }
}

/// Cache persisted in the `metric_cache` table so results outlive one process.
pub struct SqliteMetricsCache<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteMetricsCache<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Drops every expired row; returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM metric_cache WHERE expires_at <= ?1",
            params![Utc::now().timestamp_millis()],
        )?;
        if n > 0 {
            tracing::debug!(removed = n, "purged expired metric cache rows");
        }
        Ok(n)
    }

    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM metric_cache", [])?)
    }
}

impl MetricsCache for SqliteMetricsCache<'_> {
    fn get(&self, key: &CacheKey) -> Result<Option<Value>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT payload, expires_at FROM metric_cache WHERE key=?1",
                params![key.to_string()],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        match row {
            Some((payload, expires_at)) if expires_at > Utc::now().timestamp_millis() => {
                Ok(Some(serde_json::from_str(&payload)?))
            }
            _ => Ok(None),
        }
    }

    fn set(&self, key: CacheKey, value: Value, ttl: Duration) -> Result<()> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = Utc::now().timestamp_millis().saturating_add(ttl_ms);
        self.conn.execute(
            "INSERT INTO metric_cache(key, payload, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE
             SET payload=excluded.payload, expires_at=excluded.expires_at",
            params![key.to_string(), serde_json::to_string(&value)?, expires_at],
        )?;
        Ok(())
    }

    fn delete_many(&self, keys: &[CacheKey]) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached("DELETE FROM metric_cache WHERE key=?1")?;
        for key in keys {
            stmt.execute(params![key.to_string()])?;
        }
        tracing::debug!(count = keys.len(), "invalidated metric cache rows");
        Ok(())
    }
}
