// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod brokers;
pub mod categories;
pub mod currencies;
pub mod dividends;
pub mod doctor;
pub mod exporter;
pub mod flows;
pub mod reports;
pub mod settings;
pub mod tickers;
pub mod transactions;

use anyhow::Result;
use rusqlite::Connection;

use crate::cache::SqliteMetricsCache;
use crate::config::AppConfig;
use crate::journal::Journal;
use crate::ledger::SqliteLedger;
use crate::metrics::MetricsEngine;

/// Runs `f` with a ledger and an engine backed by the persistent metric cache.
pub fn with_engine<T>(
    conn: &Connection,
    f: impl FnOnce(&SqliteLedger<'_>, &MetricsEngine<'_>) -> Result<T>,
) -> Result<T> {
    let config = AppConfig::load(conn)?;
    let ledger = SqliteLedger::new(conn);
    let cache = SqliteMetricsCache::new(conn);
    let engine = MetricsEngine::new(&ledger, &cache, &config);
    f(&ledger, &engine)
}

pub fn with_journal<T>(conn: &Connection, f: impl FnOnce(&Journal<'_>) -> Result<T>) -> Result<T> {
    with_engine(conn, |ledger, engine| f(&Journal::new(ledger, engine)))
}
