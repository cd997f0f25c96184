// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Quotaledger", "quotaledger"));

/// Environment variable that overrides the platform data dir.
pub const DB_ENV: &str = "QUOTALEDGER_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(custom) = std::env::var_os(DB_ENV) {
        return Ok(PathBuf::from(custom));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("quotaledger.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn).context("Failed to initialize schema")?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS currencies(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        exchange_rate TEXT
    );

    CREATE TABLE IF NOT EXISTS brokers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        account_number TEXT,
        country TEXT,
        currency_id INTEGER,
        description TEXT,
        FOREIGN KEY(currency_id) REFERENCES currencies(id) ON DELETE RESTRICT
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE,
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS tickers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        category_id INTEGER NOT NULL,
        currency_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0,
        sector TEXT,
        description TEXT,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE RESTRICT,
        FOREIGN KEY(currency_id) REFERENCES currencies(id) ON DELETE RESTRICT
    );

    CREATE TABLE IF NOT EXISTS inflows(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker_id INTEGER NOT NULL,
        broker_id INTEGER,
        cost_price TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        total_price TEXT NOT NULL,
        date TEXT NOT NULL,
        tax TEXT NOT NULL DEFAULT '0',
        kind TEXT NOT NULL DEFAULT 'purchase' CHECK(kind IN ('purchase','subscription')),
        FOREIGN KEY(ticker_id) REFERENCES tickers(id) ON DELETE RESTRICT,
        FOREIGN KEY(broker_id) REFERENCES brokers(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_inflows_ticker_date ON inflows(ticker_id, date);

    CREATE TABLE IF NOT EXISTS outflows(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker_id INTEGER NOT NULL,
        broker_id INTEGER,
        cost_price TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        total_price TEXT NOT NULL,
        date TEXT NOT NULL,
        tax TEXT NOT NULL DEFAULT '0',
        FOREIGN KEY(ticker_id) REFERENCES tickers(id) ON DELETE RESTRICT,
        FOREIGN KEY(broker_id) REFERENCES brokers(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_outflows_ticker_date ON outflows(ticker_id, date);

    CREATE TABLE IF NOT EXISTS dividends(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker_id INTEGER NOT NULL,
        value TEXT NOT NULL,
        date TEXT NOT NULL,
        currency TEXT NOT NULL DEFAULT 'BRL',
        quantity_quote INTEGER NOT NULL DEFAULT 0,
        total_value TEXT NOT NULL DEFAULT '0',
        income_type TEXT NOT NULL DEFAULT 'dividend'
            CHECK(income_type IN ('dividend','equity-interest','amortization')),
        FOREIGN KEY(ticker_id) REFERENCES tickers(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_dividends_ticker_date ON dividends(ticker_id, date);
    CREATE INDEX IF NOT EXISTS idx_dividends_date_currency ON dividends(date, currency);

    CREATE TABLE IF NOT EXISTS declared_dividends(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker_id INTEGER NOT NULL,
        value_per_share TEXT NOT NULL,
        payment_date TEXT NOT NULL,
        FOREIGN KEY(ticker_id) REFERENCES tickers(id) ON DELETE RESTRICT
    );

    -- Cached metric payloads (JSON), expiring at a unix timestamp in milliseconds
    CREATE TABLE IF NOT EXISTS metric_cache(
        key TEXT PRIMARY KEY,
        payload TEXT NOT NULL,
        expires_at INTEGER NOT NULL
    );
    "#,
    )
}
