// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistent ledger: read shapes consumed by the metrics engine and the
//! SQLite implementation behind them.

mod mutations;
mod queries;

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::models::{Category, Ticker};

pub use queries::DividendFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSide {
    Inflow,
    Outflow,
}

/// Summed quantity and cost of one side of a ticker's history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowTotals {
    pub quantity: i64,
    pub total_price: Decimal,
}

/// Sum of an amount over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub total: Decimal,
}

/// Read access the metrics engine needs. Every grouped shape is answered in a
/// single pass over the store.
pub trait LedgerStore {
    fn categories(&self) -> Result<Vec<Category>>;

    /// Fails with [`crate::error::LedgerError::CategoryNotFound`] for unknown titles.
    fn category_by_title(&self, title: &str) -> Result<Category>;

    /// Fails with [`crate::error::LedgerError::TickerNotFound`] for unknown names.
    fn ticker_by_name(&self, name: &str) -> Result<Ticker>;

    fn tickers_in_category(&self, category_id: i64) -> Result<Vec<Ticker>>;

    fn currency_codes(&self) -> Result<Vec<String>>;

    /// Quantity and total price of a ticker's inflows or outflows dated on or
    /// before `cutoff` (all of them when `None`).
    fn flow_totals(
        &self,
        ticker_id: i64,
        side: FlowSide,
        cutoff: Option<NaiveDate>,
    ) -> Result<FlowTotals>;

    fn inflow_grand_total(&self) -> Result<Decimal>;

    /// Inflow totals keyed by the ticker's currency code.
    fn inflow_totals_by_currency(&self) -> Result<BTreeMap<String, Decimal>>;

    /// Inflow totals keyed by broker name; inflows without a broker are skipped.
    fn inflow_totals_by_broker(&self) -> Result<BTreeMap<String, Decimal>>;

    /// Monthly inflow totals for tickers in `currency_code`, oldest first.
    fn inflow_totals_by_month(&self, currency_code: &str) -> Result<Vec<MonthTotal>>;

    /// Monthly dividend totals for a category within `[from, to]`, oldest first.
    fn dividend_totals_by_month_in_category(
        &self,
        category_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthTotal>>;

    /// Monthly dividend totals settled in `currency`, oldest first.
    fn dividend_totals_by_month_in_currency(&self, currency: &str) -> Result<Vec<MonthTotal>>;

    /// Inflow quantity for a ticker dated on or before `date`.
    fn inflow_quantity_until(&self, ticker_id: i64, date: NaiveDate) -> Result<i64>;
}

/// SQLite-backed ledger over a borrowed connection.
pub struct SqliteLedger<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteLedger<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }
}

pub(crate) fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    Decimal::from_str_exact(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn opt_decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = r.get(idx)?;
    raw.map(|s| {
        Decimal::from_str_exact(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// `price * quantity`, failing instead of overflowing the decimal range.
pub(crate) fn line_total(price: Decimal, quantity: i64) -> Result<Decimal> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| out_of_range(price, quantity))
}

/// `acc + amount` for running totals over stored rows.
pub(crate) fn add_amount(acc: Decimal, amount: Decimal) -> Result<Decimal> {
    acc.checked_add(amount).ok_or_else(|| {
        LedgerError::Validation("Running total exceeds the supported decimal range".into())
    })
}

fn out_of_range(price: Decimal, quantity: i64) -> LedgerError {
    LedgerError::Validation(format!(
        "{} x {} exceeds the supported decimal range",
        price, quantity
    ))
}

/// Folds dated amounts into ascending calendar-month buckets.
pub(crate) fn bucket_by_month<I>(rows: I) -> Result<Vec<MonthTotal>>
where
    I: IntoIterator<Item = (NaiveDate, Decimal)>,
{
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for (date, amount) in rows {
        let slot = buckets
            .entry((date.year(), date.month()))
            .or_insert(Decimal::ZERO);
        *slot = add_amount(*slot, amount)?;
    }
    Ok(buckets
        .into_iter()
        .map(|((year, month), total)| MonthTotal { year, month, total })
        .collect())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Seeding helpers shared by unit tests across modules.

    use rusqlite::{Connection, params};

    use crate::db::init_schema;

    pub fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    pub fn currency(conn: &Connection, code: &str) -> i64 {
        conn.execute(
            "INSERT INTO currencies(code, name) VALUES (?1, ?1)",
            params![code],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    pub fn category(conn: &Connection, title: &str) -> i64 {
        conn.execute("INSERT INTO categories(title) VALUES (?1)", params![title])
            .unwrap();
        conn.last_insert_rowid()
    }

    pub fn broker(conn: &Connection, name: &str) -> i64 {
        conn.execute("INSERT INTO brokers(name) VALUES (?1)", params![name])
            .unwrap();
        conn.last_insert_rowid()
    }

    pub fn ticker(conn: &Connection, name: &str, category_id: i64, currency_id: i64) -> i64 {
        conn.execute(
            "INSERT INTO tickers(name, category_id, currency_id) VALUES (?1, ?2, ?3)",
            params![name, category_id, currency_id],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    pub fn inflow(
        conn: &Connection,
        ticker_id: i64,
        broker_id: Option<i64>,
        date: &str,
        quantity: i64,
        cost_price: &str,
        total_price: &str,
    ) {
        conn.execute(
            "INSERT INTO inflows(ticker_id, broker_id, cost_price, quantity, total_price, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![ticker_id, broker_id, cost_price, quantity, total_price, date],
        )
        .unwrap();
    }

    pub fn outflow(
        conn: &Connection,
        ticker_id: i64,
        date: &str,
        quantity: i64,
        cost_price: &str,
        total_price: &str,
    ) {
        conn.execute(
            "INSERT INTO outflows(ticker_id, cost_price, quantity, total_price, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![ticker_id, cost_price, quantity, total_price, date],
        )
        .unwrap();
    }

    pub fn dividend(conn: &Connection, ticker_id: i64, date: &str, currency: &str, total: &str) {
        conn.execute(
            "INSERT INTO dividends(ticker_id, value, date, currency, quantity_quote, total_value)
             VALUES (?1, '1', ?2, ?3, 1, ?4)",
            params![ticker_id, date, currency, total],
        )
        .unwrap();
    }
}
