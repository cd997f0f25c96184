// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{
    FlowSide, FlowTotals, LedgerStore, MonthTotal, SqliteLedger, add_amount, bucket_by_month,
    decimal_at, opt_decimal_at,
};
use crate::error::{LedgerError, Result};
use crate::models::{
    Broker, Category, Currency, DeclaredDividend, Dividend, IncomeType, Inflow, InflowKind,
    Negotiation, Outflow, Ticker,
};

const TICKER_COLS: &str = "id, name, category_id, currency_id, quantity, sector, description";

fn ticker_from_row(r: &Row<'_>) -> rusqlite::Result<Ticker> {
    Ok(Ticker {
        id: r.get(0)?,
        name: r.get(1)?,
        category_id: r.get(2)?,
        currency_id: r.get(3)?,
        quantity: r.get(4)?,
        sector: r.get(5)?,
        description: r.get(6)?,
    })
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        title: r.get(1)?,
        description: r.get(2)?,
    })
}

fn currency_from_row(r: &Row<'_>) -> rusqlite::Result<Currency> {
    Ok(Currency {
        id: r.get(0)?,
        code: r.get(1)?,
        name: r.get(2)?,
        exchange_rate: opt_decimal_at(r, 3)?,
    })
}

fn broker_from_row(r: &Row<'_>) -> rusqlite::Result<Broker> {
    Ok(Broker {
        id: r.get(0)?,
        name: r.get(1)?,
        account_number: r.get(2)?,
        country: r.get(3)?,
        currency_id: r.get(4)?,
        description: r.get(5)?,
    })
}

fn inflow_from_row(r: &Row<'_>) -> rusqlite::Result<Inflow> {
    let raw_kind: String = r.get(8)?;
    let kind = raw_kind
        .parse::<InflowKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;
    Ok(Inflow {
        id: r.get(0)?,
        ticker_id: r.get(1)?,
        broker_id: r.get(2)?,
        cost_price: decimal_at(r, 3)?,
        quantity: r.get(4)?,
        total_price: decimal_at(r, 5)?,
        date: r.get(6)?,
        tax: decimal_at(r, 7)?,
        kind,
    })
}

fn outflow_from_row(r: &Row<'_>) -> rusqlite::Result<Outflow> {
    Ok(Outflow {
        id: r.get(0)?,
        ticker_id: r.get(1)?,
        broker_id: r.get(2)?,
        cost_price: decimal_at(r, 3)?,
        quantity: r.get(4)?,
        total_price: decimal_at(r, 5)?,
        date: r.get(6)?,
        tax: decimal_at(r, 7)?,
    })
}

fn dividend_from_row(r: &Row<'_>) -> rusqlite::Result<Dividend> {
    let raw_type: String = r.get(7)?;
    let income_type = raw_type
        .parse::<IncomeType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
    Ok(Dividend {
        id: r.get(0)?,
        ticker_id: r.get(1)?,
        value: decimal_at(r, 2)?,
        date: r.get(3)?,
        currency: r.get(4)?,
        quantity_quote: r.get(5)?,
        total_value: decimal_at(r, 6)?,
        income_type,
    })
}

/// Optional narrowing of the dividend listing.
#[derive(Debug, Clone, Default)]
pub struct DividendFilter {
    pub ticker: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub currency: Option<String>,
}

impl LedgerStore for SqliteLedger<'_> {
    fn categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, title, description FROM categories ORDER BY title")?;
        let rows = stmt.query_map([], category_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn category_by_title(&self, title: &str) -> Result<Category> {
        self.conn
            .query_row(
                "SELECT id, title, description FROM categories WHERE title=?1",
                params![title],
                category_from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::CategoryNotFound(title.to_string()))
    }

    fn ticker_by_name(&self, name: &str) -> Result<Ticker> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM tickers WHERE name=?1", TICKER_COLS),
                params![name],
                ticker_from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::TickerNotFound(name.to_string()))
    }

    fn tickers_in_category(&self, category_id: i64) -> Result<Vec<Ticker>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM tickers WHERE category_id=?1 ORDER BY name",
            TICKER_COLS
        ))?;
        let rows = stmt.query_map(params![category_id], ticker_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn currency_codes(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT code FROM currencies ORDER BY code")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn flow_totals(
        &self,
        ticker_id: i64,
        side: FlowSide,
        cutoff: Option<NaiveDate>,
    ) -> Result<FlowTotals> {
        let sql = match side {
            FlowSide::Inflow => {
                "SELECT quantity, total_price FROM inflows
                 WHERE ticker_id=?1 AND (?2 IS NULL OR date<=?2)"
            }
            FlowSide::Outflow => {
                "SELECT quantity, total_price FROM outflows
                 WHERE ticker_id=?1 AND (?2 IS NULL OR date<=?2)"
            }
        };
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params![ticker_id, cutoff], |r| {
            Ok((r.get::<_, i64>(0)?, decimal_at(r, 1)?))
        })?;
        let mut totals = FlowTotals::default();
        for row in rows {
            let (qty, price) = row?;
            totals.quantity += qty;
            totals.total_price = add_amount(totals.total_price, price)?;
        }
        Ok(totals)
    }

    fn inflow_grand_total(&self) -> Result<Decimal> {
        let mut stmt = self.conn.prepare_cached("SELECT total_price FROM inflows")?;
        let rows = stmt.query_map([], |r| decimal_at(r, 0))?;
        let mut total = Decimal::ZERO;
        for row in rows {
            total = add_amount(total, row?)?;
        }
        Ok(total)
    }

    fn inflow_totals_by_currency(&self) -> Result<BTreeMap<String, Decimal>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT c.code, i.total_price
             FROM inflows i
             JOIN tickers t ON i.ticker_id=t.id
             JOIN currencies c ON t.currency_id=c.id",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, Option<String>>(0)?, decimal_at(r, 1)?))
        })?;
        group_named(rows)
    }

    fn inflow_totals_by_broker(&self) -> Result<BTreeMap<String, Decimal>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT b.name, i.total_price
             FROM inflows i
             LEFT JOIN brokers b ON i.broker_id=b.id",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, Option<String>>(0)?, decimal_at(r, 1)?))
        })?;
        group_named(rows)
    }

    fn inflow_totals_by_month(&self, currency_code: &str) -> Result<Vec<MonthTotal>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT i.date, i.total_price
             FROM inflows i
             JOIN tickers t ON i.ticker_id=t.id
             JOIN currencies c ON t.currency_id=c.id
             WHERE c.code=?1",
        )?;
        let rows = stmt.query_map(params![currency_code], |r| {
            Ok((r.get::<_, NaiveDate>(0)?, decimal_at(r, 1)?))
        })?;
        let mut dated = Vec::new();
        for row in rows {
            dated.push(row?);
        }
        bucket_by_month(dated)
    }

    fn dividend_totals_by_month_in_category(
        &self,
        category_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthTotal>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT d.date, d.total_value
             FROM dividends d
             JOIN tickers t ON d.ticker_id=t.id
             WHERE t.category_id=?1 AND d.date BETWEEN ?2 AND ?3",
        )?;
        let rows = stmt.query_map(params![category_id, from, to], |r| {
            Ok((r.get::<_, NaiveDate>(0)?, decimal_at(r, 1)?))
        })?;
        let mut dated = Vec::new();
        for row in rows {
            dated.push(row?);
        }
        bucket_by_month(dated)
    }

    fn dividend_totals_by_month_in_currency(&self, currency: &str) -> Result<Vec<MonthTotal>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT date, total_value FROM dividends WHERE currency=?1")?;
        let rows = stmt.query_map(params![currency], |r| {
            Ok((r.get::<_, NaiveDate>(0)?, decimal_at(r, 1)?))
        })?;
        let mut dated = Vec::new();
        for row in rows {
            dated.push(row?);
        }
        bucket_by_month(dated)
    }

    fn inflow_quantity_until(&self, ticker_id: i64, date: NaiveDate) -> Result<i64> {
        let qty: i64 = self.conn.query_row(
            "SELECT IFNULL(SUM(quantity), 0) FROM inflows WHERE ticker_id=?1 AND date<=?2",
            params![ticker_id, date],
            |r| r.get(0),
        )?;
        Ok(qty)
    }
}

fn group_named<I>(rows: I) -> Result<BTreeMap<String, Decimal>>
where
    I: Iterator<Item = rusqlite::Result<(Option<String>, Decimal)>>,
{
    let mut out: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in rows {
        let (key, amount) = row?;
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            continue;
        };
        let slot = out.entry(key).or_insert(Decimal::ZERO);
        *slot = add_amount(*slot, amount)?;
    }
    Ok(out)
}

impl SqliteLedger<'_> {
    pub fn ticker_by_id(&self, id: i64) -> Result<Ticker> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM tickers WHERE id=?1", TICKER_COLS),
                params![id],
                ticker_from_row,
            )
            .optional()?
            .ok_or(LedgerError::RecordNotFound {
                entity: "Ticker",
                id,
            })
    }

    pub fn tickers(&self, category: Option<&str>) -> Result<Vec<Ticker>> {
        match category {
            Some(title) => {
                let cat = self.category_by_title(title)?;
                self.tickers_in_category(cat.id)
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare_cached(&format!("SELECT {} FROM tickers ORDER BY name", TICKER_COLS))?;
                let rows = stmt.query_map([], ticker_from_row)?;
                let mut out = Vec::new();
                for row in rows {
                    out.push(row?);
                }
                Ok(out)
            }
        }
    }

    pub fn currencies(&self) -> Result<Vec<Currency>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, code, name, exchange_rate FROM currencies ORDER BY code",
        )?;
        let rows = stmt.query_map([], currency_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn currency_by_code(&self, code: &str) -> Result<Currency> {
        self.conn
            .query_row(
                "SELECT id, code, name, exchange_rate FROM currencies WHERE code=?1",
                params![code],
                currency_from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::CurrencyNotFound(code.to_string()))
    }

    pub fn currency_by_id(&self, id: i64) -> Result<Currency> {
        self.conn
            .query_row(
                "SELECT id, code, name, exchange_rate FROM currencies WHERE id=?1",
                params![id],
                currency_from_row,
            )
            .optional()?
            .ok_or(LedgerError::RecordNotFound {
                entity: "Currency",
                id,
            })
    }

    pub fn brokers(&self) -> Result<Vec<Broker>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, account_number, country, currency_id, description
             FROM brokers ORDER BY id",
        )?;
        let rows = stmt.query_map([], broker_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn broker_by_name(&self, name: &str) -> Result<Broker> {
        self.conn
            .query_row(
                "SELECT id, name, account_number, country, currency_id, description
                 FROM brokers WHERE name=?1",
                params![name],
                broker_from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::BrokerNotFound(name.to_string()))
    }

    pub fn inflow(&self, id: i64) -> Result<Inflow> {
        self.conn
            .query_row(
                "SELECT id, ticker_id, broker_id, cost_price, quantity, total_price, date, tax, kind
                 FROM inflows WHERE id=?1",
                params![id],
                inflow_from_row,
            )
            .optional()?
            .ok_or(LedgerError::RecordNotFound {
                entity: "Inflow",
                id,
            })
    }

    pub fn outflow(&self, id: i64) -> Result<Outflow> {
        self.conn
            .query_row(
                "SELECT id, ticker_id, broker_id, cost_price, quantity, total_price, date, tax
                 FROM outflows WHERE id=?1",
                params![id],
                outflow_from_row,
            )
            .optional()?
            .ok_or(LedgerError::RecordNotFound {
                entity: "Outflow",
                id,
            })
    }

    pub fn dividend(&self, id: i64) -> Result<Dividend> {
        self.conn
            .query_row(
                "SELECT id, ticker_id, value, date, currency, quantity_quote, total_value,
                        income_type
                 FROM dividends WHERE id=?1",
                params![id],
                dividend_from_row,
            )
            .optional()?
            .ok_or(LedgerError::RecordNotFound {
                entity: "Dividend",
                id,
            })
    }

    /// Dividends newest first, narrowed by `filter`.
    pub fn dividends(&self, filter: &DividendFilter) -> Result<Vec<(String, Dividend)>> {
        let mut sql = String::from(
            "SELECT d.id, d.ticker_id, d.value, d.date, d.currency, d.quantity_quote,
                    d.total_value, d.income_type, t.name
             FROM dividends d JOIN tickers t ON d.ticker_id=t.id WHERE 1=1",
        );
        let mut params_vec: Vec<String> = Vec::new();
        if let Some(ticker) = &filter.ticker {
            sql.push_str(" AND t.name=?");
            params_vec.push(ticker.clone());
        }
        if let Some(year) = filter.year {
            sql.push_str(" AND substr(d.date,1,4)=?");
            params_vec.push(format!("{:04}", year));
        }
        if let Some(month) = filter.month {
            sql.push_str(" AND substr(d.date,6,2)=?");
            params_vec.push(format!("{:02}", month));
        }
        if let Some(currency) = &filter.currency {
            sql.push_str(" AND d.currency=?");
            params_vec.push(currency.clone());
        }
        sql.push_str(" ORDER BY d.date DESC, d.id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
            Ok((r.get::<_, String>(8)?, dividend_from_row(r)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Distinct years with at least one dividend, newest first.
    pub fn dividend_years(&self) -> Result<Vec<i32>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT CAST(substr(date,1,4) AS INTEGER) AS y
             FROM dividends ORDER BY y DESC",
        )?;
        let rows = stmt.query_map([], |r| r.get::<_, i32>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn declared_dividends(&self) -> Result<Vec<(String, DeclaredDividend)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT dd.id, dd.ticker_id, dd.value_per_share, dd.payment_date, t.name
             FROM declared_dividends dd JOIN tickers t ON dd.ticker_id=t.id
             ORDER BY dd.payment_date DESC, dd.id DESC",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, String>(4)?,
                DeclaredDividend {
                    id: r.get(0)?,
                    ticker_id: r.get(1)?,
                    value_per_share: decimal_at(r, 2)?,
                    payment_date: r.get(3)?,
                },
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Inflows and outflows merged, newest first.
    pub fn negotiations(&self, ticker: Option<&str>) -> Result<Vec<Negotiation>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT n.id, n.date, t.name, b.name, n.side, n.quantity, n.cost_price,
                    n.total_price, n.tax
             FROM (
                 SELECT id, ticker_id, broker_id, date, 'buy' AS side, quantity, cost_price,
                        total_price, tax
                 FROM inflows
                 UNION ALL
                 SELECT id, ticker_id, broker_id, date, 'sell' AS side, quantity, cost_price,
                        total_price, tax
                 FROM outflows
             ) n
             JOIN tickers t ON n.ticker_id=t.id
             LEFT JOIN brokers b ON n.broker_id=b.id
             WHERE (?1 IS NULL OR t.name=?1)
             ORDER BY n.date DESC, n.side, n.id DESC",
        )?;
        let rows = stmt.query_map(params![ticker], |r| {
            Ok(Negotiation {
                id: r.get(0)?,
                date: r.get(1)?,
                ticker: r.get(2)?,
                broker: r.get(3)?,
                side: r.get(4)?,
                quantity: r.get(5)?,
                cost_price: decimal_at(r, 6)?,
                total_price: decimal_at(r, 7)?,
                tax: decimal_at(r, 8)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Net inflow−outflow quantity per ticker id, from the full history.
    pub fn net_quantities(&self) -> Result<BTreeMap<i64, i64>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT t.id,
                    IFNULL((SELECT SUM(quantity) FROM inflows WHERE ticker_id=t.id), 0)
                  - IFNULL((SELECT SUM(quantity) FROM outflows WHERE ticker_id=t.id), 0)
             FROM tickers t",
        )?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?;
        let mut out = BTreeMap::new();
        for row in rows {
            let (id, qty) = row?;
            out.insert(id, qty);
        }
        Ok(out)
    }

    /// Number of rows in `table` whose `column` equals `id`.
    pub(crate) fn count_refs(&self, table: &str, column: &str, id: i64) -> Result<i64> {
        let n: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {}=?1", table, column),
            params![id],
            |r| r.get(0),
        )?;
        Ok(n)
    }
}
