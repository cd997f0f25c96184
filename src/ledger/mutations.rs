// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::params;
use rust_decimal::Decimal;

use super::{LedgerStore, SqliteLedger, line_total};
use crate::error::{LedgerError, Result};
use crate::models::{
    Broker, Category, Currency, DeclaredDividend, Dividend, IncomeType, Inflow, InflowKind,
    Outflow, Ticker,
};

impl SqliteLedger<'_> {
    fn ensure_unreferenced(
        &self,
        entity: &'static str,
        name: &str,
        id: i64,
        refs: &[(&'static str, &'static str, &'static str)],
    ) -> Result<()> {
        for (table, column, label) in refs {
            let count = self.count_refs(table, column, id)?;
            if count > 0 {
                return Err(LedgerError::Protected {
                    entity,
                    name: name.to_string(),
                    count,
                    referenced_by: label,
                });
            }
        }
        Ok(())
    }

    pub fn create_currency(
        &self,
        code: &str,
        name: &str,
        exchange_rate: Option<Decimal>,
    ) -> Result<Currency> {
        let rate = exchange_rate.map(|r| r.round_dp(4));
        self.conn.execute(
            "INSERT INTO currencies(code, name, exchange_rate) VALUES (?1, ?2, ?3)",
            params![code, name, rate.map(|r| r.to_string())],
        )?;
        Ok(Currency {
            id: self.conn.last_insert_rowid(),
            code: code.to_string(),
            name: name.to_string(),
            exchange_rate: rate,
        })
    }

    pub fn delete_currency(&self, code: &str) -> Result<()> {
        let currency = self.currency_by_code(code)?;
        self.ensure_unreferenced(
            "Currency",
            code,
            currency.id,
            &[
                ("tickers", "currency_id", "ticker(s)"),
                ("brokers", "currency_id", "broker(s)"),
            ],
        )?;
        self.conn
            .execute("DELETE FROM currencies WHERE id=?1", params![currency.id])?;
        Ok(())
    }

    pub fn create_broker(
        &self,
        name: &str,
        account_number: Option<&str>,
        country: Option<&str>,
        currency_code: Option<&str>,
        description: Option<&str>,
    ) -> Result<Broker> {
        let currency_id = match currency_code {
            Some(code) => Some(self.currency_by_code(code)?.id),
            None => None,
        };
        self.conn.execute(
            "INSERT INTO brokers(name, account_number, country, currency_id, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, account_number, country, currency_id, description],
        )?;
        Ok(Broker {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            account_number: account_number.map(str::to_string),
            country: country.map(str::to_string),
            currency_id,
            description: description.map(str::to_string),
        })
    }

    pub fn delete_broker(&self, name: &str) -> Result<()> {
        let broker = self.broker_by_name(name)?;
        self.ensure_unreferenced(
            "Broker",
            name,
            broker.id,
            &[
                ("inflows", "broker_id", "inflow(s)"),
                ("outflows", "broker_id", "outflow(s)"),
            ],
        )?;
        self.conn
            .execute("DELETE FROM brokers WHERE id=?1", params![broker.id])?;
        Ok(())
    }

    pub fn create_category(&self, title: &str, description: Option<&str>) -> Result<Category> {
        self.conn.execute(
            "INSERT INTO categories(title, description) VALUES (?1, ?2)",
            params![title, description],
        )?;
        Ok(Category {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            description: description.map(str::to_string),
        })
    }

    pub fn rename_category(&self, old_title: &str, new_title: &str) -> Result<Category> {
        let mut category = self.category_by_title(old_title)?;
        self.conn.execute(
            "UPDATE categories SET title=?1 WHERE id=?2",
            params![new_title, category.id],
        )?;
        category.title = new_title.to_string();
        Ok(category)
    }

    pub fn delete_category(&self, title: &str) -> Result<()> {
        let category = self.category_by_title(title)?;
        self.ensure_unreferenced(
            "Category",
            title,
            category.id,
            &[("tickers", "category_id", "ticker(s)")],
        )?;
        self.conn
            .execute("DELETE FROM categories WHERE id=?1", params![category.id])?;
        Ok(())
    }

    pub fn create_ticker(
        &self,
        name: &str,
        category_title: &str,
        currency_code: &str,
        sector: Option<&str>,
        description: Option<&str>,
    ) -> Result<Ticker> {
        let category = self.category_by_title(category_title)?;
        let currency = self.currency_by_code(currency_code)?;
        self.conn.execute(
            "INSERT INTO tickers(name, category_id, currency_id, sector, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, category.id, currency.id, sector, description],
        )?;
        Ok(Ticker {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            category_id: category.id,
            currency_id: currency.id,
            quantity: 0,
            sector: sector.map(str::to_string),
            description: description.map(str::to_string),
        })
    }

    /// Returns the removed ticker so callers can invalidate its category.
    pub fn delete_ticker(&self, name: &str) -> Result<Ticker> {
        let ticker = self.ticker_by_name(name)?;
        self.ensure_unreferenced(
            "Ticker",
            name,
            ticker.id,
            &[
                ("inflows", "ticker_id", "inflow(s)"),
                ("outflows", "ticker_id", "outflow(s)"),
                ("dividends", "ticker_id", "dividend(s)"),
                ("declared_dividends", "ticker_id", "declared dividend(s)"),
            ],
        )?;
        self.conn
            .execute("DELETE FROM tickers WHERE id=?1", params![ticker.id])?;
        Ok(ticker)
    }

    pub fn adjust_ticker_quantity(&self, ticker_id: i64, delta: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE tickers SET quantity = quantity + ?1 WHERE id=?2",
            params![delta, ticker_id],
        )?;
        Ok(())
    }

    pub fn set_ticker_quantity(&self, ticker_id: i64, quantity: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE tickers SET quantity=?1 WHERE id=?2",
            params![quantity, ticker_id],
        )?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_inflow(
        &self,
        ticker_id: i64,
        broker_id: Option<i64>,
        cost_price: Decimal,
        quantity: i64,
        date: NaiveDate,
        tax: Decimal,
        kind: InflowKind,
    ) -> Result<Inflow> {
        let total_price = line_total(cost_price, quantity)?;
        self.conn.execute(
            "INSERT INTO inflows(ticker_id, broker_id, cost_price, quantity, total_price,
                                 date, tax, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                ticker_id,
                broker_id,
                cost_price.to_string(),
                quantity,
                total_price.to_string(),
                date,
                tax.to_string(),
                kind.as_str()
            ],
        )?;
        Ok(Inflow {
            id: self.conn.last_insert_rowid(),
            ticker_id,
            broker_id,
            cost_price,
            quantity,
            total_price,
            date,
            tax,
            kind,
        })
    }

    /// Rewrites every editable column, recomputing `total_price`.
    pub fn update_inflow(&self, inflow: &mut Inflow) -> Result<()> {
        inflow.total_price = line_total(inflow.cost_price, inflow.quantity)?;
        self.conn.execute(
            "UPDATE inflows SET broker_id=?1, cost_price=?2, quantity=?3, total_price=?4,
                    date=?5, tax=?6, kind=?7
             WHERE id=?8",
            params![
                inflow.broker_id,
                inflow.cost_price.to_string(),
                inflow.quantity,
                inflow.total_price.to_string(),
                inflow.date,
                inflow.tax.to_string(),
                inflow.kind.as_str(),
                inflow.id
            ],
        )?;
        Ok(())
    }

    pub fn delete_inflow(&self, id: i64) -> Result<Inflow> {
        let inflow = self.inflow(id)?;
        self.conn
            .execute("DELETE FROM inflows WHERE id=?1", params![id])?;
        Ok(inflow)
    }

    pub fn insert_outflow(
        &self,
        ticker_id: i64,
        broker_id: Option<i64>,
        cost_price: Decimal,
        quantity: i64,
        date: NaiveDate,
        tax: Decimal,
    ) -> Result<Outflow> {
        let total_price = line_total(cost_price, quantity)?;
        self.conn.execute(
            "INSERT INTO outflows(ticker_id, broker_id, cost_price, quantity, total_price,
                                  date, tax)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ticker_id,
                broker_id,
                cost_price.to_string(),
                quantity,
                total_price.to_string(),
                date,
                tax.to_string()
            ],
        )?;
        Ok(Outflow {
            id: self.conn.last_insert_rowid(),
            ticker_id,
            broker_id,
            cost_price,
            quantity,
            total_price,
            date,
            tax,
        })
    }

    pub fn update_outflow(&self, outflow: &mut Outflow) -> Result<()> {
        outflow.total_price = line_total(outflow.cost_price, outflow.quantity)?;
        self.conn.execute(
            "UPDATE outflows SET broker_id=?1, cost_price=?2, quantity=?3, total_price=?4,
                    date=?5, tax=?6
             WHERE id=?7",
            params![
                outflow.broker_id,
                outflow.cost_price.to_string(),
                outflow.quantity,
                outflow.total_price.to_string(),
                outflow.date,
                outflow.tax.to_string(),
                outflow.id
            ],
        )?;
        Ok(())
    }

    pub fn delete_outflow(&self, id: i64) -> Result<Outflow> {
        let outflow = self.outflow(id)?;
        self.conn
            .execute("DELETE FROM outflows WHERE id=?1", params![id])?;
        Ok(outflow)
    }

    /// Stores a dividend whose `quantity_quote` has already been resolved.
    pub fn insert_dividend(
        &self,
        ticker_id: i64,
        value: Decimal,
        date: NaiveDate,
        currency: &str,
        quantity_quote: i64,
        income_type: IncomeType,
    ) -> Result<Dividend> {
        let total_value = dividend_total(value, quantity_quote)?;
        self.conn.execute(
            "INSERT INTO dividends(ticker_id, value, date, currency, quantity_quote,
                                   total_value, income_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ticker_id,
                value.to_string(),
                date,
                currency,
                quantity_quote,
                total_value.to_string(),
                income_type.as_str()
            ],
        )?;
        Ok(Dividend {
            id: self.conn.last_insert_rowid(),
            ticker_id,
            value,
            date,
            currency: currency.to_string(),
            quantity_quote,
            total_value,
            income_type,
        })
    }

    pub fn update_dividend(&self, dividend: &mut Dividend) -> Result<()> {
        dividend.total_value = dividend_total(dividend.value, dividend.quantity_quote)?;
        self.conn.execute(
            "UPDATE dividends SET value=?1, date=?2, currency=?3, quantity_quote=?4,
                    total_value=?5, income_type=?6
             WHERE id=?7",
            params![
                dividend.value.to_string(),
                dividend.date,
                dividend.currency,
                dividend.quantity_quote,
                dividend.total_value.to_string(),
                dividend.income_type.as_str(),
                dividend.id
            ],
        )?;
        Ok(())
    }

    pub fn delete_dividend(&self, id: i64) -> Result<Dividend> {
        let dividend = self.dividend(id)?;
        self.conn
            .execute("DELETE FROM dividends WHERE id=?1", params![id])?;
        Ok(dividend)
    }

    pub fn insert_declared_dividend(
        &self,
        ticker_id: i64,
        value_per_share: Decimal,
        payment_date: NaiveDate,
    ) -> Result<DeclaredDividend> {
        let value_per_share = crate::format::round_money(value_per_share);
        self.conn.execute(
            "INSERT INTO declared_dividends(ticker_id, value_per_share, payment_date)
             VALUES (?1, ?2, ?3)",
            params![ticker_id, value_per_share.to_string(), payment_date],
        )?;
        Ok(DeclaredDividend {
            id: self.conn.last_insert_rowid(),
            ticker_id,
            value_per_share,
            payment_date,
        })
    }
}

fn dividend_total(value: Decimal, quantity_quote: i64) -> Result<Decimal> {
    line_total(value, quantity_quote).map(crate::format::round_money)
}
