// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recording use cases. Each write validates its input, persists the record
//! (plus the ticker quantity step on creation) in one transaction, then
//! invalidates the metric cache.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::ledger::{LedgerStore, SqliteLedger};
use crate::metrics::MetricsEngine;
use crate::models::{
    Broker, Category, Currency, DeclaredDividend, Dividend, DividendUpdate, FlowUpdate, Inflow,
    NewDividend, NewInflow, NewOutflow, Outflow, Ticker,
};
use crate::validators;

/// Most fractional digits a per-quota dividend value may carry.
pub const DIVIDEND_VALUE_SCALE: u32 = 10;

/// A ticker whose stored quantity disagrees with its flow history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityDrift {
    pub ticker: String,
    pub stored: i64,
    pub expected: i64,
}

pub struct Journal<'a> {
    ledger: &'a SqliteLedger<'a>,
    engine: &'a MetricsEngine<'a>,
}

impl<'a> Journal<'a> {
    pub fn new(ledger: &'a SqliteLedger<'a>, engine: &'a MetricsEngine<'a>) -> Self {
        Self { ledger, engine }
    }

    fn check_date(&self, date: NaiveDate) -> Result<()> {
        if date > self.engine.today() {
            return Err(LedgerError::Validation(format!(
                "Date {} is in the future",
                date
            )));
        }
        Ok(())
    }

    fn check_flow(
        &self,
        cost_price: Decimal,
        quantity: i64,
        tax: Decimal,
        date: NaiveDate,
    ) -> Result<()> {
        if cost_price <= Decimal::ZERO {
            return Err(LedgerError::Validation("Cost price must be positive".into()));
        }
        if quantity <= 0 {
            return Err(LedgerError::Validation("Quantity must be positive".into()));
        }
        if tax < Decimal::ZERO {
            return Err(LedgerError::Validation("Tax cannot be negative".into()));
        }
        self.check_date(date)
    }

    fn check_dividend(&self, value: Decimal, quantity_quote: i64, date: NaiveDate) -> Result<()> {
        if value < Decimal::ZERO {
            return Err(LedgerError::Validation("Dividend value cannot be negative".into()));
        }
        if value.normalize().scale() > DIVIDEND_VALUE_SCALE {
            return Err(LedgerError::Validation(format!(
                "Dividend value allows at most {} decimal places",
                DIVIDEND_VALUE_SCALE
            )));
        }
        if quantity_quote < 0 {
            return Err(LedgerError::Validation("Quota count cannot be negative".into()));
        }
        self.check_date(date)
    }

    fn broker_id(&self, broker: Option<&str>) -> Result<Option<i64>> {
        match broker {
            Some(name) => Ok(Some(self.ledger.broker_by_name(name.trim())?.id)),
            None => Ok(None),
        }
    }

    /// Quota count used when none was supplied: inflow quantity up to `date`.
    ///
    /// Outflows are not subtracted here, unlike ticker metrics. Kept as-is
    /// pending product review.
    fn derive_quota(&self, ticker_id: i64, date: NaiveDate) -> Result<i64> {
        self.ledger.inflow_quantity_until(ticker_id, date)
    }

    pub fn record_inflow(&self, input: NewInflow) -> Result<Inflow> {
        let name = validators::ticker_name(&input.ticker)?;
        self.check_flow(input.cost_price, input.quantity, input.tax, input.date)?;
        let ticker = self.ledger.ticker_by_name(&name)?;
        let broker_id = self.broker_id(input.broker.as_deref())?;

        let tx = self.ledger.conn().unchecked_transaction()?;
        let inflow = self.ledger.insert_inflow(
            ticker.id,
            broker_id,
            input.cost_price,
            input.quantity,
            input.date,
            input.tax,
            input.kind,
        )?;
        self.ledger.adjust_ticker_quantity(ticker.id, input.quantity)?;
        tx.commit()?;
        tracing::debug!(ticker = %name, delta = input.quantity, "ticker quantity adjusted");
        tracing::info!(
            id = inflow.id,
            ticker = %name,
            total = %inflow.total_price,
            "inflow recorded"
        );

        self.engine.invalidate_metrics()?;
        Ok(inflow)
    }

    /// Applies a partial update. The ticker quantity is left untouched.
    pub fn edit_inflow(&self, id: i64, update: FlowUpdate) -> Result<Inflow> {
        let mut inflow = self.ledger.inflow(id)?;
        if let Some(broker) = update.broker.as_deref() {
            inflow.broker_id = self.broker_id(Some(broker))?;
        }
        inflow.cost_price = update.cost_price.unwrap_or(inflow.cost_price);
        inflow.quantity = update.quantity.unwrap_or(inflow.quantity);
        inflow.date = update.date.unwrap_or(inflow.date);
        inflow.tax = update.tax.unwrap_or(inflow.tax);
        self.check_flow(inflow.cost_price, inflow.quantity, inflow.tax, inflow.date)?;

        self.ledger.update_inflow(&mut inflow)?;
        tracing::info!(id, total = %inflow.total_price, "inflow updated");
        self.engine.invalidate_metrics()?;
        Ok(inflow)
    }

    pub fn remove_inflow(&self, id: i64) -> Result<Inflow> {
        let inflow = self.ledger.delete_inflow(id)?;
        tracing::info!(id, "inflow removed");
        self.engine.invalidate_metrics()?;
        Ok(inflow)
    }

    pub fn record_outflow(&self, input: NewOutflow) -> Result<Outflow> {
        let name = validators::ticker_name(&input.ticker)?;
        self.check_flow(input.cost_price, input.quantity, input.tax, input.date)?;
        let ticker = self.ledger.ticker_by_name(&name)?;
        let broker_id = self.broker_id(input.broker.as_deref())?;

        let tx = self.ledger.conn().unchecked_transaction()?;
        let outflow = self.ledger.insert_outflow(
            ticker.id,
            broker_id,
            input.cost_price,
            input.quantity,
            input.date,
            input.tax,
        )?;
        self.ledger.adjust_ticker_quantity(ticker.id, -input.quantity)?;
        tx.commit()?;
        tracing::debug!(ticker = %name, delta = -input.quantity, "ticker quantity adjusted");
        tracing::info!(
            id = outflow.id,
            ticker = %name,
            total = %outflow.total_price,
            "outflow recorded"
        );

        self.engine.invalidate_metrics()?;
        Ok(outflow)
    }

    pub fn edit_outflow(&self, id: i64, update: FlowUpdate) -> Result<Outflow> {
        let mut outflow = self.ledger.outflow(id)?;
        if let Some(broker) = update.broker.as_deref() {
            outflow.broker_id = self.broker_id(Some(broker))?;
        }
        outflow.cost_price = update.cost_price.unwrap_or(outflow.cost_price);
        outflow.quantity = update.quantity.unwrap_or(outflow.quantity);
        outflow.date = update.date.unwrap_or(outflow.date);
        outflow.tax = update.tax.unwrap_or(outflow.tax);
        self.check_flow(outflow.cost_price, outflow.quantity, outflow.tax, outflow.date)?;

        self.ledger.update_outflow(&mut outflow)?;
        tracing::info!(id, total = %outflow.total_price, "outflow updated");
        self.engine.invalidate_metrics()?;
        Ok(outflow)
    }

    pub fn remove_outflow(&self, id: i64) -> Result<Outflow> {
        let outflow = self.ledger.delete_outflow(id)?;
        tracing::info!(id, "outflow removed");
        self.engine.invalidate_metrics()?;
        Ok(outflow)
    }

    /// Records a payment. A missing or zero `quantity_quote` is derived from
    /// inflow history; `total_value` is always computed here.
    pub fn record_dividend(&self, input: NewDividend) -> Result<Dividend> {
        let name = validators::ticker_name(&input.ticker)?;
        let currency = validators::currency_code(&input.currency)?;
        self.check_dividend(input.value, input.quantity_quote.unwrap_or(0), input.date)?;
        let ticker = self.ledger.ticker_by_name(&name)?;

        let quota = match input.quantity_quote {
            Some(q) if q > 0 => q,
            _ => self.derive_quota(ticker.id, input.date)?,
        };
        let dividend = self.ledger.insert_dividend(
            ticker.id,
            input.value,
            input.date,
            &currency,
            quota,
            input.income_type,
        )?;
        tracing::info!(
            id = dividend.id,
            ticker = %name,
            quota,
            total = %dividend.total_value,
            "dividend recorded"
        );
        self.engine.invalidate_metrics()?;
        Ok(dividend)
    }

    /// Applies a partial update. A supplied quota of zero is derived again from
    /// inflows up to the (possibly new) date.
    pub fn edit_dividend(&self, id: i64, update: DividendUpdate) -> Result<Dividend> {
        let mut dividend = self.ledger.dividend(id)?;
        dividend.value = update.value.unwrap_or(dividend.value);
        dividend.date = update.date.unwrap_or(dividend.date);
        dividend.income_type = update.income_type.unwrap_or(dividend.income_type);
        let requested = update.quantity_quote.unwrap_or(dividend.quantity_quote);
        self.check_dividend(dividend.value, requested, dividend.date)?;
        dividend.quantity_quote = match update.quantity_quote {
            Some(0) => self.derive_quota(dividend.ticker_id, dividend.date)?,
            _ => requested,
        };

        self.ledger.update_dividend(&mut dividend)?;
        tracing::info!(id, total = %dividend.total_value, "dividend updated");
        self.engine.invalidate_metrics()?;
        Ok(dividend)
    }

    pub fn remove_dividend(&self, id: i64) -> Result<Dividend> {
        let dividend = self.ledger.delete_dividend(id)?;
        tracing::info!(id, "dividend removed");
        self.engine.invalidate_metrics()?;
        Ok(dividend)
    }

    /// Announced payment; never part of realized aggregates.
    pub fn declare_dividend(
        &self,
        ticker: &str,
        value_per_share: Decimal,
        payment_date: NaiveDate,
    ) -> Result<DeclaredDividend> {
        let name = validators::ticker_name(ticker)?;
        if value_per_share <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "Declared value per share must be positive".into(),
            ));
        }
        let ticker = self.ledger.ticker_by_name(&name)?;
        let declared = self
            .ledger
            .insert_declared_dividend(ticker.id, value_per_share, payment_date)?;
        tracing::info!(id = declared.id, ticker = %name, %payment_date, "dividend declared");
        Ok(declared)
    }

    pub fn add_currency(
        &self,
        code: &str,
        name: &str,
        exchange_rate: Option<Decimal>,
    ) -> Result<Currency> {
        let code = validators::currency_code(code)?;
        if name.trim().is_empty() {
            return Err(LedgerError::Validation("Currency name is required".into()));
        }
        if exchange_rate.is_some_and(|r| r <= Decimal::ZERO) {
            return Err(LedgerError::Validation("Exchange rate must be positive".into()));
        }
        let currency = self.ledger.create_currency(&code, name.trim(), exchange_rate)?;
        tracing::info!(code = %code, "currency added");
        Ok(currency)
    }

    pub fn remove_currency(&self, code: &str) -> Result<()> {
        let code = validators::currency_code(code)?;
        self.ledger.delete_currency(&code)?;
        tracing::info!(code = %code, "currency removed");
        self.engine.invalidate_metrics()
    }

    pub fn add_broker(
        &self,
        name: &str,
        account_number: Option<&str>,
        country: Option<&str>,
        currency: Option<&str>,
        description: Option<&str>,
    ) -> Result<Broker> {
        let name = validators::broker_name(name)?;
        let currency = currency.map(validators::currency_code).transpose()?;
        let broker = self.ledger.create_broker(
            &name,
            account_number,
            country,
            currency.as_deref(),
            description,
        )?;
        tracing::info!(broker = %name, "broker added");
        Ok(broker)
    }

    pub fn remove_broker(&self, name: &str) -> Result<()> {
        let name = validators::broker_name(name)?;
        self.ledger.delete_broker(&name)?;
        tracing::info!(broker = %name, "broker removed");
        self.engine.invalidate_metrics()
    }

    pub fn add_category(&self, title: &str, description: Option<&str>) -> Result<Category> {
        let title = validators::category_title(title)?;
        let category = self.ledger.create_category(&title, description)?;
        tracing::info!(category = %title, "category added");
        self.engine.invalidate_metrics()?;
        Ok(category)
    }

    pub fn rename_category(&self, old_title: &str, new_title: &str) -> Result<Category> {
        let old_title = validators::category_title(old_title)?;
        let new_title = validators::category_title(new_title)?;
        let category = self.ledger.rename_category(&old_title, &new_title)?;
        tracing::info!(from = %old_title, to = %new_title, "category renamed");
        self.engine.invalidate_with_categories(&[&old_title])?;
        Ok(category)
    }

    pub fn remove_category(&self, title: &str) -> Result<()> {
        let title = validators::category_title(title)?;
        self.ledger.delete_category(&title)?;
        tracing::info!(category = %title, "category removed");
        self.engine.invalidate_with_categories(&[&title])
    }

    pub fn add_ticker(
        &self,
        name: &str,
        category: &str,
        currency: &str,
        sector: Option<&str>,
        description: Option<&str>,
    ) -> Result<Ticker> {
        let name = validators::ticker_name(name)?;
        let category = validators::category_title(category)?;
        let currency = validators::currency_code(currency)?;
        let ticker = self
            .ledger
            .create_ticker(&name, &category, &currency, sector, description)?;
        tracing::info!(ticker = %name, category = %category, "ticker added");
        self.engine.invalidate_metrics()?;
        Ok(ticker)
    }

    pub fn remove_ticker(&self, name: &str) -> Result<Ticker> {
        let name = validators::ticker_name(name)?;
        let ticker = self.ledger.delete_ticker(&name)?;
        tracing::info!(ticker = %name, "ticker removed");
        self.engine.invalidate_metrics()?;
        Ok(ticker)
    }

    /// Compares each ticker's stored quantity with inflow−outflow history.
    /// With `fix`, mismatches are overwritten with the recomputed value.
    pub fn reconcile_quantities(&self, fix: bool) -> Result<Vec<QuantityDrift>> {
        let expected = self.ledger.net_quantities()?;
        let mut drifts = Vec::new();
        for ticker in self.ledger.tickers(None)? {
            let net = expected.get(&ticker.id).copied().unwrap_or(0);
            if net != ticker.quantity {
                drifts.push(QuantityDrift {
                    ticker: ticker.name.clone(),
                    stored: ticker.quantity,
                    expected: net,
                });
                if fix {
                    self.ledger.set_ticker_quantity(ticker.id, net)?;
                    tracing::info!(
                        ticker = %ticker.name,
                        from = ticker.quantity,
                        to = net,
                        "ticker quantity reconciled"
                    );
                }
            }
        }
        if fix && !drifts.is_empty() {
            self.engine.invalidate_metrics()?;
        }
        Ok(drifts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, MemoryMetricsCache, MetricsCache};
    use crate::config::AppConfig;
    use crate::ledger::testing::setup_conn;
    use crate::models::{IncomeType, InflowKind};
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn buy(ticker: &str, qty: i64, price: Decimal, date: &str) -> NewInflow {
        NewInflow {
            ticker: ticker.into(),
            broker: None,
            cost_price: price,
            quantity: qty,
            date: d(date),
            tax: Decimal::ZERO,
            kind: InflowKind::Purchase,
        }
    }

    fn sell(ticker: &str, qty: i64, price: Decimal, date: &str) -> NewOutflow {
        NewOutflow {
            ticker: ticker.into(),
            broker: None,
            cost_price: price,
            quantity: qty,
            date: d(date),
            tax: Decimal::ZERO,
        }
    }

    fn pay(ticker: &str, value: Decimal, date: &str, quota: Option<i64>) -> NewDividend {
        NewDividend {
            ticker: ticker.into(),
            value,
            date: d(date),
            currency: "BRL".into(),
            quantity_quote: quota,
            income_type: IncomeType::Dividend,
        }
    }

    macro_rules! journal {
        ($conn:ident, $cache:ident, $ledger:ident, $engine:ident, $journal:ident) => {
            let $conn = setup_conn();
            let $cache = MemoryMetricsCache::new();
            let $ledger = SqliteLedger::new(&$conn);
            let $engine = MetricsEngine::new(&$ledger, &$cache, &AppConfig::default())
                .with_today(d("2024-06-15"));
            let $journal = Journal::new(&$ledger, &$engine);
            $journal.add_currency("BRL", "Real", None).unwrap();
            $journal.add_category("FII", None).unwrap();
            $journal.add_ticker("HGLG11", "FII", "BRL", None, None).unwrap();
        };
    }

    #[test]
    fn creation_steps_quantity_once_and_edits_do_not() {
        journal!(conn, cache, ledger, engine, journal);
        let inflow = journal
            .record_inflow(buy("hglg11", 10, dec!(150.00), "2024-05-16"))
            .unwrap();
        assert_eq!(inflow.total_price, dec!(1500.00));
        journal.record_outflow(sell("HGLG11", 5, dec!(155.00), "2024-06-05")).unwrap();
        assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, 5);

        let twelve = FlowUpdate {
            quantity: Some(12),
            ..FlowUpdate::default()
        };
        journal.edit_inflow(inflow.id, twelve).unwrap();
        assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, 5);
        journal.remove_inflow(inflow.id).unwrap();
        assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, 5);

        let drift = journal.reconcile_quantities(true).unwrap();
        assert_eq!(
            drift,
            vec![QuantityDrift {
                ticker: "HGLG11".into(),
                stored: 5,
                expected: -5
            }]
        );
        assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, -5);
        assert!(journal.reconcile_quantities(false).unwrap().is_empty());
    }

    #[test]
    fn hglg11_scenario_metrics() {
        journal!(conn, cache, ledger, engine, journal);
        journal.record_inflow(buy("HGLG11", 10, dec!(150.00), "2024-05-16")).unwrap();
        journal.record_outflow(sell("HGLG11", 5, dec!(155.00), "2024-06-05")).unwrap();
        let m = engine.ticker_metrics("HGLG11", None).unwrap();
        assert_eq!(
            (m.total_quantity, m.total_price, m.average_price),
            (5, dec!(725.00), dec!(145.00))
        );
    }

    #[test]
    fn dividend_quota_is_derived_from_inflows_only() {
        journal!(conn, cache, ledger, engine, journal);
        journal.record_inflow(buy("HGLG11", 100, dec!(10), "2024-01-10")).unwrap();
        journal.record_inflow(buy("HGLG11", 50, dec!(10), "2024-03-10")).unwrap();
        journal.record_outflow(sell("HGLG11", 30, dec!(10), "2024-03-20")).unwrap();
        journal.record_inflow(buy("HGLG11", 999, dec!(10), "2024-05-01")).unwrap();

        let div = journal
            .record_dividend(pay("HGLG11", dec!(0.85), "2024-04-01", None))
            .unwrap();
        assert_eq!(div.quantity_quote, 150);
        assert_eq!(div.total_value, dec!(127.50));

        let zero = journal
            .record_dividend(pay("HGLG11", dec!(0.85), "2024-04-01", Some(0)))
            .unwrap();
        assert_eq!(zero.quantity_quote, 150);

        let given = journal
            .record_dividend(pay("HGLG11", dec!(0.85), "2024-04-01", Some(10)))
            .unwrap();
        assert_eq!(given.quantity_quote, 10);
        assert_eq!(given.total_value, dec!(8.50));

        let raise = DividendUpdate {
            value: Some(dec!(1.1)),
            ..DividendUpdate::default()
        };
        let edited = journal.edit_dividend(given.id, raise).unwrap();
        assert_eq!(edited.total_value, dec!(11.00));
    }

    #[test]
    fn rejects_invalid_records() {
        journal!(conn, cache, ledger, engine, journal);
        let err = |e: LedgerError| matches!(e, LedgerError::Validation(_));
        assert!(err(journal.record_inflow(buy("HGLG11", 0, dec!(1), "2024-01-01")).unwrap_err()));
        assert!(err(journal.record_inflow(buy("HGLG11", 1, dec!(0), "2024-01-01")).unwrap_err()));
        assert!(err(journal.record_inflow(buy("HGLG11", 1, dec!(1), "2024-06-16")).unwrap_err()));
        let mut taxed = sell("HGLG11", 1, dec!(1), "2024-01-01");
        taxed.tax = dec!(-0.01);
        assert!(err(journal.record_outflow(taxed).unwrap_err()));
        assert!(err(journal
            .record_dividend(pay("HGLG11", dec!(-1), "2024-01-01", None))
            .unwrap_err()));
        assert!(err(journal
            .record_dividend(pay("HGLG11", dec!(0.00000000001), "2024-01-01", None))
            .unwrap_err()));
        assert!(
            journal
                .record_dividend(pay("HGLG11", dec!(0.0000000001), "2024-01-01", None))
                .is_ok()
        );
        assert!(
            journal
                .record_inflow(buy("MISSING", 1, dec!(1), "2024-01-01"))
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, 0);
    }

    #[test]
    fn every_write_clears_cached_metrics() {
        journal!(conn, cache, ledger, engine, journal);
        let first = journal.record_inflow(buy("HGLG11", 1, dec!(100), "2024-01-10")).unwrap();
        assert_eq!(engine.total_invested().unwrap(), dec!(100.00));
        assert_eq!(
            engine.category_invested("FII").unwrap().total_invested,
            "100,00"
        );
        assert!(cache.get(&CacheKey::TotalInvested).unwrap().is_some());

        journal.record_outflow(sell("HGLG11", 1, dec!(40), "2024-01-11")).unwrap();
        assert!(cache.get(&CacheKey::TotalInvested).unwrap().is_none());
        let fii_key = CacheKey::CategoryInvested("FII".into());
        assert!(cache.get(&fii_key).unwrap().is_none());
        assert_eq!(
            engine.category_invested("FII").unwrap().total_invested,
            "60,00"
        );

        journal.record_dividend(pay("HGLG11", dec!(2), "2024-06-01", Some(5))).unwrap();
        assert_eq!(engine.dividends_by_category("FII").unwrap()[6], dec!(10.00));
        journal.remove_dividend(1).unwrap();
        assert_eq!(
            engine.dividends_by_category("FII").unwrap()[6],
            Decimal::ZERO
        );

        let repriced = FlowUpdate {
            cost_price: Some(dec!(300)),
            ..FlowUpdate::default()
        };
        journal.edit_inflow(first.id, repriced).unwrap();
        assert_eq!(engine.total_invested().unwrap(), dec!(300.00));

        engine.chart_category_invested().unwrap();
        journal.rename_category("FII", "REIT").unwrap();
        let chart = engine.chart_category_invested().unwrap();
        assert!(chart.contains_key("REIT"));
        assert!(!chart.contains_key("FII"));
    }

    #[test]
    fn protected_deletes_surface_counts() {
        journal!(conn, cache, ledger, engine, journal);
        journal.record_inflow(buy("HGLG11", 1, dec!(100), "2024-01-10")).unwrap();
        let err = journal.remove_ticker("HGLG11").unwrap_err();
        assert_eq!(err.to_string(), "Ticker 'HGLG11' is still referenced by 1 inflow(s)");
        assert!(journal.remove_category("FII").is_err());
    }

    #[test]
    fn category_total_matches_sum_of_rounded_ticker_totals() {
        journal!(conn, cache, ledger, engine, journal);
        let names = ["KNRI11", "XPML11", "VISC11", "MXRF11"];
        for name in names {
            journal.add_ticker(name, "FII", "BRL", None, None).unwrap();
            journal
                .record_inflow(buy(name, 1, dec!(0.005), "2024-02-01"))
                .unwrap();
        }
        let mut expected = Decimal::ZERO;
        for name in names {
            let m = engine.ticker_metrics(name, None).unwrap();
            assert_eq!(m.total_price, dec!(0.01));
            expected += m.total_price;
        }
        assert_eq!(engine.category_invested_amount("FII").unwrap(), expected);
        assert_eq!(engine.category_invested("FII").unwrap().total_invested, "0,04");
        assert_eq!(engine.chart_category_invested().unwrap()["FII"], dec!(0.04));
    }

    #[test]
    fn amounts_beyond_decimal_range_are_rejected() {
        journal!(conn, cache, ledger, engine, journal);
        let err = journal
            .record_inflow(buy("HGLG11", 2, Decimal::MAX, "2024-01-10"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err}");
        let err = journal
            .record_outflow(sell("HGLG11", 3, Decimal::MAX, "2024-01-10"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err}");
        let err = journal
            .record_dividend(pay("HGLG11", Decimal::MAX, "2024-01-10", Some(2)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err}");

        assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, 0);
        assert!(ledger.negotiations(None).unwrap().is_empty());
    }
}
