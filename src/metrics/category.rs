// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MetricsEngine;
use crate::cache::{CacheKey, get_or_compute};
use crate::error::Result;
use crate::format::round_money;
use crate::ledger::add_amount;

/// Invested total of one category, already rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInvested {
    /// Locale-grouped amount, e.g. `1.500,00`.
    pub total_invested: String,
    pub ticker_count: usize,
}

impl MetricsEngine<'_> {
    /// Sum of each ticker's rounded `total_price` over the category.
    pub fn category_invested(&self, title: &str) -> Result<CategoryInvested> {
        let category = self.store.category_by_title(title)?;
        get_or_compute(
            self.cache,
            CacheKey::CategoryInvested(category.title.clone()),
            self.ttl,
            || {
                let tickers = self.store.tickers_in_category(category.id)?;
                let mut total = Decimal::ZERO;
                for ticker in &tickers {
                    let (_, price) = self.net_position(ticker.id, None)?;
                    total = add_amount(total, round_money(price))?;
                }
                Ok(CategoryInvested {
                    total_invested: self.locale.format_grouped(total),
                    ticker_count: tickers.len(),
                })
            },
        )
    }

    /// Numeric form of [`MetricsEngine::category_invested`], parsed back from
    /// the display string.
    pub fn category_invested_amount(&self, title: &str) -> Result<Decimal> {
        let shown = self.category_invested(title)?;
        self.locale.parse_grouped(&shown.total_invested)
    }

    /// Title → invested amount for every category.
    pub fn chart_category_invested(&self) -> Result<BTreeMap<String, Decimal>> {
        get_or_compute(self.cache, CacheKey::ChartCategoryInvested, self.ttl, || {
            let mut chart = BTreeMap::new();
            for category in self.store.categories()? {
                let amount = self.category_invested_amount(&category.title)?;
                chart.insert(category.title, amount);
            }
            Ok(chart)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::cache::MemoryMetricsCache;
    use crate::config::AppConfig;
    use crate::error::LedgerError;
    use crate::format::Locale;
    use crate::ledger::SqliteLedger;
    use crate::ledger::testing::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sums_net_basis_and_counts_tickers() {
        let conn = setup_conn();
        let s = seed(&conn);
        let knri = ticker(&conn, "KNRI11", s.fii, s.brl);
        ticker(&conn, "XPML11", s.fii, s.brl);
        inflow(&conn, s.hglg, None, "2024-01-10", 10, "150.00", "1500.00");
        outflow(&conn, s.hglg, "2024-02-10", 5, "155.00", "775.00");
        inflow(&conn, knri, None, "2024-01-11", 1000, "1000.00", "1000000.00");

        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let engine = MetricsEngine::new(&ledger, &cache, &AppConfig::default());
        let fii = engine.category_invested("FII").unwrap();
        assert_eq!(fii.ticker_count, 3);
        assert_eq!(fii.total_invested, "1.000.725,00");
        assert_eq!(
            engine.category_invested_amount("FII").unwrap(),
            dec!(1000725.00)
        );
    }

    #[test]
    fn display_follows_configured_locale() {
        let conn = setup_conn();
        let s = seed(&conn);
        inflow(&conn, s.aapl, None, "2024-01-10", 10, "123.456", "1234.56");
        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let cfg = AppConfig {
            locale: Locale::EnUs,
            ..AppConfig::default()
        };
        let engine = MetricsEngine::new(&ledger, &cache, &cfg);
        assert_eq!(engine.category_invested("Stock").unwrap().total_invested, "1,234.56");
        assert_eq!(engine.category_invested_amount("Stock").unwrap(), dec!(1234.56));
    }

    #[test]
    fn unknown_category_fails_instead_of_zero() {
        let conn = setup_conn();
        seed(&conn);
        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let engine = MetricsEngine::new(&ledger, &cache, &AppConfig::default());
        let err = engine.category_invested("Crypto").unwrap_err();
        assert!(matches!(err, LedgerError::CategoryNotFound(ref t) if t == "Crypto"));
    }

    #[test]
    fn chart_maps_every_category_including_empty_ones() {
        let conn = setup_conn();
        let s = seed(&conn);
        category(&conn, "ETF");
        inflow(&conn, s.hglg, None, "2024-01-10", 2, "10.50", "21.00");
        inflow(&conn, s.aapl, None, "2024-01-10", 1, "200.00", "200.00");

        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let engine = MetricsEngine::new(&ledger, &cache, &AppConfig::default());
        let chart = engine.chart_category_invested().unwrap();
        assert_eq!(chart.len(), 3);
        assert_eq!(chart["FII"], dec!(21.00));
        assert_eq!(chart["Stock"], dec!(200.00));
        assert_eq!(chart["ETF"], Decimal::ZERO);
    }
}
