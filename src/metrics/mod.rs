// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Portfolio metrics computed over a [`LedgerStore`], memoized in a
//! [`MetricsCache`].
//!
//! The engine only reads. Callers that mutate the ledger must call
//! [`MetricsEngine::invalidate_metrics`] (or the category-aware variant)
//! afterwards; the journal does this for every write it performs.

mod allocation;
mod calendar;
mod category;
mod ticker;

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::cache::{CacheKey, MetricsCache};
use crate::config::AppConfig;
use crate::error::Result;
use crate::format::Locale;
use crate::ledger::LedgerStore;

pub use calendar::{MonthlySeries, WINDOW_MONTHS, month_key, rolling_window};
pub use category::CategoryInvested;
pub use ticker::TickerMetrics;

pub struct MetricsEngine<'a> {
    store: &'a dyn LedgerStore,
    cache: &'a dyn MetricsCache,
    locale: Locale,
    ttl: Duration,
    tracked_currencies: Vec<String>,
    today: NaiveDate,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(
        store: &'a dyn LedgerStore,
        cache: &'a dyn MetricsCache,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            cache,
            locale: config.locale,
            ttl: config.cache_ttl(),
            tracked_currencies: config.tracked_currencies.clone(),
            today: Local::now().date_naive(),
        }
    }

    /// Pins "today", which anchors the rolling window.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Every key a ledger mutation may have made stale, plus the per-category
    /// keys of `extra_titles` (titles that no longer exist after a rename or
    /// delete).
    pub fn invalidation_keys(&self, extra_titles: &[&str]) -> Result<Vec<CacheKey>> {
        let mut titles: BTreeSet<String> = self
            .store
            .categories()?
            .into_iter()
            .map(|c| c.title)
            .collect();
        titles.extend(extra_titles.iter().map(|t| t.to_string()));

        let mut currencies: BTreeSet<String> = self.tracked_currencies.iter().cloned().collect();
        currencies.extend(self.store.currency_codes()?);

        Ok(CacheKey::invalidation_set(
            titles.iter().map(String::as_str),
            currencies.iter().map(String::as_str),
        ))
    }

    pub fn invalidate_metrics(&self) -> Result<()> {
        self.invalidate_with_categories(&[])
    }

    pub fn invalidate_with_categories(&self, extra_titles: &[&str]) -> Result<()> {
        let keys = self.invalidation_keys(extra_titles)?;
        self.cache.delete_many(&keys)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::cache::MemoryMetricsCache;
    use crate::ledger::SqliteLedger;
    use crate::ledger::testing::*;

    #[test]
    fn invalidation_keys_union_store_and_tracked_currencies() {
        let conn = setup_conn();
        seed(&conn);
        currency(&conn, "JPY");
        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let engine = MetricsEngine::new(&ledger, &cache, &AppConfig::default());

        let keys = engine.invalidation_keys(&["Old"]).unwrap();
        for code in ["BRL", "USD", "EUR", "JPY"] {
            assert!(keys.contains(&CacheKey::AppliedValue(code.into())), "{code}");
        }
        for title in ["FII", "Stock", "Old"] {
            assert!(keys.contains(&CacheKey::CategoryInvested(title.into())));
            assert!(keys.contains(&CacheKey::DividendsCategory(title.into())));
        }
        assert!(keys.contains(&CacheKey::ChartCategoryInvested));
    }

    #[test]
    fn invalidation_makes_the_next_read_fresh() {
        let conn = setup_conn();
        let s = seed(&conn);
        inflow(&conn, s.hglg, Some(s.xp), "2024-01-10", 10, "100.00", "1000.00");
        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let engine = MetricsEngine::new(&ledger, &cache, &AppConfig::default())
            .with_today(d("2024-06-15"));

        let total = engine.total_invested().unwrap();
        let by_ccy = engine.applied_by_currency().unwrap();
        let by_broker = engine.applied_by_broker().unwrap();
        let chart = engine.chart_category_invested().unwrap();
        let fii = engine.category_invested("FII").unwrap();
        assert_eq!(total.to_string(), "1000.00");

        // Written behind the engine's back: cached values stay until invalidated.
        inflow(&conn, s.hglg, Some(s.xp), "2024-02-10", 5, "100.00", "500.00");
        dividend(&conn, s.hglg, "2024-05-02", "BRL", "12.00");
        assert_eq!(engine.total_invested().unwrap(), total);
        assert_eq!(engine.applied_by_currency().unwrap(), by_ccy);
        assert_eq!(engine.applied_by_broker().unwrap(), by_broker);
        assert_eq!(engine.chart_category_invested().unwrap(), chart);
        assert_eq!(engine.category_invested("FII").unwrap(), fii);

        engine.invalidate_metrics().unwrap();
        assert_eq!(engine.total_invested().unwrap().to_string(), "1500.00");
        assert_eq!(engine.applied_by_currency().unwrap()["BRL"].to_string(), "1500.00");
        assert_eq!(engine.applied_by_broker().unwrap()["XP"].to_string(), "1500.00");
        assert_eq!(engine.chart_category_invested().unwrap()["FII"].to_string(), "1500.00");
        assert_eq!(engine.category_invested("FII").unwrap().total_invested, "1.500,00");
        let divs = engine.dividends_by_category("FII").unwrap();
        assert_eq!(divs.iter().sum::<rust_decimal::Decimal>().to_string(), "12.00");
    }
}
