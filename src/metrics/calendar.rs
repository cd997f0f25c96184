// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar-bucketed series: sparse monthly inflows, the dense rolling window
//! and per-year dividend grids.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MetricsEngine;
use crate::cache::{CacheKey, get_or_compute};
use crate::error::Result;
use crate::format::round_money;
use crate::ledger::add_amount;

/// Months in the rolling window, current month included.
pub const WINDOW_MONTHS: usize = 7;

/// Parallel labels and values; `labels[i]` names the month of `values[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// First day of each of the [`WINDOW_MONTHS`] months ending with `today`'s
/// month, oldest first.
pub fn rolling_window(today: NaiveDate) -> Vec<NaiveDate> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..WINDOW_MONTHS as i32)
        .rev()
        .filter_map(|back| {
            let idx = current - back;
            NaiveDate::from_ymd_opt(idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1, 1)
        })
        .collect()
}

/// Bucket key with a zero-padded month, e.g. `03-2024`.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:02}-{}", month, year)
}

impl MetricsEngine<'_> {
    /// Inflow totals per month for tickers in `currency_code`. Months without
    /// inflows are absent.
    pub fn applied_value_series(&self, currency_code: &str) -> Result<MonthlySeries> {
        get_or_compute(
            self.cache,
            CacheKey::AppliedValue(currency_code.to_string()),
            self.ttl,
            || {
                let mut series = MonthlySeries::default();
                for bucket in self.store.inflow_totals_by_month(currency_code)? {
                    series
                        .labels
                        .push(self.locale.month_label(bucket.year, bucket.month));
                    series.values.push(round_money(bucket.total));
                }
                Ok(series)
            },
        )
    }

    pub fn window_months(&self) -> Vec<NaiveDate> {
        rolling_window(self.today)
    }

    /// "Mon YYYY" labels of the rolling window.
    pub fn window_labels(&self) -> Vec<String> {
        self.window_months()
            .into_iter()
            .map(|m| self.locale.date_label(m))
            .collect()
    }

    /// Dividend totals for the category in each window month, zero-filled.
    pub fn dividends_by_category(&self, title: &str) -> Result<Vec<Decimal>> {
        let category = self.store.category_by_title(title)?;
        get_or_compute(
            self.cache,
            CacheKey::DividendsCategory(category.title.clone()),
            self.ttl,
            || {
                let window = self.window_months();
                let Some(&start) = window.first() else {
                    return Ok(Vec::new());
                };
                let mut buckets: BTreeMap<String, Decimal> = window
                    .iter()
                    .map(|m| (month_key(m.year(), m.month()), Decimal::ZERO))
                    .collect();
                for row in self
                    .store
                    .dividend_totals_by_month_in_category(category.id, start, self.today)?
                {
                    if let Some(slot) = buckets.get_mut(&month_key(row.year, row.month)) {
                        *slot = add_amount(*slot, row.total)?;
                    }
                }
                Ok(window
                    .iter()
                    .map(|m| {
                        let total = buckets
                            .get(&month_key(m.year(), m.month()))
                            .copied()
                            .unwrap_or_default();
                        round_money(total)
                    })
                    .collect())
            },
        )
    }

    /// Year → month (1..=12) → dividends settled in `currency` over the whole
    /// history. Every listed year carries all twelve months.
    pub fn dividends_by_currency(
        &self,
        currency: &str,
    ) -> Result<BTreeMap<i32, BTreeMap<u32, Decimal>>> {
        let mut grid: BTreeMap<i32, BTreeMap<u32, Decimal>> = BTreeMap::new();
        for row in self.store.dividend_totals_by_month_in_currency(currency)? {
            let year = grid
                .entry(row.year)
                .or_insert_with(|| (1..=12).map(|m| (m, round_money(Decimal::ZERO))).collect());
            year.insert(row.month, round_money(row.total));
        }
        Ok(grid)
    }
}
