// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::MetricsEngine;
use crate::cache::{CacheKey, get_or_compute};
use crate::error::Result;
use crate::format::round_money;

impl MetricsEngine<'_> {
    /// Capital deployed: every inflow's total price, with no outflow netting.
    pub fn total_invested(&self) -> Result<Decimal> {
        get_or_compute(self.cache, CacheKey::TotalInvested, self.ttl, || {
            Ok(round_money(self.store.inflow_grand_total()?))
        })
    }

    /// Inflow totals keyed by the ticker's currency code.
    pub fn applied_by_currency(&self) -> Result<BTreeMap<String, Decimal>> {
        get_or_compute(self.cache, CacheKey::AppliedByCurrency, self.ttl, || {
            Ok(rounded(self.store.inflow_totals_by_currency()?))
        })
    }

    /// Inflow totals keyed by broker name. Inflows without a broker are left out.
    pub fn applied_by_broker(&self) -> Result<BTreeMap<String, Decimal>> {
        get_or_compute(self.cache, CacheKey::AppliedByBroker, self.ttl, || {
            Ok(rounded(self.store.inflow_totals_by_broker()?))
        })
    }
}

fn rounded(groups: BTreeMap<String, Decimal>) -> BTreeMap<String, Decimal> {
    groups
        .into_iter()
        .map(|(k, v)| (k, round_money(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::cache::MemoryMetricsCache;
    use crate::config::AppConfig;
    use crate::ledger::SqliteLedger;
    use crate::ledger::testing::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_inflows_by_currency_and_broker() {
        let conn = setup_conn();
        let s = seed(&conn);
        let petr = ticker(&conn, "PETR4", s.stock, s.brl);
        let clear = broker(&conn, "Clear");
        inflow(&conn, s.hglg, Some(s.xp), "2024-01-10", 10, "100.00", "1000.00");
        inflow(&conn, petr, Some(clear), "2024-01-11", 5, "100.00", "500.00");
        inflow(&conn, s.aapl, None, "2024-01-12", 1, "200.00", "200.00");
        outflow(&conn, s.hglg, "2024-02-01", 1, "120.00", "120.00");

        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let engine = MetricsEngine::new(&ledger, &cache, &AppConfig::default());

        let by_ccy = engine.applied_by_currency().unwrap();
        assert_eq!(
            by_ccy,
            BTreeMap::from([
                ("BRL".to_string(), dec!(1500.00)),
                ("USD".to_string(), dec!(200.00)),
            ])
        );

        let by_broker = engine.applied_by_broker().unwrap();
        assert_eq!(
            by_broker,
            BTreeMap::from([
                ("Clear".to_string(), dec!(500.00)),
                ("XP".to_string(), dec!(1000.00)),
            ])
        );

        // Outflows never reduce capital deployed.
        assert_eq!(engine.total_invested().unwrap(), dec!(1700.00));
        assert_eq!(engine.ticker_metrics("HGLG11", None).unwrap().total_price, dec!(880.00));
    }

    #[test]
    fn empty_ledger_yields_zero_and_empty_maps() {
        let conn = setup_conn();
        let ledger = SqliteLedger::new(&conn);
        let cache = MemoryMetricsCache::new();
        let engine = MetricsEngine::new(&ledger, &cache, &AppConfig::default());
        assert_eq!(engine.total_invested().unwrap().to_string(), "0.00");
        assert!(engine.applied_by_currency().unwrap().is_empty());
        assert!(engine.applied_by_broker().unwrap().is_empty());
    }
}
