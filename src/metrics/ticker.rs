// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MetricsEngine;
use crate::error::Result;
use crate::format::round_money;
use crate::ledger::{FlowSide, add_amount};

/// Net position of one ticker. `total_price` is cost basis net of outflow
/// proceeds, not realized P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetrics {
    pub total_quantity: i64,
    pub total_price: Decimal,
    pub average_price: Decimal,
}

impl MetricsEngine<'_> {
    /// Metrics for the named ticker over flows dated on or before `cutoff`
    /// (whole history when `None`).
    pub fn ticker_metrics(&self, name: &str, cutoff: Option<NaiveDate>) -> Result<TickerMetrics> {
        let ticker = self.store.ticker_by_name(name)?;
        let (quantity, price) = self.net_position(ticker.id, cutoff)?;
        let average = if quantity == 0 {
            Decimal::ZERO
        } else {
            price / Decimal::from(quantity)
        };
        Ok(TickerMetrics {
            total_quantity: quantity,
            total_price: round_money(price),
            average_price: round_money(average),
        })
    }

    /// Unrounded (quantity, cost basis) for a ticker id.
    pub(super) fn net_position(
        &self,
        ticker_id: i64,
        cutoff: Option<NaiveDate>,
    ) -> Result<(i64, Decimal)> {
        let bought = self.store.flow_totals(ticker_id, FlowSide::Inflow, cutoff)?;
        let sold = self.store.flow_totals(ticker_id, FlowSide::Outflow, cutoff)?;
        let price = add_amount(bought.total_price, -sold.total_price)?;
        Ok((bought.quantity - sold.quantity, price))
    }
}
