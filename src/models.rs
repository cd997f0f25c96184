// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub exchange_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    pub id: i64,
    pub name: String,
    pub account_number: Option<String>,
    pub country: Option<String>,
    pub currency_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub currency_id: i64,
    /// Running position size, kept in step with inflow/outflow creation.
    pub quantity: i64,
    pub sector: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflowKind {
    #[default]
    Purchase,
    Subscription,
}

impl InflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InflowKind::Purchase => "purchase",
            InflowKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for InflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InflowKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchase" | "buy" => Ok(InflowKind::Purchase),
            "subscription" => Ok(InflowKind::Subscription),
            other => Err(LedgerError::Validation(format!(
                "Unknown inflow kind '{}' (use purchase|subscription)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeType {
    #[default]
    Dividend,
    EquityInterest,
    Amortization,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeType::Dividend => "dividend",
            IncomeType::EquityInterest => "equity-interest",
            IncomeType::Amortization => "amortization",
        }
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dividend" | "d" => Ok(IncomeType::Dividend),
            "equity-interest" | "j" => Ok(IncomeType::EquityInterest),
            "amortization" | "a" => Ok(IncomeType::Amortization),
            other => Err(LedgerError::Validation(format!(
                "Unknown income type '{}' (use dividend|equity-interest|amortization)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inflow {
    pub id: i64,
    pub ticker_id: i64,
    pub broker_id: Option<i64>,
    pub cost_price: Decimal,
    pub quantity: i64,
    pub total_price: Decimal,
    pub date: NaiveDate,
    pub tax: Decimal,
    pub kind: InflowKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outflow {
    pub id: i64,
    pub ticker_id: i64,
    pub broker_id: Option<i64>,
    pub cost_price: Decimal,
    pub quantity: i64,
    pub total_price: Decimal,
    pub date: NaiveDate,
    pub tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub id: i64,
    pub ticker_id: i64,
    pub value: Decimal,
    pub date: NaiveDate,
    pub currency: String,
    pub quantity_quote: i64,
    pub total_value: Decimal,
    pub income_type: IncomeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredDividend {
    pub id: i64,
    pub ticker_id: i64,
    pub value_per_share: Decimal,
    pub payment_date: NaiveDate,
}

/// Input for recording a purchase or subscription.
#[derive(Debug, Clone)]
pub struct NewInflow {
    pub ticker: String,
    pub broker: Option<String>,
    pub cost_price: Decimal,
    pub quantity: i64,
    pub date: NaiveDate,
    pub tax: Decimal,
    pub kind: InflowKind,
}

/// Input for recording a sale.
#[derive(Debug, Clone)]
pub struct NewOutflow {
    pub ticker: String,
    pub broker: Option<String>,
    pub cost_price: Decimal,
    pub quantity: i64,
    pub date: NaiveDate,
    pub tax: Decimal,
}

/// Partial update shared by inflows and outflows. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct FlowUpdate {
    pub broker: Option<String>,
    pub cost_price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub date: Option<NaiveDate>,
    pub tax: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewDividend {
    pub ticker: String,
    pub value: Decimal,
    pub date: NaiveDate,
    pub currency: String,
    /// `None` (or zero) derives the quota count from inflow history.
    pub quantity_quote: Option<i64>,
    pub income_type: IncomeType,
}

#[derive(Debug, Clone, Default)]
pub struct DividendUpdate {
    pub value: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub quantity_quote: Option<i64>,
    pub income_type: Option<IncomeType>,
}

/// One row of the merged buy/sell history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Negotiation {
    pub id: i64,
    pub date: NaiveDate,
    pub ticker: String,
    pub broker: Option<String>,
    pub side: String,
    pub quantity: i64,
    pub cost_price: Decimal,
    pub total_price: Decimal,
    pub tax: Decimal,
}
