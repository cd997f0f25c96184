// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use super::with_journal;
use crate::ledger::{DividendFilter, SqliteLedger};
use crate::models::{DividendUpdate, IncomeType, NewDividend};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_quantity, pretty_table};
use crate::validators;

#[derive(Serialize)]
pub struct DividendRow {
    pub id: i64,
    pub ticker: String,
    pub date: String,
    pub income_type: String,
    pub value: String,
    pub quotas: i64,
    pub total: String,
    pub currency: String,
}

#[derive(Serialize)]
struct DeclaredRow {
    id: i64,
    ticker: String,
    value_per_share: String,
    payment_date: String,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let update = DividendUpdate {
                value: sub
                    .get_one::<String>("value")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                date: sub
                    .get_one::<String>("date")
                    .map(|s| parse_date(s))
                    .transpose()?,
                quantity_quote: sub
                    .get_one::<String>("quotas")
                    .map(|s| parse_quantity(s))
                    .transpose()?,
                income_type: sub
                    .get_one::<String>("type")
                    .map(|s| s.parse::<IncomeType>())
                    .transpose()?,
            };
            let div = with_journal(conn, |j| Ok(j.edit_dividend(id, update)?))?;
            println!(
                "Updated dividend #{}: {} x {} = {}",
                div.id, div.quantity_quote, div.value, div.total_value
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            with_journal(conn, |j| Ok(j.remove_dividend(id)?))?;
            println!("Removed dividend #{}", id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("declare", sub)) => {
            let ticker = sub.get_one::<String>("ticker").unwrap();
            let value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
            let payment_date = parse_date(sub.get_one::<String>("payment-date").unwrap())?;
            let declared =
                with_journal(conn, |j| Ok(j.declare_dividend(ticker, value, payment_date)?))?;
            println!(
                "Declared {} per share for {} on {}",
                declared.value_per_share,
                ticker.to_uppercase(),
                declared.payment_date
            );
        }
        Some(("declared", sub)) => {
            let data: Vec<DeclaredRow> = SqliteLedger::new(conn)
                .declared_dividends()?
                .into_iter()
                .map(|(ticker, d)| DeclaredRow {
                    id: d.id,
                    ticker,
                    value_per_share: d.value_per_share.to_string(),
                    payment_date: d.payment_date.to_string(),
                })
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|d| {
                        vec![
                            d.id.to_string(),
                            d.ticker.clone(),
                            d.value_per_share.clone(),
                            d.payment_date.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Ticker", "Per share", "Payment date"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = NewDividend {
        ticker: sub.get_one::<String>("ticker").unwrap().to_string(),
        value: parse_decimal(sub.get_one::<String>("value").unwrap())?,
        date: parse_date(sub.get_one::<String>("date").unwrap())?,
        currency: sub.get_one::<String>("currency").unwrap().to_string(),
        quantity_quote: sub
            .get_one::<String>("quotas")
            .map(|s| parse_quantity(s))
            .transpose()?,
        income_type: sub.get_one::<String>("type").unwrap().parse()?,
    };
    let div = with_journal(conn, |j| Ok(j.record_dividend(input)?))?;
    println!(
        "Recorded dividend #{}: {} x {} = {} {}",
        div.id, div.quantity_quote, div.value, div.total_value, div.currency
    );
    Ok(())
}

/// Dividends matching the list filters, newest first.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<DividendRow>> {
    let filter = DividendFilter {
        ticker: sub
            .get_one::<String>("ticker")
            .map(|s| validators::ticker_name(s))
            .transpose()?,
        year: sub
            .get_one::<String>("year")
            .map(|s| validators::year(s))
            .transpose()?,
        month: sub
            .get_one::<String>("month")
            .map(|s| validators::month(s))
            .transpose()?,
        currency: sub
            .get_one::<String>("currency")
            .map(|s| validators::currency_code(s))
            .transpose()?,
    };
    let rows = SqliteLedger::new(conn)
        .dividends(&filter)?
        .into_iter()
        .map(|(ticker, d)| DividendRow {
            id: d.id,
            ticker,
            date: d.date.to_string(),
            income_type: d.income_type.to_string(),
            value: d.value.to_string(),
            quotas: d.quantity_quote,
            total: d.total_value.to_string(),
            currency: d.currency,
        })
        .collect();
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.id.to_string(),
                    d.date.clone(),
                    d.ticker.clone(),
                    d.income_type.clone(),
                    d.value.clone(),
                    d.quotas.to_string(),
                    d.total.clone(),
                    d.currency.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Ticker", "Type", "Value", "Quotas", "Total", "CCY"],
                rows
            )
        );
        let years = SqliteLedger::new(conn).dividend_years()?;
        if !years.is_empty() {
            let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
            println!("Years with dividends: {}", years.join(", "));
        }
    }
    Ok(())
}
