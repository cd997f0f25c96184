// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::ledger::SqliteLedger;
use crate::models::Negotiation;
use crate::utils::{maybe_print_json, opt_str, pretty_table};
use crate::validators;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|n| {
                vec![
                    n.date.to_string(),
                    n.side.clone(),
                    n.ticker.clone(),
                    opt_str(n.broker.as_deref()),
                    n.quantity.to_string(),
                    n.cost_price.to_string(),
                    n.total_price.to_string(),
                    n.tax.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Side", "Ticker", "Broker", "Qty", "Price", "Total", "Tax"],
                rows,
            )
        );
    }
    Ok(())
}

/// Merged inflow/outflow history, newest first, honoring `--ticker` and `--limit`.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Negotiation>> {
    let ticker = sub
        .get_one::<String>("ticker")
        .map(|t| validators::ticker_name(t))
        .transpose()?;
    let mut data = SqliteLedger::new(conn).negotiations(ticker.as_deref())?;
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}
