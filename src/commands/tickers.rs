// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use super::{with_engine, with_journal};
use crate::ledger::{LedgerStore, SqliteLedger};
use crate::utils::{fmt_money, maybe_print_json, opt_str, parse_date, pretty_table};
use crate::validators;

#[derive(Serialize)]
struct TickerRow {
    name: String,
    category: String,
    currency: String,
    quantity: i64,
    sector: Option<String>,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let category = sub.get_one::<String>("category").unwrap();
            let currency = sub.get_one::<String>("currency").unwrap();
            let sector = sub.get_one::<String>("sector").map(String::as_str);
            let description = sub.get_one::<String>("description").map(String::as_str);
            let ticker = with_journal(conn, |j| {
                Ok(j.add_ticker(name, category, currency, sector, description)?)
            })?;
            println!("Added ticker {}", ticker.name);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let ticker = with_journal(conn, |j| Ok(j.remove_ticker(name)?))?;
            println!("Removed ticker {}", ticker.name);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger = SqliteLedger::new(conn);
    let category = sub
        .get_one::<String>("category")
        .map(|c| validators::category_title(c))
        .transpose()?;
    let titles: HashMap<i64, String> = ledger
        .categories()?
        .into_iter()
        .map(|c| (c.id, c.title))
        .collect();
    let codes: HashMap<i64, String> = ledger
        .currencies()?
        .into_iter()
        .map(|c| (c.id, c.code))
        .collect();
    let data: Vec<TickerRow> = ledger
        .tickers(category.as_deref())?
        .into_iter()
        .map(|t| TickerRow {
            category: titles.get(&t.category_id).cloned().unwrap_or_default(),
            currency: codes.get(&t.currency_id).cloned().unwrap_or_default(),
            name: t.name,
            quantity: t.quantity,
            sector: t.sector,
        })
        .collect();

    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    t.category.clone(),
                    t.currency.clone(),
                    t.quantity.to_string(),
                    opt_str(t.sector.as_deref()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Ticker", "Category", "CCY", "Qty", "Sector"], rows)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = validators::ticker_name(sub.get_one::<String>("name").unwrap())?;
    let cutoff = sub
        .get_one::<String>("as-of")
        .map(|s| parse_date(s))
        .transpose()?;
    with_engine(conn, |ledger, engine| {
        let metrics = engine.ticker_metrics(&name, cutoff)?;
        if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &metrics)? {
            return Ok(());
        }
        let ticker = ledger.ticker_by_name(&name)?;
        let ccy = ledger.currency_by_id(ticker.currency_id)?.code;
        let locale = engine.locale();
        let rows = vec![
            vec!["Quantity".into(), metrics.total_quantity.to_string()],
            vec![
                "Net cost".into(),
                fmt_money(locale, metrics.total_price, &ccy),
            ],
            vec![
                "Average price".into(),
                fmt_money(locale, metrics.average_price, &ccy),
            ],
            vec!["Stored quantity".into(), ticker.quantity.to_string()],
        ];
        println!("{}", pretty_table(&[name.as_str(), ""], rows));
        Ok(())
    })
}
