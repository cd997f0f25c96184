// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use super::with_engine;
use crate::format::Locale;
use crate::metrics::MonthlySeries;
use crate::utils::{maybe_print_json, pretty_table};
use crate::validators;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let json = sub.get_flag("json");
    let jsonl = sub.get_flag("jsonl");

    with_engine(conn, |_, engine| {
        let locale = engine.locale();
        match name {
            "total" => {
                let total = engine.total_invested()?;
                let payload = serde_json::json!({ "total_invested": total });
                if !maybe_print_json(json, jsonl, &payload)? {
                    println!("Total invested: {}", locale.format_grouped(total));
                }
            }
            "by-currency" => {
                let groups = engine.applied_by_currency()?;
                print_groups(locale, json, jsonl, "Currency", &groups)?;
            }
            "by-broker" => {
                let groups = engine.applied_by_broker()?;
                print_groups(locale, json, jsonl, "Broker", &groups)?;
            }
            "categories" => {
                let chart = engine.chart_category_invested()?;
                print_groups(locale, json, jsonl, "Category", &chart)?;
            }
            "category" => {
                let title = validators::category_title(sub.get_one::<String>("title").unwrap())?;
                let invested = engine.category_invested(&title)?;
                if !maybe_print_json(json, jsonl, &invested)? {
                    let rows = vec![vec![
                        title,
                        invested.ticker_count.to_string(),
                        invested.total_invested,
                    ]];
                    println!("{}", pretty_table(&["Category", "Tickers", "Invested"], rows));
                }
            }
            "monthly" => {
                let code = validators::currency_code(sub.get_one::<String>("currency").unwrap())?;
                let series = engine.applied_value_series(&code)?;
                print_series(locale, json, jsonl, &series)?;
            }
            "window" => {
                let labels = engine.window_labels();
                if !maybe_print_json(json, jsonl, &labels)? {
                    let rows = engine
                        .window_months()
                        .iter()
                        .zip(labels)
                        .map(|(start, label)| vec![label, start.to_string()])
                        .collect();
                    println!("{}", pretty_table(&["Month", "Starts"], rows));
                }
            }
            "dividends-category" => {
                let title = validators::category_title(sub.get_one::<String>("title").unwrap())?;
                let series = MonthlySeries {
                    labels: engine.window_labels(),
                    values: engine.dividends_by_category(&title)?,
                };
                print_series(locale, json, jsonl, &series)?;
            }
            "dividends-currency" => {
                let code = validators::currency_code(sub.get_one::<String>("currency").unwrap())?;
                let grid = engine.dividends_by_currency(&code)?;
                if !maybe_print_json(json, jsonl, &grid)? {
                    let mut headers = vec!["Year"];
                    headers.extend((1..=12).map(|m| locale.month_abbr(m)));
                    let rows = grid
                        .iter()
                        .map(|(year, months)| {
                            let mut row = vec![year.to_string()];
                            row.extend(months.values().map(|v| locale.format_grouped(*v)));
                            row
                        })
                        .collect();
                    println!("{}", pretty_table(&headers, rows));
                }
            }
            _ => {}
        }
        Ok(())
    })
}

fn print_groups(
    locale: Locale,
    json: bool,
    jsonl: bool,
    header: &str,
    groups: &BTreeMap<String, Decimal>,
) -> Result<()> {
    if maybe_print_json(json, jsonl, groups)? {
        return Ok(());
    }
    let rows = groups
        .iter()
        .map(|(k, v)| vec![k.clone(), locale.format_grouped(*v)])
        .collect();
    println!("{}", pretty_table(&[header, "Amount"], rows));
    Ok(())
}

fn print_series(locale: Locale, json: bool, jsonl: bool, series: &MonthlySeries) -> Result<()> {
    if maybe_print_json(json, jsonl, series)? {
        return Ok(());
    }
    let rows = series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, value)| vec![label.clone(), locale.format_grouped(*value)])
        .collect();
    println!("{}", pretty_table(&["Month", "Amount"], rows));
    Ok(())
}
