// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use super::{with_engine, with_journal};
use crate::ledger::LedgerStore;
use crate::utils::{maybe_print_json, opt_str, pretty_table};

#[derive(Serialize)]
struct CategoryRow {
    title: String,
    description: Option<String>,
    tickers: usize,
    invested: String,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let title = sub.get_one::<String>("title").unwrap();
            let description = sub.get_one::<String>("description").map(String::as_str);
            let category = with_journal(conn, |j| Ok(j.add_category(title, description)?))?;
            println!("Added category '{}'", category.title);
        }
        Some(("list", sub)) => {
            let data = with_engine(conn, |ledger, engine| {
                let mut rows = Vec::new();
                for c in ledger.categories()? {
                    let invested = engine.category_invested(&c.title)?;
                    rows.push(CategoryRow {
                        title: c.title,
                        description: c.description,
                        tickers: invested.ticker_count,
                        invested: invested.total_invested,
                    });
                }
                Ok(rows)
            })?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.title.clone(),
                            r.tickers.to_string(),
                            r.invested.clone(),
                            opt_str(r.description.as_deref()),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Category", "Tickers", "Invested", "Description"], rows)
                );
            }
        }
        Some(("rename", sub)) => {
            let from = sub.get_one::<String>("from").unwrap();
            let to = sub.get_one::<String>("to").unwrap();
            let category = with_journal(conn, |j| Ok(j.rename_category(from, to)?))?;
            println!("Renamed category '{}' to '{}'", from, category.title);
        }
        Some(("rm", sub)) => {
            let title = sub.get_one::<String>("title").unwrap();
            with_journal(conn, |j| Ok(j.remove_category(title)?))?;
            println!("Removed category '{}'", title);
        }
        _ => {}
    }
    Ok(())
}
