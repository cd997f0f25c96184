// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::with_journal;
use crate::ledger::SqliteLedger;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let code = sub.get_one::<String>("code").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let rate = sub
                .get_one::<String>("rate")
                .map(|s| parse_decimal(s))
                .transpose()?;
            let currency = with_journal(conn, |j| Ok(j.add_currency(code, name, rate)?))?;
            println!("Added currency {} ({})", currency.code, currency.name);
        }
        Some(("list", sub)) => {
            let currencies = SqliteLedger::new(conn).currencies()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &currencies)? {
                let rows = currencies
                    .iter()
                    .map(|c| {
                        vec![
                            c.code.clone(),
                            c.name.clone(),
                            c.exchange_rate
                                .map(|r| r.to_string())
                                .unwrap_or_else(|| "n/a".into()),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Code", "Name", "Rate"], rows));
            }
        }
        Some(("rm", sub)) => {
            let code = sub.get_one::<String>("code").unwrap();
            with_journal(conn, |j| Ok(j.remove_currency(code)?))?;
            println!("Removed currency {}", code.to_uppercase());
        }
        _ => {}
    }
    Ok(())
}
