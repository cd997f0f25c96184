// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;

use super::with_journal;
use crate::ledger::SqliteLedger;
use crate::utils::{maybe_print_json, opt_str, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let account = sub.get_one::<String>("account").map(String::as_str);
            let country = sub.get_one::<String>("country").map(String::as_str);
            let currency = sub.get_one::<String>("currency").map(String::as_str);
            let description = sub.get_one::<String>("description").map(String::as_str);
            let broker = with_journal(conn, |j| {
                Ok(j.add_broker(name, account, country, currency, description)?)
            })?;
            println!("Added broker '{}'", broker.name);
        }
        Some(("list", sub)) => {
            let ledger = SqliteLedger::new(conn);
            let brokers = ledger.brokers()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &brokers)? {
                let codes: HashMap<i64, String> = ledger
                    .currencies()?
                    .into_iter()
                    .map(|c| (c.id, c.code))
                    .collect();
                let rows = brokers
                    .iter()
                    .map(|b| {
                        vec![
                            b.name.clone(),
                            opt_str(b.account_number.as_deref()),
                            opt_str(b.country.as_deref()),
                            opt_str(
                                b.currency_id
                                    .and_then(|id| codes.get(&id))
                                    .map(String::as_str),
                            ),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Broker", "Account", "Country", "CCY"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            with_journal(conn, |j| Ok(j.remove_broker(name)?))?;
            println!("Removed broker '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
