// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;

use crate::ledger::SqliteLedger;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("tx", sub)) => export_negotiations(conn, sub),
        _ => Ok(()),
    }
}

fn export_negotiations(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let mut rows = SqliteLedger::new(conn).negotiations(None)?;
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "side", "ticker", "broker", "quantity", "cost_price", "total_price", "tax",
            ])?;
            for n in rows {
                wtr.write_record([
                    n.date.to_string(),
                    n.side,
                    n.ticker,
                    n.broker.unwrap_or_default(),
                    n.quantity.to_string(),
                    n.cost_price.to_string(),
                    n.total_price.to_string(),
                    n.tax.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
    }
    println!("Exported negotiations to {}", out);
    Ok(())
}
