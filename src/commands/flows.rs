// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `inflow` and `outflow` subcommands. Both share argument names; only `add`
//! for inflows takes a `--kind`.

use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;

use super::with_journal;
use crate::ledger::FlowSide;
use crate::models::{FlowUpdate, InflowKind, NewInflow, NewOutflow};
use crate::utils::{parse_date, parse_decimal, parse_quantity};

pub fn handle(conn: &Connection, m: &clap::ArgMatches, side: FlowSide) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub, side)?,
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let update = parse_update(sub)?;
            let total = with_journal(conn, |j| {
                Ok(match side {
                    FlowSide::Inflow => j.edit_inflow(id, update)?.total_price,
                    FlowSide::Outflow => j.edit_outflow(id, update)?.total_price,
                })
            })?;
            println!("Updated {} #{} (total {})", label(side), id, total);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            with_journal(conn, |j| {
                match side {
                    FlowSide::Inflow => {
                        j.remove_inflow(id)?;
                    }
                    FlowSide::Outflow => {
                        j.remove_outflow(id)?;
                    }
                }
                Ok(())
            })?;
            println!("Removed {} #{}", label(side), id);
        }
        _ => {}
    }
    Ok(())
}

fn label(side: FlowSide) -> &'static str {
    match side {
        FlowSide::Inflow => "inflow",
        FlowSide::Outflow => "outflow",
    }
}

fn add(conn: &Connection, sub: &clap::ArgMatches, side: FlowSide) -> Result<()> {
    let ticker = sub.get_one::<String>("ticker").unwrap().to_string();
    let cost_price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
    let quantity = parse_quantity(sub.get_one::<String>("qty").unwrap())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let broker = sub.get_one::<String>("broker").cloned();
    let tax = sub
        .get_one::<String>("tax")
        .map(|s| parse_decimal(s))
        .transpose()?
        .unwrap_or(Decimal::ZERO);

    let (id, total) = match side {
        FlowSide::Inflow => {
            let kind = sub
                .get_one::<String>("kind")
                .map(|s| s.parse::<InflowKind>())
                .transpose()?
                .unwrap_or_default();
            let input = NewInflow {
                ticker,
                broker,
                cost_price,
                quantity,
                date,
                tax,
                kind,
            };
            let inflow = with_journal(conn, |j| Ok(j.record_inflow(input)?))?;
            (inflow.id, inflow.total_price)
        }
        FlowSide::Outflow => {
            let input = NewOutflow {
                ticker,
                broker,
                cost_price,
                quantity,
                date,
                tax,
            };
            let outflow = with_journal(conn, |j| Ok(j.record_outflow(input)?))?;
            (outflow.id, outflow.total_price)
        }
    };
    println!(
        "Recorded {} #{}: {} x {} = {} on {}",
        label(side),
        id,
        quantity,
        cost_price,
        total,
        date
    );
    Ok(())
}

fn parse_update(sub: &clap::ArgMatches) -> Result<FlowUpdate> {
    let text = |key: &str| sub.get_one::<String>(key).cloned();
    Ok(FlowUpdate {
        broker: text("broker"),
        cost_price: text("price").map(|s| parse_decimal(&s)).transpose()?,
        quantity: text("qty").map(|s| parse_quantity(&s)).transpose()?,
        date: text("date").map(|s| parse_date(&s)).transpose()?,
        tax: text("tax").map(|s| parse_decimal(&s)).transpose()?,
    })
}
