// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use quotaledger::ledger::FlowSide;
use quotaledger::{cli, commands, db};
use rusqlite::Connection;

pub fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

/// Parses `args` with the real CLI and dispatches like the binary does.
pub fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let argv = std::iter::once("quotaledger").chain(args.iter().copied());
    let matches = cli::build_cli().try_get_matches_from(argv)?;
    match matches.subcommand() {
        Some(("currency", sub)) => commands::currencies::handle(conn, sub),
        Some(("broker", sub)) => commands::brokers::handle(conn, sub),
        Some(("category", sub)) => commands::categories::handle(conn, sub),
        Some(("ticker", sub)) => commands::tickers::handle(conn, sub),
        Some(("inflow", sub)) => commands::flows::handle(conn, sub, FlowSide::Inflow),
        Some(("outflow", sub)) => commands::flows::handle(conn, sub, FlowSide::Outflow),
        Some(("dividend", sub)) => commands::dividends::handle(conn, sub),
        Some(("tx", sub)) => commands::transactions::handle(conn, sub),
        Some(("report", sub)) => commands::reports::handle(conn, sub),
        Some(("export", sub)) => commands::exporter::handle(conn, sub),
        Some(("doctor", sub)) => commands::doctor::handle(conn, sub),
        Some(("config", sub)) => commands::settings::handle(conn, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

/// Whitespace-separated form of [`run`].
pub fn cmd(conn: &Connection, line: &str) -> anyhow::Result<()> {
    let args: Vec<&str> = line.split_whitespace().collect();
    run(conn, &args)
}

/// Matches of the innermost subcommand in `line`, for handlers that expose
/// their rows directly.
pub fn leaf_matches(line: &str) -> clap::ArgMatches {
    let argv = std::iter::once("quotaledger").chain(line.split_whitespace());
    let mut matches = cli::build_cli().get_matches_from(argv);
    while let Some(next) = matches.subcommand().map(|(_, sub)| sub.clone()) {
        matches = next;
    }
    matches
}

/// BRL and USD, categories FII and Stock, broker XP, tickers HGLG11 and AAPL.
pub fn seed(conn: &Connection) {
    for line in [
        "currency add --code BRL --name Real",
        "currency add --code usd --name Dollar --rate 5.1234",
        "category add --title FII",
        "category add --title Stock",
        "broker add --name XP --currency BRL",
        "ticker add --name hglg11 --category FII --currency BRL",
        "ticker add --name AAPL --category Stock --currency USD",
    ] {
        cmd(conn, line).unwrap();
    }
}

pub fn cached_keys(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT key FROM metric_cache ORDER BY key")
        .unwrap();
    stmt.query_map([], |r| r.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}
