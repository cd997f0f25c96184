// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{cached_keys, cmd, seed, setup};
use quotaledger::ledger::{LedgerStore, SqliteLedger};

#[test]
fn doctor_reports_then_fixes_quantity_drift() {
    let conn = setup();
    seed(&conn);
    cmd(&conn, "inflow add --ticker HGLG11 --price 10 --qty 8 --date 2024-01-02").unwrap();
    cmd(&conn, "outflow add --ticker HGLG11 --price 11 --qty 3 --date 2024-02-02").unwrap();
    conn.execute("UPDATE tickers SET quantity = 42 WHERE name = 'HGLG11'", [])
        .unwrap();

    cmd(&conn, "doctor").unwrap();
    let ledger = SqliteLedger::new(&conn);
    assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, 42);

    cmd(&conn, "doctor --fix").unwrap();
    assert_eq!(ledger.ticker_by_name("HGLG11").unwrap().quantity, 5);
    assert_eq!(ledger.ticker_by_name("AAPL").unwrap().quantity, 0);
}

#[test]
fn doctor_purges_expired_cached_metrics() {
    let conn = setup();
    seed(&conn);
    cmd(&conn, "report total").unwrap();
    conn.execute(
        "INSERT INTO metric_cache(key, payload, expires_at) VALUES ('stale', '0', 0)",
        [],
    )
    .unwrap();

    cmd(&conn, "doctor").unwrap();
    assert_eq!(cached_keys(&conn), vec!["total_invested".to_string()]);
}
