// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{cmd, run, seed, setup};
use tempfile::tempdir;

fn seeded_with_trades() -> rusqlite::Connection {
    let conn = setup();
    seed(&conn);
    cmd(
        &conn,
        "inflow add --ticker HGLG11 --price 150.00 --qty 10 --date 2024-05-16 --broker XP",
    )
    .unwrap();
    cmd(&conn, "outflow add --ticker HGLG11 --price 155.00 --qty 5 --date 2024-06-05").unwrap();
    conn
}

#[test]
fn export_negotiations_to_json_oldest_first() {
    let conn = seeded_with_trades();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.json");
    run(&conn, &["export", "tx", "--format", "json", "--out", out.to_str().unwrap()]).unwrap();

    let body = std::fs::read_to_string(&out).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&body).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["side"], "buy");
    assert_eq!(rows[0]["broker"], "XP");
    assert_eq!(rows[0]["total_price"], "1500.00");
    assert_eq!(rows[1]["side"], "sell");
    assert!(rows[1]["broker"].is_null());
}

#[test]
fn export_negotiations_to_csv() {
    let conn = seeded_with_trades();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    run(&conn, &["export", "tx", "--format", "CSV", "--out", out.to_str().unwrap()]).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "date");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][0], "2024-05-16");
    assert_eq!(&records[0][2], "HGLG11");
    assert_eq!(&records[1][1], "sell");
    assert_eq!(&records[1][3], "");
}

#[test]
fn unknown_format_errors_without_writing() {
    let conn = seeded_with_trades();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.xml");
    let err = run(&conn, &["export", "tx", "--format", "xml", "--out", out.to_str().unwrap()])
        .unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out.exists());
}
