// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{cached_keys, cmd, run, seed, setup};
use quotaledger::cache::SqliteMetricsCache;
use quotaledger::config::AppConfig;
use quotaledger::ledger::SqliteLedger;
use quotaledger::metrics::MetricsEngine;
use rust_decimal_macros::dec;

#[test]
fn reports_fill_the_persistent_cache() {
    let conn = setup();
    seed(&conn);
    cmd(
        &conn,
        "inflow add --ticker HGLG11 --price 150 --qty 10 --date 2024-05-16 --broker XP",
    )
    .unwrap();

    cmd(&conn, "report total").unwrap();
    cmd(&conn, "report by-currency --json").unwrap();
    cmd(&conn, "report by-broker").unwrap();
    cmd(&conn, "report categories").unwrap();
    cmd(&conn, "report category --title FII").unwrap();
    cmd(&conn, "report monthly --currency BRL").unwrap();
    cmd(&conn, "report dividends-category --title FII").unwrap();
    cmd(&conn, "report dividends-currency --currency BRL").unwrap();
    cmd(&conn, "report window --jsonl").unwrap();

    let keys = cached_keys(&conn);
    for expected in [
        "total_invested",
        "total_applied_by_currency",
        "total_applied_by_broker",
        "chart_category_invested",
        "category_invested_FII",
        "applied_value_BRL",
        "dividends_category_FII",
    ] {
        assert!(keys.iter().any(|k| k == expected), "missing {expected} in {keys:?}");
    }
}

#[test]
fn recording_a_flow_drops_cached_metrics() {
    let conn = setup();
    seed(&conn);
    cmd(&conn, "inflow add --ticker HGLG11 --price 150 --qty 10 --date 2024-05-16").unwrap();
    cmd(&conn, "report total").unwrap();
    cmd(&conn, "report category --title FII").unwrap();
    cmd(&conn, "report monthly --currency BRL").unwrap();
    assert!(!cached_keys(&conn).is_empty());

    cmd(&conn, "inflow add --ticker AAPL --price 20 --qty 10 --date 2024-05-20").unwrap();
    assert!(cached_keys(&conn).is_empty());

    let ledger = SqliteLedger::new(&conn);
    let cache = SqliteMetricsCache::new(&conn);
    let cfg = AppConfig::load(&conn).unwrap();
    let engine = MetricsEngine::new(&ledger, &cache, &cfg);
    assert_eq!(engine.total_invested().unwrap(), dec!(1700.00));
    let by_currency = engine.applied_by_currency().unwrap();
    assert_eq!(by_currency["BRL"], dec!(1500.00));
    assert_eq!(by_currency["USD"], dec!(200.00));
}

#[test]
fn renaming_a_category_drops_the_old_title() {
    let conn = setup();
    seed(&conn);
    cmd(&conn, "inflow add --ticker HGLG11 --price 150 --qty 10 --date 2024-05-16").unwrap();
    cmd(&conn, "report category --title FII").unwrap();
    cmd(&conn, "report dividends-category --title FII").unwrap();

    cmd(&conn, "category rename --from FII --to REIT").unwrap();
    let keys = cached_keys(&conn);
    assert!(!keys.iter().any(|k| k.ends_with("_FII")), "{keys:?}");
    assert!(cmd(&conn, "report category --title FII").is_err());
    cmd(&conn, "report category --title REIT").unwrap();
}

#[test]
fn locale_change_and_clear_cache_empty_the_store() {
    let conn = setup();
    seed(&conn);
    cmd(&conn, "report total").unwrap();
    assert!(!cached_keys(&conn).is_empty());
    cmd(&conn, "config set --key locale --value en-US").unwrap();
    assert!(cached_keys(&conn).is_empty());

    cmd(&conn, "report by-broker").unwrap();
    cmd(&conn, "config clear-cache").unwrap();
    assert!(cached_keys(&conn).is_empty());
}

#[test]
fn config_set_validates_and_normalizes() {
    let conn = setup();
    run(
        &conn,
        &["config", "set", "--key", "tracked_currencies", "--value", "brl, usd"],
    )
    .unwrap();
    cmd(&conn, "config set --key cache_ttl_secs --value 60").unwrap();
    assert!(cmd(&conn, "config set --key cache_ttl_secs --value 0").is_err());
    assert!(cmd(&conn, "config set --key locale --value fr-FR").is_err());
    assert!(cmd(&conn, "config set --key colour --value blue").is_err());

    let cfg = AppConfig::load(&conn).unwrap();
    assert_eq!(cfg.tracked_currencies, vec!["BRL".to_string(), "USD".to_string()]);
    assert_eq!(cfg.cache_ttl_secs, 60);
    assert_eq!(cfg.locale.code(), "pt-BR");
    cmd(&conn, "config show --json").unwrap();
}
