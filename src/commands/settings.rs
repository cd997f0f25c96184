// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::cache::SqliteMetricsCache;
use crate::config::{AppConfig, KEY_CACHE_TTL, KEY_LOCALE, KEY_TRACKED_CURRENCIES};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let cfg = AppConfig::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cfg)? {
                let rows = vec![
                    vec![KEY_LOCALE.to_string(), cfg.locale.to_string()],
                    vec![KEY_CACHE_TTL.to_string(), cfg.cache_ttl_secs.to_string()],
                    vec![
                        KEY_TRACKED_CURRENCIES.to_string(),
                        cfg.tracked_currencies.join(","),
                    ],
                ];
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            let stored = AppConfig::set(conn, key, value)?;
            // Cached payloads carry locale-formatted strings.
            if key == KEY_LOCALE {
                SqliteMetricsCache::new(conn).clear()?;
            }
            println!("Set {} = {}", key, stored);
        }
        Some(("clear-cache", _)) => {
            let n = SqliteMetricsCache::new(conn).clear()?;
            println!("Dropped {} cached metrics", n);
        }
        _ => {}
    }
    Ok(())
}
