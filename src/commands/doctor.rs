// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use super::with_journal;
use crate::cache::SqliteMetricsCache;
use crate::utils::pretty_table;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let fix = m.get_flag("fix");
    let drifts = with_journal(conn, |j| Ok(j.reconcile_quantities(fix)?))?;
    let purged = SqliteMetricsCache::new(conn).purge_expired()?;
    if purged > 0 {
        println!("Purged {} expired cached metrics", purged);
    }

    if drifts.is_empty() {
        println!("✅ doctor: no issues found");
        return Ok(());
    }
    let rows = drifts
        .iter()
        .map(|d| {
            vec![
                "quantity_drift".into(),
                d.ticker.clone(),
                d.stored.to_string(),
                d.expected.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Issue", "Ticker", "Stored", "From history"], rows)
    );
    if fix {
        println!("Rewrote {} ticker quantities", drifts.len());
    } else {
        println!("Run `doctor --fix` to rewrite them");
    }
    Ok(())
}
