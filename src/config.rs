// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::format::Locale;
use crate::validators;

pub const KEY_LOCALE: &str = "locale";
pub const KEY_CACHE_TTL: &str = "cache_ttl_secs";
pub const KEY_TRACKED_CURRENCIES: &str = "tracked_currencies";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_TRACKED_CURRENCIES: [&str; 3] = ["BRL", "USD", "EUR"];

/// Runtime settings persisted in the `settings` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub locale: Locale,
    pub cache_ttl_secs: u64,
    pub tracked_currencies: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            tracked_currencies: DEFAULT_TRACKED_CURRENCIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Reads every known key, keeping defaults for absent or unparseable values.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Some(raw) = get_setting(conn, KEY_LOCALE)? {
            match raw.parse::<Locale>() {
                Ok(locale) => cfg.locale = locale,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring stored locale"),
            }
        }
        if let Some(raw) = get_setting(conn, KEY_CACHE_TTL)? {
            match parse_ttl(&raw) {
                Ok(secs) => cfg.cache_ttl_secs = secs,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring stored cache ttl"),
            }
        }
        if let Some(raw) = get_setting(conn, KEY_TRACKED_CURRENCIES)? {
            match parse_currency_list(&raw) {
                Ok(list) => cfg.tracked_currencies = list,
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring stored tracked currencies")
                }
            }
        }
        Ok(cfg)
    }

    /// Validates and stores one setting, returning the normalized value.
    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<String> {
        let normalized = match key {
            KEY_LOCALE => value.parse::<Locale>()?.code().to_string(),
            KEY_CACHE_TTL => parse_ttl(value)?.to_string(),
            KEY_TRACKED_CURRENCIES => parse_currency_list(value)?.join(","),
            other => {
                return Err(LedgerError::Validation(format!(
                    "Unknown setting '{}' (use {}|{}|{})",
                    other, KEY_LOCALE, KEY_CACHE_TTL, KEY_TRACKED_CURRENCIES
                )));
            }
        };
        conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, normalized],
        )?;
        Ok(normalized)
    }
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

fn parse_ttl(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(LedgerError::Validation(format!(
            "Cache TTL must be a positive number of seconds, got '{}'",
            raw.trim()
        ))),
    }
}

fn parse_currency_list(raw: &str) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let code = validators::currency_code(part)?;
        if !out.contains(&code) {
            out.push(code);
        }
    }
    Ok(out)
}
