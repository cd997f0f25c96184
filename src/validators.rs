// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Normalization and validation of user-supplied names and calendar filters.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{LedgerError, Result};

static TICKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{1,10}$").unwrap());
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w\s\-]+$").unwrap());
static BROKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w\s\-\.&]+$").unwrap());

const MAX_CATEGORY_LEN: usize = 50;
const MAX_BROKER_LEN: usize = 100;

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cased alphanumeric symbol, e.g. `PETR4`, `HGLG11`, `AAPL`.
pub fn ticker_name(raw: &str) -> Result<String> {
    let name = raw.trim().to_uppercase();
    if !TICKER_RE.is_match(&name) {
        return Err(LedgerError::Validation(format!(
            "Invalid ticker '{}'",
            raw.trim()
        )));
    }
    Ok(name)
}

pub fn currency_code(raw: &str) -> Result<String> {
    let code = raw.trim().to_uppercase();
    if !CURRENCY_RE.is_match(&code) {
        return Err(LedgerError::Validation(format!(
            "Invalid currency code '{}'",
            raw.trim()
        )));
    }
    Ok(code)
}

pub fn category_title(raw: &str) -> Result<String> {
    let title = collapse_whitespace(raw);
    if title.is_empty() {
        return Err(LedgerError::Validation("Category title is required".into()));
    }
    if title.chars().count() > MAX_CATEGORY_LEN {
        return Err(LedgerError::Validation(format!(
            "Category title longer than {} characters",
            MAX_CATEGORY_LEN
        )));
    }
    if !CATEGORY_RE.is_match(&title) {
        return Err(LedgerError::Validation(format!(
            "Invalid category title '{}'",
            title
        )));
    }
    Ok(title)
}

pub fn broker_name(raw: &str) -> Result<String> {
    let name = collapse_whitespace(raw);
    if name.is_empty() {
        return Err(LedgerError::Validation("Broker name is required".into()));
    }
    if name.chars().count() > MAX_BROKER_LEN {
        return Err(LedgerError::Validation(format!(
            "Broker name longer than {} characters",
            MAX_BROKER_LEN
        )));
    }
    if !BROKER_RE.is_match(&name) {
        return Err(LedgerError::Validation(format!(
            "Invalid broker name '{}'",
            name
        )));
    }
    Ok(name)
}

pub fn year(raw: &str) -> Result<i32> {
    match raw.trim().parse::<i32>() {
        Ok(y) if (1900..=2100).contains(&y) => Ok(y),
        _ => Err(LedgerError::Validation(format!("Invalid year '{}'", raw.trim()))),
    }
}

pub fn month(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(LedgerError::Validation(format!("Invalid month '{}'", raw.trim()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_names_are_upper_cased_and_trimmed() {
        assert_eq!(ticker_name(" hglg11 ").unwrap(), "HGLG11");
        assert!(ticker_name("PETR4;DROP").is_err());
        assert!(ticker_name("TOOLONGTICKER").is_err());
        assert!(ticker_name("").is_err());
    }

    #[test]
    fn currency_codes_need_three_letters() {
        assert_eq!(currency_code("brl").unwrap(), "BRL");
        assert!(currency_code("US").is_err());
        assert!(currency_code("US1").is_err());
    }

    #[test]
    fn category_titles_accept_accents() {
        assert_eq!(category_title("  Ações   BR ").unwrap(), "Ações BR");
        assert!(category_title("FII<script>").is_err());
        assert!(category_title(&"x".repeat(51)).is_err());
        assert!(category_title("   ").is_err());
    }

    #[test]
    fn broker_names_allow_common_punctuation() {
        assert_eq!(broker_name("XP  Investimentos").unwrap(), "XP Investimentos");
        assert_eq!(broker_name("B&N Corp.").unwrap(), "B&N Corp.");
        assert!(broker_name("Bad;Name").is_err());
    }

    #[test]
    fn calendar_filters_are_bounded() {
        assert_eq!(year("2024").unwrap(), 2024);
        assert!(year("1800").is_err());
        assert_eq!(month(" 3 ").unwrap(), 3);
        assert!(month("13").is_err());
        assert!(month("x").is_err());
    }
}
