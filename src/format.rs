// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Money rounding and locale-aware rendering of amounts and month labels.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Half-up rounding to cents, applied once at output boundaries. The result
/// always carries two fractional digits.
pub fn round_money(d: Decimal) -> Decimal {
    let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
}

const MONTHS_PT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Maio", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];
const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::EnUs => "en-US",
        }
    }

    pub fn thousands_separator(&self) -> char {
        match self {
            Locale::PtBr => '.',
            Locale::EnUs => ',',
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            Locale::PtBr => ',',
            Locale::EnUs => '.',
        }
    }

    /// Abbreviated month name for `month` in 1..=12.
    pub fn month_abbr(&self, month: u32) -> &'static str {
        let idx = month.clamp(1, 12) as usize - 1;
        match self {
            Locale::PtBr => MONTHS_PT[idx],
            Locale::EnUs => MONTHS_EN[idx],
        }
    }

    /// "Mon YYYY" label for a calendar month.
    pub fn month_label(&self, year: i32, month: u32) -> String {
        format!("{} {}", self.month_abbr(month), year)
    }

    pub fn date_label(&self, date: NaiveDate) -> String {
        self.month_label(date.year(), date.month())
    }

    /// Grouped rendering with two decimals, e.g. `1.234.567,89` for pt-BR.
    pub fn format_grouped(&self, value: Decimal) -> String {
        let rounded = round_money(value);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let plain = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let sep = self.thousands_separator();
        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
        for (i, ch) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(sep);
            }
            grouped.push(*ch);
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        out.push(self.decimal_separator());
        out.push_str(frac_part);
        out
    }

    /// Inverse of [`Locale::format_grouped`].
    pub fn parse_grouped(&self, s: &str) -> Result<Decimal> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != self.thousands_separator())
            .map(|c| if c == self.decimal_separator() { '.' } else { c })
            .collect();
        Decimal::from_str_exact(&cleaned)
            .map_err(|_| LedgerError::Validation(format!("Invalid grouped amount '{}'", s)))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LedgerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en-us" | "en" => Ok(Locale::EnUs),
            other => Err(LedgerError::Validation(format!(
                "Unsupported locale '{}' (use pt-BR|en-US)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands_per_locale() {
        assert_eq!(Locale::PtBr.format_grouped(dec!(1234567.891)), "1.234.567,89");
        assert_eq!(Locale::EnUs.format_grouped(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(Locale::PtBr.format_grouped(dec!(725)), "725,00");
        assert_eq!(Locale::PtBr.format_grouped(dec!(0)), "0,00");
        assert_eq!(Locale::EnUs.format_grouped(dec!(-1500.5)), "-1,500.50");
    }

    #[test]
    fn rounds_half_up_at_the_boundary() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
        assert_eq!(Locale::EnUs.format_grouped(dec!(0.005)), "0.01");
    }

    #[test]
    fn month_labels_follow_locale() {
        assert_eq!(Locale::PtBr.month_label(2024, 5), "Maio 2024");
        assert_eq!(Locale::EnUs.month_label(2024, 1), "Jan 2024");
        assert_eq!(Locale::PtBr.month_label(2023, 12), "Dez 2023");
    }

    #[test]
    fn rejects_garbage_amounts() {
        assert!(Locale::PtBr.parse_grouped("12,3x").is_err());
        assert!("fr-FR".parse::<Locale>().is_err());
        assert_eq!("en_US".parse::<Locale>().unwrap(), Locale::EnUs);
    }

    proptest! {
        #[test]
        fn grouped_amounts_parse_back(cents in -10_000_000_000i64..10_000_000_000i64) {
            let value = Decimal::new(cents, 2);
            for locale in [Locale::PtBr, Locale::EnUs] {
                let shown = locale.format_grouped(value);
                prop_assert_eq!(locale.parse_grouped(&shown).unwrap(), value);
            }
        }
    }
}
