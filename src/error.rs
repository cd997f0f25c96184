// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised by the ledger, the metrics engine and the cache layer.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Category '{0}' not found")]
    CategoryNotFound(String),

    #[error("Ticker '{0}' not found")]
    TickerNotFound(String),

    #[error("Broker '{0}' not found")]
    BrokerNotFound(String),

    #[error("Currency '{0}' not found")]
    CurrencyNotFound(String),

    #[error("{entity} #{id} not found")]
    RecordNotFound {
        entity: &'static str,
        id: i64,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{entity} '{name}' is still referenced by {count} {referenced_by}")]
    Protected {
        entity: &'static str,
        name: String,
        count: i64,
        referenced_by: &'static str,
    },

    #[error("Database operation failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to parse decimal number: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Cache payload could not be encoded: {0}")]
    CachePayload(#[from] serde_json::Error),
}

impl LedgerError {
    /// True for lookups of categories, tickers, brokers, currencies or record ids.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::CategoryNotFound(_)
                | LedgerError::TickerNotFound(_)
                | LedgerError::BrokerNotFound(_)
                | LedgerError::CurrencyNotFound(_)
                | LedgerError::RecordNotFound { .. }
        )
    }
}
