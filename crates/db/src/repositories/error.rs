//! Repository error type.

use neraca_core::ageing::AgeingError;
use neraca_core::chart::ChartError;
use neraca_core::ledger::LedgerError;
use neraca_core::reconciliation::ReconciliationError;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// A stored column holds a value the domain does not recognise.
    #[error("Invalid value {value:?} in {table}.{column}")]
    InvalidStoredValue {
        /// Table name.
        table: &'static str,
        /// Column name.
        column: &'static str,
        /// Offending value.
        value: String,
    },

    /// JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chart of accounts rule violated.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Reconciliation failed.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Ageing classification failed.
    #[error(transparent)]
    Ageing(#[from] AgeingError),
}

impl RepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::InvalidStoredValue { .. } | Self::Serialization(_) => "CORRUPT_RECORD",
            Self::Chart(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Reconciliation(e) => e.error_code(),
            Self::Ageing(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Database(_) | Self::InvalidStoredValue { .. } | Self::Serialization(_) => 500,
            Self::Chart(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::Reconciliation(e) => e.http_status_code(),
            Self::Ageing(e) => e.http_status_code(),
        }
    }
}
