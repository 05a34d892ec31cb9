//! Report error types.

use chrono::NaiveDate;
use neraca_shared::types::AccountId;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A referenced record is absent.
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Invalid date range.
    #[error("Invalid date range: previous {previous} is after current {current}")]
    InvalidDateRange {
        /// Earlier date.
        previous: NaiveDate,
        /// Later date.
        current: NaiveDate,
    },
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingReference(_) => "MISSING_REFERENCE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingReference(_) | Self::AccountNotFound(_) => 404,
            Self::InvalidDateRange { .. } => 400,
        }
    }
}
