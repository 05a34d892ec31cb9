//! Ageing error types.

use chrono::NaiveDate;
use neraca_shared::types::OpenBalanceId;
use thiserror::Error;

/// Errors raised while classifying an open balance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgeingError {
    /// Due date precedes the invoice date.
    #[error("Due date {due_date} is before invoice date {invoice_date}")]
    InvalidDueDate {
        /// Invoice date.
        invoice_date: NaiveDate,
        /// Due date.
        due_date: NaiveDate,
    },

    /// Open balance not found.
    #[error("Open balance not found: {0}")]
    OpenBalanceNotFound(OpenBalanceId),
}

impl AgeingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDueDate { .. } => "INVALID_DUE_DATE",
            Self::OpenBalanceNotFound(_) => "OPEN_BALANCE_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDueDate { .. } => 422,
            Self::OpenBalanceNotFound(_) => 404,
        }
    }
}
