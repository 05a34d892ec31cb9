//! Reconciliation error types.

use neraca_shared::types::TransactionGroupId;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur while repairing a transaction group.
///
/// Fixing an already-balanced group is not an error; it yields
/// `FixStatus::AlreadyBalanced`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    /// The group has no posted lines.
    #[error("Transaction group not found: {0}")]
    GroupNotFound(TransactionGroupId),

    /// The configured correction account is not in the chart.
    #[error("Correction account {0} is not in the chart of accounts")]
    CorrectionAccountMissing(String),

    /// The action string is not `delete` or `correct`.
    #[error("Unknown fix action: {0}")]
    UnknownAction(String),

    /// The ledger rejected the write.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::CorrectionAccountMissing(_) => "CORRECTION_ACCOUNT_MISSING",
            Self::UnknownAction(_) => "UNKNOWN_FIX_ACTION",
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::GroupNotFound(_) => 404,
            Self::CorrectionAccountMissing(_) => 422,
            Self::UnknownAction(_) => 400,
            Self::Ledger(e) => e.http_status_code(),
        }
    }
}
