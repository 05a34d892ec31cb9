//! Journal ledger error types.

use neraca_shared::types::{AccountId, JournalLineId, TransactionGroupId};
use thiserror::Error;

use super::source::SourceKind;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Line amount cannot be negative.
    #[error("Journal line amounts cannot be negative")]
    NegativeAmount,

    /// Line carries both a debit and a credit.
    #[error("Journal line must post either a debit or a credit, not both")]
    BothSidesPosted,

    // ========== Reference Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal line not found.
    #[error("Journal line not found: {0}")]
    LineNotFound(JournalLineId),

    /// Transaction group has no posted lines.
    #[error("Transaction group not found: {0}")]
    GroupNotFound(TransactionGroupId),

    /// Source document could not be resolved.
    #[error("Source {kind} document {reference} could not be resolved")]
    SourceNotFound {
        /// Kind of source document.
        kind: SourceKind,
        /// Document reference as shown to users.
        reference: String,
    },

    // ========== Update Errors ==========
    /// The `before` side of an update does not match the stored line.
    #[error("Journal line {0} changed since it was read")]
    LineMismatch(JournalLineId),

    /// The `before` and `after` sides of an update are different lines.
    #[error("Update pairs lines {before} and {after}")]
    UpdateIdMismatch {
        /// Id of the `before` line.
        before: JournalLineId,
        /// Id of the `after` line.
        after: JournalLineId,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::BothSidesPosted => "BOTH_SIDES_POSTED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::SourceNotFound { .. } => "SOURCE_NOT_FOUND",
            Self::LineMismatch(_) => "LINE_MISMATCH",
            Self::UpdateIdMismatch { .. } => "UPDATE_ID_MISMATCH",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NegativeAmount | Self::BothSidesPosted | Self::UpdateIdMismatch { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound(_)
            | Self::LineNotFound(_)
            | Self::GroupNotFound(_)
            | Self::SourceNotFound { .. } => 404,

            // 409 Conflict - stale read
            Self::LineMismatch(_) => 409,
        }
    }
}
