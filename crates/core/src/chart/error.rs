//! Chart of accounts error types.

use neraca_shared::types::AccountId;
use thiserror::Error;

/// Errors raised while building or mutating the chart of accounts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No account carries the given code.
    #[error("No account with code {0}")]
    AccountCodeNotFound(String),

    /// Two accounts share a code.
    #[error("Account code {0} is already in use")]
    DuplicateCode(String),

    /// Parent link points to an account that does not exist.
    #[error("Parent {parent} of account {code} does not exist")]
    ParentNotFound {
        /// Code of the child account.
        code: String,
        /// Missing parent id.
        parent: AccountId,
    },

    /// Parent chain loops back to the account itself.
    #[error("Account {0} is its own ancestor")]
    CyclicParent(String),

    /// Account type string is not one of the known types.
    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),
}

impl ChartError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::ParentNotFound { .. } => "PARENT_NOT_FOUND",
            Self::CyclicParent(_) => "CYCLIC_PARENT",
            Self::UnknownAccountType(_) => "UNKNOWN_ACCOUNT_TYPE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => 404,
            Self::DuplicateCode(_) => 409,
            Self::ParentNotFound { .. } | Self::CyclicParent(_) => 422,
            Self::UnknownAccountType(_) => 400,
        }
    }
}
