//! Chart of accounts.
//!
//! Hierarchical accounts with a type, a normal-balance sign, a parent link
//! and an opening balance. Accounts are created at setup and afterwards only
//! their opening balance and active flag change.

pub mod error;
pub mod registry;
pub mod types;

pub use error::ChartError;
pub use registry::{ChartOfAccounts, ClassificationReport};
pub use types::{Account, AccountType, NormalBalance};
