//! Financial position reporting.
//!
//! This module provides pure business logic for the balance sheet:
//! - One-level parent grouping with subtotals
//! - Section totals, retained earnings and the accounting-equation check
//! - Summary ratios
//! - Period comparison
//! - Account drill-down

pub mod error;
pub mod grouping;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use grouping::group_by_parent;
pub use service::FinancialPositionService;
pub use types::*;
