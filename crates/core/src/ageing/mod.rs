//! Receivable and payable ageing.
//!
//! Classifies open balances by days past due and builds the ageing feed:
//! per-balance rows, bucket summaries, and a forward cash-flow projection.

pub mod classifier;
pub mod error;
pub mod report;
pub mod types;

pub use classifier::{AgeingClassifier, ResolvedAgeing};
pub use error::AgeingError;
pub use report::{AgeingReportService, CASH_FLOW_HORIZONS};
pub use types::*;
