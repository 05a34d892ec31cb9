//! Detection and repair of unbalanced transaction groups.

pub mod error;
pub mod service;
pub mod types;

pub use error::ReconciliationError;
pub use service::ReconciliationService;
pub use types::{FixAction, FixOutcome, FixPlan, FixStatus, UnbalancedGroup};
