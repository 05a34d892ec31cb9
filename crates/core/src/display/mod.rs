//! Presentation of composed balance sheets.
//!
//! - Display modes (`total_only`, `parent_only`, `detailed`, `with_zero`)
//! - Zero-balance suppression
//! - Multi-period expansion at trailing month, quarter and year ends

pub mod filter;
pub mod mode;
pub mod periods;
pub mod service;

pub use filter::DisplayModeFilter;
pub use mode::{DisplayMode, DisplayOptions};
pub use periods::{Granularity, MultiPeriodData, MultiPeriodExpander, PeriodPoint};
pub use service::{BalanceSheetService, BalanceSheetView};
