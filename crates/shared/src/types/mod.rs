//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{TOLERANCE, exceeds_tolerance, is_negligible, within_tolerance};
pub use pagination::{PageMeta, PageRequest, PageResponse};
