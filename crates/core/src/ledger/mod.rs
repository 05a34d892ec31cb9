//! Journal ledger.
//!
//! This module implements the journal side of the bookkeeping system:
//! - Journal lines with scope, source reference and soft-delete flag
//! - Scope filtering by branch, department and project
//! - Typed source references and their resolution
//! - Explicit before/after line updates
//! - The append-only ledger store

pub mod error;
pub mod journal;
pub mod source;
pub mod types;
pub mod update;

pub use error::LedgerError;
pub use journal::JournalLedger;
pub use source::{
    SourceDocument, SourceKind, SourceRef, SourceResolver, SourcedLine, resolve_lines,
    resolve_source,
};
pub use types::{JournalLine, JournalType, Scope, ScopeFilter};
pub use update::{BalanceDelta, LineUpdate};
