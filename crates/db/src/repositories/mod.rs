//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod ageing;
pub mod error;
pub mod journal;
pub mod locks;
pub mod sources;

pub use account::AccountRepository;
pub use ageing::{AgeingRefresh, AgeingRepository};
pub use error::RepositoryError;
pub use journal::JournalRepository;
pub use locks::{GroupGuard, GroupLocks};
pub use sources::{InvoiceSourceResolver, SourceRepository};
