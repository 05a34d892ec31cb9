//! `SeaORM` entity definitions.

pub mod accounts;
pub mod ageing_records;
pub mod journal_lines;
pub mod open_balances;
