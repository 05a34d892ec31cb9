//! Core accounting logic for Neraca.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, balance arithmetic, and report composition live here.
//!
//! # Modules
//!
//! - `chart` - Chart of accounts registry
//! - `ledger` - Append-only journal lines and scope filtering
//! - `balance` - As-of-date signed balances per account
//! - `ageing` - Receivable/payable ageing classification and feed
//! - `reports` - Financial position (balance sheet) composition
//! - `reconciliation` - Detection and repair of unbalanced transaction groups
//! - `display` - Presentation variants and multi-period expansion

pub mod ageing;
pub mod balance;
pub mod chart;
pub mod display;
pub mod ledger;
pub mod reconciliation;
pub mod reports;
