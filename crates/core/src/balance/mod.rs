//! As-of-date account balances.
//!
//! `balance = opening_balance + (Σdebit - Σcredit) × sign`, where the sign is
//! `+1` for debit-normal and `-1` for credit-normal account types.

pub mod calculator;

#[cfg(test)]
mod calculator_props;

pub use calculator::{AccountBalance, Activity, ActivityIndex, BalanceCalculator};
