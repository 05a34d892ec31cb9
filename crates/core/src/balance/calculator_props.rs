//! Property-based tests for `BalanceCalculator`.
//!
//! - Property 1: Debit-normal balances rise with debits and fall with credits
//! - Property 2: Credit-normal balances move inversely
//! - Property 3: Index and direct computation agree

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::BalanceCalculator;
use crate::chart::{Account, AccountType};
use crate::ledger::{JournalLedger, JournalLine, ScopeFilter};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate signed opening balances.
fn opening_balance() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn debit_normal_type() -> impl Strategy<Value = AccountType> {
    prop_oneof![Just(AccountType::Asset), Just(AccountType::Expense)]
}

fn credit_normal_type() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::ContraAsset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
    ]
}

/// Strategy for a sequence of (day offset, is_debit, amount) postings.
fn postings() -> impl Strategy<Value = Vec<(u32, bool, Decimal)>> {
    prop::collection::vec((0u32..60, any::<bool>(), positive_amount()), 0..20)
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
}

fn ledger_with(account: &Account, postings: &[(u32, bool, Decimal)]) -> JournalLedger {
    let base = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let mut ledger = JournalLedger::new();
    for (offset, is_debit, amount) in postings {
        let date = base + chrono::Days::new(u64::from(*offset));
        let line = if *is_debit {
            JournalLine::debit(account.id, date, *amount)
        } else {
            JournalLine::credit(account.id, date, *amount)
        };
        ledger.append(line).unwrap();
    }
    ledger
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Debit-normal monotonicity**
    ///
    /// *For any* Asset or Expense account, appending a debit-only line SHALL
    /// strictly increase the balance and a credit-only line SHALL strictly
    /// decrease it.
    #[test]
    fn prop_debit_normal_monotonic(
        account_type in debit_normal_type(),
        opening in opening_balance(),
        history in postings(),
        amount in positive_amount(),
    ) {
        let account = Account::new("1-0001", "Subject", account_type).with_opening_balance(opening);
        let scope = ScopeFilter::all();
        let ledger = ledger_with(&account, &history);
        let before = BalanceCalculator::balance(&account, &ledger, as_of(), &scope);

        let mut with_debit = ledger.clone();
        with_debit.append(JournalLine::debit(account.id, as_of(), amount)).unwrap();
        let after_debit = BalanceCalculator::balance(&account, &with_debit, as_of(), &scope);
        prop_assert!(after_debit > before);
        prop_assert_eq!(after_debit - before, amount);

        let mut with_credit = ledger;
        with_credit.append(JournalLine::credit(account.id, as_of(), amount)).unwrap();
        let after_credit = BalanceCalculator::balance(&account, &with_credit, as_of(), &scope);
        prop_assert!(after_credit < before);
    }

    /// **Property 2: Credit-normal monotonicity**
    ///
    /// *For any* ContraAsset, Liability, Equity or Revenue account, the
    /// balance SHALL move inversely to Property 1.
    #[test]
    fn prop_credit_normal_monotonic(
        account_type in credit_normal_type(),
        opening in opening_balance(),
        history in postings(),
        amount in positive_amount(),
    ) {
        let account = Account::new("2-0001", "Subject", account_type).with_opening_balance(opening);
        let scope = ScopeFilter::all();
        let ledger = ledger_with(&account, &history);
        let before = BalanceCalculator::balance(&account, &ledger, as_of(), &scope);

        let mut with_debit = ledger.clone();
        with_debit.append(JournalLine::debit(account.id, as_of(), amount)).unwrap();
        prop_assert!(BalanceCalculator::balance(&account, &with_debit, as_of(), &scope) < before);

        let mut with_credit = ledger;
        with_credit.append(JournalLine::credit(account.id, as_of(), amount)).unwrap();
        let after_credit = BalanceCalculator::balance(&account, &with_credit, as_of(), &scope);
        prop_assert_eq!(after_credit - before, amount);
    }

    /// **Property 3: Index agreement**
    ///
    /// *For any* ledger and cut date, the single-pass index SHALL produce the
    /// same balance as the per-account computation.
    #[test]
    fn prop_index_matches_direct(
        account_type in prop_oneof![debit_normal_type(), credit_normal_type()],
        opening in opening_balance(),
        history in postings(),
        cut in 0u64..90,
    ) {
        let account = Account::new("9-0001", "Subject", account_type).with_opening_balance(opening);
        let scope = ScopeFilter::all();
        let ledger = ledger_with(&account, &history);
        let date = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap() + chrono::Days::new(cut);

        let index = BalanceCalculator::index(&ledger, date, &scope);
        prop_assert_eq!(
            BalanceCalculator::account_balance(&account, &index).balance,
            BalanceCalculator::balance(&account, &ledger, date, &scope)
        );
    }
}
