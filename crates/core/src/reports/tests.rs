//! Tests for the financial position composer.

use chrono::NaiveDate;
use neraca_shared::types::{BranchId, TransactionGroupId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ReportError;
use super::service::FinancialPositionService;
use crate::chart::{Account, AccountType, ChartOfAccounts};
use crate::ledger::{JournalLedger, JournalLine, Scope, ScopeFilter};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

struct Books {
    chart: ChartOfAccounts,
    ledger: JournalLedger,
    cash: Account,
    loan: Account,
    capital: Account,
    sales: Account,
    rent: Account,
}

impl Books {
    fn new() -> Self {
        let cash = Account::new("1-1100", "Cash", AccountType::Asset);
        let loan = Account::new("2-2100", "Bank Loan", AccountType::Liability);
        let capital = Account::new("3-1000", "Share Capital", AccountType::Equity);
        let sales = Account::new("4-1000", "Sales", AccountType::Revenue);
        let rent = Account::new("6-1000", "Rent", AccountType::Expense);
        Self::with_accounts(cash, loan, capital, sales, rent)
    }

    fn with_accounts(cash: Account, loan: Account, capital: Account, sales: Account, rent: Account) -> Self {
        let chart = ChartOfAccounts::from_accounts(vec![
            cash.clone(),
            loan.clone(),
            capital.clone(),
            sales.clone(),
            rent.clone(),
        ])
        .unwrap();
        Self {
            chart,
            ledger: JournalLedger::new(),
            cash,
            loan,
            capital,
            sales,
            rent,
        }
    }

    fn post(&mut self, on: NaiveDate, debit: &Account, credit: &Account, amount: Decimal) -> TransactionGroupId {
        let group = TransactionGroupId::new();
        self.ledger
            .append(JournalLine::debit(debit.id, on, amount).in_group(group))
            .unwrap();
        self.ledger
            .append(JournalLine::credit(credit.id, on, amount).in_group(group))
            .unwrap();
        group
    }
}

#[test]
fn test_balance_invariant_example() {
    let mut books = Books::new();
    let (cash, capital, loan, sales) = (
        books.cash.clone(),
        books.capital.clone(),
        books.loan.clone(),
        books.sales.clone(),
    );
    books.post(date(1, 2), &cash, &capital, dec!(500000));
    books.post(date(1, 3), &cash, &loan, dec!(400000));
    books.post(date(1, 4), &cash, &sales, dec!(100000));

    let snapshot =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());

    assert_eq!(snapshot.asset_total, dec!(1000000));
    assert_eq!(snapshot.liab_total, dec!(400000));
    assert_eq!(snapshot.equity_accounts_total, dec!(500000));
    assert_eq!(snapshot.retained_earnings, dec!(100000));
    assert_eq!(snapshot.current_earnings, dec!(0));
    assert_eq!(snapshot.equity_total, dec!(600000));
    assert_eq!(snapshot.liabilities_and_equity, dec!(1000000));
    assert!(snapshot.balanced);
    assert!(snapshot.unbalanced_entries.is_empty());
    assert!(snapshot.warnings.is_empty());
}

#[test]
fn test_equity_rows_exclude_retained_earnings() {
    let mut books = Books::new();
    let (cash, capital, sales) = (books.cash.clone(), books.capital.clone(), books.sales.clone());
    books.post(date(1, 2), &cash, &capital, dec!(1000));
    books.post(date(1, 3), &cash, &sales, dec!(250));

    let snapshot =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());

    let equity_rows: Decimal = snapshot
        .equity
        .iter()
        .flat_map(|g| g.members.iter())
        .map(|m| m.balance)
        .sum();
    assert_eq!(equity_rows, dec!(1000));
    assert_eq!(snapshot.equity[0].subtotal, dec!(1000));
    assert_eq!(snapshot.equity_total, dec!(1250));
}

#[test]
fn test_zero_ledger_forces_retained_earnings_to_zero() {
    let cash = Account::new("1-1100", "Cash", AccountType::Asset).with_opening_balance(dec!(1000));
    let loan = Account::new("2-2100", "Loan", AccountType::Liability).with_opening_balance(dec!(200));
    let books = Books::with_accounts(
        cash,
        loan,
        Account::new("3-1000", "Capital", AccountType::Equity),
        Account::new("4-1000", "Sales", AccountType::Revenue),
        Account::new("6-1000", "Rent", AccountType::Expense),
    );

    let snapshot =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(6, 30), &ScopeFilter::all());

    assert_eq!(snapshot.retained_earnings, dec!(0));
    assert_eq!(snapshot.asset_total, dec!(1000));
    assert_eq!(snapshot.liab_total, dec!(200));
    assert_eq!(snapshot.difference, dec!(800));
    assert!(!snapshot.balanced);
}

#[test]
fn test_opening_imbalance_subtracted_once_lines_exist() {
    let cash = Account::new("1-1100", "Cash", AccountType::Asset).with_opening_balance(dec!(1000));
    let capital = Account::new("3-1000", "Capital", AccountType::Equity).with_opening_balance(dec!(800));
    let mut books = Books::with_accounts(
        cash,
        Account::new("2-2100", "Loan", AccountType::Liability),
        capital,
        Account::new("4-1000", "Sales", AccountType::Revenue),
        Account::new("6-1000", "Rent", AccountType::Expense),
    );
    let (cash, sales) = (books.cash.clone(), books.sales.clone());
    books.post(date(2, 1), &cash, &sales, dec!(50));

    let snapshot =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(2, 28), &ScopeFilter::all());

    // income 50, opening imbalance 1000 - 0 - 800 = 200
    assert_eq!(snapshot.retained_earnings, dec!(-150));
}

#[test]
fn test_expenses_reduce_retained_earnings() {
    let mut books = Books::new();
    let (cash, capital, sales, rent) = (
        books.cash.clone(),
        books.capital.clone(),
        books.sales.clone(),
        books.rent.clone(),
    );
    books.post(date(1, 1), &cash, &capital, dec!(1000));
    books.post(date(1, 5), &cash, &sales, dec!(300));
    books.post(date(1, 9), &rent, &cash, dec!(120));

    let snapshot =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());
    assert_eq!(snapshot.retained_earnings, dec!(180));
    assert_eq!(snapshot.asset_total, dec!(1180));
    assert!(snapshot.balanced);
}

#[test]
fn test_unbalanced_groups_are_surfaced() {
    let mut books = Books::new();
    let group = TransactionGroupId::new();
    books
        .ledger
        .append(JournalLine::debit(books.cash.id, date(3, 1), dec!(150000)).in_group(group))
        .unwrap();
    books
        .ledger
        .append(JournalLine::credit(books.sales.id, date(3, 1), dec!(100000)).in_group(group))
        .unwrap();

    let snapshot =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(3, 31), &ScopeFilter::all());

    assert!(!snapshot.balanced);
    assert_eq!(snapshot.difference, dec!(50000));
    assert_eq!(snapshot.unbalanced_entries.len(), 1);
    assert_eq!(snapshot.unbalanced_entries[0].transaction_group_id, group);
}

#[test]
fn test_branch_scope() {
    let mut books = Books::new();
    let branch = BranchId::new();
    let scope = Scope {
        branch: Some(branch),
        ..Scope::default()
    };
    books
        .ledger
        .append(JournalLine::debit(books.cash.id, date(1, 1), dec!(70)).with_scope(scope))
        .unwrap();
    books
        .ledger
        .append(JournalLine::credit(books.sales.id, date(1, 1), dec!(70)).with_scope(scope))
        .unwrap();
    let (cash, sales) = (books.cash.clone(), books.sales.clone());
    books.post(date(1, 1), &cash, &sales, dec!(30));

    let scoped =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::branch(branch));
    assert_eq!(scoped.asset_total, dec!(70));
    assert_eq!(scoped.retained_earnings, dec!(70));
    assert!(scoped.balanced);

    let all = FinancialPositionService::compose(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());
    assert_eq!(all.asset_total, dec!(100));
}

#[test]
fn test_inactive_accounts_left_out() {
    let mut books = Books::new();
    let (cash, capital) = (books.cash.clone(), books.capital.clone());
    books.post(date(1, 1), &cash, &capital, dec!(10));
    books.chart.set_active(books.cash.id, false).unwrap();

    let snapshot =
        FinancialPositionService::compose(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());
    assert_eq!(snapshot.asset_total, dec!(0));
    assert!(snapshot.assets.is_empty());
}

#[test]
fn test_summary_ratios() {
    let mut books = Books::new();
    let (cash, capital, loan) = (books.cash.clone(), books.capital.clone(), books.loan.clone());
    let payable = Account::new("2-1100", "Accounts Payable", AccountType::Liability);
    books.chart.insert(payable.clone()).unwrap();

    books.post(date(1, 1), &cash, &capital, dec!(1000));
    books.post(date(1, 2), &cash, &loan, dec!(500));
    books.post(date(1, 3), &cash, &payable, dec!(300));

    let summary =
        FinancialPositionService::summary(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());

    assert_eq!(summary.total_assets, dec!(1800));
    assert_eq!(summary.current_assets, dec!(1800));
    // 2-2100 is non-current, 2-1100 current.
    assert_eq!(summary.current_liabilities, dec!(300));
    assert_eq!(summary.current_ratio, dec!(6));
    assert_eq!(summary.debt_to_equity_ratio, dec!(0.8));
    assert_eq!(summary.working_capital, dec!(1500));
    assert!(summary.balanced);
}

#[test]
fn test_summary_ratio_zero_denominator() {
    let books = Books::new();
    let summary =
        FinancialPositionService::summary(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());
    assert_eq!(summary.current_ratio, dec!(0));
    assert_eq!(summary.debt_to_equity_ratio, dec!(0));
}

#[test]
fn test_compare_periods() {
    let mut books = Books::new();
    let (cash, capital, sales) = (books.cash.clone(), books.capital.clone(), books.sales.clone());
    books.post(date(1, 1), &cash, &capital, dec!(1000));
    books.post(date(2, 1), &cash, &sales, dec!(250));

    let comparison = FinancialPositionService::compare(
        &books.chart,
        &books.ledger,
        date(2, 28),
        date(1, 31),
        &ScopeFilter::all(),
    )
    .unwrap();

    assert_eq!(comparison.asset_total.current, dec!(1250));
    assert_eq!(comparison.asset_total.previous, dec!(1000));
    assert_eq!(comparison.asset_total.change, dec!(250));
    assert_eq!(comparison.asset_total.percentage, dec!(25));
    assert_eq!(comparison.liab_total.percentage, dec!(0));
    assert_eq!(comparison.retained_earnings.previous, dec!(0));
}

#[test]
fn test_compare_rejects_reversed_dates() {
    let books = Books::new();
    let err = FinancialPositionService::compare(
        &books.chart,
        &books.ledger,
        date(1, 31),
        date(2, 28),
        &ScopeFilter::all(),
    )
    .unwrap_err();
    assert!(matches!(err, ReportError::InvalidDateRange { .. }));
}

#[test]
fn test_drilldown_newest_first() {
    let mut books = Books::new();
    let (cash, capital, sales) = (books.cash.clone(), books.capital.clone(), books.sales.clone());
    books.post(date(1, 1), &cash, &capital, dec!(100));
    books.post(date(1, 20), &cash, &sales, dec!(40));
    books.post(date(1, 10), &cash, &sales, dec!(25));
    books.post(date(3, 1), &cash, &sales, dec!(999));

    let drilldown = FinancialPositionService::drilldown(
        &books.chart,
        &books.ledger,
        cash.id,
        date(1, 31),
        &ScopeFilter::all(),
    )
    .unwrap();

    let dates: Vec<NaiveDate> = drilldown.entries.iter().map(|l| l.date).collect();
    assert_eq!(dates, vec![date(1, 20), date(1, 10), date(1, 1)]);
    assert_eq!(drilldown.account.total_debit, dec!(165));
    assert_eq!(drilldown.account.balance, dec!(165));

    let missing = FinancialPositionService::drilldown(
        &books.chart,
        &books.ledger,
        neraca_shared::types::AccountId::new(),
        date(1, 31),
        &ScopeFilter::all(),
    );
    assert!(matches!(missing, Err(ReportError::AccountNotFound(_))));
}

// ============================================================================
// Property tests
// ============================================================================

/// Strategy to generate positive decimal amounts (0.01 to 100,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for balanced postings: (debit account index, credit account index, day, amount).
fn postings() -> impl Strategy<Value = Vec<(usize, usize, u32, Decimal)>> {
    prop::collection::vec((0usize..5, 0usize..5, 1u32..28, positive_amount()), 1..30)
}

fn books_with(postings: &[(usize, usize, u32, Decimal)]) -> Books {
    let mut books = Books::new();
    let accounts = [
        books.cash.clone(),
        books.loan.clone(),
        books.capital.clone(),
        books.sales.clone(),
        books.rent.clone(),
    ];
    for (debit, credit, day, amount) in postings {
        books.post(date(1, *day), &accounts[*debit], &accounts[*credit], *amount);
    }
    books
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Idempotence**
    ///
    /// *For any* chart and ledger, composing twice with identical inputs
    /// SHALL return identical snapshots.
    #[test]
    fn prop_compose_is_idempotent(postings in postings(), cut in 1u32..28) {
        let books = books_with(&postings);
        let first = FinancialPositionService::compose(&books.chart, &books.ledger, date(1, cut), &ScopeFilter::all());
        let second = FinancialPositionService::compose(&books.chart, &books.ledger, date(1, cut), &ScopeFilter::all());
        prop_assert_eq!(first, second);
    }

    /// **Property 2: Double entry keeps the equation**
    ///
    /// *For any* set of balanced postings over asset, liability, equity,
    /// revenue and expense accounts with zero opening balances, the
    /// snapshot SHALL balance at every cut date.
    #[test]
    fn prop_balanced_postings_balance(postings in postings(), cut in 1u32..28) {
        let books = books_with(&postings);
        let snapshot = FinancialPositionService::compose(&books.chart, &books.ledger, date(1, cut), &ScopeFilter::all());
        prop_assert!(snapshot.balanced, "difference {}", snapshot.difference);
        prop_assert!(snapshot.unbalanced_entries.is_empty());
    }

    /// **Property 3: Reduced totals agree with the full snapshot**
    #[test]
    fn prop_totals_match_snapshot(postings in postings(), cut in 1u32..28) {
        let books = books_with(&postings);
        let snapshot = FinancialPositionService::compose(&books.chart, &books.ledger, date(1, cut), &ScopeFilter::all());
        let totals = FinancialPositionService::totals_at(&books.chart, &books.ledger, date(1, cut), &ScopeFilter::all());
        prop_assert_eq!(snapshot.totals(), totals);
    }

    /// **Property 4: Group subtotals sum to section totals**
    #[test]
    fn prop_subtotals_sum_to_totals(postings in postings()) {
        let books = books_with(&postings);
        let snapshot = FinancialPositionService::compose(&books.chart, &books.ledger, date(1, 31), &ScopeFilter::all());
        let assets: Decimal = snapshot.assets.iter().map(|g| g.subtotal).sum();
        let liabilities: Decimal = snapshot.liabilities.iter().map(|g| g.subtotal).sum();
        let equity: Decimal = snapshot.equity.iter().map(|g| g.subtotal).sum();
        prop_assert_eq!(assets, snapshot.asset_total);
        prop_assert_eq!(liabilities, snapshot.liab_total);
        prop_assert_eq!(equity, snapshot.equity_accounts_total);
    }
}
