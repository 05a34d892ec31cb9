//! Financial position (balance sheet) composition.

use chrono::NaiveDate;
use neraca_shared::types::{AccountId, within_tolerance};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::error::ReportError;
use super::grouping::group_by_parent;
use super::types::{
    AccountDrilldown, BalanceSheetSummary, ComparisonLine, FinancialPositionSnapshot,
    PeriodComparison, PositionTotals,
};
use crate::balance::{AccountBalance, ActivityIndex, BalanceCalculator};
use crate::chart::{AccountType, ChartOfAccounts};
use crate::ledger::{JournalLedger, JournalLine, ScopeFilter};
use crate::reconciliation::ReconciliationService;

/// Account types reported as assets.
pub const ASSET_TYPES: [AccountType; 2] = [AccountType::Asset, AccountType::ContraAsset];
/// Account types reported as liabilities.
pub const LIABILITY_TYPES: [AccountType; 1] = [AccountType::Liability];
/// Account types reported as equity.
pub const EQUITY_TYPES: [AccountType; 1] = [AccountType::Equity];

/// Balance rows of the three balance sheet sections.
struct SectionRows {
    assets: Vec<AccountBalance>,
    liabilities: Vec<AccountBalance>,
    equity: Vec<AccountBalance>,
}

impl SectionRows {
    fn collect(chart: &ChartOfAccounts, index: &ActivityIndex) -> Self {
        Self {
            assets: BalanceCalculator::balances_of_types(chart, index, &ASSET_TYPES),
            liabilities: BalanceCalculator::balances_of_types(chart, index, &LIABILITY_TYPES),
            equity: BalanceCalculator::balances_of_types(chart, index, &EQUITY_TYPES),
        }
    }
}

fn sum(rows: &[AccountBalance]) -> Decimal {
    rows.iter().map(|r| r.balance).sum()
}

/// Stateless service composing balance sheets.
pub struct FinancialPositionService;

impl FinancialPositionService {
    /// Composes the full balance sheet as of a date.
    ///
    /// Read-only: identical inputs give identical snapshots.
    #[must_use]
    pub fn compose(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        as_of: NaiveDate,
        scope: &ScopeFilter,
    ) -> FinancialPositionSnapshot {
        let index = BalanceCalculator::index(ledger, as_of, scope);
        let rows = SectionRows::collect(chart, &index);
        let totals = Self::totals_from_rows(chart, ledger, &index, &rows, as_of);
        let equity_accounts_total = sum(&rows.equity);

        let mut warnings = Vec::new();
        let (assets, asset_warnings) = group_by_parent(chart, rows.assets);
        let (liabilities, liability_warnings) = group_by_parent(chart, rows.liabilities);
        let (equity, equity_warnings) = group_by_parent(chart, rows.equity);
        warnings.extend(asset_warnings);
        warnings.extend(liability_warnings);
        warnings.extend(equity_warnings);

        let unbalanced_entries = ReconciliationService::find_unbalanced(ledger, as_of, scope);
        let difference = totals.asset_total - totals.liabilities_and_equity;

        if !totals.balanced {
            warn!(
                %as_of,
                asset_total = %totals.asset_total,
                liabilities_and_equity = %totals.liabilities_and_equity,
                %difference,
                unbalanced_groups = unbalanced_entries.len(),
                "Balance sheet does not balance"
            );
        }

        FinancialPositionSnapshot {
            as_of,
            scope: scope.clone(),
            assets,
            liabilities,
            equity,
            asset_total: totals.asset_total,
            liab_total: totals.liab_total,
            equity_accounts_total,
            retained_earnings: totals.retained_earnings,
            current_earnings: Decimal::ZERO,
            equity_total: totals.equity_total,
            liabilities_and_equity: totals.liabilities_and_equity,
            difference,
            balanced: totals.balanced,
            unbalanced_entries,
            warnings,
        }
    }

    /// Totals and balanced flag only, without grouping or the unbalanced list.
    #[must_use]
    pub fn totals_at(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        as_of: NaiveDate,
        scope: &ScopeFilter,
    ) -> PositionTotals {
        let index = BalanceCalculator::index(ledger, as_of, scope);
        let rows = SectionRows::collect(chart, &index);
        Self::totals_from_rows(chart, ledger, &index, &rows, as_of)
    }

    fn totals_from_rows(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        index: &ActivityIndex,
        rows: &SectionRows,
        as_of: NaiveDate,
    ) -> PositionTotals {
        let asset_total = sum(&rows.assets);
        let liab_total = sum(&rows.liabilities);
        let retained_earnings = Self::retained_earnings(chart, ledger, index);
        let current_earnings = Decimal::ZERO;
        let equity_total = sum(&rows.equity) + retained_earnings + current_earnings;
        let liabilities_and_equity = liab_total + equity_total;

        PositionTotals {
            as_of,
            asset_total,
            liab_total,
            equity_total,
            retained_earnings,
            liabilities_and_equity,
            balanced: within_tolerance(asset_total, liabilities_and_equity),
        }
    }

    /// Earnings from revenue and expense activity in the index.
    ///
    /// `(Σ(credit - debit) over Revenue) - (Σ(debit - credit) over Expense)`,
    /// minus the opening imbalance `Σopening(assets) - Σopening(liabilities) -
    /// Σopening(equity)`. With no posted line anywhere in the ledger the
    /// result is zero whatever the opening balances.
    #[must_use]
    pub fn retained_earnings(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        index: &ActivityIndex,
    ) -> Decimal {
        if !ledger.has_posted_lines() {
            debug!("No posted journal lines; retained earnings forced to zero");
            return Decimal::ZERO;
        }

        let revenue = index.activity_of(chart.of_types(&[AccountType::Revenue]));
        let expense = index.activity_of(chart.of_types(&[AccountType::Expense]));
        let income = (revenue.credit - revenue.debit) - (expense.debit - expense.credit);

        let opening_imbalance = chart.opening_total(&ASSET_TYPES)
            - chart.opening_total(&LIABILITY_TYPES)
            - chart.opening_total(&EQUITY_TYPES);

        income - opening_imbalance
    }

    /// Headline figures and ratios.
    ///
    /// Accounts without a current classification count as non-current.
    #[must_use]
    pub fn summary(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        as_of: NaiveDate,
        scope: &ScopeFilter,
    ) -> BalanceSheetSummary {
        let index = BalanceCalculator::index(ledger, as_of, scope);
        let rows = SectionRows::collect(chart, &index);
        let totals = Self::totals_from_rows(chart, ledger, &index, &rows, as_of);

        let is_current = |row: &&AccountBalance| {
            chart
                .get(row.account_id)
                .and_then(|a| a.current_classification())
                .unwrap_or(false)
        };
        let current_assets: Decimal = rows
            .assets
            .iter()
            .filter(|r| r.account_type == AccountType::Asset)
            .filter(is_current)
            .map(|r| r.balance)
            .sum();
        let current_liabilities: Decimal = rows
            .liabilities
            .iter()
            .filter(is_current)
            .map(|r| r.balance)
            .sum();

        let ratio = |numerator: Decimal, denominator: Decimal| {
            if denominator > Decimal::ZERO {
                numerator
                    .checked_div(denominator)
                    .map_or(Decimal::ZERO, |r| r.round_dp(4))
            } else {
                Decimal::ZERO
            }
        };

        BalanceSheetSummary {
            as_of,
            total_assets: totals.asset_total,
            total_liabilities: totals.liab_total,
            total_equity: totals.equity_total,
            current_assets,
            current_liabilities,
            current_ratio: ratio(current_assets, current_liabilities),
            debt_to_equity_ratio: ratio(totals.liab_total, totals.equity_total),
            working_capital: current_assets - current_liabilities,
            balanced: totals.balanced,
        }
    }

    /// Compares totals at two dates.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `previous` is after `current`.
    pub fn compare(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        current: NaiveDate,
        previous: NaiveDate,
        scope: &ScopeFilter,
    ) -> Result<PeriodComparison, ReportError> {
        if previous > current {
            return Err(ReportError::InvalidDateRange { previous, current });
        }

        let now = Self::totals_at(chart, ledger, current, scope);
        let before = Self::totals_at(chart, ledger, previous, scope);

        Ok(PeriodComparison {
            current_as_of: current,
            previous_as_of: previous,
            asset_total: ComparisonLine::new(now.asset_total, before.asset_total),
            liab_total: ComparisonLine::new(now.liab_total, before.liab_total),
            equity_total: ComparisonLine::new(now.equity_total, before.equity_total),
            retained_earnings: ComparisonLine::new(now.retained_earnings, before.retained_earnings),
            liabilities_and_equity: ComparisonLine::new(
                now.liabilities_and_equity,
                before.liabilities_and_equity,
            ),
        })
    }

    /// Journal lines behind one account's balance, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::AccountNotFound` if the account is not in the chart.
    pub fn drilldown(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        account_id: AccountId,
        as_of: NaiveDate,
        scope: &ScopeFilter,
    ) -> Result<AccountDrilldown, ReportError> {
        let account = chart
            .get(account_id)
            .ok_or(ReportError::AccountNotFound(account_id))?;

        let mut entries: Vec<JournalLine> = ledger
            .lines_at(as_of, scope)
            .filter(|l| l.account_id == account_id)
            .cloned()
            .collect();
        entries.reverse();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        let index = BalanceCalculator::index(ledger, as_of, scope);
        Ok(AccountDrilldown {
            as_of,
            account: BalanceCalculator::account_balance(account, &index),
            entries,
        })
    }
}
