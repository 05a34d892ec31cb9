//! Report data types.

use chrono::NaiveDate;
use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::AccountBalance;
use crate::ledger::{JournalLine, ScopeFilter};
use crate::reconciliation::UnbalancedGroup;

/// Label of the group holding accounts without a parent.
pub const UNPARENTED_LABEL: &str = "Unparented";

/// Accounts sharing one direct parent, with their subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentGroup {
    /// Parent account, or `None` for the unparented group.
    pub parent_id: Option<AccountId>,
    /// Parent code and name, or [`UNPARENTED_LABEL`].
    pub parent_label: String,
    /// Member balance rows, in code order.
    pub members: Vec<AccountBalance>,
    /// Sum of member balances.
    pub subtotal: Decimal,
}

/// Balance sheet as of a date.
///
/// Equity member rows carry only their own balances; retained and current
/// earnings appear solely in the section totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialPositionSnapshot {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Scope the snapshot was computed for.
    pub scope: ScopeFilter,
    /// Asset and contra-asset groups.
    pub assets: Vec<ParentGroup>,
    /// Liability groups.
    pub liabilities: Vec<ParentGroup>,
    /// Equity groups.
    pub equity: Vec<ParentGroup>,
    /// Sum of asset and contra-asset balances.
    pub asset_total: Decimal,
    /// Sum of liability balances.
    pub liab_total: Decimal,
    /// Sum of equity account balances, earnings excluded.
    pub equity_accounts_total: Decimal,
    /// Earnings derived from revenue and expense activity.
    pub retained_earnings: Decimal,
    /// Current-year earnings. Always zero until a fiscal-year split exists.
    pub current_earnings: Decimal,
    /// `equity_accounts_total + retained_earnings + current_earnings`.
    pub equity_total: Decimal,
    /// `liab_total + equity_total`.
    pub liabilities_and_equity: Decimal,
    /// `asset_total - liabilities_and_equity`.
    pub difference: Decimal,
    /// True when `|difference| < 0.01`.
    pub balanced: bool,
    /// Transaction groups out of balance at the as-of date.
    pub unbalanced_entries: Vec<UnbalancedGroup>,
    /// Derived values that could not be computed.
    pub warnings: Vec<String>,
}

impl FinancialPositionSnapshot {
    /// Reduced form with totals only.
    #[must_use]
    pub fn totals(&self) -> PositionTotals {
        PositionTotals {
            as_of: self.as_of,
            asset_total: self.asset_total,
            liab_total: self.liab_total,
            equity_total: self.equity_total,
            retained_earnings: self.retained_earnings,
            liabilities_and_equity: self.liabilities_and_equity,
            balanced: self.balanced,
        }
    }
}

/// Totals and balanced flag at one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTotals {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Total assets.
    pub asset_total: Decimal,
    /// Total liabilities.
    pub liab_total: Decimal,
    /// Total equity, earnings included.
    pub equity_total: Decimal,
    /// Retained earnings.
    pub retained_earnings: Decimal,
    /// `liab_total + equity_total`.
    pub liabilities_and_equity: Decimal,
    /// Accounting equation holds within tolerance.
    pub balanced: bool,
}

/// Headline figures and ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetSummary {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity, earnings included.
    pub total_equity: Decimal,
    /// Assets classified current.
    pub current_assets: Decimal,
    /// Liabilities classified current.
    pub current_liabilities: Decimal,
    /// `current_assets / current_liabilities`, zero when the denominator is not positive.
    pub current_ratio: Decimal,
    /// `total_liabilities / total_equity`, zero when equity is not positive.
    pub debt_to_equity_ratio: Decimal,
    /// `current_assets - current_liabilities`.
    pub working_capital: Decimal,
    /// Accounting equation holds within tolerance.
    pub balanced: bool,
}

/// One line item compared across two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonLine {
    /// Value at the current date.
    pub current: Decimal,
    /// Value at the previous date.
    pub previous: Decimal,
    /// `current - previous`.
    pub change: Decimal,
    /// `change / previous × 100`, rounded to two places; zero when previous is zero.
    pub percentage: Decimal,
}

impl ComparisonLine {
    /// Compares two values.
    #[must_use]
    pub fn new(current: Decimal, previous: Decimal) -> Self {
        let change = current - previous;
        let percentage = change
            .checked_div(previous)
            .map_or(Decimal::ZERO, |ratio| (ratio * Decimal::ONE_HUNDRED).round_dp(2));
        Self {
            current,
            previous,
            change,
            percentage,
        }
    }
}

/// Balance sheet totals compared across two dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// Current as-of date.
    pub current_as_of: NaiveDate,
    /// Previous as-of date.
    pub previous_as_of: NaiveDate,
    /// Total assets.
    pub asset_total: ComparisonLine,
    /// Total liabilities.
    pub liab_total: ComparisonLine,
    /// Total equity.
    pub equity_total: ComparisonLine,
    /// Retained earnings.
    pub retained_earnings: ComparisonLine,
    /// Liabilities plus equity.
    pub liabilities_and_equity: ComparisonLine,
}

/// Journal lines behind one account's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDrilldown {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Balance row.
    pub account: AccountBalance,
    /// Lines, newest first.
    pub entries: Vec<JournalLine>,
}
