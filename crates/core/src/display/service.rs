//! Balance sheet data for renderers.

use chrono::NaiveDate;
use serde::Serialize;

use super::filter::DisplayModeFilter;
use super::mode::{DisplayMode, DisplayOptions};
use super::periods::{Granularity, MultiPeriodData, MultiPeriodExpander};
use crate::chart::ChartOfAccounts;
use crate::ledger::{JournalLedger, ScopeFilter};
use crate::reports::{FinancialPositionService, FinancialPositionSnapshot};

/// A display-filtered balance sheet, optionally with historical totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheetView {
    /// Mode the detail was shaped with.
    pub mode: DisplayMode,
    /// Filtered snapshot.
    #[serde(flatten)]
    pub report: FinancialPositionSnapshot,
    /// Totals at trailing period ends, keyed by granularity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_period_data: Option<MultiPeriodData>,
}

/// Composes, filters and expands balance sheets.
pub struct BalanceSheetService;

impl BalanceSheetService {
    /// Builds the renderer view.
    ///
    /// An empty `granularities` slice leaves `multi_period_data` unset.
    #[must_use]
    pub fn balance_sheet_data(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        as_of: NaiveDate,
        scope: &ScopeFilter,
        options: DisplayOptions,
        granularities: &[Granularity],
    ) -> BalanceSheetView {
        let snapshot = FinancialPositionService::compose(chart, ledger, as_of, scope);
        let report = DisplayModeFilter::apply(snapshot, options, chart);

        let multi_period_data = (!granularities.is_empty())
            .then(|| MultiPeriodExpander::expand(chart, ledger, as_of, scope, granularities));

        BalanceSheetView {
            mode: options.mode,
            report,
            multi_period_data,
        }
    }
}
