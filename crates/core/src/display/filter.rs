//! Display-mode post-processing of a composed balance sheet.

use neraca_shared::types::is_negligible;

use super::mode::{DisplayMode, DisplayOptions};
use crate::chart::ChartOfAccounts;
use crate::reports::{FinancialPositionSnapshot, ParentGroup};

/// Shapes a snapshot into a presentation variant.
///
/// Only group detail changes. Totals, the balanced flag, the unbalanced
/// list and warnings pass through untouched in every mode.
pub struct DisplayModeFilter;

impl DisplayModeFilter {
    /// Applies the mode, then zero suppression unless disabled.
    #[must_use]
    pub fn apply(
        mut snapshot: FinancialPositionSnapshot,
        options: DisplayOptions,
        chart: &ChartOfAccounts,
    ) -> FinancialPositionSnapshot {
        let sections = [
            &mut snapshot.assets,
            &mut snapshot.liabilities,
            &mut snapshot.equity,
        ];

        for section in sections {
            match options.mode {
                DisplayMode::TotalOnly => {
                    section.clear();
                    continue;
                }
                DisplayMode::ParentOnly => Self::keep_parents(section, chart),
                DisplayMode::Detailed | DisplayMode::WithZero => {}
            }

            if options.suppresses_zero() {
                Self::suppress_zero(section);
            }
        }

        snapshot
    }

    /// Keeps rows whose account has at least one child in the chart.
    ///
    /// Groups left without members are dropped; surviving groups keep their
    /// original subtotal.
    fn keep_parents(section: &mut Vec<ParentGroup>, chart: &ChartOfAccounts) {
        for group in section.iter_mut() {
            group.members.retain(|m| chart.has_children(m.account_id));
        }
        section.retain(|g| !g.members.is_empty());
    }

    /// Drops negligible rows, and a group only once it is empty with a
    /// negligible subtotal.
    fn suppress_zero(section: &mut Vec<ParentGroup>) {
        for group in section.iter_mut() {
            group.members.retain(|m| !is_negligible(m.balance));
        }
        section.retain(|g| !g.members.is_empty() || !is_negligible(g.subtotal));
    }
}
