//! One-level parent grouping of balance rows.

use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use tracing::warn;

use super::error::ReportError;
use super::types::{ParentGroup, UNPARENTED_LABEL};
use crate::balance::AccountBalance;
use crate::chart::ChartOfAccounts;

/// Groups rows by their direct parent.
///
/// Grouping is exactly one level deep: a grandchild is grouped under its own
/// parent, never rolled into the grandparent. Groups appear in the order
/// their first member appears. A parent missing from the chart keeps its
/// group under a placeholder label and yields a warning.
#[must_use]
pub fn group_by_parent(
    chart: &ChartOfAccounts,
    rows: Vec<AccountBalance>,
) -> (Vec<ParentGroup>, Vec<String>) {
    let mut groups: Vec<ParentGroup> = Vec::new();
    let mut warnings = Vec::new();

    for row in rows {
        let parent_id = row.parent_id;
        let position = match groups.iter().position(|g| g.parent_id == parent_id) {
            Some(position) => position,
            None => {
                let parent_label = match parent_label(chart, parent_id) {
                    Ok(label) => label,
                    Err(e) => {
                        warn!(account = %row.code, error = %e, "Grouping under unknown parent");
                        warnings.push(format!("{}: {e}", row.code));
                        format!("Unknown parent ({})", parent_id.map(|id| id.to_string()).unwrap_or_default())
                    }
                };
                groups.push(ParentGroup {
                    parent_id,
                    parent_label,
                    members: Vec::new(),
                    subtotal: Decimal::ZERO,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[position];
        group.subtotal += row.balance;
        group.members.push(row);
    }

    (groups, warnings)
}

fn parent_label(chart: &ChartOfAccounts, parent_id: Option<AccountId>) -> Result<String, ReportError> {
    let Some(id) = parent_id else {
        return Ok(UNPARENTED_LABEL.to_string());
    };
    chart
        .get(id)
        .map(|parent| format!("{} - {}", parent.code, parent.name))
        .ok_or_else(|| ReportError::MissingReference(format!("parent account {id}")))
}
