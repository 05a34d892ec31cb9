//! Reconciliation domain types.

use std::fmt;
use std::str::FromStr;

use neraca_shared::types::{JournalLineId, TransactionGroupId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReconciliationError;
use crate::ledger::JournalLine;

/// A transaction group whose debits and credits differ beyond tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbalancedGroup {
    /// Group id.
    pub transaction_group_id: TransactionGroupId,
    /// Lines of the group visible at the cut.
    pub lines: Vec<JournalLine>,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub difference: Decimal,
}

/// Repair applied to an unbalanced group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixAction {
    /// Remove every line of the group.
    Delete,
    /// Append one offsetting line against the correction account.
    Correct,
}

impl FixAction {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Correct => "correct",
        }
    }
}

impl fmt::Display for FixAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixAction {
    type Err = ReconciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Self::Delete),
            "correct" => Ok(Self::Correct),
            other => Err(ReconciliationError::UnknownAction(other.to_string())),
        }
    }
}

/// What a fix will do, decided from the group's current lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixPlan {
    /// Nothing to do.
    AlreadyBalanced {
        /// Current difference, within tolerance.
        difference: Decimal,
    },
    /// Soft-delete these lines.
    DeleteLines {
        /// Lines to delete.
        line_ids: Vec<JournalLineId>,
        /// Difference being removed.
        difference: Decimal,
    },
    /// Append this correcting line.
    AppendCorrection {
        /// The correcting line.
        line: JournalLine,
        /// Difference being offset.
        difference: Decimal,
    },
}

/// Result of applying a fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixStatus {
    /// Group lines were deleted.
    Deleted {
        /// Number of lines removed.
        lines_removed: usize,
    },
    /// A correcting line was appended.
    Corrected {
        /// New line id.
        line_id: JournalLineId,
        /// Amount of the correcting line.
        amount: Decimal,
    },
    /// The group was already balanced; nothing was written.
    AlreadyBalanced,
}

/// Outcome reported to the caller of a fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixOutcome {
    /// Group that was fixed.
    pub transaction_group_id: TransactionGroupId,
    /// Requested action.
    pub action: FixAction,
    /// What happened.
    pub status: FixStatus,
    /// Difference before the fix.
    pub difference: Decimal,
    /// Human-readable summary.
    pub message: String,
}

impl FixOutcome {
    /// Builds the outcome with a message derived from the status.
    #[must_use]
    pub fn new(
        transaction_group_id: TransactionGroupId,
        action: FixAction,
        status: FixStatus,
        difference: Decimal,
    ) -> Self {
        let message = match &status {
            FixStatus::Deleted { lines_removed } => {
                format!("Deleted {lines_removed} lines of transaction {transaction_group_id}")
            }
            FixStatus::Corrected { amount, .. } => {
                format!("Added correcting line of {amount} to transaction {transaction_group_id}")
            }
            FixStatus::AlreadyBalanced => {
                format!("Transaction {transaction_group_id} is already balanced")
            }
        };
        Self {
            transaction_group_id,
            action,
            status,
            difference,
            message,
        }
    }
}
