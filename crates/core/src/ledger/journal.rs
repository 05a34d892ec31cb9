//! Append-only journal line store.

use chrono::NaiveDate;
use neraca_shared::types::{JournalLineId, TransactionGroupId};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{JournalLine, ScopeFilter};
use super::update::{BalanceDelta, LineUpdate};

/// In-memory journal, in posting order.
///
/// Lines are never physically removed. Deleting marks them with the
/// soft-delete flag, after which they are invisible to every read that
/// derives balances.
#[derive(Debug, Clone, Default)]
pub struct JournalLedger {
    lines: Vec<JournalLine>,
}

impl JournalLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps lines loaded from storage.
    ///
    /// Stored rows are taken as written; validation applies to new lines only.
    #[must_use]
    pub fn from_lines(lines: Vec<JournalLine>) -> Self {
        Self { lines }
    }

    /// Validates a line before it is written.
    ///
    /// # Errors
    ///
    /// Returns an error if either side is negative or both sides are non-zero.
    pub fn validate_line(line: &JournalLine) -> Result<(), LedgerError> {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if !line.debit.is_zero() && !line.credit.is_zero() {
            return Err(LedgerError::BothSidesPosted);
        }
        Ok(())
    }

    /// Appends a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line fails validation.
    pub fn append(&mut self, line: JournalLine) -> Result<JournalLineId, LedgerError> {
        Self::validate_line(&line)?;
        let id = line.id;
        self.lines.push(line);
        Ok(id)
    }

    /// Every stored line, deleted ones included.
    #[must_use]
    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    /// Number of stored lines, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if nothing was ever stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines that count toward balances.
    pub fn posted(&self) -> impl Iterator<Item = &JournalLine> {
        self.lines.iter().filter(|l| l.is_posted())
    }

    /// Returns true if at least one line is posted anywhere, regardless of date or scope.
    #[must_use]
    pub fn has_posted_lines(&self) -> bool {
        self.posted().next().is_some()
    }

    /// Posted lines dated on or before `as_of` that pass the scope filter.
    pub fn lines_at<'a>(
        &'a self,
        as_of: NaiveDate,
        filter: &'a ScopeFilter,
    ) -> impl Iterator<Item = &'a JournalLine> + 'a {
        self.lines.iter().filter(move |l| l.counts_at(as_of, filter))
    }

    /// Looks up a line by id.
    #[must_use]
    pub fn get(&self, id: JournalLineId) -> Option<&JournalLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Posted lines of a transaction group, across all dates.
    #[must_use]
    pub fn group_lines(&self, group: TransactionGroupId) -> Vec<&JournalLine> {
        self.posted()
            .filter(|l| l.transaction_group_id == Some(group))
            .collect()
    }

    /// Soft-deletes every posted line of a group and returns how many were marked.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::GroupNotFound` if the group has no posted lines.
    pub fn soft_delete_group(&mut self, group: TransactionGroupId) -> Result<usize, LedgerError> {
        let mut marked = 0;
        for line in self
            .lines
            .iter_mut()
            .filter(|l| l.is_posted() && l.transaction_group_id == Some(group))
        {
            line.is_deleted = true;
            marked += 1;
        }

        if marked == 0 {
            return Err(LedgerError::GroupNotFound(group));
        }
        Ok(marked)
    }

    /// Replaces a stored line with the `after` side of an update.
    ///
    /// The `before` side must equal what is stored, so an update built from
    /// a stale read is rejected instead of silently overwriting.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::LineNotFound` for unknown lines,
    /// `LedgerError::LineMismatch` for stale updates, and validation errors
    /// for an invalid `after` line.
    pub fn apply_update(&mut self, update: LineUpdate) -> Result<Vec<BalanceDelta>, LedgerError> {
        Self::validate_line(&update.after)?;

        let stored = self
            .lines
            .iter_mut()
            .find(|l| l.id == update.before.id)
            .ok_or(LedgerError::LineNotFound(update.before.id))?;
        if *stored != update.before {
            return Err(LedgerError::LineMismatch(update.before.id));
        }

        let deltas = update.deltas();
        *stored = update.after;
        Ok(deltas)
    }
}
