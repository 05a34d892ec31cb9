//! Explicit before/after journal line updates.
//!
//! An edit to a journal line carries both versions of the line, so the
//! per-account balance effect is derived from the pair alone.

use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::JournalLine;

/// Both versions of an edited journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdate {
    /// Line as previously stored.
    pub before: JournalLine,
    /// Line as it should be stored.
    pub after: JournalLine,
}

/// Change in raw debit/credit activity on one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    /// Affected account.
    pub account_id: AccountId,
    /// Change in total debit.
    pub debit: Decimal,
    /// Change in total credit.
    pub credit: Decimal,
}

impl BalanceDelta {
    /// Change in `debit - credit`.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns true if the delta changes nothing.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

impl LineUpdate {
    /// Pairs two versions of the same line.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UpdateIdMismatch` if the ids differ and
    /// `LedgerError::NegativeAmount` if the new version has a negative side.
    pub fn new(before: JournalLine, after: JournalLine) -> Result<Self, LedgerError> {
        if before.id != after.id {
            return Err(LedgerError::UpdateIdMismatch {
                before: before.id,
                after: after.id,
            });
        }
        if after.debit < Decimal::ZERO || after.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        Ok(Self { before, after })
    }

    /// Per-account activity change caused by the update.
    ///
    /// Moving a line to another account yields two deltas: the old account
    /// loses the old amounts and the new account gains the new ones. Deleted
    /// versions contribute nothing. Zero deltas are omitted.
    #[must_use]
    pub fn deltas(&self) -> Vec<BalanceDelta> {
        let (before_debit, before_credit) = posted_amounts(&self.before);
        let (after_debit, after_credit) = posted_amounts(&self.after);

        let candidates = if self.before.account_id == self.after.account_id {
            vec![BalanceDelta {
                account_id: self.after.account_id,
                debit: after_debit - before_debit,
                credit: after_credit - before_credit,
            }]
        } else {
            vec![
                BalanceDelta {
                    account_id: self.before.account_id,
                    debit: -before_debit,
                    credit: -before_credit,
                },
                BalanceDelta {
                    account_id: self.after.account_id,
                    debit: after_debit,
                    credit: after_credit,
                },
            ]
        };

        candidates.into_iter().filter(|d| !d.is_zero()).collect()
    }
}

fn posted_amounts(line: &JournalLine) -> (Decimal, Decimal) {
    if line.is_posted() {
        (line.debit, line.credit)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_amount_change_on_same_account() {
        let before = JournalLine::debit(AccountId::new(), date(), dec!(100));
        let after = JournalLine {
            debit: dec!(150),
            ..before.clone()
        };

        let deltas = LineUpdate::new(before.clone(), after).unwrap().deltas();
        assert_eq!(
            deltas,
            vec![BalanceDelta {
                account_id: before.account_id,
                debit: dec!(50),
                credit: dec!(0),
            }]
        );
    }

    #[test]
    fn test_account_move_yields_two_deltas() {
        let old_account = AccountId::new();
        let new_account = AccountId::new();
        let before = JournalLine::credit(old_account, date(), dec!(80));
        let after = JournalLine {
            account_id: new_account,
            ..before.clone()
        };

        let deltas = LineUpdate::new(before, after).unwrap().deltas();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].account_id, old_account);
        assert_eq!(deltas[0].net(), dec!(80));
        assert_eq!(deltas[1].account_id, new_account);
        assert_eq!(deltas[1].net(), dec!(-80));
    }

    #[test]
    fn test_soft_delete_reverses_contribution() {
        let before = JournalLine::debit(AccountId::new(), date(), dec!(40));
        let after = JournalLine {
            is_deleted: true,
            ..before.clone()
        };

        let deltas = LineUpdate::new(before, after).unwrap().deltas();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].net(), dec!(-40));
    }

    #[test]
    fn test_description_only_change_has_no_delta() {
        let before = JournalLine::debit(AccountId::new(), date(), dec!(40));
        let after = before.clone().with_description("fixed typo");
        assert!(LineUpdate::new(before, after).unwrap().deltas().is_empty());
    }

    #[test]
    fn test_rejects_mismatched_ids() {
        let before = JournalLine::debit(AccountId::new(), date(), dec!(40));
        let after = JournalLine::debit(before.account_id, date(), dec!(40));
        assert!(matches!(
            LineUpdate::new(before, after),
            Err(LedgerError::UpdateIdMismatch { .. })
        ));
    }
}
