//! Reconciliation service.

use std::collections::HashMap;

use chrono::NaiveDate;
use neraca_shared::types::{AccountId, TransactionGroupId, exceeds_tolerance, within_tolerance};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::error::ReconciliationError;
use super::types::{FixAction, FixOutcome, FixPlan, FixStatus, UnbalancedGroup};
use crate::chart::ChartOfAccounts;
use crate::ledger::{JournalLedger, JournalLine, JournalType, Scope, ScopeFilter, SourceRef};

/// Stateless service for finding and repairing unbalanced transaction groups.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Transaction groups whose debits and credits at `as_of` differ by more
    /// than the tolerance, in order of first appearance.
    #[must_use]
    pub fn find_unbalanced(
        ledger: &JournalLedger,
        as_of: NaiveDate,
        scope: &ScopeFilter,
    ) -> Vec<UnbalancedGroup> {
        let mut order = Vec::new();
        let mut groups: HashMap<TransactionGroupId, Vec<&JournalLine>> = HashMap::new();
        for line in ledger.lines_at(as_of, scope) {
            if let Some(group) = line.transaction_group_id {
                groups
                    .entry(group)
                    .or_insert_with(|| {
                        order.push(group);
                        Vec::new()
                    })
                    .push(line);
            }
        }

        order
            .into_iter()
            .filter_map(|group| {
                let lines = groups.remove(&group)?;
                let (total_debit, total_credit) = Self::totals(lines.iter().copied());
                let difference = total_debit - total_credit;

                exceeds_tolerance(difference).then(|| UnbalancedGroup {
                    transaction_group_id: group,
                    lines: lines.into_iter().cloned().collect(),
                    total_debit,
                    total_credit,
                    difference,
                })
            })
            .collect()
    }

    /// Sums debits and credits.
    #[must_use]
    pub fn totals<'a>(lines: impl Iterator<Item = &'a JournalLine>) -> (Decimal, Decimal) {
        lines.fold((Decimal::ZERO, Decimal::ZERO), |(debit, credit), l| {
            (debit + l.debit, credit + l.credit)
        })
    }

    /// Decides what a fix does, from the group's current posted lines.
    ///
    /// The group is judged over all its lines regardless of date, so a
    /// correction appended earlier counts toward the balance.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group has no posted lines and
    /// `CorrectionAccountMissing` if a correction is requested but the
    /// correction account is not in the chart.
    pub fn plan_fix(
        ledger: &JournalLedger,
        chart: &ChartOfAccounts,
        group: TransactionGroupId,
        action: FixAction,
        correction_account_code: &str,
    ) -> Result<FixPlan, ReconciliationError> {
        let lines = ledger.group_lines(group);
        if lines.is_empty() {
            return Err(ReconciliationError::GroupNotFound(group));
        }

        let (total_debit, total_credit) = Self::totals(lines.iter().copied());
        let difference = total_debit - total_credit;
        if within_tolerance(total_debit, total_credit) {
            return Ok(FixPlan::AlreadyBalanced { difference });
        }

        match action {
            FixAction::Delete => Ok(FixPlan::DeleteLines {
                line_ids: lines.iter().map(|l| l.id).collect(),
                difference,
            }),
            FixAction::Correct => {
                let Some(account) = chart.by_code(correction_account_code) else {
                    warn!(
                        transaction_group_id = %group,
                        correction_account_code,
                        "Correction account missing from chart"
                    );
                    return Err(ReconciliationError::CorrectionAccountMissing(
                        correction_account_code.to_string(),
                    ));
                };

                let date = lines.iter().map(|l| l.date).max().unwrap_or_default();
                let scope = common_scope(&lines);
                let line = Self::correction_line(group, difference, account.id, date, scope);
                Ok(FixPlan::AppendCorrection { line, difference })
            }
        }
    }

    /// Builds the single line that offsets `difference`.
    ///
    /// A debit excess is offset with a credit and a credit excess with a debit.
    #[must_use]
    pub fn correction_line(
        group: TransactionGroupId,
        difference: Decimal,
        account_id: AccountId,
        date: NaiveDate,
        scope: Scope,
    ) -> JournalLine {
        let amount = difference.abs();
        let line = if difference > Decimal::ZERO {
            JournalLine::credit(account_id, date, amount)
        } else {
            JournalLine::debit(account_id, date, amount)
        };

        JournalLine {
            reference: Some(format!("CORRECTION-{group}")),
            ..line
        }
        .in_group(group)
        .with_journal_type(JournalType::Correction)
        .with_source(SourceRef::Correction {
            transaction_group_id: group,
        })
        .with_scope(scope)
        .with_description(format!(
            "Correcting entry for unbalanced transaction {group} (difference {difference})"
        ))
    }

    /// Plans and applies a fix to an in-memory ledger.
    ///
    /// The exclusive borrow serializes fixes; a second fix of the same group
    /// sees the first one's line and reports `AlreadyBalanced`.
    ///
    /// # Errors
    ///
    /// See [`ReconciliationService::plan_fix`].
    pub fn fix(
        ledger: &mut JournalLedger,
        chart: &ChartOfAccounts,
        group: TransactionGroupId,
        action: FixAction,
        correction_account_code: &str,
    ) -> Result<FixOutcome, ReconciliationError> {
        info!(transaction_group_id = %group, %action, "Fixing transaction group");
        let plan = Self::plan_fix(ledger, chart, group, action, correction_account_code)?;
        let (status, difference) = Self::apply(ledger, group, plan)?;

        let outcome = FixOutcome::new(group, action, status, difference);
        info!(
            transaction_group_id = %group,
            %action,
            %difference,
            status = ?outcome.status,
            "Transaction group fix finished"
        );
        Ok(outcome)
    }

    fn apply(
        ledger: &mut JournalLedger,
        group: TransactionGroupId,
        plan: FixPlan,
    ) -> Result<(FixStatus, Decimal), ReconciliationError> {
        match plan {
            FixPlan::AlreadyBalanced { difference } => Ok((FixStatus::AlreadyBalanced, difference)),
            FixPlan::DeleteLines { difference, .. } => {
                let lines_removed = ledger.soft_delete_group(group)?;
                Ok((FixStatus::Deleted { lines_removed }, difference))
            }
            FixPlan::AppendCorrection { line, difference } => {
                let amount = line.debit.max(line.credit);
                let line_id = ledger.append(line)?;
                Ok((FixStatus::Corrected { line_id, amount }, difference))
            }
        }
    }
}

/// Scope shared by every line, or the empty scope if they differ.
fn common_scope(lines: &[&JournalLine]) -> Scope {
    match lines.split_first() {
        Some((first, rest)) if rest.iter().all(|l| l.scope == first.scope) => first.scope,
        _ => Scope::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neraca_shared::types::BranchId;
    use rust_decimal_macros::dec;

    use crate::chart::{Account, AccountType};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    struct Fixture {
        chart: ChartOfAccounts,
        ledger: JournalLedger,
        group: TransactionGroupId,
        cash: Account,
    }

    /// One unbalanced group (debit 150,000 vs credit 100,000) and one balanced group.
    fn fixture() -> Fixture {
        let cash = Account::new("1-1100", "Cash", AccountType::Asset);
        let sales = Account::new("4-1000", "Sales", AccountType::Revenue);
        let retained = Account::new("3100", "Retained Earnings", AccountType::Equity);
        let chart =
            ChartOfAccounts::from_accounts(vec![cash.clone(), sales.clone(), retained]).unwrap();

        let group = TransactionGroupId::new();
        let balanced = TransactionGroupId::new();
        let mut ledger = JournalLedger::new();
        ledger
            .append(JournalLine::debit(cash.id, date(5), dec!(150000)).in_group(group))
            .unwrap();
        ledger
            .append(JournalLine::credit(sales.id, date(6), dec!(100000)).in_group(group))
            .unwrap();
        ledger
            .append(JournalLine::debit(cash.id, date(7), dec!(20)).in_group(balanced))
            .unwrap();
        ledger
            .append(JournalLine::credit(sales.id, date(7), dec!(20)).in_group(balanced))
            .unwrap();

        Fixture {
            chart,
            ledger,
            group,
            cash,
        }
    }

    #[test]
    fn test_find_unbalanced() {
        let f = fixture();
        let unbalanced = ReconciliationService::find_unbalanced(&f.ledger, date(31), &ScopeFilter::all());

        assert_eq!(unbalanced.len(), 1);
        let group = &unbalanced[0];
        assert_eq!(group.transaction_group_id, f.group);
        assert_eq!(group.lines.len(), 2);
        assert_eq!(group.total_debit, dec!(150000));
        assert_eq!(group.total_credit, dec!(100000));
        assert_eq!(group.difference, dec!(50000));
    }

    #[test]
    fn test_find_unbalanced_across_many_groups() {
        let f = fixture();
        let mut ledger = f.ledger;
        let cash = f.cash.id;
        let mut expected = vec![f.group];

        // Every third group is short by a third of its amount; the rest balance.
        for i in 1..=300u32 {
            let group = TransactionGroupId::new();
            let amount = Decimal::from(i);
            let short = if i % 3 == 0 { Decimal::from(i / 3) } else { Decimal::ZERO };
            ledger
                .append(JournalLine::debit(cash, date(10), amount).in_group(group))
                .unwrap();
            ledger
                .append(JournalLine::credit(cash, date(11), amount - short).in_group(group))
                .unwrap();
            if short > Decimal::ZERO {
                expected.push(group);
            }
        }

        let unbalanced = ReconciliationService::find_unbalanced(&ledger, date(31), &ScopeFilter::all());
        let found: Vec<TransactionGroupId> =
            unbalanced.iter().map(|g| g.transaction_group_id).collect();
        assert_eq!(found, expected);
        assert_eq!(unbalanced.len(), 101);
        assert!(unbalanced.iter().all(|g| g.lines.len() == 2));
        assert_eq!(unbalanced[1].difference, dec!(1));
        assert_eq!(unbalanced[100].difference, dec!(100));
    }

    #[test]
    fn test_find_unbalanced_respects_cutoff() {
        let f = fixture();
        // On the 5th only the debit side exists.
        let early = ReconciliationService::find_unbalanced(&f.ledger, date(5), &ScopeFilter::all());
        assert_eq!(early[0].difference, dec!(150000));
        assert!(ReconciliationService::find_unbalanced(&f.ledger, date(4), &ScopeFilter::all()).is_empty());
    }

    #[test]
    fn test_tolerance_boundary() {
        let account = AccountId::new();
        let group = TransactionGroupId::new();
        let mut ledger = JournalLedger::new();
        ledger
            .append(JournalLine::debit(account, date(1), dec!(100.01)).in_group(group))
            .unwrap();
        ledger
            .append(JournalLine::credit(account, date(1), dec!(100)).in_group(group))
            .unwrap();
        assert!(ReconciliationService::find_unbalanced(&ledger, date(1), &ScopeFilter::all()).is_empty());
    }

    #[test]
    fn test_correct_round_trip() {
        let mut f = fixture();
        let outcome =
            ReconciliationService::fix(&mut f.ledger, &f.chart, f.group, FixAction::Correct, "3100")
                .unwrap();

        let FixStatus::Corrected { line_id, amount } = outcome.status else {
            panic!("expected a correction, got {:?}", outcome.status);
        };
        assert_eq!(amount, dec!(50000));
        assert_eq!(outcome.difference, dec!(50000));

        let line = f.ledger.get(line_id).unwrap();
        assert_eq!(line.credit, dec!(50000));
        assert_eq!(line.debit, dec!(0));
        assert_eq!(line.account_id, f.chart.by_code("3100").unwrap().id);
        assert_eq!(line.journal_type, JournalType::Correction);
        assert_eq!(line.transaction_group_id, Some(f.group));
        assert_eq!(line.date, date(6));
        assert_eq!(f.ledger.group_lines(f.group).len(), 3);

        assert!(ReconciliationService::find_unbalanced(&f.ledger, date(31), &ScopeFilter::all()).is_empty());
    }

    #[test]
    fn test_credit_excess_gets_debit_line() {
        let mut f = fixture();
        let group = TransactionGroupId::new();
        f.ledger
            .append(JournalLine::credit(f.cash.id, date(9), dec!(75)).in_group(group))
            .unwrap();

        let plan =
            ReconciliationService::plan_fix(&f.ledger, &f.chart, group, FixAction::Correct, "3100")
                .unwrap();
        let FixPlan::AppendCorrection { line, difference } = plan else {
            panic!("expected a correction plan");
        };
        assert_eq!(difference, dec!(-75));
        assert_eq!(line.debit, dec!(75));
        assert_eq!(line.credit, dec!(0));
    }

    #[test]
    fn test_second_correct_is_informational() {
        let mut f = fixture();
        ReconciliationService::fix(&mut f.ledger, &f.chart, f.group, FixAction::Correct, "3100")
            .unwrap();
        let second =
            ReconciliationService::fix(&mut f.ledger, &f.chart, f.group, FixAction::Correct, "3100")
                .unwrap();

        assert_eq!(second.status, FixStatus::AlreadyBalanced);
        assert_eq!(f.ledger.group_lines(f.group).len(), 3);
    }

    #[test]
    fn test_delete_removes_group() {
        let mut f = fixture();
        let outcome =
            ReconciliationService::fix(&mut f.ledger, &f.chart, f.group, FixAction::Delete, "3100")
                .unwrap();

        assert_eq!(outcome.status, FixStatus::Deleted { lines_removed: 2 });
        assert!(f.ledger.group_lines(f.group).is_empty());
        assert!(ReconciliationService::find_unbalanced(&f.ledger, date(31), &ScopeFilter::all()).is_empty());
    }

    #[test]
    fn test_missing_correction_account() {
        let f = fixture();
        let err =
            ReconciliationService::plan_fix(&f.ledger, &f.chart, f.group, FixAction::Correct, "9999")
                .unwrap_err();
        assert_eq!(err, ReconciliationError::CorrectionAccountMissing("9999".into()));
    }

    #[test]
    fn test_unknown_group() {
        let f = fixture();
        let missing = TransactionGroupId::new();
        let err = ReconciliationService::plan_fix(
            &f.ledger,
            &f.chart,
            missing,
            FixAction::Delete,
            "3100",
        )
        .unwrap_err();
        assert_eq!(err, ReconciliationError::GroupNotFound(missing));
    }

    #[test]
    fn test_correction_keeps_shared_scope() {
        let mut f = fixture();
        let branch = BranchId::new();
        let scope = Scope {
            branch: Some(branch),
            ..Scope::default()
        };
        let group = TransactionGroupId::new();
        f.ledger
            .append(
                JournalLine::debit(f.cash.id, date(10), dec!(30))
                    .in_group(group)
                    .with_scope(scope),
            )
            .unwrap();

        let plan =
            ReconciliationService::plan_fix(&f.ledger, &f.chart, group, FixAction::Correct, "3100")
                .unwrap();
        let FixPlan::AppendCorrection { line, .. } = plan else {
            panic!("expected a correction plan");
        };
        assert_eq!(line.scope, scope);
    }

    #[test]
    fn test_fix_action_parse() {
        assert_eq!("delete".parse::<FixAction>().unwrap(), FixAction::Delete);
        assert_eq!("correct".parse::<FixAction>().unwrap(), FixAction::Correct);
        assert!(matches!(
            "void".parse::<FixAction>(),
            Err(ReconciliationError::UnknownAction(_))
        ));
    }

}
