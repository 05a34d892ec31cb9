//! Journal repository: ledger loading and reconciliation writes.

use std::sync::Arc;

use chrono::Utc;
use neraca_core::chart::ChartOfAccounts;
use neraca_core::ledger::{
    BalanceDelta, JournalLedger, JournalLine, JournalType, LedgerError, LineUpdate, Scope,
    SourceRef,
};
use neraca_core::reconciliation::{
    FixAction, FixOutcome, FixPlan, FixStatus, ReconciliationService,
};
use neraca_shared::types::{
    AccountId, BranchId, DepartmentId, JournalLineId, ProjectId, TransactionGroupId,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use tracing::{debug, info};

use super::error::RepositoryError;
use super::locks::GroupLocks;
use crate::entities::journal_lines;

/// Converts a stored row into a domain journal line.
fn to_line(model: journal_lines::Model) -> Result<JournalLine, RepositoryError> {
    let journal_type = model.journal_type.parse::<JournalType>().map_err(|_| {
        RepositoryError::InvalidStoredValue {
            table: "journal_lines",
            column: "journal_type",
            value: model.journal_type.clone(),
        }
    })?;
    let source = model
        .source
        .map(serde_json::from_value::<SourceRef>)
        .transpose()?;

    Ok(JournalLine {
        id: JournalLineId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        date: model.date,
        debit: model.debit,
        credit: model.credit,
        description: model.description,
        journal_type,
        transaction_group_id: model.transaction_group_id.map(TransactionGroupId::from_uuid),
        source,
        reference: model.reference,
        scope: Scope {
            branch: model.branch_id.map(BranchId::from_uuid),
            department: model.department_id.map(DepartmentId::from_uuid),
            project: model.project_id.map(ProjectId::from_uuid),
        },
        is_deleted: model.deleted_at.is_some(),
    })
}

fn to_active_model(
    line: &JournalLine,
    now: DateTimeWithTimeZone,
) -> Result<journal_lines::ActiveModel, RepositoryError> {
    Ok(journal_lines::ActiveModel {
        id: Set(line.id.into_inner()),
        account_id: Set(line.account_id.into_inner()),
        date: Set(line.date),
        debit: Set(line.debit),
        credit: Set(line.credit),
        description: Set(line.description.clone()),
        journal_type: Set(line.journal_type.as_str().to_string()),
        transaction_group_id: Set(line.transaction_group_id.map(TransactionGroupId::into_inner)),
        source: Set(line.source.as_ref().map(serde_json::to_value).transpose()?),
        reference: Set(line.reference.clone()),
        branch_id: Set(line.scope.branch.map(BranchId::into_inner)),
        department_id: Set(line.scope.department.map(DepartmentId::into_inner)),
        project_id: Set(line.scope.project.map(ProjectId::into_inner)),
        deleted_at: Set(line.is_deleted.then_some(now)),
        created_at: Set(now),
    })
}

/// Key for the transaction-scoped advisory lock on a group.
///
/// Distinct groups may share a key; that only makes them wait on each other.
fn advisory_key(group: TransactionGroupId) -> i64 {
    let (high, low) = group.into_inner().as_u64_pair();
    i64::from_ne_bytes((high ^ low).to_ne_bytes())
}

/// Repository for journal lines.
///
/// Clones share one [`GroupLocks`] table, so every clone serializes fixes
/// of the same transaction group.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    locks: Arc<GroupLocks>,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            locks: Arc::new(GroupLocks::new()),
        }
    }

    /// Loads every live journal line.
    ///
    /// Reports filter by date and scope in memory, and retained earnings
    /// needs to know whether any line exists at all, so nothing is cut here.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn load_ledger(&self) -> Result<JournalLedger, RepositoryError> {
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::DeletedAt.is_null())
            .order_by_asc(journal_lines::Column::Date)
            .order_by_asc(journal_lines::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_line)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(lines = lines.len(), "Loaded journal ledger");
        Ok(JournalLedger::from_lines(lines))
    }

    /// Appends a validated line.
    ///
    /// # Errors
    ///
    /// Returns a ledger error for invalid lines, or a database error.
    pub async fn append(&self, line: &JournalLine) -> Result<JournalLineId, RepositoryError> {
        JournalLedger::validate_line(line)?;
        to_active_model(line, Utc::now().into())?
            .insert(&self.db)
            .await?;
        Ok(line.id)
    }

    /// Deletes or corrects an unbalanced transaction group.
    ///
    /// Fixes of one group are serialized in-process by [`GroupLocks`] and
    /// across processes by a `pg_advisory_xact_lock` on the group, held
    /// until the fix commits. The group is read only after both locks are
    /// taken, so a fix that lost the race sees the winner's correction and
    /// reports `AlreadyBalanced`. Every write commits in one database
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns reconciliation errors (unknown group, missing correction
    /// account) or database errors. Nothing is written on error.
    pub async fn fix(
        &self,
        chart: &ChartOfAccounts,
        group: TransactionGroupId,
        action: FixAction,
        correction_account_code: &str,
    ) -> Result<FixOutcome, RepositoryError> {
        let _guard = self.locks.acquire(group).await;
        self.fix_locked(chart, group, action, correction_account_code)
            .await
    }

    async fn fix_locked(
        &self,
        chart: &ChartOfAccounts,
        group: TransactionGroupId,
        action: FixAction,
        correction_account_code: &str,
    ) -> Result<FixOutcome, RepositoryError> {
        info!(transaction_group_id = %group, %action, "Fixing transaction group");

        let txn = self.db.begin().await?;
        txn.execute(Statement::from_sql_and_values(
            txn.get_database_backend(),
            "SELECT pg_advisory_xact_lock($1)",
            [advisory_key(group).into()],
        ))
        .await?;
        let ledger = JournalLedger::from_lines(Self::lock_group(&txn, group).await?);
        let plan =
            ReconciliationService::plan_fix(&ledger, chart, group, action, correction_account_code)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let (status, difference) = match plan {
            FixPlan::AlreadyBalanced { difference } => (FixStatus::AlreadyBalanced, difference),
            FixPlan::DeleteLines {
                line_ids,
                difference,
            } => {
                let result = journal_lines::Entity::update_many()
                    .col_expr(journal_lines::Column::DeletedAt, Expr::value(now))
                    .filter(
                        journal_lines::Column::Id
                            .is_in(line_ids.iter().map(|id| id.into_inner())),
                    )
                    .exec(&txn)
                    .await?;
                let lines_removed = usize::try_from(result.rows_affected).unwrap_or(usize::MAX);
                info!(transaction_group_id = %group, lines_removed, "Transaction group deleted");
                (FixStatus::Deleted { lines_removed }, difference)
            }
            FixPlan::AppendCorrection { line, difference } => {
                JournalLedger::validate_line(&line)?;
                let amount = line.debit.max(line.credit);
                let line_id = line.id;
                to_active_model(&line, now)?.insert(&txn).await?;
                info!(
                    transaction_group_id = %group,
                    line_id = %line_id,
                    %amount,
                    "Correction line appended"
                );
                (FixStatus::Corrected { line_id, amount }, difference)
            }
        };

        txn.commit().await?;

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

    /// Reads a group's live lines with `SELECT ... FOR UPDATE`.
    async fn lock_group(
        txn: &DatabaseTransaction,
        group: TransactionGroupId,
    ) -> Result<Vec<JournalLine>, RepositoryError> {
        journal_lines::Entity::find()
            .filter(journal_lines::Column::TransactionGroupId.eq(group.into_inner()))
            .filter(journal_lines::Column::DeletedAt.is_null())
            .order_by_asc(journal_lines::Column::Date)
            .lock_exclusive()
            .all(txn)
            .await?
            .into_iter()
            .map(to_line)
            .collect()
    }

    /// Replaces a stored line with the `after` side of an update.
    ///
    /// The stored row is locked and compared with `before`; a stale update
    /// is rejected with `LedgerError::LineMismatch`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::LineNotFound`, `LedgerError::LineMismatch`,
    /// validation errors for the new version, or database errors.
    pub async fn apply_update(&self, update: LineUpdate) -> Result<Vec<BalanceDelta>, RepositoryError> {
        let id = update.before.id;
        let txn = self.db.begin().await?;

        let stored = journal_lines::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::LineNotFound(id))?;
        let created_at = stored.created_at;

        let mut ledger = JournalLedger::from_lines(vec![to_line(stored)?]);
        let after = update.after.clone();
        let deltas = ledger.apply_update(update)?;

        let mut active = to_active_model(&after, Utc::now().into())?;
        active.created_at = Set(created_at);
        active.update(&txn).await?;
        txn.commit().await?;

        info!(line_id = %id, changed_accounts = deltas.len(), "Journal line updated");
        Ok(deltas)
    }
}
