//! Ageing repository: open balances and the ageing record cache.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use neraca_core::ageing::{
    AgeingBucket, AgeingClassifier, AgeingError, AgeingFilter, AgeingRecord, AgeingReport,
    AgeingReportService, BalanceKind, OpenBalance,
};
use neraca_shared::types::{BranchId, OpenBalanceId};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, warn};

use super::error::RepositoryError;
use crate::entities::{ageing_records, open_balances};

pub(super) fn to_open_balance(model: open_balances::Model) -> Result<OpenBalance, RepositoryError> {
    let kind = model
        .kind
        .parse::<BalanceKind>()
        .map_err(|_| RepositoryError::InvalidStoredValue {
            table: "open_balances",
            column: "kind",
            value: model.kind.clone(),
        })?;

    Ok(OpenBalance {
        id: OpenBalanceId::from_uuid(model.id),
        kind,
        party: model.party,
        document_number: model.document_number,
        invoice_date: model.invoice_date,
        due_date: model.due_date,
        remaining: model.remaining,
        branch: model.branch_id.map(BranchId::from_uuid),
    })
}

fn to_record(model: ageing_records::Model) -> Result<AgeingRecord, RepositoryError> {
    let bucket = model
        .bucket
        .parse::<AgeingBucket>()
        .map_err(|_| RepositoryError::InvalidStoredValue {
            table: "ageing_records",
            column: "bucket",
            value: model.bucket.clone(),
        })?;

    Ok(AgeingRecord {
        open_balance_id: OpenBalanceId::from_uuid(model.open_balance_id),
        invoice_date: model.invoice_date,
        due_date: model.due_date,
        days_outstanding: model.days_outstanding,
        bucket,
        computed_as_of: model.computed_as_of,
    })
}

fn record_model(record: &AgeingRecord, now: DateTimeWithTimeZone) -> ageing_records::ActiveModel {
    ageing_records::ActiveModel {
        open_balance_id: Set(record.open_balance_id.into_inner()),
        invoice_date: Set(record.invoice_date),
        due_date: Set(record.due_date),
        days_outstanding: Set(record.days_outstanding),
        bucket: Set(record.bucket.label().to_string()),
        computed_as_of: Set(record.computed_as_of),
        updated_at: Set(now),
    }
}

/// Result of an explicit ageing refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeingRefresh {
    /// Date the records were recomputed for.
    pub as_of: NaiveDate,
    /// Number of records written.
    pub refreshed: usize,
    /// Open balances that could not be classified.
    pub failures: Vec<String>,
}

/// Repository for open balances and cached ageing records.
#[derive(Debug, Clone)]
pub struct AgeingRepository {
    db: DatabaseConnection,
}

impl AgeingRepository {
    /// Creates a new ageing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads open balances with something still outstanding.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn open_balances(&self) -> Result<Vec<OpenBalance>, RepositoryError> {
        open_balances::Entity::find()
            .filter(open_balances::Column::Remaining.gt(rust_decimal::Decimal::ZERO))
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_open_balance)
            .collect()
    }

    /// Inserts an open balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_open_balance(&self, balance: &OpenBalance) -> Result<(), RepositoryError> {
        open_balances::ActiveModel {
            id: Set(balance.id.into_inner()),
            kind: Set(balance.kind.as_str().to_string()),
            party: Set(balance.party.clone()),
            document_number: Set(balance.document_number.clone()),
            invoice_date: Set(balance.invoice_date),
            due_date: Set(balance.due_date),
            remaining: Set(balance.remaining),
            branch_id: Set(balance.branch.map(BranchId::into_inner)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    /// Loads every cached ageing record.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn cached_records(
        &self,
    ) -> Result<HashMap<OpenBalanceId, AgeingRecord>, RepositoryError> {
        ageing_records::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| to_record(model).map(|r| (r.open_balance_id, r)))
            .collect()
    }

    /// Inserts or overwrites cached records.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn overwrite_records(&self, records: &[AgeingRecord]) -> Result<usize, RepositoryError> {
        if records.is_empty() {
            return Ok(0);
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        ageing_records::Entity::insert_many(records.iter().map(|r| record_model(r, now)))
            .on_conflict(
                OnConflict::column(ageing_records::Column::OpenBalanceId)
                    .update_columns([
                        ageing_records::Column::InvoiceDate,
                        ageing_records::Column::DueDate,
                        ageing_records::Column::DaysOutstanding,
                        ageing_records::Column::Bucket,
                        ageing_records::Column::ComputedAsOf,
                        ageing_records::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(records.len())
    }

    /// Inserts records for balances that have none, leaving existing rows
    /// untouched.
    ///
    /// Returns how many rows were actually inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn store_missing_records(
        &self,
        records: &[AgeingRecord],
    ) -> Result<u64, RepositoryError> {
        if records.is_empty() {
            return Ok(0);
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let inserted =
            ageing_records::Entity::insert_many(records.iter().map(|r| record_model(r, now)))
                .on_conflict(
                    OnConflict::column(ageing_records::Column::OpenBalanceId)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;

        Ok(inserted)
    }

    /// Builds the ageing feed, caching records for balances seen for the
    /// first time.
    ///
    /// Balances that already have a cached record use it verbatim. When two
    /// first reports race, the record stored first wins; only
    /// [`refresh`](Self::refresh) overwrites.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or caching fails.
    pub async fn report(
        &self,
        filter: AgeingFilter,
        as_of: NaiveDate,
    ) -> Result<AgeingReport, RepositoryError> {
        let balances = self.open_balances().await?;
        let cached = self.cached_records().await?;
        let report = AgeingReportService::build(&balances, &cached, filter, as_of);

        let fresh: Vec<AgeingRecord> = report
            .rows
            .iter()
            .filter(|row| !row.from_cache)
            .map(|row| AgeingRecord {
                open_balance_id: row.open_balance_id,
                invoice_date: row.invoice_date,
                due_date: row.due_date,
                days_outstanding: row.days_outstanding,
                bucket: row.bucket,
                computed_as_of: as_of,
            })
            .collect();
        let stored = self.store_missing_records(&fresh).await?;
        if stored > 0 {
            info!(%as_of, stored, "Cached new ageing records");
        }

        Ok(report)
    }

    /// Recomputes and overwrites every cached record at `as_of`.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or writing fails.
    pub async fn refresh(&self, as_of: NaiveDate) -> Result<AgeingRefresh, RepositoryError> {
        let balances = self.open_balances().await?;
        let (records, failures) = AgeingClassifier::refresh(&balances, as_of);

        let failures: Vec<String> = failures
            .into_iter()
            .map(|(balance, e)| {
                warn!(open_balance_id = %balance.id, error = %e, "Ageing refresh skipped open balance");
                format!("{}: {e}", balance.document_number)
            })
            .collect();
        let refreshed = self.overwrite_records(&records).await?;

        info!(%as_of, refreshed, failed = failures.len(), "Ageing records refreshed");
        Ok(AgeingRefresh {
            as_of,
            refreshed,
            failures,
        })
    }

    /// Recomputes and overwrites the cached record of one open balance.
    ///
    /// # Errors
    ///
    /// Returns `AgeingError::OpenBalanceNotFound` for an unknown id,
    /// `AgeingError::InvalidDueDate` for an unclassifiable balance, or a
    /// database error.
    pub async fn refresh_balance(
        &self,
        id: OpenBalanceId,
        as_of: NaiveDate,
    ) -> Result<AgeingRecord, RepositoryError> {
        let model = open_balances::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AgeingError::OpenBalanceNotFound(id))?;
        let balance = to_open_balance(model)?;

        let record = AgeingClassifier::record_for(&balance, as_of)?;
        self.overwrite_records(std::slice::from_ref(&record)).await?;

        info!(open_balance_id = %id, %as_of, bucket = %record.bucket, "Ageing record refreshed");
        Ok(record)
    }
}
