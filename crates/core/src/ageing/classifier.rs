//! Ageing classification.

use chrono::NaiveDate;
use tracing::debug;

use super::error::AgeingError;
use super::types::{AgeingBucket, AgeingRecord, OpenBalance};

/// Classification result, flagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAgeing {
    /// Ageing values.
    pub record: AgeingRecord,
    /// True when a cached record was used verbatim.
    pub from_cache: bool,
}

/// Service for ageing open balances.
pub struct AgeingClassifier;

impl AgeingClassifier {
    /// Days past due and bucket as of a date.
    ///
    /// Days outstanding is `as_of - due_date`. Balances not yet due have a
    /// negative count and fall in `Current`.
    ///
    /// # Errors
    ///
    /// Returns `AgeingError::InvalidDueDate` if the due date precedes the invoice date.
    pub fn classify(
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<(i64, AgeingBucket), AgeingError> {
        if due_date < invoice_date {
            return Err(AgeingError::InvalidDueDate {
                invoice_date,
                due_date,
            });
        }
        let days = (as_of - due_date).num_days();
        Ok((days, AgeingBucket::from_days(days)))
    }

    /// Fresh record for an open balance.
    ///
    /// # Errors
    ///
    /// See [`AgeingClassifier::classify`].
    pub fn record_for(balance: &OpenBalance, as_of: NaiveDate) -> Result<AgeingRecord, AgeingError> {
        let (days_outstanding, bucket) =
            Self::classify(balance.invoice_date, balance.due_date, as_of)?;
        Ok(AgeingRecord {
            open_balance_id: balance.id,
            invoice_date: balance.invoice_date,
            due_date: balance.due_date,
            days_outstanding,
            bucket,
            computed_as_of: as_of,
        })
    }

    /// Uses the cached record verbatim when present, otherwise classifies afresh.
    ///
    /// A cached record is not recomputed even if `as_of` has moved on; use
    /// [`AgeingClassifier::refresh`] to bring records up to date.
    ///
    /// # Errors
    ///
    /// See [`AgeingClassifier::classify`].
    pub fn resolve(
        balance: &OpenBalance,
        cached: Option<&AgeingRecord>,
        as_of: NaiveDate,
    ) -> Result<ResolvedAgeing, AgeingError> {
        if let Some(record) = cached.filter(|r| r.open_balance_id == balance.id) {
            debug!(
                open_balance_id = %balance.id,
                computed_as_of = %record.computed_as_of,
                "Using cached ageing record"
            );
            return Ok(ResolvedAgeing {
                record: record.clone(),
                from_cache: true,
            });
        }

        debug!(open_balance_id = %balance.id, %as_of, "Classifying open balance");
        Ok(ResolvedAgeing {
            record: Self::record_for(balance, as_of)?,
            from_cache: false,
        })
    }

    /// Recomputes records for every open balance at `as_of`.
    ///
    /// Balances that fail classification are returned separately so the
    /// caller can report them without losing the rest.
    #[must_use]
    pub fn refresh(
        balances: &[OpenBalance],
        as_of: NaiveDate,
    ) -> (Vec<AgeingRecord>, Vec<(OpenBalance, AgeingError)>) {
        let mut records = Vec::with_capacity(balances.len());
        let mut failures = Vec::new();
        for balance in balances {
            match Self::record_for(balance, as_of) {
                Ok(record) => records.push(record),
                Err(e) => failures.push((balance.clone(), e)),
            }
        }
        (records, failures)
    }
}
