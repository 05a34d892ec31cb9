//! Ageing feed composition.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use neraca_shared::types::OpenBalanceId;
use rust_decimal::Decimal;
use tracing::warn;

use super::classifier::AgeingClassifier;
use super::types::{
    AgeingBucket, AgeingFilter, AgeingRecord, AgeingReport, AgeingReportType, AgeingRow,
    AgeingSummary, BalanceKind, BucketSummary, CashFlowProjection, OpenBalance,
};

/// Cash-flow projection horizons, in days after the as-of date.
pub const CASH_FLOW_HORIZONS: [u32; 3] = [30, 60, 90];

/// Builds the ageing feed.
pub struct AgeingReportService;

impl AgeingReportService {
    /// Builds rows, bucket summaries and the cash-flow projection.
    ///
    /// Balances with nothing remaining are skipped. A balance that cannot be
    /// classified is reported in `warnings` and left out of the totals.
    #[must_use]
    pub fn build(
        balances: &[OpenBalance],
        cached: &HashMap<OpenBalanceId, AgeingRecord>,
        filter: AgeingFilter,
        as_of: NaiveDate,
    ) -> AgeingReport {
        let mut rows = Vec::new();
        let mut warnings = Vec::new();

        for balance in balances.iter().filter(|b| {
            b.remaining > Decimal::ZERO
                && filter.report_type.includes(b.kind)
                && filter.branch.is_none_or(|branch| b.branch == Some(branch))
        }) {
            match AgeingClassifier::resolve(balance, cached.get(&balance.id), as_of) {
                Ok(resolved) => rows.push(AgeingRow {
                    open_balance_id: balance.id,
                    kind: balance.kind,
                    party: balance.party.clone(),
                    document_number: balance.document_number.clone(),
                    invoice_date: resolved.record.invoice_date,
                    due_date: resolved.record.due_date,
                    remaining: balance.remaining,
                    days_outstanding: resolved.record.days_outstanding,
                    bucket: resolved.record.bucket,
                    from_cache: resolved.from_cache,
                }),
                Err(e) => {
                    warn!(open_balance_id = %balance.id, error = %e, "Skipping open balance in ageing feed");
                    warnings.push(format!("{}: {e}", balance.document_number));
                }
            }
        }

        rows.sort_by(|a, b| {
            (a.kind == BalanceKind::Payable, a.due_date, &a.document_number).cmp(&(
                b.kind == BalanceKind::Payable,
                b.due_date,
                &b.document_number,
            ))
        });

        let receivables = filter
            .report_type
            .includes(BalanceKind::Receivable)
            .then(|| Self::summarize(&rows, BalanceKind::Receivable));
        let payables = filter
            .report_type
            .includes(BalanceKind::Payable)
            .then(|| Self::summarize(&rows, BalanceKind::Payable));
        let cash_flow = if filter.report_type == AgeingReportType::Both {
            Self::project_cash_flow(&rows, as_of)
        } else {
            Vec::new()
        };

        AgeingReport {
            as_of,
            filter,
            rows,
            receivables,
            payables,
            cash_flow,
            warnings,
        }
    }

    /// Bucketed count and amount for one side. All four buckets are present.
    #[must_use]
    pub fn summarize(rows: &[AgeingRow], kind: BalanceKind) -> AgeingSummary {
        let mut buckets: Vec<BucketSummary> = AgeingBucket::ALL
            .into_iter()
            .map(|bucket| BucketSummary {
                bucket,
                count: 0,
                amount: Decimal::ZERO,
            })
            .collect();

        for row in rows.iter().filter(|r| r.kind == kind) {
            if let Some(summary) = buckets.iter_mut().find(|s| s.bucket == row.bucket) {
                summary.count += 1;
                summary.amount += row.remaining;
            }
        }

        AgeingSummary {
            kind,
            total_count: buckets.iter().map(|b| b.count).sum(),
            total_amount: buckets.iter().map(|b| b.amount).sum(),
            buckets,
        }
    }

    /// Sum of balances due on or before `as_of + N` for each horizon.
    #[must_use]
    pub fn project_cash_flow(rows: &[AgeingRow], as_of: NaiveDate) -> Vec<CashFlowProjection> {
        CASH_FLOW_HORIZONS
            .into_iter()
            .map(|horizon_days| {
                let limit = as_of
                    .checked_add_days(Days::new(u64::from(horizon_days)))
                    .unwrap_or(NaiveDate::MAX);
                let due_by = |kind: BalanceKind| -> Decimal {
                    rows.iter()
                        .filter(|r| r.kind == kind && r.due_date <= limit)
                        .map(|r| r.remaining)
                        .sum()
                };
                let receivables = due_by(BalanceKind::Receivable);
                let payables = due_by(BalanceKind::Payable);
                CashFlowProjection {
                    horizon_days,
                    receivables,
                    payables,
                    net: receivables - payables,
                }
            })
            .collect()
    }
}
