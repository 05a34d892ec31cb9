//! Ageing domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use neraca_shared::types::{BranchId, OpenBalanceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How overdue an open balance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeingBucket {
    /// Up to 30 days past due, or not yet due.
    #[serde(rename = "Current")]
    Current,
    /// 31 to 60 days past due.
    #[serde(rename = "31-60")]
    Days31To60,
    /// 61 to 90 days past due.
    #[serde(rename = "61-90")]
    Days61To90,
    /// More than 90 days past due.
    #[serde(rename = ">90")]
    Over90,
}

impl AgeingBucket {
    /// Buckets in ascending age.
    pub const ALL: [Self; 4] = [Self::Current, Self::Days31To60, Self::Days61To90, Self::Over90];

    /// Bucket for a days-outstanding count.
    #[must_use]
    pub const fn from_days(days_outstanding: i64) -> Self {
        match days_outstanding {
            ..=30 => Self::Current,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }

    /// Display and storage label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Days31To60 => "31-60",
            Self::Days61To90 => "61-90",
            Self::Over90 => ">90",
        }
    }
}

impl fmt::Display for AgeingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeingBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown ageing bucket: {s}"))
    }
}

/// Side of the ledger an open balance sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceKind {
    /// Owed by a customer.
    Receivable,
    /// Owed to a vendor.
    Payable,
}

impl BalanceKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receivable => "receivable",
            Self::Payable => "payable",
        }
    }
}

impl FromStr for BalanceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receivable" => Ok(Self::Receivable),
            "payable" => Ok(Self::Payable),
            other => Err(format!("unknown balance kind: {other}")),
        }
    }
}

/// An unpaid receivable or payable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBalance {
    /// Unique identifier.
    pub id: OpenBalanceId,
    /// Receivable or payable.
    pub kind: BalanceKind,
    /// Customer or vendor name.
    pub party: String,
    /// Originating invoice number.
    pub document_number: String,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount still outstanding.
    pub remaining: Decimal,
    /// Branch the invoice was raised in.
    pub branch: Option<BranchId>,
}

/// Cached ageing classification of one open balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeingRecord {
    /// Open balance this record belongs to.
    pub open_balance_id: OpenBalanceId,
    /// Invoice date at classification time.
    pub invoice_date: NaiveDate,
    /// Due date at classification time.
    pub due_date: NaiveDate,
    /// Days past due at `computed_as_of`.
    pub days_outstanding: i64,
    /// Bucket at `computed_as_of`.
    pub bucket: AgeingBucket,
    /// Date the record was computed for.
    pub computed_as_of: NaiveDate,
}

/// Which side of the ageing feed to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeingReportType {
    /// Receivables only.
    Receivables,
    /// Payables only.
    Payables,
    /// Both sides, with a cash-flow projection.
    #[default]
    Both,
}

impl AgeingReportType {
    /// Returns true if the report includes balances of this kind.
    #[must_use]
    pub fn includes(self, kind: BalanceKind) -> bool {
        match self {
            Self::Receivables => kind == BalanceKind::Receivable,
            Self::Payables => kind == BalanceKind::Payable,
            Self::Both => true,
        }
    }
}

/// Filter for the ageing feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeingFilter {
    /// Receivables, payables, or both.
    #[serde(default)]
    pub report_type: AgeingReportType,
    /// Restrict to one branch.
    pub branch: Option<BranchId>,
}

/// One row of the ageing feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeingRow {
    /// Open balance id.
    pub open_balance_id: OpenBalanceId,
    /// Receivable or payable.
    pub kind: BalanceKind,
    /// Customer or vendor name.
    pub party: String,
    /// Invoice number.
    pub document_number: String,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Outstanding amount.
    pub remaining: Decimal,
    /// Days past due.
    pub days_outstanding: i64,
    /// Ageing bucket.
    pub bucket: AgeingBucket,
    /// True when the values came from a cached record.
    pub from_cache: bool,
}

/// Count and amount in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Bucket.
    pub bucket: AgeingBucket,
    /// Number of open balances.
    pub count: usize,
    /// Sum of remaining amounts.
    pub amount: Decimal,
}

/// Bucketed totals for one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeingSummary {
    /// Receivable or payable.
    pub kind: BalanceKind,
    /// One entry per bucket, in ascending age, always all four.
    pub buckets: Vec<BucketSummary>,
    /// Total count.
    pub total_count: usize,
    /// Total remaining amount.
    pub total_amount: Decimal,
}

/// Expected cash movement within a horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    /// Days after the as-of date.
    pub horizon_days: u32,
    /// Receivables due within the horizon.
    pub receivables: Decimal,
    /// Payables due within the horizon.
    pub payables: Decimal,
    /// `receivables - payables`.
    pub net: Decimal,
}

/// The ageing feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeingReport {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Filter the report was built with.
    pub filter: AgeingFilter,
    /// Rows, receivables first, then by due date.
    pub rows: Vec<AgeingRow>,
    /// Receivable summary, when included.
    pub receivables: Option<AgeingSummary>,
    /// Payable summary, when included.
    pub payables: Option<AgeingSummary>,
    /// Projection at +30/+60/+90 days. Empty unless both sides are included.
    pub cash_flow: Vec<CashFlowProjection>,
    /// Open balances that could not be classified.
    pub warnings: Vec<String>,
}
