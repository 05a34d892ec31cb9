//! Multi-period expansion of balance sheet totals.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::ChartOfAccounts;
use crate::ledger::{JournalLedger, ScopeFilter};
use crate::reports::{FinancialPositionService, PositionTotals};

/// Spacing of historical points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Trailing 12 month ends.
    Monthly,
    /// Trailing 4 quarter ends.
    Quarterly,
    /// Trailing 3 year ends.
    Yearly,
}

impl Granularity {
    /// All granularities.
    pub const ALL: [Self; 3] = [Self::Monthly, Self::Quarterly, Self::Yearly];

    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Number of trailing points.
    #[must_use]
    pub const fn point_count(self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Yearly => 3,
        }
    }

    const fn step_months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        }
    }

    /// Period-end dates and labels trailing `base`, oldest first.
    ///
    /// Each point is the end of the period that contains `base` shifted
    /// back by whole periods, so the last point may fall after `base`.
    #[must_use]
    pub fn points(self, base: NaiveDate) -> Vec<(String, NaiveDate)> {
        (0..self.point_count())
            .rev()
            .filter_map(|i| {
                let shifted = base.checked_sub_months(Months::new(i * self.step_months()))?;
                let end = match self {
                    Self::Monthly => end_of_month(shifted)?,
                    Self::Quarterly => end_of_quarter(shifted)?,
                    Self::Yearly => NaiveDate::from_ymd_opt(shifted.year(), 12, 31)?,
                };
                Some((self.label(end), end))
            })
            .collect()
    }

    fn label(self, end: NaiveDate) -> String {
        match self {
            Self::Monthly => end.format("%b %Y").to_string(),
            Self::Quarterly => format!("Q{} {}", end.month().div_ceil(3), end.year()),
            Self::Yearly => end.year().to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("unknown period granularity: {s}"))
    }
}

fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn end_of_quarter(date: NaiveDate) -> Option<NaiveDate> {
    let last_month = date.month().div_ceil(3) * 3;
    end_of_month(NaiveDate::from_ymd_opt(date.year(), last_month, 1)?)
}

/// Totals recomputed at one historical point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPoint {
    /// Human-readable period label ("Mar 2025", "Q1 2025", "2025").
    pub period: String,
    /// Period-end date the totals were computed at.
    pub date: NaiveDate,
    /// Totals and balanced flag at `date`.
    pub data: PositionTotals,
}

/// Historical points keyed by granularity.
pub type MultiPeriodData = BTreeMap<Granularity, Vec<PeriodPoint>>;

/// Recomputes reduced snapshots across trailing periods.
pub struct MultiPeriodExpander;

impl MultiPeriodExpander {
    /// Expands totals for each requested granularity.
    ///
    /// Every point is an independent read of the ledger, so points are
    /// computed in parallel. Duplicate granularities collapse into one entry.
    #[must_use]
    pub fn expand(
        chart: &ChartOfAccounts,
        ledger: &JournalLedger,
        base: NaiveDate,
        scope: &ScopeFilter,
        granularities: &[Granularity],
    ) -> MultiPeriodData {
        let mut requested = granularities.to_vec();
        requested.sort_unstable();
        requested.dedup();

        let marks: Vec<(Granularity, String, NaiveDate)> = requested
            .iter()
            .flat_map(|&g| g.points(base).into_iter().map(move |(label, date)| (g, label, date)))
            .collect();

        debug!(%base, points = marks.len(), "Expanding balance sheet across periods");

        let computed: Vec<(Granularity, PeriodPoint)> = marks
            .into_par_iter()
            .map(|(granularity, period, date)| {
                let data = FinancialPositionService::totals_at(chart, ledger, date, scope);
                (granularity, PeriodPoint { period, date, data })
            })
            .collect();

        let mut expanded = MultiPeriodData::new();
        for (granularity, point) in computed {
            expanded.entry(granularity).or_default().push(point);
        }
        expanded
    }
}
