//! Journal line domain types and scope filtering.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use neraca_shared::types::{AccountId, BranchId, DepartmentId, JournalLineId, ProjectId, TransactionGroupId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::source::SourceRef;

/// Journal classification tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalType {
    /// Manual general journal.
    General,
    /// Sales and receivables.
    Sales,
    /// Purchases and payables.
    Purchase,
    /// Cash and bank movements.
    CashBank,
    /// Stock movements.
    Inventory,
    /// Period-end adjustments.
    Adjustment,
    /// Opening balance postings.
    Opening,
    /// Reconciliation correcting line.
    Correction,
}

impl JournalType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::CashBank => "cash_bank",
            Self::Inventory => "inventory",
            Self::Adjustment => "adjustment",
            Self::Opening => "opening",
            Self::Correction => "correction",
        }
    }
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "sales" => Ok(Self::Sales),
            "purchase" => Ok(Self::Purchase),
            "cash_bank" => Ok(Self::CashBank),
            "inventory" => Ok(Self::Inventory),
            "adjustment" => Ok(Self::Adjustment),
            "opening" => Ok(Self::Opening),
            "correction" => Ok(Self::Correction),
            other => Err(format!("unknown journal type: {other}")),
        }
    }
}

/// Organisational scope a journal line is posted under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Branch.
    pub branch: Option<BranchId>,
    /// Department.
    pub department: Option<DepartmentId>,
    /// Project.
    pub project: Option<ProjectId>,
}

/// Filter applied to journal lines by scope.
///
/// A single branch takes precedence over a branch set when both are given.
/// Department and project narrow the result further.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    /// Single branch.
    pub branch: Option<BranchId>,
    /// Branch set, used only when `branch` is absent.
    #[serde(default)]
    pub branches: Vec<BranchId>,
    /// Department.
    pub department: Option<DepartmentId>,
    /// Project.
    pub project: Option<ProjectId>,
}

impl ScopeFilter {
    /// Filter that matches every line.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter on one branch.
    #[must_use]
    pub fn branch(branch: BranchId) -> Self {
        Self {
            branch: Some(branch),
            ..Self::default()
        }
    }

    /// Filter on a set of branches.
    #[must_use]
    pub fn branches(branches: Vec<BranchId>) -> Self {
        Self {
            branches,
            ..Self::default()
        }
    }

    /// Narrows the filter to a department.
    #[must_use]
    pub fn with_department(mut self, department: DepartmentId) -> Self {
        self.department = Some(department);
        self
    }

    /// Narrows the filter to a project.
    #[must_use]
    pub fn with_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    /// Returns true if the filter places no constraint.
    #[must_use]
    pub fn is_unscoped(&self) -> bool {
        self.branch.is_none()
            && self.branches.is_empty()
            && self.department.is_none()
            && self.project.is_none()
    }

    /// Returns true if a line posted under `scope` passes the filter.
    #[must_use]
    pub fn matches(&self, scope: &Scope) -> bool {
        let branch_ok = match (self.branch, self.branches.is_empty()) {
            (Some(branch), _) => scope.branch == Some(branch),
            (None, false) => scope
                .branch
                .is_some_and(|branch| self.branches.contains(&branch)),
            (None, true) => true,
        };

        branch_ok
            && self.department.is_none_or(|d| scope.department == Some(d))
            && self.project.is_none_or(|p| scope.project == Some(p))
    }
}

/// A single journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: JournalLineId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Posting date.
    pub date: NaiveDate,
    /// Debit amount (zero or positive).
    pub debit: Decimal,
    /// Credit amount (zero or positive).
    pub credit: Decimal,
    /// Line description.
    pub description: String,
    /// Journal classification.
    pub journal_type: JournalType,
    /// Business event this line belongs to.
    pub transaction_group_id: Option<TransactionGroupId>,
    /// Originating document.
    pub source: Option<SourceRef>,
    /// Free-form reference number.
    pub reference: Option<String>,
    /// Organisational scope.
    #[serde(default)]
    pub scope: Scope,
    /// Soft-delete flag. Deleted lines never contribute to balances.
    #[serde(default)]
    pub is_deleted: bool,
}

impl JournalLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, date: NaiveDate, amount: Decimal) -> Self {
        Self::new(account_id, date, amount, Decimal::ZERO)
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, date: NaiveDate, amount: Decimal) -> Self {
        Self::new(account_id, date, Decimal::ZERO, amount)
    }

    fn new(account_id: AccountId, date: NaiveDate, debit: Decimal, credit: Decimal) -> Self {
        Self {
            id: JournalLineId::new(),
            account_id,
            date,
            debit,
            credit,
            description: String::new(),
            journal_type: JournalType::General,
            transaction_group_id: None,
            source: None,
            reference: None,
            scope: Scope::default(),
            is_deleted: false,
        }
    }

    /// Assigns the line to a transaction group.
    #[must_use]
    pub fn in_group(mut self, group: TransactionGroupId) -> Self {
        self.transaction_group_id = Some(group);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the journal type.
    #[must_use]
    pub fn with_journal_type(mut self, journal_type: JournalType) -> Self {
        self.journal_type = journal_type;
        self
    }

    /// Sets the organisational scope.
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the originating document.
    #[must_use]
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns `debit - credit`.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns true if the line counts toward balances.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        !self.is_deleted
    }

    /// Returns true if the line is posted, dated on or before `as_of`, and in scope.
    #[must_use]
    pub fn counts_at(&self, as_of: NaiveDate, filter: &ScopeFilter) -> bool {
        self.is_posted() && self.date <= as_of && filter.matches(&self.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scope(branch: Option<BranchId>) -> Scope {
        Scope {
            branch,
            ..Scope::default()
        }
    }

    #[test]
    fn test_unscoped_filter_matches_everything() {
        let filter = ScopeFilter::all();
        assert!(filter.is_unscoped());
        assert!(filter.matches(&Scope::default()));
        assert!(filter.matches(&scope(Some(BranchId::new()))));
    }

    #[test]
    fn test_single_branch_takes_precedence_over_branch_set() {
        let jakarta = BranchId::new();
        let bandung = BranchId::new();
        let filter = ScopeFilter {
            branch: Some(jakarta),
            branches: vec![bandung],
            ..ScopeFilter::default()
        };

        assert!(filter.matches(&scope(Some(jakarta))));
        assert!(!filter.matches(&scope(Some(bandung))));
        assert!(!filter.matches(&scope(None)));
    }

    #[test]
    fn test_branch_set() {
        let jakarta = BranchId::new();
        let bandung = BranchId::new();
        let filter = ScopeFilter::branches(vec![jakarta, bandung]);

        assert!(filter.matches(&scope(Some(bandung))));
        assert!(!filter.matches(&scope(Some(BranchId::new()))));
        assert!(!filter.matches(&scope(None)));
    }

    #[test]
    fn test_department_and_project_narrow() {
        let department = DepartmentId::new();
        let project = ProjectId::new();
        let filter = ScopeFilter::all()
            .with_department(department)
            .with_project(project);

        let full = Scope {
            branch: None,
            department: Some(department),
            project: Some(project),
        };
        assert!(filter.matches(&full));
        assert!(!filter.matches(&Scope {
            project: None,
            ..full
        }));
    }

    #[test]
    fn test_counts_at() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let line = JournalLine::debit(AccountId::new(), date, dec!(100));
        assert!(line.counts_at(date, &ScopeFilter::all()));
        assert!(!line.counts_at(date.pred_opt().unwrap(), &ScopeFilter::all()));

        let deleted = JournalLine {
            is_deleted: true,
            ..line
        };
        assert!(!deleted.counts_at(date, &ScopeFilter::all()));
    }

    #[test]
    fn test_net() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(JournalLine::debit(AccountId::new(), date, dec!(75)).net(), dec!(75));
        assert_eq!(JournalLine::credit(AccountId::new(), date, dec!(75)).net(), dec!(-75));
    }

    #[test]
    fn test_journal_type_parse() {
        assert_eq!("correction".parse::<JournalType>().unwrap(), JournalType::Correction);
        assert_eq!("CASH_BANK".parse::<JournalType>().unwrap(), JournalType::CashBank);
        assert!("payroll".parse::<JournalType>().is_err());
    }
}
