//! Query extractors shared by report routes.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use neraca_core::ledger::ScopeFilter;
use neraca_shared::types::{BranchId, DepartmentId, ProjectId};
use serde::Deserialize;

use crate::error::ApiError;

/// Branch, department and project restriction of a report.
///
/// `branch` takes precedence over the comma-separated `branches` list.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    /// Single branch.
    pub branch: Option<BranchId>,
    /// Comma-separated branch IDs.
    pub branches: Option<String>,
    /// Department.
    pub department: Option<DepartmentId>,
    /// Project.
    pub project: Option<ProjectId>,
}

impl ScopeQuery {
    /// Builds the ledger filter.
    ///
    /// # Errors
    ///
    /// Returns a bad request if `branches` holds an invalid ID.
    pub fn to_filter(&self) -> Result<ScopeFilter, ApiError> {
        let mut filter = match (self.branch, self.branches.as_deref()) {
            (Some(branch), _) => ScopeFilter::branch(branch),
            (None, Some(list)) => ScopeFilter::branches(parse_list(list, "branches")?),
            (None, None) => ScopeFilter::all(),
        };
        if let Some(department) = self.department {
            filter = filter.with_department(department);
        }
        if let Some(project) = self.project {
            filter = filter.with_project(project);
        }
        Ok(filter)
    }
}

/// Reporting date, defaulting to today.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    /// As of date.
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    /// The requested date or today.
    pub fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Parses a comma-separated list, skipping blank items.
///
/// # Errors
///
/// Returns a bad request naming `field` on the first item that fails to parse.
pub fn parse_list<T>(raw: &str, field: &str) -> Result<Vec<T>, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .map_err(|e| ApiError::bad_request(format!("Invalid {field} value '{item}': {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neraca_core::display::Granularity;

    #[test]
    fn test_branch_wins_over_list() {
        let branch = BranchId::new();
        let query = ScopeQuery {
            branch: Some(branch),
            branches: Some("not-a-uuid".into()),
            ..ScopeQuery::default()
        };
        assert_eq!(query.to_filter().unwrap(), ScopeFilter::branch(branch));
    }

    #[test]
    fn test_branch_list() {
        let (a, b) = (BranchId::new(), BranchId::new());
        let query = ScopeQuery {
            branches: Some(format!("{a}, {b},")),
            ..ScopeQuery::default()
        };
        assert_eq!(query.to_filter().unwrap(), ScopeFilter::branches(vec![a, b]));
    }

    #[test]
    fn test_dimensions_combine() {
        let department = DepartmentId::new();
        let project = ProjectId::new();
        let query = ScopeQuery {
            department: Some(department),
            project: Some(project),
            ..ScopeQuery::default()
        };
        assert_eq!(
            query.to_filter().unwrap(),
            ScopeFilter::all().with_department(department).with_project(project)
        );
    }

    #[test]
    fn test_invalid_branch_list() {
        let query = ScopeQuery {
            branches: Some("nope".into()),
            ..ScopeQuery::default()
        };
        let err = query.to_filter().unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
    }

    #[test]
    fn test_parse_granularity_list() {
        let parsed: Vec<Granularity> = parse_list("monthly,yearly", "periods").unwrap();
        assert_eq!(parsed, vec![Granularity::Monthly, Granularity::Yearly]);
        assert!(parse_list::<Granularity>("weekly", "periods").is_err());
    }
}
