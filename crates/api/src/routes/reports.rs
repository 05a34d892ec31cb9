//! Balance sheet report routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::NaiveDate;
use neraca_core::balance::AccountBalance;
use neraca_core::display::{BalanceSheetService, BalanceSheetView, DisplayMode, DisplayOptions, Granularity};
use neraca_core::ledger::{SourcedLine, resolve_lines};
use neraca_core::reports::{
    BalanceSheetSummary, FinancialPositionService, FinancialPositionSnapshot, PeriodComparison,
    ReportError,
};
use neraca_shared::types::{AccountId, PageRequest, PageResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{compute, load_books};
use crate::query::{AsOfQuery, ScopeQuery, parse_list};
use crate::{AppState, error::ApiError};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/financial-position", get(get_financial_position))
        .route("/reports/balance-sheet", get(get_balance_sheet))
        .route("/reports/balance-sheet/summary", get(get_summary))
        .route("/reports/balance-sheet/compare", get(get_comparison))
        .route("/accounts/{account_id}/drilldown", get(get_drilldown))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters for the rendered balance sheet.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceSheetQuery {
    /// `total_only`, `parent_only`, `detailed` or `with_zero`.
    pub mode: Option<String>,
    /// Keep zero-balance rows in any mode.
    #[serde(default)]
    pub include_zero: bool,
    /// Comma-separated granularities for multi-period data.
    pub periods: Option<String>,
}

impl BalanceSheetQuery {
    fn options(&self) -> Result<DisplayOptions, ApiError> {
        let mode = match self.mode.as_deref() {
            Some(raw) => raw.parse::<DisplayMode>().map_err(ApiError::bad_request)?,
            None => DisplayMode::default(),
        };
        Ok(DisplayOptions {
            mode,
            include_zero_balances: self.include_zero,
        })
    }

    fn granularities(&self) -> Result<Vec<Granularity>, ApiError> {
        self.periods
            .as_deref()
            .map_or_else(|| Ok(Vec::new()), |raw| parse_list(raw, "periods"))
    }
}

/// Query parameters for a two-date comparison.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    /// Later date (defaults to today).
    pub current: Option<NaiveDate>,
    /// Earlier date.
    pub previous: NaiveDate,
}

// ============================================================================
// Response Types
// ============================================================================

/// One account's balance with a page of the lines behind it.
#[derive(Debug, Serialize)]
pub struct DrilldownResponse {
    /// As of date.
    pub as_of: NaiveDate,
    /// Account balance at `as_of`.
    pub account: AccountBalance,
    /// Journal lines, newest first, with their source documents.
    pub entries: PageResponse<SourcedLine>,
    /// Sources on this page that could not be resolved.
    pub warnings: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_financial_position(
    State(state): State<AppState>,
    Query(as_of): Query<AsOfQuery>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<FinancialPositionSnapshot>, ApiError> {
    let as_of = as_of.date();
    let scope = scope.to_filter()?;
    let (chart, ledger) = load_books(&state).await?;

    let snapshot =
        compute(move || FinancialPositionService::compose(&chart, &ledger, as_of, &scope)).await?;
    Ok(Json(snapshot))
}

async fn get_balance_sheet(
    State(state): State<AppState>,
    Query(as_of): Query<AsOfQuery>,
    Query(scope): Query<ScopeQuery>,
    Query(params): Query<BalanceSheetQuery>,
) -> Result<Json<BalanceSheetView>, ApiError> {
    let as_of = as_of.date();
    let scope = scope.to_filter()?;
    let options = params.options()?;
    let granularities = params.granularities()?;
    debug!(%as_of, mode = %options.mode, periods = granularities.len(), "Building balance sheet");

    let (chart, ledger) = load_books(&state).await?;
    let view = compute(move || {
        BalanceSheetService::balance_sheet_data(&chart, &ledger, as_of, &scope, options, &granularities)
    })
    .await?;
    Ok(Json(view))
}

async fn get_summary(
    State(state): State<AppState>,
    Query(as_of): Query<AsOfQuery>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<BalanceSheetSummary>, ApiError> {
    let as_of = as_of.date();
    let scope = scope.to_filter()?;
    let (chart, ledger) = load_books(&state).await?;

    let summary =
        compute(move || FinancialPositionService::summary(&chart, &ledger, as_of, &scope)).await?;
    Ok(Json(summary))
}

async fn get_comparison(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<PeriodComparison>, ApiError> {
    let current = params
        .current
        .unwrap_or_else(|| AsOfQuery::default().date());
    let previous = params.previous;
    if previous > current {
        return Err(ReportError::InvalidDateRange { previous, current }.into());
    }
    let scope = scope.to_filter()?;
    let (chart, ledger) = load_books(&state).await?;

    let comparison = compute(move || {
        FinancialPositionService::compare(&chart, &ledger, current, previous, &scope)
    })
    .await??;
    Ok(Json(comparison))
}

async fn get_drilldown(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(as_of): Query<AsOfQuery>,
    Query(scope): Query<ScopeQuery>,
    Query(page): Query<PageRequest>,
) -> Result<Json<DrilldownResponse>, ApiError> {
    let as_of = as_of.date();
    let scope = scope.to_filter()?;
    let ((chart, ledger), resolver) = tokio::try_join!(load_books(&state), async {
        Ok::<_, ApiError>(state.sources.invoice_resolver().await?)
    })?;

    let drilldown = compute(move || {
        FinancialPositionService::drilldown(&chart, &ledger, account_id, as_of, &scope)
    })
    .await??;

    let total = u64::try_from(drilldown.entries.len()).unwrap_or(u64::MAX);
    let (lines, warnings) = resolve_lines(&resolver, page.slice(&drilldown.entries).to_vec());
    let entries = PageResponse::new(lines, page.page, page.per_page, total);

    Ok(Json(DrilldownResponse {
        as_of: drilldown.as_of,
        account: drilldown.account,
        entries,
        warnings,
    }))
}
