//! Ageing feed routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use neraca_core::ageing::{AgeingFilter, AgeingRecord, AgeingReport, AgeingReportType};
use neraca_db::AgeingRefresh;
use neraca_shared::types::{BranchId, OpenBalanceId};
use serde::Deserialize;
use tracing::info;

use crate::query::AsOfQuery;
use crate::{AppState, error::ApiError};

/// Creates the ageing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ageing", get(get_ageing))
        .route("/ageing/refresh", post(refresh_ageing))
        .route("/ageing/{open_balance_id}/refresh", post(refresh_balance))
}

/// Query parameters for the ageing feed.
#[derive(Debug, Default, Deserialize)]
pub struct AgeingQuery {
    /// `receivables`, `payables` or `both` (default).
    #[serde(default)]
    pub report_type: AgeingReportType,
    /// Restrict to one branch.
    pub branch: Option<BranchId>,
}

/// Request body for a refresh.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    /// Date to recompute at (defaults to today).
    pub as_of: Option<NaiveDate>,
}

async fn get_ageing(
    State(state): State<AppState>,
    Query(as_of): Query<AsOfQuery>,
    Query(params): Query<AgeingQuery>,
) -> Result<Json<AgeingReport>, ApiError> {
    let filter = AgeingFilter {
        report_type: params.report_type,
        branch: params.branch,
    };
    let report = state.ageing.report(filter, as_of.date()).await?;
    Ok(Json(report))
}

async fn refresh_ageing(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AgeingRefresh>, ApiError> {
    let as_of = AsOfQuery {
        as_of: request.as_of,
    }
    .date();
    info!(%as_of, "Ageing refresh requested");

    let refreshed = state.ageing.refresh(as_of).await?;
    Ok(Json(refreshed))
}

async fn refresh_balance(
    State(state): State<AppState>,
    Path(open_balance_id): Path<OpenBalanceId>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AgeingRecord>, ApiError> {
    let as_of = AsOfQuery {
        as_of: request.as_of,
    }
    .date();
    let record = state.ageing.refresh_balance(open_balance_id, as_of).await?;
    Ok(Json(record))
}
