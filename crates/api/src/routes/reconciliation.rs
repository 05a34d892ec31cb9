//! Reconciliation routes: unbalanced group detection and repair.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use neraca_core::reconciliation::{FixAction, FixOutcome, ReconciliationService, UnbalancedGroup};
use neraca_shared::types::TransactionGroupId;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::compute;
use crate::query::{AsOfQuery, ScopeQuery};
use crate::{AppState, error::ApiError};

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reconciliation/unbalanced", get(list_unbalanced))
        .route("/reconciliation/fix", post(fix_group))
}

/// Request body for a fix.
#[derive(Debug, Deserialize)]
pub struct FixRequest {
    /// Group to repair.
    pub transaction_group_id: TransactionGroupId,
    /// `delete` or `correct`.
    pub action: String,
}

/// Unbalanced groups at a date.
#[derive(Debug, Serialize)]
pub struct UnbalancedResponse {
    /// Number of groups found.
    pub count: usize,
    /// Groups in order of first appearance.
    pub groups: Vec<UnbalancedGroup>,
}

async fn list_unbalanced(
    State(state): State<AppState>,
    Query(as_of): Query<AsOfQuery>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<UnbalancedResponse>, ApiError> {
    let as_of = as_of.date();
    let scope = scope.to_filter()?;
    let ledger = state.journal.load_ledger().await?;

    let groups = compute(move || ReconciliationService::find_unbalanced(&ledger, as_of, &scope)).await?;
    Ok(Json(UnbalancedResponse {
        count: groups.len(),
        groups,
    }))
}

async fn fix_group(
    State(state): State<AppState>,
    Json(request): Json<FixRequest>,
) -> Result<Json<FixOutcome>, ApiError> {
    let action: FixAction = request.action.parse()?;
    let group = request.transaction_group_id;
    info!(%group, %action, "Fix requested");

    let chart = state.accounts.load_chart().await?;
    let outcome = state
        .journal
        .fix(&chart, group, action, &state.reporting.correction_account_code)
        .await?;
    Ok(Json(outcome))
}
