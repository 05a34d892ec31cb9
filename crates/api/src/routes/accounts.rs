//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use neraca_core::chart::{Account, ClassificationReport};
use neraca_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/classification", get(validate_classification))
        .route("/accounts/{account_id}/opening-balance", put(set_opening_balance))
        .route("/accounts/{account_id}/active", put(set_active))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for an opening balance change.
#[derive(Debug, Deserialize)]
pub struct OpeningBalanceRequest {
    /// New opening balance, in the account's normal direction.
    pub opening_balance: Decimal,
}

/// Result of an opening balance change.
#[derive(Debug, Serialize)]
pub struct OpeningBalanceResponse {
    /// Account changed.
    pub account_id: AccountId,
    /// Value before the change.
    pub previous: Decimal,
    /// Value after the change.
    pub opening_balance: Decimal,
}

/// Request body for activating or deactivating an account.
#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    /// New active flag.
    pub is_active: bool,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let chart = state.accounts.load_chart().await?;
    Ok(Json(chart.iter().cloned().collect()))
}

async fn validate_classification(
    State(state): State<AppState>,
) -> Result<Json<ClassificationReport>, ApiError> {
    let chart = state.accounts.load_chart().await?;
    Ok(Json(chart.validate_classification()))
}

async fn set_opening_balance(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Json(request): Json<OpeningBalanceRequest>,
) -> Result<Json<OpeningBalanceResponse>, ApiError> {
    let previous = state
        .accounts
        .set_opening_balance(account_id, request.opening_balance)
        .await?;
    Ok(Json(OpeningBalanceResponse {
        account_id,
        previous,
        opening_balance: request.opening_balance,
    }))
}

async fn set_active(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Json(request): Json<ActiveRequest>,
) -> Result<StatusCode, ApiError> {
    state.accounts.set_active(account_id, request.is_active).await?;
    Ok(StatusCode::NO_CONTENT)
}
