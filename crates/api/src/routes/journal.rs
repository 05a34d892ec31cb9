//! Journal write routes: posting lines and explicit before/after edits.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use chrono::NaiveDate;
use neraca_core::ledger::{
    BalanceDelta, JournalLedger, JournalLine, JournalType, LineUpdate, Scope, SourceRef,
};
use neraca_shared::types::{AccountId, JournalLineId, TransactionGroupId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal/lines", post(post_line))
        .route("/journal/lines/{line_id}", put(update_line))
}

/// Request body for posting a line.
#[derive(Debug, Deserialize)]
pub struct NewJournalLine {
    /// Account posted to.
    pub account_id: AccountId,
    /// Posting date.
    pub date: NaiveDate,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
    /// Line description.
    #[serde(default)]
    pub description: String,
    /// Journal classification (defaults to `general`).
    pub journal_type: Option<JournalType>,
    /// Business event the line belongs to.
    pub transaction_group_id: Option<TransactionGroupId>,
    /// Originating document.
    pub source: Option<SourceRef>,
    /// Free-form reference number.
    pub reference: Option<String>,
    /// Organisational scope.
    #[serde(default)]
    pub scope: Scope,
}

impl NewJournalLine {
    fn into_line(self) -> JournalLine {
        let mut line = JournalLine::debit(self.account_id, self.date, self.debit)
            .with_description(self.description)
            .with_journal_type(self.journal_type.unwrap_or(JournalType::General))
            .with_scope(self.scope);
        line.credit = self.credit;
        line.transaction_group_id = self.transaction_group_id;
        line.source = self.source;
        line.reference = self.reference;
        line
    }
}

async fn post_line(
    State(state): State<AppState>,
    Json(request): Json<NewJournalLine>,
) -> Result<(StatusCode, Json<JournalLine>), ApiError> {
    let line = request.into_line();
    JournalLedger::validate_line(&line)?;

    state.journal.append(&line).await?;
    info!(line_id = %line.id, account_id = %line.account_id, "Journal line posted");
    Ok((StatusCode::CREATED, Json(line)))
}

async fn update_line(
    State(state): State<AppState>,
    Path(line_id): Path<JournalLineId>,
    Json(request): Json<LineUpdate>,
) -> Result<Json<Vec<BalanceDelta>>, ApiError> {
    if request.before.id != line_id {
        return Err(ApiError::bad_request(format!(
            "Line {} in the body does not match {line_id} in the path",
            request.before.id
        )));
    }
    let update = LineUpdate::new(request.before, request.after)?;

    let deltas = state.journal.apply_update(update).await?;
    Ok(Json(deltas))
}
