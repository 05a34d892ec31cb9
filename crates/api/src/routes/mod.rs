//! API route definitions.

use axum::Router;
use neraca_core::chart::ChartOfAccounts;
use neraca_core::ledger::JournalLedger;

use crate::{AppState, error::ApiError};

pub mod accounts;
pub mod ageing;
pub mod health;
pub mod journal;
pub mod reconciliation;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(reports::routes())
        .merge(journal::routes())
        .merge(reconciliation::routes())
        .merge(ageing::routes())
}

/// Loads the chart and the live ledger concurrently.
pub(crate) async fn load_books(
    state: &AppState,
) -> Result<(ChartOfAccounts, JournalLedger), ApiError> {
    let (chart, ledger) = tokio::try_join!(state.accounts.load_chart(), state.journal.load_ledger())?;
    Ok((chart, ledger))
}

/// Runs report arithmetic off the async workers.
pub(crate) async fn compute<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await?)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::test_support::offline_router;

    /// Sends one request to an offline router and decodes the JSON body.
    pub async fn send(method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = offline_router()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}
