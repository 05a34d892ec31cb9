//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes over the balance sheet, journal writes, reconciliation and ageing feeds
//! - Query extractors for report scope and display options
//! - JSON error responses

pub mod error;
pub mod query;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::{BoxError, Router};
use neraca_db::{AccountRepository, AgeingRepository, JournalRepository, SourceRepository};
use neraca_shared::AppError;
use neraca_shared::config::ReportingConfig;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Chart of accounts access.
    pub accounts: AccountRepository,
    /// Journal access; clones share the per-group fix locks.
    pub journal: JournalRepository,
    /// Open balances and cached ageing records.
    pub ageing: AgeingRepository,
    /// Source document lookup for drilldowns.
    pub sources: SourceRepository,
    /// Reporting settings.
    pub reporting: Arc<ReportingConfig>,
}

impl AppState {
    /// Builds the state around one connection pool.
    pub fn new(db: DatabaseConnection, reporting: ReportingConfig) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            journal: JournalRepository::new(db.clone()),
            ageing: AgeingRepository::new(db.clone()),
            sources: SourceRepository::new(db.clone()),
            db: Arc::new(db),
            reporting: Arc::new(reporting),
        }
    }
}

/// Creates the main application router.
///
/// Requests running longer than `request_timeout` are abandoned.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    with_middleware(
        Router::new().nest("/api/v1", routes::api_routes()),
        request_timeout,
    )
    .with_state(state)
}

/// Wraps routes in request ids, tracing, the timeout and CORS.
fn with_middleware<S>(router: Router<S>, request_timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    )
}

/// Renders timeouts and other middleware failures as JSON errors.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        AppError::Timeout("request exceeded its time limit".to_string()).into()
    } else {
        AppError::Internal(err.to_string()).into()
    }
}
