//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use neraca_core::ageing::AgeingError;
use neraca_core::ledger::LedgerError;
use neraca_core::reconciliation::ReconciliationError;
use neraca_core::reports::ReportError;
use neraca_db::RepositoryError;
use neraca_shared::AppError;
use serde_json::json;
use tracing::error;

/// An error rendered as `{"error": CODE, "message": text}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A malformed query parameter or body field.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        Self::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "Request failed");
            "An error occurred".to_string()
        } else {
            self.message
        };

        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<ReconciliationError> for ApiError {
    fn from(e: ReconciliationError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<AgeingError> for ApiError {
    fn from(e: AgeingError) -> Self {
        Self::from_parts(e.http_status_code(), e.error_code(), e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use neraca_shared::types::AccountId;

    #[tokio::test]
    async fn test_client_error_body() {
        let response = ApiError::from(ReportError::AccountNotFound(AccountId::new())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "ACCOUNT_NOT_FOUND");
        assert!(json["message"].as_str().unwrap().starts_with("Account not found"));
    }

    #[tokio::test]
    async fn test_server_error_hides_detail() {
        let response = ApiError::from(AppError::Internal("connection reset".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "INTERNAL_ERROR");
        assert_eq!(json["message"], "An error occurred");
    }
}
