use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::sync::SyncError;

/// Structured error response returned by the read endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `NOT_FOUND`, `SERVICE_UNAVAILABLE`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Plant not found")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::ServiceUnavailable(detail) => {
                tracing::warn!("Service unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "SERVICE_UNAVAILABLE",
                        message: detail,
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Failure body of `POST /sync`: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncFailureBody {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "Unauthorized. Please provide valid API key in Authorization header.")]
    pub error: String,
}

/// Error returned by the sync endpoint. Keeps the `{success, error}` shape
/// that schedulers calling the endpoint expect.
#[derive(Debug)]
pub struct SyncFailure {
    pub status: StatusCode,
    pub message: String,
}

impl SyncFailure {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized. Please provide valid API key in Authorization header.".into(),
        }
    }
}

impl IntoResponse for SyncFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(SyncFailureBody {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<SyncError> for SyncFailure {
    fn from(err: SyncError) -> Self {
        let status = match &err {
            SyncError::AlreadyRunning { .. } => {
                tracing::warn!("Sync rejected: {}", err);
                StatusCode::CONFLICT
            }
            _ => {
                tracing::error!("Sync failed with fatal error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}
