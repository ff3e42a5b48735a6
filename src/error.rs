use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::classifier::ClassifierError;
use crate::diary::DiaryError;
use crate::recommend::RecommendError;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("Diary storage unavailable: {0}")]
    DiaryUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Returns the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidInput(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::CatalogUnavailable(_)
            | Self::ClassifierUnavailable(_)
            | Self::DiaryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Returns a machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::CatalogUnavailable(_) => "CATALOG_UNAVAILABLE",
            Self::ClassifierUnavailable(_) => "CLASSIFIER_UNAVAILABLE",
            Self::DiaryUnavailable(_) => "DIARY_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InvalidInput(msg) => Self::InvalidInput(msg),
            RecommendError::CatalogUnavailable(e) => Self::CatalogUnavailable(e.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unsupported(msg) => Self::NotFound(msg),
            other => Self::CatalogUnavailable(other.to_string()),
        }
    }
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::InvalidInput(msg) => Self::InvalidInput(msg),
            other => Self::ClassifierUnavailable(other.to_string()),
        }
    }
}

impl From<DiaryError> for AppError {
    fn from(err: DiaryError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Error response body structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };

        // Try to serialize as msgpack, fall back to JSON
        if let Ok(bytes) = rmp_serde::to_vec_named(&body) {
            (status, [("content-type", "application/msgpack")], bytes).into_response()
        } else {
            let json = serde_json::to_string(&body).unwrap_or_else(|_| {
                r#"{"error":{"code":"INTERNAL_ERROR","message":"Failed to serialize error"}}"#.to_string()
            });
            (status, [("content-type", "application/json")], json).into_response()
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
