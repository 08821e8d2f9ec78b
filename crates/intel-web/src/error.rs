//! Error responses for the dashboard routes
//!
//! Most failures never reach this type: the analysis services fold them into
//! displayable values. What remains is bad input, a missing analysis and
//! rendering faults.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use intel_stock::StockError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Nothing to serve for this request (404)
    #[error("{resource} not found for {id}")]
    NotFound { resource: String, id: String },

    /// Unusable input such as a blank ticker or unknown timeframe (400)
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Rendering or export fault (500)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// No analysis stored for `ticker` in this session
    pub fn analysis_not_found(ticker: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "Analysis".to_string(),
            id: ticker.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::InvalidSymbol(_) | StockError::Config(_) => Self::bad_request(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal { .. } => tracing::error!(error = %self, "Request failed"),
            _ => tracing::warn!(error = %self, "Request rejected"),
        }

        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::analysis_not_found("AAPL").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_stock_error() {
        let err: ApiError = StockError::InvalidSymbol("  ".to_string()).into();
        assert_eq!(err.error_code(), "BAD_REQUEST");

        let err: ApiError = StockError::Config("unknown timeframe '2D'".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = StockError::Export("writer".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            ApiError::analysis_not_found("AAPL").to_string(),
            "Analysis not found for AAPL"
        );
    }
}
