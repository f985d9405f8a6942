//! API error type and its JSON rendering.
//!
//! Every failure leaving a handler is an [`ApiError`]. The response body always
//! has the same envelope:
//!
//! ```json
//! { "error": { "code": "RES_4001", "code_number": 4001, "message": "Listing not found" },
//!   "request_id": "…", "timestamp": "…" }
//! ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;
use validator::ValidationErrors;

use crate::middleware::request_logger::current_request_id;
use crate::models::json_field_name;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "VAL_3001")]
    InvalidInput,
    #[serde(rename = "VAL_3002")]
    MissingRequiredField,
    #[serde(rename = "VAL_3003")]
    InvalidFormat,
    #[serde(rename = "RES_4001")]
    NotFound,
    #[serde(rename = "DB_7001")]
    StoreUnavailable,
    #[serde(rename = "DB_7002")]
    StoreFailure,
    #[serde(rename = "INT_9999")]
    InternalServerError,
}

impl ErrorCode {
    fn describe(self) -> (u16, StatusCode, &'static str) {
        use ErrorCode::*;
        match self {
            InvalidInput => (3001, StatusCode::BAD_REQUEST, "Invalid input provided"),
            MissingRequiredField => (3002, StatusCode::BAD_REQUEST, "Required field is missing"),
            InvalidFormat => (3003, StatusCode::BAD_REQUEST, "Request body is not valid JSON"),
            NotFound => (4001, StatusCode::NOT_FOUND, "Resource not found"),
            StoreUnavailable => (
                7001,
                StatusCode::SERVICE_UNAVAILABLE,
                "Listing store is unavailable",
            ),
            StoreFailure => (
                7002,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Listing store operation failed",
            ),
            InternalServerError => (
                9999,
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
        }
    }

    pub fn number(self) -> u16 {
        self.describe().0
    }

    pub fn status(self) -> StatusCode {
        self.describe().1
    }

    /// Generic text for this code, used whenever the specific message is not
    /// safe to show
    pub fn default_message(self) -> &'static str {
        self.describe().2
    }
}

/// JSON envelope for every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub request_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub code_number: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// A single request field failed validation
    #[error("invalid field {field}: {message}")]
    InvalidField {
        code: ErrorCode,
        field: String,
        message: String,
    },

    /// The request could not be decoded
    #[error("{message}")]
    BadRequest {
        code: ErrorCode,
        message: String,
        details: Option<String>,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("listing store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidField {
            code: ErrorCode::InvalidInput,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(
        code: ErrorCode,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
            details,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        ApiError::NotFound(resource.to_string())
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidField { code, .. } | ApiError::BadRequest { code, .. } => *code,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Store(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                ErrorCode::StoreUnavailable
            }
            ApiError::Store(_) => ErrorCode::StoreFailure,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.error_code().status()
    }

    fn detail(&self) -> ErrorDetail {
        let code = self.error_code();
        let mut detail = ErrorDetail {
            code,
            code_number: code.number(),
            message: code.default_message().to_string(),
            details: None,
            field: None,
        };

        // Server-side failures keep the generic message; the cause is only logged.
        match self {
            ApiError::InvalidField { field, message, .. } => {
                detail.message = message.clone();
                detail.field = Some(field.clone());
            }
            ApiError::BadRequest {
                message, details, ..
            } => {
                detail.message = message.clone();
                detail.details = details.clone();
            }
            ApiError::NotFound(_) => detail.message = self.to_string(),
            ApiError::Store(_) | ApiError::Internal(_) => {}
        }
        detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string());
        let status = self.status_code();

        if status.is_server_error() {
            error!(request_id = %request_id, error = %self, "Server error occurred");
        } else {
            warn!(request_id = %request_id, error = %self, "Client error occurred");
        }

        let body = ErrorResponse {
            error: self.detail(),
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        let code = match &err {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::MissingJsonContentType(_) => {
                ErrorCode::InvalidFormat
            }
            _ => ErrorCode::InvalidInput,
        };
        ApiError::bad_request(code, "Invalid request body", Some(err.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        ApiError::bad_request(
            ErrorCode::InvalidInput,
            "Invalid query string",
            Some(err.body_text()),
        )
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        ApiError::bad_request(
            ErrorCode::InvalidInput,
            "Invalid path parameter",
            Some(err.body_text()),
        )
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        // Report the first offending field by name so the choice is deterministic.
        let first = errors
            .field_errors()
            .into_iter()
            .min_by(|a, b| a.0.cmp(&b.0));

        match first {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                ApiError::InvalidField {
                    code: ErrorCode::MissingRequiredField,
                    field: json_field_name(&field).to_string(),
                    message,
                }
            }
            None => ApiError::bad_request(ErrorCode::InvalidInput, errors.to_string(), None),
        }
    }
}
