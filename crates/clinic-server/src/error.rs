//! HTTP error responses.
//!
//! Every error body is `{"error": "..."}`, with `details` added for field
//! validation failures. Server-side failures are logged and answered with a
//! generic message so driver or pool details never reach the client.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clinic_db::{OrmError, ValidationErrors};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        details: Option<ValidationErrors>,
    },
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid(message: impl Into<String>, details: ValidationErrors) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Log `err` and build a 500 that only carries `context`.
    pub fn internal(context: &str, err: &dyn std::fmt::Display) -> Self {
        tracing::error!(%context, error = %err, "internal server error");
        Self::Internal(context.to_string())
    }

    /// Map a store error: input problems are 400, missing rows 404, the rest 500.
    pub fn from_store(context: &str, err: OrmError) -> Self {
        match err {
            OrmError::NotFound(message) => Self::NotFound(message),
            OrmError::Invalid(details) => Self::invalid("Invalid request", details),
            err if err.is_client_error() => Self::bad_request(err.to_string()),
            err => Self::internal(context, &err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest { message, details } => ErrorResponse {
                error: message,
                details,
            },
            Self::NotFound(message) | Self::Internal(message) => ErrorResponse {
                error: message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Attach a 500 context to store results.
pub trait StoreResultExt<T> {
    fn or_api(self, context: &str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for Result<T, OrmError> {
    fn or_api(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::from_store(context, err))
    }
}

/// Parse a path id; anything but an integer is `400 Invalid ID`.
pub fn parse_path_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid ID"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_does_not_leak_details() {
        let err = ApiError::from_store(
            "Failed to fetch patients",
            OrmError::Connection("password authentication failed for user clinic".into()),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let ApiError::Internal(message) = err else {
            panic!("expected internal error");
        };
        assert_eq!(message, "Failed to fetch patients");
    }

    #[test]
    fn input_errors_are_bad_requests() {
        for err in [
            OrmError::empty_update("patients"),
            OrmError::schema_violation("unknown column"),
            OrmError::validation("invalid date 'x'"),
            OrmError::ForeignKeyViolation("appointments_doctor_id_fkey".into()),
        ] {
            assert_eq!(ApiError::from_store("ctx", err).status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(
            ApiError::from_store("ctx", OrmError::not_found("gone")).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn path_ids() {
        assert_eq!(parse_path_id("42").unwrap(), 42);
        for raw in ["abc", "", "4.2", "99999999999999999999"] {
            assert!(matches!(parse_path_id(raw), Err(ApiError::BadRequest { .. })));
        }
    }
}
