use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Errors surfaced to HTTP clients
///
/// Every variant renders as an [`ErrorResponse`] with a stable `error` code.
/// Server-side failures carry a fixed message; the cause is logged where the
/// error is raised.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Job {0} not found")]
    JobNotFound(i64),

    #[error("Job location is not specified")]
    JobLocationMissing,

    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::JobNotFound(_) => "job_not_found",
            ApiError::JobLocationMissing => "job_location_missing",
            ApiError::InvalidQuery(_) => "invalid_query",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::JobNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::JobLocationMissing | ApiError::InvalidQuery(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    ApiError::InvalidQuery(format!("Invalid query: {}", err)).into()
}

/// Handle path segment errors (e.g. a non-numeric job id)
pub fn handle_path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    ApiError::InvalidQuery(format!("Invalid path: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::JobNotFound(3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::JobLocationMissing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal("Failed to generate recommendations").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ApiError::Internal("Failed to generate recommendations");
        assert_eq!(err.code(), "internal_error");
        assert_eq!(err.to_string(), "Failed to generate recommendations");
    }
}
