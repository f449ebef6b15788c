//! Mapping from core errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use utoipa::ToSchema;

use cdr_core::CdrError;

/// Error body returned for every non-2xx response.
#[derive(Serialize, ToSchema)]
pub struct ErrorRes {
    pub code: String,
    pub message: String,
}

/// Wrapper giving [`CdrError`] an HTTP representation.
pub struct ApiError(pub CdrError);

impl From<CdrError> for ApiError {
    fn from(err: CdrError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            CdrError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            CdrError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            CdrError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            CdrError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM"),
            CdrError::Integrity(_) | CdrError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        };

        // Internal faults are logged with their detail but not leaked to
        // the client; the message is not part of the API contract.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorRes {
                code: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError(CdrError::not_found("Patient", "Id", 1)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_400() {
        let response =
            ApiError(CdrError::Conflict("already enrolled".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn integrity_maps_to_500_with_generic_body() {
        let response = ApiError(CdrError::Integrity("two preferred".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_maps_to_502() {
        let response = ApiError(CdrError::Upstream("person service down".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
