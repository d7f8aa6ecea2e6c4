//! Gateway error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::application::ports::BackendError;

/// Errors a gateway request can terminate with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The model call went through but the response is unusable
    #[error("{0}")]
    Model(String),

    /// The model provider could not be reached or failed upstream
    #[error("{0}")]
    Upstream(String),

    #[error("Rate limited by the model provider")]
    RateLimited,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match &err {
            BackendError::RateLimited => ApiError::RateLimited,
            BackendError::RequestFailed(_) => ApiError::Upstream(err.to_string()),
            BackendError::Upstream { status, .. } if *status >= 500 => {
                ApiError::Upstream(err.to_string())
            }
            _ => ApiError::Model(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "request_failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_per_variant() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("/api/x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Model("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Upstream("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn incomplete_model_response_maps_to_500() {
        let err: ApiError = BackendError::IncompleteResponse("label".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unreachable_provider_maps_to_502() {
        let err: ApiError = BackendError::RequestFailed("connection refused".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err: ApiError = BackendError::Upstream {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn provider_rejection_maps_to_500() {
        // A 4xx from the provider means the gateway built a bad call,
        // not that the provider is down
        let err: ApiError = BackendError::Upstream {
            status: 400,
            message: "bad request".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rate_limit_is_forwarded() {
        let err: ApiError = BackendError::RateLimited.into();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
