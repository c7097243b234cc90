use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::services::LookupError;

/// Body returned for every failure that is not the caller's fault.
pub const GENERIC_ERROR_BODY: &str = "Sorry, something went wrong";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => {
                tracing::info!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, GENERIC_ERROR_BODY.to_string())
            }
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_BODY.to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_BODY.to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_BODY.to_string(),
                )
            }
        };

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::UpstreamFetchFailed { provider, message } => Self::ExternalApiError {
                service: provider.to_string(),
                message,
            },
            LookupError::NoResultsFound { provider } => Self::ExternalApiError {
                service: provider.to_string(),
                message: "no results".to_string(),
            },
            err @ LookupError::MalformedResult { .. } => Self::InternalError(err.to_string()),
            LookupError::Store(msg) => Self::DatabaseError(msg),
            err @ LookupError::UnknownLocation(_) => Self::NotFound(err.to_string()),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocationId;

    #[test]
    fn lookup_failures_map_to_generic_server_errors() {
        let cases = [
            LookupError::UpstreamFetchFailed {
                provider: "geocode",
                message: "timeout".to_string(),
            },
            LookupError::NoResultsFound {
                provider: "geocode",
            },
            LookupError::Store("locked".to_string()),
        ];

        for err in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn unknown_location_is_not_found() {
        let response = ApiError::from(LookupError::UnknownLocation(LocationId::new(3)))
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_is_bad_request() {
        let response = ApiError::validation("missing data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
