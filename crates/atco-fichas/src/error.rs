use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::policy::PolicyDenial;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Failure taxonomy shared by every domain service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Role or ownership check failed; carries the policy reason.
    #[error("{0}")]
    Forbidden(String),
    /// The referenced record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Malformed or missing input, detected before persistence.
    #[error("{0}")]
    Validation(String),
    /// The persistence backend is unreachable.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Encoding an outgoing payload failed.
    #[error("encoding failed: {0}")]
    Encoding(#[from] csv::Error),
}

impl ServiceError {
    /// Stable machine-readable code surfaced to API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Validation(_) => "validation",
            ServiceError::Store(_) => "unavailable",
            ServiceError::Encoding(_) => "internal",
        }
    }
}

impl From<PolicyDenial> for ServiceError {
    fn from(denial: PolicyDenial) -> Self {
        ServiceError::Forbidden(denial.reason)
    }
}

/// Top-level application error for the HTTP boundary.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Auth(AuthError),
    Service(ServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Auth(err) => write!(f, "authentication error: {}", err),
            AppError::Service(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Auth(err) => Some(err),
            AppError::Service(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Auth(AuthError::Store(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
            }
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AppError::Service(err) => (
                match err {
                    ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                    ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                    ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    ServiceError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
                    ServiceError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
                err.code(),
            ),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Server(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        let body = Json(json!({ "error": self.to_string(), "code": code }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}
