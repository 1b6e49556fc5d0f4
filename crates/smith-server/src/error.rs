use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use smith::errors::SmithError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Convert a dotted config path into the environment variable that sets it
pub fn to_env_var(field_path: &str) -> String {
    let path = match field_path {
        // fields that only exist under the provider table
        "type" | "api_key" => format!("provider.{}", field_path),
        other => other.to_string(),
    };

    format!("SMITH_{}", path.replace('.', "__").to_uppercase())
}

/// An error on its way out of a route handler
#[derive(Debug)]
pub enum ApiError {
    Smith(SmithError),
    NotConfigured(&'static str),
    /// The request body did not deserialize
    Body(JsonRejection),
}

impl From<SmithError> for ApiError {
    fn from(err: SmithError) -> Self {
        ApiError::Smith(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let err = match self {
            ApiError::Smith(err) => err,
            ApiError::NotConfigured(_) => return StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Body(rejection) => return rejection.status(),
        };

        match err {
            SmithError::EmptyInput
            | SmithError::InputTooLong { .. }
            | SmithError::SubjectCount { .. }
            | SmithError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SmithError::RateLimitExceeded | SmithError::MaxRetriesExceeded { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            SmithError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            SmithError::ContextLengthExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SmithError::CompilationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SmithError::ServerError { .. }
            | SmithError::TransportError(_)
            | SmithError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Smith(err) => err.kind(),
            ApiError::NotConfigured(_) => "not_configured",
            ApiError::Body(_) => "invalid_body",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Smith(err) => err.to_string(),
            ApiError::NotConfigured(what) => format!("{} is not configured on this server", what),
            ApiError::Body(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        } else {
            tracing::warn!(error = %message, "request rejected");
        }

        (
            status,
            Json(json!({
                "error": message,
                "kind": self.kind(),
            })),
        )
            .into_response()
    }
}
