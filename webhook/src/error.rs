//! Error types.
//!
//! `ConfigError` is fatal at startup. `WebhookError` is caught at the
//! request boundary and turned into an HTTP status with a plain-text body.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid Strava credentials: {0}")]
    InvalidCredentials(#[source] serde_json::Error),

    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// A request that could not be served.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Mode not supported: {0}")]
    UnsupportedMode(String),

    #[error("Wrong token")]
    InvalidToken,

    #[error("Wrong request: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Invalid subscription id")]
    SubscriptionMismatch,

    #[error("Error converting message")]
    Serialization(#[source] serde_json::Error),

    #[error("Error publishing message")]
    Publish(#[source] anyhow::Error),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::UnsupportedMode(_) | WebhookError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::InvalidToken => StatusCode::UNAUTHORIZED,
            WebhookError::SubscriptionMismatch => StatusCode::FORBIDDEN,
            WebhookError::Serialization(_) | WebhookError::Publish(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebhookError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            WebhookError::UnsupportedMode("test".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(WebhookError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            WebhookError::SubscriptionMismatch.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WebhookError::Publish(anyhow::anyhow!("broker down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::MethodNotAllowed(Method::PUT).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_messages() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(WebhookError::MalformedPayload(err)
            .to_string()
            .starts_with("Wrong request: "));
        assert_eq!(
            WebhookError::MethodNotAllowed(Method::DELETE).to_string(),
            "Method not allowed: DELETE"
        );
        assert_eq!(
            WebhookError::Publish(anyhow::anyhow!("secret detail")).to_string(),
            "Error publishing message"
        );
    }
}
