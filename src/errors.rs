// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CarspotError {
    #[error("Please select an image file (got {0})")]
    InvalidImage(String),

    #[error("Could not reach the prediction service: {0}")]
    Network(String),

    #[error("The prediction service timed out after {0} seconds")]
    Timeout(u64),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Unexpected response from the prediction service: {0}")]
    Parse(String),

    #[error("Invalid password")]
    InvalidCredential,

    #[error("A detection is already running")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CarspotError {
    fn label(&self) -> &'static str {
        match self {
            CarspotError::InvalidImage(_) => "Invalid image",
            CarspotError::Network(_) => "Network error",
            CarspotError::Timeout(_) => "Timed out",
            CarspotError::Upstream { .. } => "Prediction service error",
            CarspotError::Parse(_) => "Parse error",
            CarspotError::InvalidCredential => "Invalid credential",
            CarspotError::Busy => "Busy",
            CarspotError::Config(_) => "Configuration error",
        }
    }
}

impl ResponseError for CarspotError {
    fn status_code(&self) -> StatusCode {
        match self {
            CarspotError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            CarspotError::Network(_) | CarspotError::Upstream { .. } | CarspotError::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
            CarspotError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CarspotError::InvalidCredential => StatusCode::UNAUTHORIZED,
            CarspotError::Busy => StatusCode::CONFLICT,
            CarspotError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.label(),
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_displays_service_message_verbatim() {
        let err = CarspotError::Upstream {
            status: 400,
            message: "Invalid file type".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid file type");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn timeout_is_distinct_from_network_failure() {
        assert_eq!(CarspotError::Timeout(5).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            CarspotError::Network("refused".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
