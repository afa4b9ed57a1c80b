use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// `Clone` so a single-flight leader can hand the same failure to every follower.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// Missing/unknown document type, wrong file type, or empty input.
    #[error("Validation error: {0}")]
    InputValidation(String),

    /// The uploaded binary could not be read or decoded.
    #[error("File read error: {0}")]
    FileRead(String),

    /// The request body exceeds the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Transport failure or the inference endpoint returned an error object.
    #[error("API Error: {0}")]
    Remote(String),

    /// The inference response (or the detection record) is missing expected fields.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Detection output parsed as JSON but is not a valid detection record.
    #[error("Detection schema error: {0}")]
    DetectionSchema(String),

    /// Detection output was not valid JSON after fence stripping.
    #[error("Detection parse error: {0}")]
    DetectionParse(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(format!("{e:#}"))
    }
}

impl AppError {
    /// Stable machine-readable code used in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InputValidation(_) => "VALIDATION_ERROR",
            AppError::FileRead(_) => "FILE_READ_ERROR",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Remote(_) => "REMOTE_ERROR",
            AppError::Schema(_) | AppError::DetectionSchema(_) => "SCHEMA_ERROR",
            AppError::DetectionParse(_) => "DETECTION_PARSE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InputValidation(msg)
            | AppError::FileRead(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Remote(msg) => format!("API Error: {msg}"),
            AppError::Schema(_) => "Failed to get analysis. Please try again.".to_string(),
            AppError::DetectionSchema(_) => {
                "AI detection returned an incomplete result. Please try again.".to_string()
            }
            AppError::DetectionParse(_) => {
                "Failed to parse AI detection results. Please try again.".to_string()
            }
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InputValidation(_) | AppError::FileRead(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Remote(_)
            | AppError::Schema(_)
            | AppError::DetectionSchema(_)
            | AppError::DetectionParse(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InputValidation(_) | AppError::FileRead(_) | AppError::PayloadTooLarge(_) => {
                tracing::debug!("Rejected request: {self}");
            }
            AppError::Internal(e) => tracing::error!("Internal error: {e}"),
            other => tracing::error!("Pipeline error: {other}"),
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (self.status(), body).into_response()
    }
}
