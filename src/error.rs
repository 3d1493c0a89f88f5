use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Prediction error: {0}")]
    Inference(String),

    #[error("Model artifact error: {0}")]
    ArtifactLoad(String),

    #[error("Dataset error: {0}")]
    Dataset(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Inference(_) => {
                tracing::error!("Error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            // Everything else is an operational failure; keep the
            // details out of the response body.
            _ => {
                tracing::error!("Error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "detail": detail,
        }));

        (status, body).into_response()
    }
}

pub fn validation_error(msg: &str) -> AppError {
    AppError::Validation(msg.to_string())
}
