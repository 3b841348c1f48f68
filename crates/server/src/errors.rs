use agrobot::KnowledgeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Chat requests never fail (the processor always answers), so these cover the
/// administrative paths: knowledge base reloads and unexpected internal errors.
#[derive(Debug)]
pub enum AppError {
    /// The knowledge base file could not be read or parsed.
    Knowledge(KnowledgeError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<KnowledgeError> for AppError {
    fn from(err: KnowledgeError) -> Self {
        AppError::Knowledge(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Knowledge(err) => {
                error!("KnowledgeError: {:?}", err);
                let status = match err {
                    KnowledgeError::Io { .. } => StatusCode::NOT_FOUND,
                    KnowledgeError::Json(_) | KnowledgeError::UnsupportedShape(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                };
                (status, err.to_string())
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
