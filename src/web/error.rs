use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::presence;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Data source error: {0}")]
    DataSource(#[from] presence::Error),
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::DataSource(e) => {
                error!(error = %e, "Failed to read data source.");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Template(e) => {
                error!(error = ?e, "Failed to render page.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Template error: {e}"),
                )
            }
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalServerError(format!("Background task failed: {err}"))
    }
}
