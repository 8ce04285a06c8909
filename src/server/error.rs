//! Error types for the server

use crate::error::SalaryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// User input that failed cleaning, encoding or range checks
    #[error("{message}")]
    Validation {
        column: Option<String>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SalaryError> for ServerError {
    fn from(err: SalaryError) -> Self {
        if err.is_input_error() {
            ServerError::Validation {
                column: err.column().map(str::to_string),
                message: err.to_string(),
            }
        } else {
            ServerError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, column) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ServerError::Validation { column, message } => {
                (StatusCode::BAD_REQUEST, message, column)
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
            "column": column,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
