//! Error types for the stamp server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Missing pdfUrl or text")]
    MissingParams,

    #[error("Invalid pdfUrl: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Fetch PDF failed")]
    FetchFailed,

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Stamp(#[from] stamp_core::StampError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::MissingParams => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut message = self.to_string();
        if message.is_empty() {
            message = "Server error".to_string();
        }

        if status.is_server_error() {
            tracing::error!("Stamp request failed: {}", message);
        }

        (status, message).into_response()
    }
}
