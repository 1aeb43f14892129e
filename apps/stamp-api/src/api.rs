//! API handlers for the stamp server
//!
//! Provides:
//! - GET /api/stamp (also served at /): fetch, stamp and return a PDF
//! - OPTIONS on the same paths for CORS preflight
//! - GET /health

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stamp_core::{output_filename, stamp_first_page, StampRequest};
use tracing::info;
use url::Url;

use crate::error::ServerError;
use crate::fetch::{fetch_pdf, load_stamp_font};
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "stamp-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: OPTIONS /api/stamp
pub async fn handle_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Stamp query string
#[derive(Debug, Default)]
pub struct StampQuery {
    /// Source document URL (`pdfUrl`)
    pub pdf_url: Option<String>,

    /// Label to draw
    pub text: Option<String>,

    /// Anchor token, e.g. "bottom-right"
    pub pos: Option<String>,

    /// Font size; non-numeric values fall back to the default
    pub size: Option<String>,
}

impl StampQuery {
    /// Collect the known keys; a repeated key keeps its first value
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "pdfUrl" => &mut query.pdf_url,
                "text" => &mut query.text,
                "pos" => &mut query.pos,
                "size" => &mut query.size,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Handler: GET /api/stamp
pub async fn handle_stamp(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let query = StampQuery::from_pairs(pairs);
    let (pdf_url, text) = match (
        query.pdf_url.filter(|u| !u.is_empty()),
        query.text.filter(|t| !t.is_empty()),
    ) {
        (Some(pdf_url), Some(text)) => (pdf_url, text),
        _ => return Err(ServerError::MissingParams),
    };

    let request = StampRequest {
        text,
        anchor: state.config.anchor(query.pos.as_deref()),
        font_size: state.config.font_size(query.size.as_deref()),
    };
    info!(
        "Stamp request: url={}, pos={}, size={}",
        pdf_url, request.anchor, request.font_size
    );

    let source = Url::parse(&pdf_url)?;
    let pdf_bytes = fetch_pdf(&state.client, source.clone()).await?;
    let font = load_stamp_font(&state.client, &state.config.font_url).await;

    let margin = state.config.margin;
    let stamped = tokio::task::spawn_blocking(move || {
        stamp_first_page(&pdf_bytes, &font, &request, margin)
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    let filename = output_filename(&source);
    info!(
        "Stamped {} ({} bytes) at ({:.2}, {:.2})",
        filename,
        stamped.bytes.len(),
        stamped.position.x,
        stamped.position.y
    );

    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{}\"", filename))
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        stamped.bytes,
    )
        .into_response())
}
