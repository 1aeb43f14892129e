//! Outbound fetches: the source PDF and the stamp font

use reqwest::Client;
use stamp_core::StampFont;
use tracing::{debug, warn};
use url::Url;

use crate::error::ServerError;

/// Download the document to stamp. Any failure here fails the request.
pub async fn fetch_pdf(client: &Client, url: Url) -> Result<Vec<u8>, ServerError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        debug!("Source PDF fetch returned {}", response.status());
        return Err(ServerError::FetchFailed);
    }
    Ok(response.bytes().await?.to_vec())
}

/// Fetch and parse the configured font, falling back to Helvetica on any
/// failure.
pub async fn load_stamp_font(client: &Client, font_url: &str) -> StampFont {
    let bytes = match fetch_font_bytes(client, font_url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Font fetch failed, using Helvetica: {}", e);
            return StampFont::Helvetica;
        }
    };

    match StampFont::from_bytes(bytes) {
        Ok(font) => {
            debug!("Loaded stamp font {}", font.name());
            font
        }
        Err(e) => {
            warn!("Font embedding failed, using Helvetica: {}", e);
            StampFont::Helvetica
        }
    }
}

async fn fetch_font_bytes(client: &Client, font_url: &str) -> Result<Vec<u8>, String> {
    let response = client
        .get(font_url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("Font fetch failed with status {}", response.status()));
    }
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}
