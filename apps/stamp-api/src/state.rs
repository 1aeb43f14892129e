//! Application state for the stamp server

use std::time::Duration;

use stamp_core::StampConfig;

pub struct AppState {
    pub config: StampConfig,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: StampConfig, fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent(concat!("stamp-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!("Stamp font source: {}", config.font_url);

        Ok(Self { config, client })
    }
}
