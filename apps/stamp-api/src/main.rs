//! PDF Stamp Server
//!
//! Downloads a PDF from a URL, draws a short text label on its first page
//! and returns the edited document inline.
//!
//! ## Endpoint
//!
//! `GET /api/stamp?pdfUrl=...&text=...&pos=bottom-right&size=11`
//!
//! The font configured with `--font-url` is fetched per request and embedded;
//! if it cannot be fetched or parsed the label is drawn in Helvetica instead.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use clap::Parser;
use stamp_core::{
    config::{DEFAULT_FONT_SIZE, DEFAULT_FONT_URL, DEFAULT_POSITION},
    StampConfig, DEFAULT_MARGIN,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod fetch;
mod state;

use api::{handle_health, handle_preflight, handle_stamp};
use state::AppState;

/// Command-line arguments for the stamp server
#[derive(Parser, Debug)]
#[command(name = "stamp-api")]
#[command(about = "Stamp a text label onto the first page of a remote PDF")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// TrueType font to embed; CFF outlines and collections fall back to Helvetica
    #[arg(long, env = "STAMP_FONT_URL", default_value = DEFAULT_FONT_URL)]
    font_url: String,

    /// Anchor used when a request has no `pos`
    #[arg(long, env = "STAMP_DEFAULT_POSITION", default_value = DEFAULT_POSITION)]
    default_position: String,

    /// Font size used when a request has no usable `size`
    #[arg(long, env = "STAMP_DEFAULT_SIZE", default_value_t = DEFAULT_FONT_SIZE)]
    default_size: f64,

    /// Inset from the page edges in points
    #[arg(long, env = "STAMP_MARGIN", default_value_t = DEFAULT_MARGIN)]
    margin: f64,

    /// Timeout for outbound fetches in milliseconds
    #[arg(long, env = "STAMP_FETCH_TIMEOUT_MS", default_value = "30000")]
    fetch_timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn stamp_config(&self) -> StampConfig {
        StampConfig {
            font_url: self.font_url.clone(),
            default_position: self.default_position.clone(),
            default_font_size: self.default_size,
            margin: self.margin,
        }
    }
}

/// Build the router with CORS headers on every response
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/", get(handle_stamp).options(handle_preflight))
        .route("/api/stamp", get(handle_stamp).options(handle_preflight))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting stamp server on {}:{}", args.host, args.port);

    let state = AppState::new(
        args.stamp_config(),
        Duration::from_millis(args.fetch_timeout_ms),
    )?;
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!(
        "Defaults: pos={}, size={}, margin={}",
        args.default_position, args.default_size, args.margin
    );

    axum::serve(listener, app).await?;

    Ok(())
}
