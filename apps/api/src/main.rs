mod access;
mod analysis;
mod concierge;
mod config;
mod errors;
mod imagegen;
mod llm_client;
mod mailer;
mod routes;
mod state;
mod validation;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::access::clock::SystemClock;
use crate::access::geo::IpApiResolver;
use crate::config::Config;
use crate::imagegen::{ImageGenClient, PreviewGenerator};
use crate::llm_client::LlmClient;
use crate::mailer::HttpMailer;
use crate::routes::build_router;
use crate::state::{AppState, Collaborators};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting skin consult API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let previews = config.openai_api_key.clone().map(|key| {
        info!("Aging previews enabled");
        Arc::new(ImageGenClient::new(key)) as Arc<dyn PreviewGenerator>
    });
    if previews.is_none() {
        info!("OPENAI_API_KEY not set; aging previews disabled");
    }

    let mailer = HttpMailer::new(config.email_api_key.clone(), config.email_from.clone());
    let geo = IpApiResolver::new(config.geo_lookup_url.clone());
    info!(
        "Geo lookup via {}; concierge radius {} mi around ({}, {})",
        config.geo_lookup_url,
        config.concierge_radius_miles,
        config.concierge_center.latitude,
        config.concierge_center.longitude
    );

    let state = AppState::new(
        config.clone(),
        Collaborators {
            llm: Arc::new(llm),
            previews,
            mailer: Arc::new(mailer),
            geo: Arc::new(geo),
        },
        Arc::new(SystemClock),
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the marketing site domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Peer address feeds the rate-limit key when no proxy header is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
