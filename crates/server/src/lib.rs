//! # agrobot HTTP server
//!
//! Serves the agricultural chatbot over axum: `/chat` runs the full message
//! cascade, `/get` answers from the keyword rules and `/kb/reload` swaps in a
//! freshly loaded knowledge base.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

use crate::{
    config::{get_config, AppConfig},
    router::create_router,
    state::build_app_state,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Builds the chatbot from `config` and serves it on `listener` until the server stops.
pub async fn run(listener: TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Building chatbot state");

    let app_state = build_app_state(config).await?;
    info!(
        keywords = app_state.processor.knowledge().snapshot().len(),
        kb_path = %app_state.kb_path.display(),
        model = app_state.processor.has_model(),
        translation = app_state.processor.has_translator(),
        "Chatbot ready"
    );

    let addr = listener.local_addr()?;
    info!(%addr, "Accepting chat requests");
    axum::serve(listener, create_router(app_state)).await?;
    Ok(())
}

/// Entry point of the `server` binary: reads `.env` and `config.yml`, binds the
/// configured port on all interfaces and runs the chatbot.
pub async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = get_config(None)?;
    let listener = TcpListener::bind(listen_addr(&config)).await?;
    run(listener, config).await
}

fn init_tracing() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn listen_addr(config: &AppConfig) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], config.port))
}
