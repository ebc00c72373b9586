//! Support Chat - keyword-matching customer support assistant
//!
//! `support-chat serve` runs the HTTP responder, `support-chat chat [URL]`
//! runs a terminal client against it.

mod api;
mod cli;
mod config;
mod knowledge;
mod locale;
mod resolver;
mod session;
mod store;
mod transport;

use api::{create_router, AppState};
use clap::{Parser, Subcommand};
use config::{ClientConfig, ServerConfig};
use knowledge::KnowledgeBase;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "support-chat")]
#[command(about = "Keyword-matching customer support chat", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP responder (default)
    Serve,
    /// Chat with a running responder from the terminal
    Chat {
        /// Responder origin, overrides SUPPORT_CHAT_URL
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Chat { base_url } => {
            init_client_logging();
            let mut config = ClientConfig::from_env();
            if let Some(url) = base_url {
                config.base_url = url;
            }
            cli::run(config).await
        }
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "support_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ServerConfig::from_env();

    let knowledge_base = match &config.knowledge_base_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading knowledge base");
            KnowledgeBase::load(path)?
        }
        None => KnowledgeBase::builtin(),
    };

    if knowledge_base.is_empty() {
        tracing::warn!("Knowledge base is empty, every message gets the fallback reply");
    } else {
        tracing::info!(entries = knowledge_base.len(), "Knowledge base ready");
    }

    // Create application state
    let state = AppState::new(knowledge_base, config.locale.fallback, config.reply_delay);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Support chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Chat mode owns stdout, so logs go to stderr and default to warnings only
fn init_client_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "support_chat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}
