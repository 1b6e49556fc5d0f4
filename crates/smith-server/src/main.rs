mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Context;
use smith::{
    assembler::PromptAssembler,
    compiler::CompilerClient,
    providers::factory::get_retrying_provider,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = configuration::Settings::new().context("failed to load configuration")?;
    let policy = settings.retry.policy();
    let assembler_config = settings.assembler_config();

    let provider = get_retrying_provider(settings.provider.into_config(), policy)?;
    tracing::info!(provider = provider.name(), "provider configured");

    let claude = match settings.claude {
        Some(claude) => Some(Arc::from(get_retrying_provider(claude.into_config(), policy)?)),
        None => {
            tracing::info!("SMITH_CLAUDE__API_KEY not set, /claude is disabled");
            None
        }
    };
    let compiler = match settings.compiler {
        Some(compiler) => Some(Arc::new(CompilerClient::new(compiler.into_config())?)),
        None => {
            tracing::info!("SMITH_COMPILER__HOST not set, /compile is disabled");
            None
        }
    };

    // Create app state
    let state = state::AppState {
        assembler: Arc::new(PromptAssembler::new(Arc::from(provider), assembler_config)),
        claude,
        compiler,
    };

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Run server
    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
