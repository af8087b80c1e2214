//! Chat relay
//!
//! A small web chat backend: the browser posts its whole conversation, the
//! server asks Gemini for a reply, resolving at most one tool call on the
//! way, and answers with the final text.

mod api;
mod config;
mod dispatch;
mod gateway;
mod llm;
mod tools;

#[cfg(test)]
mod testing;

use api::{create_router, AppState};
use config::AppConfig;
use dispatch::Dispatcher;
use gateway::ModelGateway;
use llm::{GeminiService, LlmService, LoggingService};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{ToolName, ToolRegistry};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    // Configuration: a missing API key stops us before we bind
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "FATAL: invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        model = %config.model,
        notify_url_set = config.notify_url.is_some(),
        port = config.port,
        "Configuration loaded"
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("chat-relay/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let tools = Arc::new(ToolRegistry::new(config.notify_url.clone(), http.clone()));

    let gemini: Arc<dyn LlmService> = Arc::new(GeminiService::new(
        http,
        config.api_key.clone(),
        &config.model,
        &config.gemini_base_url,
    ));
    let gateway = Arc::new(ModelGateway::new(
        Arc::new(LoggingService::new(gemini)),
        tools.definitions(),
    ));

    let tool_names: Vec<_> = ToolName::ALL.iter().map(|t| t.as_str()).collect();
    tracing::info!(
        model = %gateway.model_id(),
        tools = ?tool_names,
        "Model gateway initialized"
    );

    let dispatcher = Arc::new(Dispatcher::new(gateway, tools));
    let state = AppState::new(dispatcher, config.public_dir.clone());

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
    tracing::info!("Chat relay listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
