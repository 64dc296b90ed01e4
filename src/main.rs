//! Interview bot - password-gated research interview backed by a chat model
//!
//! Serves a single-page interview UI, keeps one in-memory conversation per
//! browser session, and forwards each answer to an OpenAI-compatible chat
//! completions endpoint for feedback and a follow-up question.

mod api;
mod config;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod system_prompt;
mod transcript;
mod turn_processor;

use api::{create_router, AppState};
use config::AppConfig;
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::SessionManager;
use state_machine::SessionContext;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turn_processor::TurnProcessor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_bot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration, refusing to start");
    })?;

    // Chat model client
    let openai = OpenAIService::new(
        config.api_key.expose(),
        config.model.model.clone(),
        config.model.api_url.clone(),
    )?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(openai)));
    tracing::info!(
        model = %config.model.model,
        api_url = %config.model.api_url,
        max_tokens = config.model.max_tokens,
        temperature = config.model.temperature,
        "Chat model configured"
    );

    // Session runtime
    let sessions = SessionManager::new(
        SessionContext::new(&config.access_password),
        TurnProcessor::new(llm, &config.model),
        config.session_ttl,
    );
    let state = AppState::new(sessions);

    // Create router
    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        %addr,
        session_ttl_secs = config.session_ttl.as_secs(),
        "Interview server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
