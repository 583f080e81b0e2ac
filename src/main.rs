//! AgroSmart - agricultural advisory backend
//!
//! Recommends a crop from soil and weather readings with generated advice,
//! and runs a bilingual chat assistant restricted to farming topics.

mod advisory;
mod api;
mod chat;
mod classifier;
mod config;
mod llm;
mod market;
mod persona;
mod session;
mod state_machine;
mod upstream;
mod weather;

#[cfg(test)]
mod testing;

use advisory::AdvisoryPipeline;
use api::{create_router, AppState};
use chat::ChatRuntime;
use classifier::CentroidClassifier;
use config::Config;
use llm::{GeminiService, LlmService, LoggingService};
use market::AgmarknetClient;
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather::OpenWeatherClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrosmart=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration errors are fatal: never serve without credentials or model
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    tracing::info!(path = %config.model_path.display(), "Loading crop model");
    let classifier = CentroidClassifier::load(&config.model_path).inspect_err(|e| {
        tracing::error!(error = %e, "Crop model unavailable");
    })?;
    tracing::info!(crops = classifier.labels().count(), "Crop model loaded");

    let http = upstream::http_client(config.upstream_timeout)?;

    let gemini = match (&config.llm_gateway, &config.gemini_api_key) {
        (Some(gateway), _) => GeminiService::via_gateway(http.clone(), &config.gemini_model, gateway),
        (None, Some(key)) => GeminiService::new(http.clone(), key.clone(), &config.gemini_model, None),
        (None, None) => return Err(config::ConfigError::Missing("GEMINI_KEY").into()),
    };
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(gemini)));
    tracing::info!(model = %llm.model_id(), gateway = ?config.llm_gateway, "Text generation ready");

    let advisory = AdvisoryPipeline::new(
        Arc::new(OpenWeatherClient::new(
            http.clone(),
            config.weather_api_key.clone(),
            &config.weather_base_url,
            config.upstream_timeout,
        )),
        Arc::new(classifier),
        Arc::new(AgmarknetClient::new(
            http,
            config.market_api_key.clone(),
            &config.market_base_url,
            config.upstream_timeout,
        )),
        llm.clone(),
        config.upstream_timeout,
    );

    let sessions = Arc::new(SessionStore::new());
    let _sweeper = sessions.spawn_sweeper(config.session_ttl, config.session_sweep_interval);
    let chat = ChatRuntime::new(sessions, llm, config.upstream_timeout);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(advisory, chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("AgroSmart server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
