use std::sync::Arc;

use anyhow::{Context, Result};

use lfa_insights::{
    ai_gateway::{
        adapters::gemini::GeminiBackend, credentials::credential_provider, gateway::InsightGateway,
    },
    cli::config_path_from_args,
    config::Config,
    insights::InsightService,
    logging::init_tracing,
    server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_path_from_args()?;
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let logging_guard = init_tracing(&config.logging).context("failed to initialize logging")?;

    let credentials = credential_provider(
        config.ai_gateway.credential_loading,
        &config.ai_gateway.credential,
    );
    let backend = GeminiBackend::new().context("failed to construct gemini backend")?;
    let gateway = Arc::new(InsightGateway::new(
        config.ai_gateway.clone(),
        credentials,
        Arc::new(backend),
    ));
    let service = Arc::new(InsightService::new(Arc::clone(&gateway), config.prompt.template));

    tracing::info!(
        target: "ai_gateway",
        run_id = logging_guard.run_id(),
        candidates = ?gateway.candidates(),
        credential_loading = ?config.ai_gateway.credential_loading,
        template = ?service.template(),
        "gateway_ready"
    );

    server::run(service, config.server).await
}
