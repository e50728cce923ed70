use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tokio::{
    net::TcpListener,
    signal::unix::{SignalKind, signal},
};
use tower_http::cors::CorsLayer;

use crate::{
    ai_gateway::error::{GatewayError, GatewayErrorKind},
    config::ServerConfig,
    insights::InsightService,
    lfa::LfaPayload,
};

pub const GENERATION_FAILED: &str = "AI generation failed";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInsightsRequest {
    pub lfa_data: LfaPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateInsightsResponse {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidBody(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid request body".to_string(),
                    details: Some(details),
                },
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    error: "Method not allowed".to_string(),
                    details: None,
                },
            ),
            ApiError::Gateway(err) if err.kind == GatewayErrorKind::Configuration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: err.message,
                    details: None,
                },
            ),
            ApiError::Gateway(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: GENERATION_FAILED.to_string(),
                    details: Some(err.message),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(service: Arc<InsightService>, config: &ServerConfig) -> Router {
    let generate = post(generate_insights).fallback(method_not_allowed);
    let router = Router::new()
        .route("/generate-insights", generate.clone())
        .route("/api/generate-insights", generate)
        .with_state(service);

    if config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn generate_insights(
    State(service): State<Arc<InsightService>>,
    payload: Result<Json<GenerateInsightsRequest>, JsonRejection>,
) -> Result<Json<GenerateInsightsResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(target: "server", error = %rejection.body_text(), "request_rejected");
        ApiError::InvalidBody(rejection.body_text())
    })?;

    match service.generate_insights(&request.lfa_data).await {
        Ok(generation) => Ok(Json(GenerateInsightsResponse {
            text: generation.text,
            model: generation.model,
        })),
        Err(err) => {
            tracing::error!(
                target: "server",
                kind = err.kind.as_str(),
                error = %err,
                "insight_generation_failed"
            );
            Err(ApiError::Gateway(err))
        }
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn run(service: Arc<InsightService>, config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("unable to bind {}", config.bind))?;
    let local_addr = listener
        .local_addr()
        .context("unable to read bound address")?;

    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;

    tracing::info!(target: "server", addr = %local_addr, "server_listening");

    axum::serve(listener, router(service, &config))
        .with_graceful_shutdown(async move {
            let signal_name = tokio::select! {
                _ = sigint.recv() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            };
            tracing::info!(target: "server", signal = signal_name, "shutdown_requested");
        })
        .await
        .context("http server terminated unexpectedly")?;

    tracing::info!(target: "server", "server_stopped");
    Ok(())
}
