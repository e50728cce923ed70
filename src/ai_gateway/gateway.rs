use std::{sync::Arc, time::Instant};

use tracing::Instrument;
use uuid::Uuid;

use crate::ai_gateway::{
    adapters::GenerationBackend,
    credentials::CredentialProvider,
    error::{GatewayError, empty_output},
    reliability::{MarkerTerminalPolicy, TerminalErrorPolicy},
    telemetry::{GatewayTelemetryEvent, emit_gateway_event},
    types::{AIGatewayConfig, BackendContext, Generation, ModelId},
};

/// Tries the configured candidate models in order and returns the first
/// non-empty generation.
pub struct InsightGateway {
    config: AIGatewayConfig,
    credential_provider: Arc<dyn CredentialProvider>,
    backend: Arc<dyn GenerationBackend>,
    terminal_policy: Arc<dyn TerminalErrorPolicy>,
}

impl InsightGateway {
    pub fn new(
        config: AIGatewayConfig,
        credential_provider: Arc<dyn CredentialProvider>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        let terminal_policy = Arc::new(MarkerTerminalPolicy::new(
            config.terminal_error_markers.clone(),
        ));
        Self {
            config,
            credential_provider,
            backend,
            terminal_policy,
        }
    }

    pub fn with_terminal_policy(mut self, terminal_policy: Arc<dyn TerminalErrorPolicy>) -> Self {
        self.terminal_policy = terminal_policy;
        self
    }

    pub fn candidates(&self) -> &[ModelId] {
        &self.config.candidates
    }

    pub async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError> {
        self.generate_with_candidates(prompt, &self.config.candidates)
            .await
    }

    pub async fn generate_with_candidates(
        &self,
        prompt: &str,
        candidates: &[ModelId],
    ) -> Result<Generation, GatewayError> {
        let request_id = Uuid::now_v7().to_string();
        let span = tracing::info_span!(
            target: "ai_gateway",
            "gateway_request",
            request_id = %request_id,
            backend = self.backend.name(),
            candidates = candidates.len(),
        );

        self.run_fallback(request_id, prompt, candidates)
            .instrument(span)
            .await
    }

    async fn run_fallback(
        &self,
        request_id: String,
        prompt: &str,
        candidates: &[ModelId],
    ) -> Result<Generation, GatewayError> {
        let started_at = Instant::now();

        let credential = match self
            .credential_provider
            .resolve(&self.config.credential)
            .await
        {
            Ok(credential) => credential,
            Err(err) => {
                emit_gateway_event(GatewayTelemetryEvent::RequestFailed {
                    request_id,
                    attempts: 0,
                    error_kind: err.kind,
                    elapsed_ms: started_at.elapsed().as_millis() as u64,
                });
                return Err(err);
            }
        };

        emit_gateway_event(GatewayTelemetryEvent::RequestStarted {
            request_id: request_id.clone(),
            candidates: candidates.len(),
        });

        let mut attempts = 0_u32;
        let mut last_error: Option<GatewayError> = None;

        for model in candidates {
            attempts += 1;
            let attempt_started_at = Instant::now();
            emit_gateway_event(GatewayTelemetryEvent::AttemptStarted {
                request_id: request_id.clone(),
                attempt: attempts,
                model: model.clone(),
            });

            let ctx = BackendContext {
                request_id: request_id.clone(),
                model: model.clone(),
                endpoint: self.config.endpoint.clone(),
                credential: credential.clone(),
                timeout: self.config.request_timeout(),
            };

            let outcome = match self.backend.generate(ctx, prompt).await {
                Ok(text) if !text.is_empty() => Ok(text),
                Ok(_) => Err(empty_output(model)),
                Err(err) => Err(err),
            };
            let elapsed_ms = attempt_started_at.elapsed().as_millis() as u64;

            match outcome {
                Ok(text) => {
                    emit_gateway_event(GatewayTelemetryEvent::AttemptSucceeded {
                        request_id: request_id.clone(),
                        attempt: attempts,
                        model: model.clone(),
                        elapsed_ms,
                        output_chars: text.chars().count(),
                    });
                    emit_gateway_event(GatewayTelemetryEvent::RequestCompleted {
                        request_id,
                        attempts,
                        model: model.clone(),
                        elapsed_ms: started_at.elapsed().as_millis() as u64,
                    });
                    return Ok(Generation {
                        text,
                        model: model.clone(),
                    });
                }
                Err(err) => {
                    let terminal = self.terminal_policy.is_terminal(&err);
                    emit_gateway_event(GatewayTelemetryEvent::AttemptFailed {
                        request_id: request_id.clone(),
                        attempt: attempts,
                        model: model.clone(),
                        kind: err.kind,
                        terminal,
                        elapsed_ms,
                        message: err.message.clone(),
                    });

                    if terminal {
                        emit_gateway_event(GatewayTelemetryEvent::RequestFailed {
                            request_id,
                            attempts,
                            error_kind: err.kind,
                            elapsed_ms: started_at.elapsed().as_millis() as u64,
                        });
                        return Err(err);
                    }
                    last_error = Some(err);
                }
            }
        }

        let err = GatewayError::exhausted(last_error);
        emit_gateway_event(GatewayTelemetryEvent::RequestFailed {
            request_id,
            attempts,
            error_kind: err.kind,
            elapsed_ms: started_at.elapsed().as_millis() as u64,
        });
        Err(err)
    }
}
