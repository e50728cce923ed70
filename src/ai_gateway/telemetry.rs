use crate::ai_gateway::{
    error::GatewayErrorKind,
    types::{ModelId, RequestId},
};

#[derive(Debug, Clone)]
pub enum GatewayTelemetryEvent {
    RequestStarted {
        request_id: RequestId,
        candidates: usize,
    },
    AttemptStarted {
        request_id: RequestId,
        attempt: u32,
        model: ModelId,
    },
    AttemptSucceeded {
        request_id: RequestId,
        attempt: u32,
        model: ModelId,
        elapsed_ms: u64,
        output_chars: usize,
    },
    AttemptFailed {
        request_id: RequestId,
        attempt: u32,
        model: ModelId,
        kind: GatewayErrorKind,
        terminal: bool,
        elapsed_ms: u64,
        message: String,
    },
    RequestCompleted {
        request_id: RequestId,
        attempts: u32,
        model: ModelId,
        elapsed_ms: u64,
    },
    RequestFailed {
        request_id: RequestId,
        attempts: u32,
        error_kind: GatewayErrorKind,
        elapsed_ms: u64,
    },
}

pub fn emit_gateway_event(event: GatewayTelemetryEvent) {
    match event {
        GatewayTelemetryEvent::RequestStarted {
            request_id,
            candidates,
        } => {
            tracing::info!(
                target: "ai_gateway",
                request_id = %request_id,
                candidates = candidates,
                "request_started"
            );
        }
        GatewayTelemetryEvent::AttemptStarted {
            request_id,
            attempt,
            model,
        } => {
            tracing::info!(
                target: "ai_gateway",
                request_id = %request_id,
                attempt = attempt,
                model = %model,
                "attempt_started"
            );
        }
        GatewayTelemetryEvent::AttemptSucceeded {
            request_id,
            attempt,
            model,
            elapsed_ms,
            output_chars,
        } => {
            tracing::info!(
                target: "ai_gateway",
                request_id = %request_id,
                attempt = attempt,
                model = %model,
                elapsed_ms = elapsed_ms,
                output_chars = output_chars,
                "attempt_succeeded"
            );
        }
        GatewayTelemetryEvent::AttemptFailed {
            request_id,
            attempt,
            model,
            kind,
            terminal,
            elapsed_ms,
            message,
        } => {
            tracing::warn!(
                target: "ai_gateway",
                request_id = %request_id,
                attempt = attempt,
                model = %model,
                kind = kind.as_str(),
                terminal = terminal,
                elapsed_ms = elapsed_ms,
                error = %message,
                "attempt_failed"
            );
        }
        GatewayTelemetryEvent::RequestCompleted {
            request_id,
            attempts,
            model,
            elapsed_ms,
        } => {
            tracing::info!(
                target: "ai_gateway",
                request_id = %request_id,
                attempts = attempts,
                model = %model,
                elapsed_ms = elapsed_ms,
                "request_completed"
            );
        }
        GatewayTelemetryEvent::RequestFailed {
            request_id,
            attempts,
            error_kind,
            elapsed_ms,
        } => {
            tracing::error!(
                target: "ai_gateway",
                request_id = %request_id,
                attempts = attempts,
                error_kind = error_kind.as_str(),
                elapsed_ms = elapsed_ms,
                "request_failed"
            );
        }
    }
}
