use serde_json::Value;

use crate::ai_gateway::error::{GatewayError, GatewayErrorKind};

const AUTH_FAILURE_REASONS: &[&str] = &["API_KEY_INVALID", "API_KEY_EXPIRED"];

/// Provider details pulled out of a Google-style `{"error": {...}}` envelope.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorBody {
    pub message: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
}

pub fn parse_error_body(body: &str) -> ProviderErrorBody {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ProviderErrorBody::default();
    };
    let Some(error) = value.get("error") else {
        return ProviderErrorBody::default();
    };

    let reason = error
        .get("details")
        .and_then(Value::as_array)
        .and_then(|details| {
            details
                .iter()
                .find_map(|detail| detail.get("reason").and_then(Value::as_str))
        })
        .map(str::to_string);

    ProviderErrorBody {
        message: error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        status: error
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string),
        reason,
    }
}

pub fn map_http_error(status: u16, model: &str, body: &str) -> GatewayError {
    let provider = parse_error_body(body);
    let detail = provider
        .message
        .clone()
        .unwrap_or_else(|| body.chars().take(240).collect::<String>());

    let credential_rejected = provider
        .reason
        .as_deref()
        .is_some_and(|reason| AUTH_FAILURE_REASONS.contains(&reason));

    let kind = if status == 401 || credential_rejected {
        GatewayErrorKind::Authentication
    } else if status == 403 {
        GatewayErrorKind::Authorization
    } else if status == 408 || status == 429 {
        GatewayErrorKind::RateLimited
    } else if status == 504 {
        GatewayErrorKind::Timeout
    } else if (400..500).contains(&status) {
        GatewayErrorKind::InvalidRequest
    } else {
        GatewayErrorKind::BackendTransient
    };

    let mut message = format!("backend returned status {}", status);
    if !detail.trim().is_empty() {
        message = format!("{}: {}", message, detail.trim());
    }
    if let Some(reason) = &provider.reason {
        message = format!("{} [{}]", message, reason);
    }

    let mut err = GatewayError::new(kind, message)
        .with_model(model.to_string())
        .with_provider_http_status(status);
    if let Some(code) = provider.reason.or(provider.status) {
        err = err.with_provider_code(code);
    }
    err
}

pub fn map_transport_error(err: &reqwest::Error, model: &str) -> GatewayError {
    let kind = if err.is_timeout() {
        GatewayErrorKind::Timeout
    } else {
        GatewayErrorKind::BackendTransient
    };
    GatewayError::new(kind, format!("request to model {} failed: {}", model, err))
        .with_model(model.to_string())
}
