use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ai_gateway::types::ModelId;

pub const EXHAUSTED_MESSAGE: &str = "All models failed to generate content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    Configuration,
    Authentication,
    Authorization,
    InvalidRequest,
    RateLimited,
    Timeout,
    BackendTransient,
    EmptyOutput,
    ProtocolViolation,
    Exhausted,
    Internal,
}

impl GatewayErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::InvalidRequest => "invalid_request",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::BackendTransient => "backend_transient",
            Self::EmptyOutput => "empty_output",
            Self::ProtocolViolation => "protocol_violation",
            Self::Exhausted => "exhausted",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    pub model: Option<ModelId>,
    pub provider_code: Option<String>,
    pub provider_http_status: Option<u16>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            model: None,
            provider_code: None,
            provider_http_status: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_provider_code(mut self, provider_code: impl Into<String>) -> Self {
        self.provider_code = Some(provider_code.into());
        self
    }

    pub fn with_provider_http_status(mut self, status: u16) -> Self {
        self.provider_http_status = Some(status);
        self
    }

    /// Wraps the last per-model failure once every candidate has been tried.
    /// The message is carried over verbatim so callers see the provider text.
    pub fn exhausted(last: Option<GatewayError>) -> Self {
        match last {
            Some(last) => Self {
                kind: GatewayErrorKind::Exhausted,
                message: last.message,
                model: last.model,
                provider_code: last.provider_code,
                provider_http_status: last.provider_http_status,
            },
            None => Self::new(GatewayErrorKind::Exhausted, EXHAUSTED_MESSAGE),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.model, &self.provider_code) {
            (Some(model), Some(provider_code)) => {
                write!(
                    f,
                    "{} (model={}, provider_code={})",
                    self.message, model, provider_code
                )
            }
            (Some(model), None) => write!(f, "{} (model={})", self.message, model),
            (None, Some(provider_code)) => {
                write!(f, "{} (provider_code={})", self.message, provider_code)
            }
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for GatewayError {}

pub fn configuration_error(message: impl Into<String>) -> GatewayError {
    GatewayError::new(GatewayErrorKind::Configuration, message)
}

pub fn internal_error(message: impl Into<String>) -> GatewayError {
    GatewayError::new(GatewayErrorKind::Internal, message)
}

pub fn empty_output(model: &str) -> GatewayError {
    GatewayError::new(
        GatewayErrorKind::EmptyOutput,
        format!("model {} returned empty text", model),
    )
    .with_model(model.to_string())
}
