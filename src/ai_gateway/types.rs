use std::time::Duration;

use serde::{Deserialize, Serialize};

pub type ModelId = String;
pub type RequestId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialRef {
    Env { var: String },
    InlineToken { token: String },
    None,
}

impl Default for CredentialRef {
    fn default() -> Self {
        CredentialRef::Env {
            var: default_credential_var(),
        }
    }
}

/// When the credential is read from its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialLoading {
    /// Once at process start; a key added later needs a restart.
    #[default]
    Startup,
    PerRequest,
}

#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub api_key: Option<String>,
}

impl ResolvedCredential {
    pub fn api_key(token: impl Into<String>) -> Self {
        Self {
            api_key: Some(token.into()),
        }
    }

    pub fn none() -> Self {
        Self { api_key: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIGatewayConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub credential: CredentialRef,
    #[serde(default)]
    pub credential_loading: CredentialLoading,
    #[serde(default = "default_candidates")]
    pub candidates: Vec<ModelId>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_terminal_error_markers")]
    pub terminal_error_markers: Vec<String>,
}

impl Default for AIGatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            credential: CredentialRef::default(),
            credential_loading: CredentialLoading::default(),
            candidates: default_candidates(),
            request_timeout_ms: default_request_timeout_ms(),
            terminal_error_markers: default_terminal_error_markers(),
        }
    }
}

impl AIGatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

/// Everything a backend needs for a single model attempt.
#[derive(Debug, Clone)]
pub struct BackendContext {
    pub request_id: RequestId,
    pub model: ModelId,
    pub endpoint: String,
    pub credential: ResolvedCredential,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub model: ModelId,
}

fn default_credential_var() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_candidates() -> Vec<ModelId> {
    vec![
        "gemini-3-flash-preview".to_string(),
        "gemini-flash-latest".to_string(),
        "gemini-1.5-flash".to_string(),
    ]
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_terminal_error_markers() -> Vec<String> {
    vec!["API_KEY_INVALID".to_string(), "expired".to_string()]
}
