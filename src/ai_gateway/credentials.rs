use std::{env, sync::Arc};

use async_trait::async_trait;

use crate::ai_gateway::{
    error::{GatewayError, configuration_error},
    types::{CredentialLoading, CredentialRef, ResolvedCredential},
};

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self, reference: &CredentialRef) -> Result<ResolvedCredential, GatewayError>;
}

/// Reads the environment on every call.
#[derive(Default)]
pub struct EnvCredentialProvider;

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(&self, reference: &CredentialRef) -> Result<ResolvedCredential, GatewayError> {
        resolve_from_env(reference)
    }
}

/// Captures the credential once at startup. A missing credential is kept as
/// an error and handed back to every request until the process restarts.
pub struct SnapshotCredentialProvider {
    resolved: Result<ResolvedCredential, GatewayError>,
}

impl SnapshotCredentialProvider {
    pub fn capture(reference: &CredentialRef) -> Self {
        Self {
            resolved: resolve_from_env(reference),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.resolved.is_ok()
    }
}

#[async_trait]
impl CredentialProvider for SnapshotCredentialProvider {
    async fn resolve(&self, _reference: &CredentialRef) -> Result<ResolvedCredential, GatewayError> {
        self.resolved.clone()
    }
}

/// Builds the provider selected by `ai_gateway.credential_loading`.
pub fn credential_provider(
    loading: CredentialLoading,
    reference: &CredentialRef,
) -> Arc<dyn CredentialProvider> {
    match loading {
        CredentialLoading::Startup => {
            let snapshot = SnapshotCredentialProvider::capture(reference);
            if !snapshot.is_configured() {
                tracing::warn!(target: "ai_gateway", "credential_missing_requests_will_fail");
            }
            Arc::new(snapshot)
        }
        CredentialLoading::PerRequest => Arc::new(EnvCredentialProvider),
    }
}

fn resolve_from_env(reference: &CredentialRef) -> Result<ResolvedCredential, GatewayError> {
    match reference {
        CredentialRef::Env { var } => match env::var(var) {
            Ok(token) if !token.trim().is_empty() => Ok(ResolvedCredential::api_key(token)),
            _ => Err(configuration_error(format!("Missing {} in environment", var))),
        },
        CredentialRef::InlineToken { token } => {
            if token.trim().is_empty() {
                return Err(configuration_error("inline credential token cannot be empty"));
            }
            Ok(ResolvedCredential::api_key(token.clone()))
        }
        CredentialRef::None => Ok(ResolvedCredential::none()),
    }
}
