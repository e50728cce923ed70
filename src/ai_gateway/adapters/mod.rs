use async_trait::async_trait;

use crate::ai_gateway::{error::GatewayError, types::BackendContext};

pub mod gemini;
pub mod http_common;

/// One operation against the external generation service: turn a prompt into
/// text with the model named in `ctx`. Empty text is returned as-is; deciding
/// what an empty answer means belongs to the caller.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, ctx: BackendContext, prompt: &str) -> Result<String, GatewayError>;
}
