use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::{Value, json};

use crate::ai_gateway::{
    adapters::{GenerationBackend, http_common},
    error::{GatewayError, GatewayErrorKind, internal_error},
    types::BackendContext,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Generative Language `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
}

impl GeminiBackend {
    pub fn new() -> Result<Self, GatewayError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| internal_error(format!("failed to build http client: {}", err)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, ctx: BackendContext, prompt: &str) -> Result<String, GatewayError> {
        let url = format!(
            "{}/models/{}:generateContent",
            ctx.endpoint.trim_end_matches('/'),
            ctx.model
        );
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let mut req_builder = self
            .client
            .post(url)
            .timeout(ctx.timeout)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", ctx.request_id.as_str())
            .json(&body);
        if let Some(api_key) = &ctx.credential.api_key {
            req_builder = req_builder.header(API_KEY_HEADER, api_key);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|err| http_common::map_transport_error(&err, &ctx.model))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(http_common::map_http_error(status, &ctx.model, &body));
        }

        let payload = response.json::<Value>().await.map_err(|err| {
            GatewayError::new(
                GatewayErrorKind::ProtocolViolation,
                format!("gemini body decode failed: {}", err),
            )
            .with_model(ctx.model.clone())
        })?;

        extract_text(&payload, &ctx.model)
    }
}

/// Concatenates the text parts of the first candidate. A response without
/// candidates is a protocol violation unless the prompt was blocked, which is
/// reported with the provider's block reason.
pub fn extract_text(payload: &Value, model: &str) -> Result<String, GatewayError> {
    let Some(candidate) = payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    else {
        let message = match payload
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(Value::as_str)
        {
            Some(reason) => format!("prompt was blocked by the provider: {}", reason),
            None => "gemini response missing candidates".to_string(),
        };
        return Err(
            GatewayError::new(GatewayErrorKind::ProtocolViolation, message)
                .with_model(model.to_string()),
        );
    };

    let text = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Ok(text)
}
