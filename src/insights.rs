use std::sync::Arc;

use crate::{
    ai_gateway::{error::GatewayError, gateway::InsightGateway, types::Generation},
    lfa::{LfaPayload, PromptTemplate, render_prompt},
};

/// Turns an LFA into narrative insights through the gateway.
pub struct InsightService {
    gateway: Arc<InsightGateway>,
    template: PromptTemplate,
}

impl InsightService {
    pub fn new(gateway: Arc<InsightGateway>, template: PromptTemplate) -> Self {
        Self { gateway, template }
    }

    pub fn template(&self) -> PromptTemplate {
        self.template
    }

    pub async fn generate_insights(&self, lfa: &LfaPayload) -> Result<Generation, GatewayError> {
        let prompt = render_prompt(self.template, lfa);
        tracing::debug!(
            target: "insights",
            template = ?self.template,
            stakeholders = lfa.step4.len(),
            prompt_chars = prompt.chars().count(),
            "insight_prompt_rendered"
        );
        self.gateway.generate(&prompt).await
    }
}
