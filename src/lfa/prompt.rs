use serde::{Deserialize, Serialize};

use crate::lfa::LfaPayload;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptTemplate {
    /// Asks for Strengths, Gaps/Risks and System-Level Suggestions sections.
    #[default]
    Review,
    /// Education-systems-expert framing asking for concise strategic insights.
    Strategic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub template: PromptTemplate,
}

pub fn render_prompt(template: PromptTemplate, lfa: &LfaPayload) -> String {
    let stakeholders = lfa.stakeholder_names();
    match template {
        PromptTemplate::Review => format!(
            "Review this LFA and provide professional insights \
             (### Strengths, ### Gaps/Risks, ### System-Level Suggestions):\n\
             Problem: {}\n\
             Change: {}\n\
             Interventions: {}\n\
             Stakeholders: {}\n\
             Practice Changes: {}\n\
             KPIs: {}\n",
            lfa.step1, lfa.step2, lfa.step3, stakeholders, lfa.step5, lfa.step6,
        ),
        PromptTemplate::Strategic => format!(
            "You are an education systems expert.\n\
             Based on the following Logical Framework data, generate concise strategic insights:\n\
             \n\
             Problem Statement:\n{}\n\
             \n\
             Desired Change:\n{}\n\
             \n\
             Intervention:\n{}\n\
             \n\
             Stakeholders:\n{}\n\
             \n\
             Practice Changes:\n{}\n\
             \n\
             KPIs:\n{}\n",
            lfa.step1, lfa.step2, lfa.step3, stakeholders, lfa.step5, lfa.step6,
        ),
    }
}
