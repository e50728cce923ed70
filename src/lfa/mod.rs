pub mod prompt;

use serde::{Deserialize, Deserializer, Serialize};

pub use prompt::{PromptConfig, PromptTemplate, render_prompt};

/// A Logical Framework Analysis as submitted by the planning form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LfaPayload {
    /// Problem statement.
    #[serde(default, deserialize_with = "null_as_default")]
    pub step1: String,
    /// Desired change.
    #[serde(default, deserialize_with = "null_as_default")]
    pub step2: String,
    /// Intervention.
    #[serde(default, deserialize_with = "null_as_default")]
    pub step3: String,
    /// Stakeholders.
    #[serde(default, deserialize_with = "null_as_default")]
    pub step4: Vec<Stakeholder>,
    /// Practice changes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub step5: String,
    /// KPIs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub step6: String,
}

impl LfaPayload {
    pub fn stakeholder_names(&self) -> String {
        self.step4
            .iter()
            .map(|stakeholder| stakeholder.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Stakeholder {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Default::default(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
