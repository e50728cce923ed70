use crate::ai_gateway::error::{GatewayError, GatewayErrorKind};

/// Decides whether a failed attempt should stop the fallback loop.
///
/// A terminal error is one that every remaining candidate would hit as well,
/// such as a rejected credential.
pub trait TerminalErrorPolicy: Send + Sync {
    fn is_terminal(&self, err: &GatewayError) -> bool;
}

/// Treats typed credential failures as terminal and, for providers that only
/// report them in free text, any message containing one of `markers`.
#[derive(Debug, Clone)]
pub struct MarkerTerminalPolicy {
    markers: Vec<String>,
}

impl MarkerTerminalPolicy {
    pub fn new(markers: Vec<String>) -> Self {
        Self {
            markers: markers
                .into_iter()
                .filter(|marker| !marker.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl TerminalErrorPolicy for MarkerTerminalPolicy {
    fn is_terminal(&self, err: &GatewayError) -> bool {
        if matches!(
            err.kind,
            GatewayErrorKind::Authentication | GatewayErrorKind::Configuration
        ) {
            return true;
        }

        let matches_marker = |text: &str| self.markers.iter().any(|m| text.contains(m.as_str()));
        matches_marker(&err.message) || err.provider_code.as_deref().is_some_and(matches_marker)
    }
}

impl<F> TerminalErrorPolicy for F
where
    F: Fn(&GatewayError) -> bool + Send + Sync,
{
    fn is_terminal(&self, err: &GatewayError) -> bool {
        self(err)
    }
}
