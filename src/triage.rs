use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::client::CompletionClient;
use crate::error::GatewayError;
use crate::prompt::PromptTemplate;
use crate::prompts::CLASSIFICATION_PROMPT;

/// Fixed three-way triage domain. Anything the model answers outside the
/// known labels collapses to `Indeterminate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TicketClass {
    Incident,
    ServiceRequest,
    Indeterminate,
}

impl TicketClass {
    /// Maps a raw completion onto the label domain. Tolerates markdown
    /// emphasis, backticks and the Portuguese labels of the legacy system.
    pub fn from_completion(completion: &str) -> Self {
        let normalized = completion
            .trim()
            .trim_matches(|c| c == '`' || c == '*' || c == '"' || c == '.')
            .to_lowercase();
        match normalized.as_str() {
            "incident" | "incidente" => TicketClass::Incident,
            "service request" | "requisição de serviço" => TicketClass::ServiceRequest,
            _ => TicketClass::Indeterminate,
        }
    }
}

impl fmt::Display for TicketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TicketClass::Incident => "Incident",
            TicketClass::ServiceRequest => "Service Request",
            TicketClass::Indeterminate => "Indeterminate",
        };
        write!(f, "{label}")
    }
}

/// Single-shot classification of one ticket description. Returns the raw
/// completion alongside the parsed label.
pub async fn classify(
    client: &dyn CompletionClient,
    description: &str,
) -> Result<(String, TicketClass), GatewayError> {
    let template = PromptTemplate::new(CLASSIFICATION_PROMPT);
    let vars = HashMap::from([("description".to_string(), description.to_string())]);
    let prompt = template.render(&vars)?;
    let completion = client.complete(&prompt).await?;
    let class = TicketClass::from_completion(&completion);
    Ok((completion, class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use async_trait::async_trait;

    struct FixedClient(&'static str);

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete(&self, _prompt: &str) -> Result<String, ClientError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn parses_the_three_labels() {
        assert_eq!(TicketClass::from_completion("Incident"), TicketClass::Incident);
        assert_eq!(
            TicketClass::from_completion("Service Request"),
            TicketClass::ServiceRequest
        );
        assert_eq!(
            TicketClass::from_completion("Indeterminate"),
            TicketClass::Indeterminate
        );
    }

    #[test]
    fn tolerates_markdown_and_legacy_labels() {
        assert_eq!(TicketClass::from_completion("`Incident`"), TicketClass::Incident);
        assert_eq!(TicketClass::from_completion("**incidente**"), TicketClass::Incident);
        assert_eq!(
            TicketClass::from_completion("Requisição de Serviço"),
            TicketClass::ServiceRequest
        );
    }

    #[test]
    fn unknown_answers_collapse_to_indeterminate() {
        assert_eq!(
            TicketClass::from_completion("probably an incident, hard to say"),
            TicketClass::Indeterminate
        );
    }

    #[tokio::test]
    async fn classify_renders_the_description_and_parses_the_label() {
        let client = FixedClient("Service Request");
        let (raw, class) = classify(&client, "Please create a new user account")
            .await
            .unwrap();
        assert_eq!(raw, "Service Request");
        assert_eq!(class, TicketClass::ServiceRequest);
    }
}
