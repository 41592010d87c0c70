use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Placeholder that may legitimately be absent: when no retriever is
/// configured the `context` slot renders as the empty string instead of
/// failing the whole prompt.
pub const CONTEXT_VAR: &str = "context";

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("Invalid regex pattern"))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no value supplied for prompt placeholder `{0}`")]
    MissingVariable(String),
}

/// A prompt template with `{name}` placeholders, parsed once at construction.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: &str) -> Self {
        let mut variables = Vec::new();
        for cap in placeholder_regex().captures_iter(template) {
            if let Some(name) = cap.get(1) {
                let name = name.as_str().to_string();
                if !variables.contains(&name) {
                    variables.push(name);
                }
            }
        }
        PromptTemplate {
            template: template.to_string(),
            variables,
        }
    }

    /// Placeholder names in order of first appearance.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Substitutes every placeholder. Strict: a placeholder without a value
    /// fails, except the optional `context` slot which renders empty.
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
        for name in &self.variables {
            if name != CONTEXT_VAR && !vars.contains_key(name) {
                return Err(TemplateError::MissingVariable(name.clone()));
            }
        }
        let rendered = placeholder_regex().replace_all(&self.template, |caps: &regex::Captures| {
            caps.get(1)
                .and_then(|name| vars.get(name.as_str()))
                .map(String::as_str)
                .unwrap_or("")
                .to_string()
        });
        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_placeholders_in_order() {
        let template = PromptTemplate::new("Classify: {description} for {company}");
        assert_eq!(template.variables(), ["description", "company"]);
    }

    #[test]
    fn deduplicates_repeated_placeholders() {
        let template = PromptTemplate::new("{question} and again {question}");
        assert_eq!(template.variables(), ["question"]);
    }

    #[test]
    fn renders_all_placeholders() {
        let template = PromptTemplate::new("Classify: {description}");
        let rendered = template
            .render(&vars(&[("description", "VPN is down for everyone")]))
            .unwrap();
        assert_eq!(rendered, "Classify: VPN is down for everyone");
    }

    #[test]
    fn missing_placeholder_is_an_error() {
        let template = PromptTemplate::new("Classify: {description}");
        let err = template.render(&vars(&[])).unwrap_err();
        assert_eq!(err, TemplateError::MissingVariable("description".into()));
    }

    #[test]
    fn missing_context_renders_empty() {
        let template = PromptTemplate::new("Docs: \"{context}\" Question: {question}");
        let rendered = template.render(&vars(&[("question", "why?")])).unwrap();
        assert_eq!(rendered, "Docs: \"\" Question: why?");
    }

    #[test]
    fn supplied_context_is_substituted() {
        let template = PromptTemplate::new("Docs: {context}");
        let rendered = template
            .render(&vars(&[("context", "excerpt one")]))
            .unwrap();
        assert_eq!(rendered, "Docs: excerpt one");
    }

    #[test]
    fn template_without_placeholders_renders_verbatim() {
        let template = PromptTemplate::new("no slots here");
        assert_eq!(template.render(&vars(&[])).unwrap(), "no slots here");
    }
}
