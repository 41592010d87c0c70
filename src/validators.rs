use serde_json::Value;

/// Normalizes a raw completion into the shape the caller expects.
/// `None` means "could not parse" and becomes a null cell; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseValidator {
    /// Pass the completion through verbatim.
    #[default]
    Identity,
    /// Trim and parse as a whole number.
    Integer,
    /// Trim and parse as a float; a decimal comma is tolerated.
    Float,
    /// Parse the completion as a JSON document.
    Json,
}

impl ResponseValidator {
    pub fn apply(&self, raw: &str) -> Option<Value> {
        match self {
            ResponseValidator::Identity => Some(Value::String(raw.to_string())),
            ResponseValidator::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            ResponseValidator::Float => raw
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            ResponseValidator::Json => serde_json::from_str(raw).ok(),
        }
    }
}
