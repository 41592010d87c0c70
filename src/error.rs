use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::client::ClientError;
use crate::prompt::TemplateError;

/// Top-level error for the gateway. Every variant that reaches the HTTP
/// boundary maps to a 500 with the display message as the body.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A column named in the prompt variable map does not exist in the input
    /// table. Raised at construction, before any model call.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to parse uploaded csv: {0}")]
    Csv(String),

    /// A failure in batch orchestration outside the per-row retry boundary.
    /// Per-row model failures never end up here; they degrade to null cells.
    #[error("failed to generate responses: {0}")]
    BatchGeneration(anyhow::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    ModelCall(#[from] ClientError),
}

impl From<csv::Error> for GatewayError {
    fn from(err: csv::Error) -> Self {
        GatewayError::Csv(err.to_string())
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_internal_server_error() {
        let errors = [
            GatewayError::Configuration("column `x` does not exist".into()),
            GatewayError::Csv("bad header".into()),
            GatewayError::BatchGeneration(anyhow::anyhow!("boom")),
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn batch_generation_message_includes_cause() {
        let err = GatewayError::BatchGeneration(anyhow::anyhow!("row 3 exploded"));
        assert!(err.to_string().contains("row 3 exploded"));
    }
}
