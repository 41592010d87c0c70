use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;

use crate::client::{ClientError, CompletionClient};
use crate::error::GatewayError;
use crate::prompt::{CONTEXT_VAR, PromptTemplate, TemplateError};
use crate::table::Table;
use crate::validators::ResponseValidator;

pub const DEFAULT_RESPONSE_COL: &str = "llm_response";
pub const CONTEXT_COL: &str = "context";

/// Placeholder name → input column name.
pub type PromptVariableMap = HashMap<String, String>;

/// Supplies contextual text for a row's question (retrieval-augmented
/// generation). Retrieval failures are structural and abort the batch.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, question: &str) -> anyhow::Result<String>;
}

/// Maps a table to model calls row by row: renders the prompt with each
/// row's values, invokes the client with a bounded retry budget, validates
/// the completion and joins the results back positionally.
pub struct LlmIntegrator {
    table: Table,
    prompt_variables_map: PromptVariableMap,
    template: PromptTemplate,
    client: Arc<dyn CompletionClient>,
    validator: ResponseValidator,
    retriever: Option<Arc<dyn Retriever>>,
    max_retry: usize,
    response_col: String,
}

impl LlmIntegrator {
    /// Validates the configuration once, before any model call: every column
    /// named in the variable map must exist in the input table.
    pub fn new(
        table: Table,
        prompt_variables_map: PromptVariableMap,
        template: &str,
        client: Arc<dyn CompletionClient>,
    ) -> Result<Self, GatewayError> {
        for column in prompt_variables_map.values() {
            if table.column_index(column).is_none() {
                return Err(GatewayError::Configuration(format!(
                    "column `{column}` does not exist in the input table"
                )));
            }
        }
        Ok(LlmIntegrator {
            table,
            prompt_variables_map,
            template: PromptTemplate::new(template),
            client,
            validator: ResponseValidator::default(),
            retriever: None,
            max_retry: 0,
            response_col: DEFAULT_RESPONSE_COL.to_string(),
        })
    }

    pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_max_retry(mut self, max_retry: usize) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn with_response_col(mut self, response_col: &str) -> Self {
        self.response_col = response_col.to_string();
        self
    }

    /// Invokes the client with a fixed attempt budget: `max_retry + 1` total
    /// attempts, no backoff. Returns the last error once the budget is spent.
    async fn invoke_with_retry(&self, prompt: &str) -> Result<String, ClientError> {
        let mut attempt = 0;
        loop {
            match self.client.complete(prompt).await {
                Ok(completion) => return Ok(completion),
                Err(err) if attempt < self.max_retry => {
                    attempt += 1;
                    log::warn!(
                        "model call failed (attempt {}/{}): {}",
                        attempt,
                        self.max_retry + 1,
                        err
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Generates one row's response. Exhausted retries and unparseable
    /// completions both degrade to `None`; only a render failure (a
    /// programming error, not a model error) propagates.
    pub async fn generate_single_response(
        &self,
        vars: &HashMap<String, String>,
    ) -> Result<Option<Value>, TemplateError> {
        let prompt = self.template.render(vars)?;
        match self.invoke_with_retry(&prompt).await {
            Ok(completion) => Ok(self.validator.apply(&completion)),
            Err(err) => {
                log::warn!(
                    "row degraded to null after {} attempts: {}",
                    self.max_retry + 1,
                    err
                );
                Ok(None)
            }
        }
    }

    /// Runs the batch: optional retrieval pass, then the sequential row loop.
    /// Output rows correspond 1:1 and in order to input rows. The input table
    /// is copied; the caller's data is never mutated.
    pub async fn generate_response_df(&self) -> Result<Table, GatewayError> {
        let mut table = self.table.clone();
        if let Some(retriever) = &self.retriever {
            table = self.attach_context(retriever.as_ref(), table).await?;
        }

        let context_idx = table.column_index(CONTEXT_COL);
        let mut results = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let mut vars = HashMap::new();
            for (placeholder, column) in &self.prompt_variables_map {
                let idx = table.column_index(column).ok_or_else(|| {
                    GatewayError::BatchGeneration(anyhow!(
                        "column `{column}` disappeared during generation"
                    ))
                })?;
                vars.insert(placeholder.clone(), table.cell_text(row, idx));
            }
            if let Some(idx) = context_idx {
                vars.entry(CONTEXT_VAR.to_string())
                    .or_insert_with(|| table.cell_text(row, idx));
            }
            let value = self
                .generate_single_response(&vars)
                .await
                .map_err(|err| GatewayError::BatchGeneration(err.into()))?;
            results.push(value.unwrap_or(Value::Null));
        }

        let degraded = results.iter().filter(|v| v.is_null()).count();
        log::info!(
            "generated {} responses ({} degraded to null)",
            results.len(),
            degraded
        );
        Ok(table.with_column(&self.response_col, results))
    }

    async fn attach_context(
        &self,
        retriever: &dyn Retriever,
        table: Table,
    ) -> Result<Table, GatewayError> {
        let question_col = self
            .prompt_variables_map
            .get("question")
            .cloned()
            .unwrap_or_else(|| "question".to_string());
        let idx = table.column_index(&question_col).ok_or_else(|| {
            GatewayError::BatchGeneration(anyhow!(
                "retrieval requires a `{question_col}` column in the input table"
            ))
        })?;
        let mut values = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let context = retriever
                .retrieve(&table.cell_text(row, idx))
                .await
                .map_err(GatewayError::BatchGeneration)?;
            values.push(Value::String(context));
        }
        Ok(table.with_column(CONTEXT_COL, values))
    }
}
