pub mod models;
#[cfg(test)]
pub mod testing;

use crate::executor::{Record, SqlExecutor};
use crate::llm::prompt::{
    build_prompt, build_prompt_with_examples, PromptError, SYSTEM_INSTRUCTION,
};
use crate::llm::sanitize::sanitize_sql;
use crate::llm::{LlmError, TextCompletionProvider};
use crate::training::TrainingStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a question produced no SQL.
#[derive(Debug)]
pub enum QueryError {
    Validation(String),
    Prompt(PromptError),
    Model(LlmError),
    EmptySql,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Validation(msg) => write!(f, "{}", msg),
            QueryError::Prompt(e) => write!(f, "{}", e),
            QueryError::Model(e) => write!(f, "{}", e),
            QueryError::EmptySql => write!(f, "Could not generate SQL from question"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<PromptError> for QueryError {
    fn from(e: PromptError) -> Self {
        QueryError::Prompt(e)
    }
}

impl From<LlmError> for QueryError {
    fn from(e: LlmError) -> Self {
        QueryError::Model(e)
    }
}

/// SQL that was generated, with whatever rows running it produced.
#[derive(Debug)]
pub struct QueryOutcome {
    pub sql: String,
    pub results: Vec<Record>,
}

/// Question in, SQL and rows out.
pub struct QueryService {
    provider: Arc<dyn TextCompletionProvider>,
    executor: Arc<dyn SqlExecutor>,
    training: Arc<TrainingStore>,
    schema: &'static str,
    example_count: usize,
}

impl QueryService {
    pub fn new(
        provider: Arc<dyn TextCompletionProvider>,
        executor: Arc<dyn SqlExecutor>,
        training: Arc<TrainingStore>,
        schema: &'static str,
        example_count: usize,
    ) -> Self {
        Self {
            provider,
            executor,
            training,
            schema,
            example_count,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Generates SQL for `question` and runs it.
    ///
    /// Errors only before any SQL exists. Once SQL has been generated the
    /// outcome always carries it, even when running it fails.
    pub async fn answer(&self, question: &str) -> Result<QueryOutcome, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::Validation("No question provided".to_string()));
        }

        info!("Generating SQL for: {}", question);
        let sql = self.generate_sql(question).await?;
        info!("Generated SQL: {}", sql);

        let results = match self.executor.execute(&sql).await {
            Ok(rows) => rows,
            Err(e) => {
                // Rows are best effort; the SQL still goes back to the caller.
                warn!("Could not execute SQL, returning no results: {}", e);
                Vec::new()
            }
        };
        info!("Got {} results", results.len());

        Ok(QueryOutcome { sql, results })
    }

    async fn generate_sql(&self, question: &str) -> Result<String, QueryError> {
        let examples = self.training.related(question, self.example_count).await;
        let prompt = if examples.is_empty() {
            build_prompt(self.schema, question)?
        } else {
            build_prompt_with_examples(self.schema, question, &examples)?
        };
        debug!("Prepared prompt with {} examples: {}", examples.len(), prompt);

        let raw = self.provider.complete(SYSTEM_INSTRUCTION, &prompt).await?;
        debug!("Raw completion: {}", raw);

        let sql = sanitize_sql(&raw);
        if sql.is_empty() {
            return Err(QueryError::EmptySql);
        }
        Ok(sql)
    }
}
