pub mod database;
pub mod db_pool;
pub mod http;

use crate::config::{DatabaseConfig, ExecutorConfig};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// One result row: column name to value.
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Debug)]
pub enum ExecutionError {
    Transport(String),
    Status { status: u16, body: String },
    Decode(String),
    Database(String),
    Config(String),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::Transport(msg) => write!(f, "Execution endpoint unreachable: {}", msg),
            ExecutionError::Status { status, body } => {
                write!(f, "Execution endpoint responded with status {}: {}", status, body)
            }
            ExecutionError::Decode(msg) => write!(f, "Could not decode execution results: {}", msg),
            ExecutionError::Database(msg) => write!(f, "Database error: {}", msg),
            ExecutionError::Config(msg) => write!(f, "Executor configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ExecutionError {}

/// Runs a SQL string somewhere and hands back the rows.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<Record>, ExecutionError>;

    fn name(&self) -> &'static str;
}

pub fn build_executor(
    executor: &ExecutorConfig,
    db: &DatabaseConfig,
) -> Result<Arc<dyn SqlExecutor>, ExecutionError> {
    let sql_executor: Arc<dyn SqlExecutor> = match executor.backend.as_str() {
        "http" => Arc::new(http::HttpSqlExecutor::new(executor)?),
        "duckdb" => {
            let connection_string = db.connection_string.as_deref().ok_or_else(|| {
                ExecutionError::Config("a database connection string is required".to_string())
            })?;
            Arc::new(database::DuckDbExecutor::open(
                connection_string,
                db.pool_size,
            )?)
        }
        other => {
            return Err(ExecutionError::Config(format!(
                "Unsupported executor backend: {}",
                other
            )))
        }
    };

    Ok(sql_executor)
}
