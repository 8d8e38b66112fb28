use super::{ExecutionError, Record, SqlExecutor};
use crate::config::ExecutorConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Forwards SQL to the backend's execute-sql endpoint.
pub struct HttpSqlExecutor {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct ExecuteSqlRequest<'a> {
    sql: &'a str,
}

#[derive(Deserialize)]
struct ExecuteSqlResponse {
    #[serde(default)]
    results: Vec<Record>,
}

impl HttpSqlExecutor {
    pub fn new(config: &ExecutorConfig) -> Result<Self, ExecutionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExecutionError::Config(e.to_string()))?;

        let url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.path.trim_start_matches('/')
        );

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SqlExecutor for HttpSqlExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<Record>, ExecutionError> {
        debug!("Forwarding SQL to {}", self.url());

        let response = self
            .client
            .post(&self.url)
            .json(&ExecuteSqlRequest { sql })
            .send()
            .await
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ExecuteSqlResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::Decode(e.to_string()))?;

        Ok(payload.results)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
