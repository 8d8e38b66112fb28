//! In-process stand-ins for the model and execution endpoints.

use crate::executor::{ExecutionError, Record, SqlExecutor};
use crate::llm::{LlmError, TextCompletionProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn row(column: &str, value: impl Into<Value>) -> Record {
    let mut record = Record::new();
    record.insert(column.to_string(), value.into());
    record
}

pub struct MockProvider {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl MockProvider {
    pub fn replying(text: &str) -> Self {
        Self::with(Ok(text.to_string()))
    }

    /// Fails like an endpoint answering with a non-success status.
    pub fn failing(body: &str) -> Self {
        Self::with(Err(body.to_string()))
    }

    fn with(reply: Result<String, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompletionProvider for MockProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((system.to_string(), prompt.to_string()));
        self.reply.clone().map_err(|body| {
            LlmError::ResponseError(format!("API responded with status code: {}", body))
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub struct MockExecutor {
    rows: Option<Vec<Record>>,
    calls: AtomicUsize,
    last_sql: Mutex<Option<String>>,
}

impl MockExecutor {
    pub fn returning(rows: Vec<Record>) -> Self {
        Self::with(Some(rows))
    }

    /// Fails like an unreachable execution endpoint.
    pub fn failing() -> Self {
        Self::with(None)
    }

    fn with(rows: Option<Vec<Record>>) -> Self {
        Self {
            rows,
            calls: AtomicUsize::new(0),
            last_sql: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_sql(&self) -> Option<String> {
        self.last_sql.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<Record>, ExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_sql.lock().unwrap() = Some(sql.to_string());
        self.rows
            .clone()
            .ok_or_else(|| ExecutionError::Transport("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
