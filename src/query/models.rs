use crate::executor::Record;
use serde::{Deserialize, Serialize};

/// Body of `POST /query`. Older clients send the text as `query`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl QueryRequest {
    /// The first of `question` / `query` that has any non-blank text.
    pub fn question(&self) -> &str {
        [&self.question, &self.query]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// The single response envelope of the query endpoint.
///
/// Built only through [`QueryResponse::success`] and [`QueryResponse::failure`],
/// so `error` and a non-empty `sql` never appear together.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct QueryResponse {
    sql: String,
    results: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl QueryResponse {
    pub fn success(sql: String, results: Vec<Record>) -> Self {
        let explanation = format!("Found {} result(s)", results.len());
        Self {
            sql,
            results,
            explanation: Some(explanation),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            sql: String::new(),
            results: Vec::new(),
            explanation: None,
            error: Some(message.into()),
        }
    }
}
