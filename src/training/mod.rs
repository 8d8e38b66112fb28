pub mod corpus;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use tokio::sync::RwLock;
use tracing::debug;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9_]+").unwrap());

/// Words too common in questions to say anything about which example fits.
const STOP_WORDS: &[&str] = &[
    "a", "all", "an", "and", "are", "by", "for", "from", "how", "in", "is", "me", "of", "on",
    "the", "to", "what", "which", "with",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub question: String,
    pub sql: String,
}

#[derive(Debug)]
pub enum TrainingError {
    EmptyQuestion,
    EmptySql,
}

impl fmt::Display for TrainingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingError::EmptyQuestion => write!(f, "Training question must not be empty"),
            TrainingError::EmptySql => write!(f, "Training SQL must not be empty"),
        }
    }
}

impl std::error::Error for TrainingError {}

#[derive(Default)]
struct TrainingData {
    ddl: Vec<String>,
    examples: Vec<TrainingExample>,
}

/// Append-only store of DDL and question/SQL pairs used to bias generation.
///
/// Entries are never edited or removed once added, so readers only ever see
/// the store grow.
#[derive(Default)]
pub struct TrainingStore {
    inner: RwLock<TrainingData>,
}

impl TrainingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_ddl(&self, ddl: &str) {
        let ddl = ddl.trim();
        if ddl.is_empty() {
            return;
        }
        self.inner.write().await.ddl.push(ddl.to_string());
    }

    pub async fn add_example(&self, question: &str, sql: &str) -> Result<(), TrainingError> {
        let question = question.trim();
        let sql = sql.trim();
        if question.is_empty() {
            return Err(TrainingError::EmptyQuestion);
        }
        if sql.is_empty() {
            return Err(TrainingError::EmptySql);
        }

        let mut data = self.inner.write().await;
        data.examples.push(TrainingExample {
            question: question.to_string(),
            sql: sql.to_string(),
        });
        debug!("Training store now holds {} examples", data.examples.len());
        Ok(())
    }

    pub async fn examples(&self) -> Vec<TrainingExample> {
        self.inner.read().await.examples.clone()
    }

    /// Stored DDL, oldest first. Listed by `GET /train`; prompts use the
    /// schema description instead.
    pub async fn ddl(&self) -> Vec<String> {
        self.inner.read().await.ddl.clone()
    }

    pub async fn ddl_count(&self) -> usize {
        self.inner.read().await.ddl.len()
    }

    pub async fn example_count(&self) -> usize {
        self.inner.read().await.examples.len()
    }

    /// Returns up to `limit` stored examples sharing words with `question`,
    /// best match first. Ties keep insertion order.
    pub async fn related(&self, question: &str, limit: usize) -> Vec<TrainingExample> {
        if limit == 0 {
            return Vec::new();
        }

        let wanted = keywords(question);
        if wanted.is_empty() {
            return Vec::new();
        }

        let data = self.inner.read().await;
        let mut scored: Vec<(usize, &TrainingExample)> = data
            .examples
            .iter()
            .map(|example| (keywords(&example.question).intersection(&wanted).count(), example))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, example)| example.clone())
            .collect()
    }
}

fn keywords(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_example_appends_without_touching_existing_entries() {
        let store = TrainingStore::new();
        store.add_example("Q1", "SELECT 1;").await.unwrap();
        let before = store.examples().await;

        store.add_example("Q", "S").await.unwrap();
        let after = store.examples().await;

        assert_eq!(after.len(), 2);
        assert_eq!(after[0], before[0]);
        assert_eq!(
            after[1],
            TrainingExample {
                question: "Q".to_string(),
                sql: "S".to_string()
            }
        );
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let store = TrainingStore::new();
        assert!(matches!(
            store.add_example("  ", "SELECT 1").await,
            Err(TrainingError::EmptyQuestion)
        ));
        assert!(matches!(
            store.add_example("How many?", "\n").await,
            Err(TrainingError::EmptySql)
        ));
        assert_eq!(store.example_count().await, 0);
    }

    #[tokio::test]
    async fn blank_ddl_is_ignored() {
        let store = TrainingStore::new();
        store.add_ddl("   ").await;
        store.add_ddl("CREATE TABLE t (id INT);").await;
        assert_eq!(store.ddl_count().await, 1);
        assert_eq!(store.ddl().await, vec!["CREATE TABLE t (id INT);".to_string()]);
    }

    #[tokio::test]
    async fn related_ranks_by_shared_words() {
        let store = TrainingStore::new();
        store
            .add_example("Show me all pending invoices", "SELECT 1;")
            .await
            .unwrap();
        store
            .add_example("List top 5 vendors by spend", "SELECT 2;")
            .await
            .unwrap();
        store
            .add_example("Total spend per vendors category", "SELECT 3;")
            .await
            .unwrap();

        let hits = store.related("Which vendors have the highest spend?", 2).await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].sql, "SELECT 2;");
        assert_eq!(hits[1].sql, "SELECT 3;");
    }

    #[tokio::test]
    async fn related_skips_examples_with_no_overlap() {
        let store = TrainingStore::new();
        store
            .add_example("Show me all pending invoices", "SELECT 1;")
            .await
            .unwrap();

        assert!(store.related("payment methods breakdown", 3).await.is_empty());
        assert!(store.related("what is the", 3).await.is_empty());
        assert!(store.related("pending invoices", 0).await.is_empty());
    }
}
