use super::db_pool::{build_pool, DuckDbConnectionManager};
use super::{ExecutionError, Record, SqlExecutor};
use arrow::json::writer::JsonArray;
use arrow::json::WriterBuilder;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use r2d2::Pool;
use std::time::Instant;
use tracing::{debug, info};

/// Runs SQL directly against a DuckDB database through a connection pool.
pub struct DuckDbExecutor {
    pool: Pool<DuckDbConnectionManager>,
}

impl DuckDbExecutor {
    pub fn open(connection_string: &str, pool_size: usize) -> Result<Self, ExecutionError> {
        info!("Opening DuckDB pool for {} ({} connections)", connection_string, pool_size);
        let pool = build_pool(connection_string, pool_size)
            .map_err(|e| ExecutionError::Database(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: Pool<DuckDbConnectionManager>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SqlExecutor for DuckDbExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<Record>, ExecutionError> {
        let pool = self.pool.clone();
        let sql = sql.to_string();

        // DuckDB calls block, keep them off the async workers
        tokio::task::spawn_blocking(move || run_query(&pool, &sql))
            .await
            .map_err(|e| ExecutionError::Database(format!("Query task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }
}

fn run_query(
    pool: &Pool<DuckDbConnectionManager>,
    sql: &str,
) -> Result<Vec<Record>, ExecutionError> {
    let start_time = Instant::now();

    let conn = pool
        .get()
        .map_err(|e| ExecutionError::Database(e.to_string()))?;
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ExecutionError::Database(e.to_string()))?;
    let batches: Vec<RecordBatch> = stmt
        .query_arrow([])
        .map_err(|e| ExecutionError::Database(e.to_string()))?
        .collect();

    let records = batches_to_records(&batches)?;
    debug!(
        "DuckDB returned {} rows in {}ms",
        records.len(),
        start_time.elapsed().as_millis()
    );
    Ok(records)
}

/// Converts Arrow batches into JSON objects, keeping null columns as `null`.
fn batches_to_records(batches: &[RecordBatch]) -> Result<Vec<Record>, ExecutionError> {
    let mut buffer = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .with_explicit_nulls(true)
            .build::<_, JsonArray>(&mut buffer);
        let refs: Vec<&RecordBatch> = batches.iter().collect();
        writer
            .write_batches(&refs)
            .map_err(|e| ExecutionError::Decode(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| ExecutionError::Decode(e.to_string()))?;
    }

    if buffer.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&buffer).map_err(|e| ExecutionError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn seeded_executor() -> DuckDbExecutor {
        // One connection, so every query sees the same in-memory database.
        let pool = build_pool(":memory:", 1).unwrap();
        {
            let conn = pool.get().unwrap();
            conn.execute_batch(
                "CREATE TABLE vendors (id INTEGER, name VARCHAR, email VARCHAR);
                 INSERT INTO vendors VALUES (1, 'Acme', 'ap@acme.test'), (2, 'Globex', NULL);",
            )
            .unwrap();
        }
        DuckDbExecutor::new(pool)
    }

    #[tokio::test]
    async fn returns_rows_as_records() {
        let executor = seeded_executor();
        let rows = executor
            .execute("SELECT id, name, email FROM vendors ORDER BY id")
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[0]["name"], "Acme");
        assert_eq!(rows[1]["email"], Value::Null);
    }

    #[tokio::test]
    async fn empty_result_is_an_empty_sequence() {
        let executor = seeded_executor();
        let rows = executor
            .execute("SELECT * FROM vendors WHERE id > 100")
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn invalid_sql_is_a_database_error() {
        let executor = seeded_executor();
        assert!(matches!(
            executor.execute("SELECT * FROM nowhere").await,
            Err(ExecutionError::Database(_))
        ));
    }
}
