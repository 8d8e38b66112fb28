use super::TrainingStore;
use crate::schema::SCHEMA_DDL;
use tracing::{info, warn};

/// Question/SQL pairs submitted once at startup.
pub const EXAMPLE_PAIRS: [(&str, &str); 5] = [
    (
        "What is the total spend?",
        "SELECT SUM(total_amount) as total_spend FROM invoices;",
    ),
    (
        "Show me all pending invoices",
        "SELECT * FROM invoices WHERE status = 'pending';",
    ),
    (
        "List top 5 vendors by spend",
        "SELECT v.name, SUM(i.total_amount) as total_spend
FROM invoices i
JOIN vendors v ON i.vendor_id = v.id
GROUP BY v.name
ORDER BY total_spend DESC
LIMIT 5;",
    ),
    (
        "What are the overdue invoices?",
        "SELECT * FROM invoices WHERE status = 'overdue' OR (due_date < CURRENT_DATE AND status != 'paid');",
    ),
    (
        "Average invoice amount by category",
        "SELECT category, AVG(total_amount) as avg_amount
FROM invoices
WHERE category IS NOT NULL
GROUP BY category;",
    ),
];

/// Seeds the store with the schema DDL and the example pairs.
///
/// A pair that fails to load is logged and skipped; startup carries on.
pub async fn seed(store: &TrainingStore) {
    for ddl in SCHEMA_DDL {
        store.add_ddl(ddl).await;
    }

    for (question, sql) in EXAMPLE_PAIRS {
        if let Err(e) = store.add_example(question, sql).await {
            warn!("Skipping training example '{}': {}", question, e);
        }
    }

    info!(
        "Training completed: {} DDL statements, {} examples",
        store.ddl_count().await,
        store.example_count().await
    );
}
