use crate::config::AppConfig;
use crate::query::QueryService;
use crate::training::TrainingStore;
use std::sync::Arc;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub query_service: QueryService,
    pub training: Arc<TrainingStore>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        query_service: QueryService,
        training: Arc<TrainingStore>,
    ) -> Self {
        Self {
            config,
            query_service,
            training,
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.startup_time)
            .num_seconds()
    }
}
