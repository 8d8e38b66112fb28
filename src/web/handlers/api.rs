use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::query::models::{QueryRequest, QueryResponse};
use crate::query::QueryError;
use crate::training::TrainingExample;
use crate::web::state::AppState;

// Health types

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

// Training types

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TrainingDataResponse {
    pub ddl_count: usize,
    pub ddl: Vec<String>,
    pub examples: Vec<TrainingExample>,
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub llm_backend: String,
    pub llm_model: String,
    pub executor_backend: String,
    pub ddl_count: usize,
    pub example_count: usize,
}

// API Implementations

fn health_body() -> HealthResponse {
    HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    }
}

pub async fn root() -> Json<HealthResponse> {
    Json(health_body())
}

pub async fn health() -> Json<HealthResponse> {
    Json(health_body())
}

// Natural language question to SQL, then rows
pub async fn query(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> (StatusCode, Json<QueryResponse>) {
    let start_time = Instant::now();

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Rejected query body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(QueryResponse::failure(rejection.body_text())),
            );
        }
    };

    debug!("Received request: {:?}", payload);

    match app_state.query_service.answer(payload.question()).await {
        Ok(outcome) => {
            info!(
                "Answered with {} rows in {}ms",
                outcome.results.len(),
                start_time.elapsed().as_millis()
            );
            (
                StatusCode::OK,
                Json(QueryResponse::success(outcome.sql, outcome.results)),
            )
        }
        Err(e) => {
            let status = match &e {
                QueryError::Validation(_) => StatusCode::BAD_REQUEST,
                QueryError::Prompt(_) | QueryError::Model(_) | QueryError::EmptySql => {
                    error!("Failed to generate SQL: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, Json(QueryResponse::failure(e.to_string())))
        }
    }
}

// Training
pub async fn train(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<TrainRequest>,
) -> Result<Json<TrainResponse>, (StatusCode, String)> {
    app_state
        .training
        .add_example(&payload.question, &payload.sql)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    info!("Added training example: {}", payload.question.trim());
    Ok(Json(TrainResponse {
        message: "Training data added successfully".to_string(),
    }))
}

pub async fn training_data(
    State(app_state): State<Arc<AppState>>,
) -> Json<TrainingDataResponse> {
    let ddl = app_state.training.ddl().await;
    Json(TrainingDataResponse {
        ddl_count: ddl.len(),
        ddl,
        examples: app_state.training.examples().await,
    })
}

pub async fn system_status(State(app_state): State<Arc<AppState>>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: app_state.uptime_seconds(),
        llm_backend: app_state.query_service.provider_name().to_string(),
        llm_model: app_state.config.llm.model.clone(),
        executor_backend: app_state.query_service.executor_name().to_string(),
        ddl_count: app_state.training.ddl_count().await,
        example_count: app_state.training.example_count().await,
    })
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
