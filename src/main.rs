use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

mod config;
mod executor;
mod llm;
mod query;
mod schema;
mod training;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs, LoggingConfig};
use crate::executor::build_executor;
use crate::llm::build_provider;
use crate::query::QueryService;
use crate::schema::SCHEMA_DESCRIPTION;
use crate::training::{corpus, TrainingStore};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration; missing credentials end the process here
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!("{}", e);
            return Err(e.into());
        }
    };

    init_tracing(&config.logging);

    info!("Initializing LLM provider with backend: {}", config.llm.backend);
    let provider = build_provider(&config.llm)?;

    info!("Initializing SQL executor with backend: {}", config.executor.backend);
    let executor = build_executor(&config.executor, &config.database)?;

    let training = Arc::new(TrainingStore::new());
    if args.no_train {
        warn!("Skipping training, prompts will carry no example queries");
    } else {
        corpus::seed(&training).await;
    }

    let query_service = QueryService::new(
        provider,
        executor,
        Arc::clone(&training),
        SCHEMA_DESCRIPTION,
        config.llm.example_count,
    );

    let app_state = Arc::new(AppState::new(config.clone(), query_service, training));

    // Start the web server
    info!("Starting server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
