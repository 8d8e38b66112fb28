use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "remote" or "ollama"
    /// Empty means the backend's own default model
    #[serde(default)]
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
    /// How many stored question/SQL pairs are embedded in each prompt
    pub example_count: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExecutorConfig {
    pub backend: String, // "http" or "duckdb"
    pub base_url: String,
    pub path: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub pool_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub llm: LlmConfig,
    pub executor: ExecutorConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip seeding the retrieval index with the built-in corpus
    #[arg(long)]
    pub no_train: bool,
}

/// Startup failures. Every variant is fatal.
#[derive(Debug)]
pub enum AppError {
    Configuration(String),
    Load(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Load(e) => write!(f, "Failed to load configuration: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Load(e)
    }
}

/// Plain environment variables understood in addition to `SQLGATE__*`.
const ENV_API_KEY: &str = "GROQ_API_KEY";
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_PORT: &str = "PORT";
const ENV_EXECUTOR_BASE_URL: &str = "EXECUTOR_BASE_URL";

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, AppError> {
        let mut config_builder = Config::builder()
            .set_default("web.host", "0.0.0.0")?
            .set_default("web.port", 8000)?
            .set_default("llm.backend", "remote")?
            .set_default("llm.temperature", 0.1)?
            .set_default("llm.max_tokens", 500)?
            .set_default("llm.timeout_secs", 30)?
            .set_default("llm.example_count", 3)?
            .set_default("executor.backend", "http")?
            .set_default("executor.base_url", "http://localhost:3002")?
            .set_default("executor.path", "/api/execute-sql")?
            .set_default("executor.timeout_secs", 30)?
            .set_default("database.pool_size", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/invoice-sql-gateway/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("SQLGATE")
                .prefix_separator("__")
                .separator("__"),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        config.apply_env(|name| std::env::var(name).ok())?;
        config.fill_backend_defaults();

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// Applies the unprefixed variables the service has always honoured.
    fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.trim().is_empty()) {
            self.database.connection_string = Some(url);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.web.port = port.trim().parse().map_err(|_| {
                AppError::Configuration(format!("{} is not a valid port: {}", ENV_PORT, port))
            })?;
        }
        if let Some(url) = lookup(ENV_EXECUTOR_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.executor.base_url = url;
        }
        Ok(())
    }

    fn fill_backend_defaults(&mut self) {
        if self.llm.model.trim().is_empty() {
            self.llm.model = default_model(&self.llm.backend).to_string();
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self.llm.backend.as_str() {
            "remote" => {
                let has_key = self
                    .llm
                    .api_key
                    .as_deref()
                    .is_some_and(|k| !k.trim().is_empty());
                if !has_key {
                    return Err(AppError::Configuration(format!(
                        "{} must be set for the remote LLM backend",
                        ENV_API_KEY
                    )));
                }
            }
            "ollama" => {}
            other => {
                return Err(AppError::Configuration(format!(
                    "Unsupported LLM backend: {}",
                    other
                )));
            }
        }

        match self.executor.backend.as_str() {
            "http" => {}
            "duckdb" => {
                let has_db = self
                    .database
                    .connection_string
                    .as_deref()
                    .is_some_and(|c| !c.trim().is_empty());
                if !has_db {
                    return Err(AppError::Configuration(format!(
                        "{} must be set for the duckdb executor",
                        ENV_DATABASE_URL
                    )));
                }
                let server_url = self
                    .database
                    .connection_string
                    .as_deref()
                    .filter(|c| is_server_url(c));
                if let Some(url) = server_url {
                    return Err(AppError::Configuration(format!(
                        "The duckdb executor needs a DuckDB file path, not a server URL: {}",
                        redact_url(url)
                    )));
                }
            }
            other => {
                return Err(AppError::Configuration(format!(
                    "Unsupported executor backend: {}",
                    other
                )));
            }
        }

        Ok(())
    }
}

fn default_model(backend: &str) -> &'static str {
    match backend {
        "ollama" => "sqlcoder",
        _ => "llama-3.3-70b-versatile",
    }
}

/// `DATABASE_URL` usually points at the Postgres behind the execute-sql
/// endpoint. Such URLs are not something DuckDB can open.
fn is_server_url(connection_string: &str) -> bool {
    let lower = connection_string.trim().to_ascii_lowercase();
    ["postgres://", "postgresql://", "mysql://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            llm: LlmConfig {
                backend: "remote".to_string(),
                model: default_model("remote").to_string(),
                api_key: None,
                api_url: None,
                temperature: 0.1,
                max_tokens: 500,
                timeout_secs: 30,
                example_count: 3,
            },
            executor: ExecutorConfig {
                backend: "http".to_string(),
                base_url: "http://localhost:3002".to_string(),
                path: "/api/execute-sql".to_string(),
                timeout_secs: 30,
            },
            database: DatabaseConfig {
                connection_string: None,
                pool_size: 5,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("gsk_test".to_string());
        config
    }

    #[test]
    fn missing_api_key_is_fatal_for_remote_backend() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn ollama_backend_needs_no_key() {
        let mut config = AppConfig::default();
        config.llm.backend = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duckdb_executor_requires_connection_string() {
        let mut config = with_key();
        config.executor.backend = "duckdb".to_string();
        assert!(config.validate().is_err());

        config.database.connection_string = Some("invoices.duckdb".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_backends_are_rejected() {
        let mut config = with_key();
        config.llm.backend = "carrier-pigeon".to_string();
        assert!(config.validate().is_err());

        let mut config = with_key();
        config.executor.backend = "odbc".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn plain_env_vars_override_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GROQ_API_KEY", "gsk_env"),
            ("DATABASE_URL", "postgres://localhost/flobit"),
            ("PORT", "9100"),
            ("EXECUTOR_BASE_URL", "http://api.internal:3002"),
        ]);

        let mut config = AppConfig::default();
        config
            .apply_env(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("gsk_env"));
        assert_eq!(
            config.database.connection_string.as_deref(),
            Some("postgres://localhost/flobit")
        );
        assert_eq!(config.web.port, 9100);
        assert_eq!(config.executor.base_url, "http://api.internal:3002");
    }

    #[test]
    fn duckdb_executor_rejects_server_urls() {
        let mut config = with_key();
        config.executor.backend = "duckdb".to_string();
        config.database.connection_string =
            Some("postgres://app:secret@db:5432/flobit".to_string());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        let message = err.to_string();
        assert!(message.contains("server URL"));
        assert!(message.contains("postgres://***@db:5432/flobit"));
        assert!(!message.contains("secret"));

        config.database.connection_string = Some("POSTGRESQL://db/flobit".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn server_url_is_harmless_with_http_executor() {
        let mut config = with_key();
        config
            .apply_env(|name| (name == "DATABASE_URL").then(|| "postgres://db/flobit".to_string()))
            .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn each_llm_backend_gets_its_own_default_model() {
        let mut config = AppConfig::default();
        config.llm.model = String::new();
        config.fill_backend_defaults();
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");

        config.llm.backend = "ollama".to_string();
        config.llm.model = String::new();
        config.fill_backend_defaults();
        assert_eq!(config.llm.model, "sqlcoder");

        config.llm.model = "duckdb-nsql".to_string();
        config.fill_backend_defaults();
        assert_eq!(config.llm.model, "duckdb-nsql");
    }

    #[test]
    fn file_then_prefixed_env_then_cli_layering() {
        let path = std::env::temp_dir()
            .join(format!("sqlgate-layering-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[web]
host = "127.0.0.1"
port = 7000

[llm]
backend = "ollama"
model = "from-file"
example_count = 5

[executor]
timeout_secs = 10
"#,
        )
        .unwrap();

        // No other test reads this variable.
        unsafe { std::env::set_var("SQLGATE__LLM__MODEL", "from-env") };

        let args = CliArgs {
            config: Some(path.clone()),
            host: None,
            port: Some(9000),
            no_train: false,
        };
        let result = AppConfig::new(&args);

        unsafe { std::env::remove_var("SQLGATE__LLM__MODEL") };
        std::fs::remove_file(&path).unwrap();

        let config = result.unwrap();
        // file over defaults
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.llm.backend, "ollama");
        assert_eq!(config.llm.example_count, 5);
        assert_eq!(config.executor.timeout_secs, 10);
        // prefixed env over file
        assert_eq!(config.llm.model, "from-env");
        // CLI over everything
        assert_eq!(config.web.port, 9000);
        // untouched defaults
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.executor.path, "/api/execute-sql");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_port_env_var_is_a_configuration_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|name| (name == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
