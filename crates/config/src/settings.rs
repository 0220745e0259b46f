//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Extraction and detection tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Optional file overrides for the embedded data
    #[serde(default)]
    pub knowledge: KnowledgeSources,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Interaction audit log kept by the server
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate all settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_engine()?;
        self.validate_knowledge_sources()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if server.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_body_bytes".to_string(),
                message: "Request body limit must be at least 1 byte".to_string(),
            });
        }

        if self.environment.is_production() && server.auth.enabled && server.auth.api_key.is_none()
        {
            return Err(ConfigError::InvalidValue {
                field: "server.auth.api_key".to_string(),
                message: "API key must be set when auth is enabled in production".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured; \
                 any origin will be allowed"
            );
        }

        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;

        if engine.min_language_matches == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.min_language_matches".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if engine.max_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.max_window".to_string(),
                message: "Sliding window must cover at least one word".to_string(),
            });
        }

        Ok(())
    }

    /// Missing override files are fatal outside development
    fn validate_knowledge_sources(&self) -> Result<(), ConfigError> {
        let sources = [
            ("knowledge.dataset_path", &self.knowledge.dataset_path),
            ("knowledge.lexicon_path", &self.knowledge.lexicon_path),
            ("knowledge.templates_path", &self.knowledge.templates_path),
        ];

        for (field, path) in sources {
            let Some(path) = path else { continue };
            if Path::new(path).is_file() {
                continue;
            }
            if self.environment.is_strict() {
                return Err(ConfigError::FileNotFound(format!("{}: {}", field, path)));
            }
            tracing::warn!(field, path = %path, "Override file not found, loader will fail");
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Largest accepted request body; bigger ones get 413
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            max_body_bytes: default_max_body_bytes(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Enable authentication (set to false for development)
    #[serde(default)]
    pub enabled: bool,

    /// Bearer API key (set via TRADE_QUERY__SERVER__AUTH__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Paths that bypass authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/health".to_string(),
        "/ready".to_string(),
        "/metrics".to_string(),
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

/// Tuning for detection and extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Distinct marker words needed before a non-English language is chosen
    #[serde(default = "default_min_language_matches")]
    pub min_language_matches: usize,

    /// Words of a multi-word name are indexed only when longer than this
    #[serde(default = "default_min_subword_len")]
    pub min_subword_len: usize,

    /// Largest word window tried by the product fallback search
    #[serde(default = "default_max_window")]
    pub max_window: usize,
}

fn default_min_language_matches() -> usize {
    2
}

fn default_min_subword_len() -> usize {
    3
}

fn default_max_window() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_language_matches: default_min_language_matches(),
            min_subword_len: default_min_subword_len(),
            max_window: default_max_window(),
        }
    }
}

/// Paths to data files replacing the embedded defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeSources {
    #[serde(default)]
    pub dataset_path: Option<String>,

    #[serde(default)]
    pub lexicon_path: Option<String>,

    #[serde(default)]
    pub templates_path: Option<String>,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Interaction audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entries kept in memory before the oldest is dropped
    #[serde(default = "default_audit_capacity")]
    pub capacity: usize,
}

fn default_audit_capacity() -> usize {
    1000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_audit_capacity(),
        }
    }
}

/// Load settings from files and environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    build_settings(env, environment_source())
}

/// `TRADE_QUERY__SECTION__KEY` variables
fn environment_source() -> Environment {
    Environment::with_prefix("TRADE_QUERY")
        .separator("__")
        .try_parsing(true)
}

fn build_settings(env: Option<&str>, environment: Environment) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(environment);

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
