//! Configuration management for the trade query engine
//!
//! Supports loading configuration from:
//! - YAML/TOML settings files (`config/default`, `config/{env}`)
//! - Environment variables (TRADE_QUERY__ prefix)
//! - YAML data files for the knowledge dataset, lexicons and templates
//!
//! The dataset, lexicons and templates ship embedded in the binary and can
//! be replaced by files named in [`KnowledgeSources`].

pub mod dataset;
pub mod lexicon;
pub mod settings;
pub mod templates;

pub use dataset::KnowledgeDataset;
pub use lexicon::{CueDirection, CuePhrase, IntentKeywords, LexiconConfig};
pub use settings::{
    load_settings, AuditConfig, AuthConfig, EngineConfig, KnowledgeSources, ObservabilityConfig,
    RuntimeEnvironment, ServerConfig, Settings,
};
pub use templates::{fill, Phrase, TemplateId, TemplateTable};

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for trade_query_core::Error {
    fn from(err: ConfigError) -> Self {
        trade_query_core::Error::Config(err.to_string())
    }
}

/// Read a YAML or JSON data file, picking the parser from the extension
pub(crate) fn read_data_file<T, P>(path: P) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }
}

/// Parse an embedded YAML document
pub(crate) fn parse_builtin<T: serde::de::DeserializeOwned>(
    name: &str,
    content: &str,
) -> Result<T, ConfigError> {
    serde_yaml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("built-in {}: {}", name, e)))
}
