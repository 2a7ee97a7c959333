//! Configuration management for the intake agent
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (`LEXAI_` prefix, `__` separator)
//! - Built-in defaults

pub mod settings;

pub use settings::{
    AgentSettings, BookingSettings, GenerationSettings, ServerSettings, SessionSettings, Settings,
    load_settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
