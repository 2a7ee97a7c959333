//! Application settings

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub agent: AgentSettings,
    pub booking: BookingSettings,
    pub generation: GenerationSettings,
    pub session: SessionSettings,
}

/// HTTP/WebSocket server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means permissive (development only)
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

/// External agent channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Hosted agent identifier
    pub agent_id: String,
    /// API key for private agents
    pub api_key: Option<String>,
    /// Assistant display name used in greetings and summaries
    pub assistant_name: String,
    /// Law firm name used in summaries
    pub firm_name: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            api_key: None,
            assistant_name: "Sonia".to_string(),
            firm_name: "Machado e Costa Advocacia".to_string(),
        }
    }
}

/// Booking provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Base scheduling URL; may already carry query parameters
    pub calendly_url: String,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            calendly_url: "https://calendly.com/ricardo-palomar-onsmartai/30min/?month=2026-01"
                .to_string(),
        }
    }
}

/// Text-generation provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// API key; when absent, synthesis uses the local template only
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com".to_string(),
        }
    }
}

/// Session manager settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Maximum concurrent widget sessions
    pub max_sessions: usize,
    /// Idle timeout before a session is expired (seconds)
    pub timeout_secs: u64,
    /// Interval for the background expiry sweep (seconds)
    pub cleanup_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: 256,
            timeout_secs: 1800,
            cleanup_interval_secs: 300,
        }
    }
}

impl Settings {
    /// Validate cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.agent_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "agent.agent_id".to_string(),
                message: "hosted agent id is required".to_string(),
            });
        }
        if self.booking.calendly_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "booking.calendly_url".to_string(),
                message: "booking URL is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from defaults, an optional TOML file and the environment
///
/// Environment variables use the `LEXAI_` prefix with `__` as the section
/// separator, e.g. `LEXAI_AGENT__AGENT_ID`, `LEXAI_SERVER__PORT`.
pub fn load_settings(path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !std::path::Path::new(path).exists() {
            return Err(ConfigError::FileNotFound(path.to_string()));
        }
        builder = builder.add_source(config::File::with_name(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("LEXAI")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    tracing::debug!(
        host = %settings.server.host,
        port = settings.server.port,
        generation_enabled = settings.generation.api_key.is_some(),
        "settings loaded"
    );
    Ok(settings)
}
