use clinic_types::{StreamConfig, ToolName};
use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File, Source};
use config::builder::DefaultState;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    pub stream: StreamSettings,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    /// Upper bound on a whole request, stream included. `None` or `0` disables it.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            api_prefix: "/api/v1".to_string(),
            request_timeout_secs: Some(300),
        }
    }
}

impl ServerConfig {
    /// `api_prefix` with one leading slash and no trailing slash; empty
    /// means routes are mounted at the root.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Pacing, in milliseconds as written in TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub start_delay_ms: u64,
    pub thinking_delay_ms: u64,
    pub content_delay_ms: u64,
    pub tool_delay_ms: u64,
    pub heartbeat_secs: Option<u64>,
    pub channel_capacity: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            start_delay_ms: 100,
            thinking_delay_ms: 150,
            content_delay_ms: 100,
            tool_delay_ms: 100,
            heartbeat_secs: Some(15),
            channel_capacity: 16,
        }
    }
}

impl From<&StreamSettings> for StreamConfig {
    fn from(settings: &StreamSettings) -> Self {
        StreamConfig::new()
            .with_start_delay(Duration::from_millis(settings.start_delay_ms))
            .with_thinking_delay(Duration::from_millis(settings.thinking_delay_ms))
            .with_content_delay(Duration::from_millis(settings.content_delay_ms))
            .with_tool_delay(Duration::from_millis(settings.tool_delay_ms))
            .with_heartbeat(settings.heartbeat_secs.map(Duration::from_secs))
            .with_channel_capacity(settings.channel_capacity)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Substrings of the user input that route the answer through a tool
    pub tool_triggers: Vec<String>,
    pub default_tool: ToolName,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            tool_triggers: vec!["分析".to_string(), "检查".to_string()],
            default_tool: ToolName::EvidenceConclusion,
        }
    }
}

/// Environment prefix and the section it overrides
const ENV_SECTIONS: [(&str, &str); 4] = [
    ("SERVER", "server"),
    ("LOG", "logging"),
    ("STREAM", "stream"),
    ("CHAT", "chat"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (ENV defaults to `dev`)
    /// 4. Environment variables (`SERVER_PORT`, `LOG_LEVEL`, `STREAM_CONTENT_DELAY_MS`, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for (prefix, section) in ENV_SECTIONS {
            builder = with_env_section(builder, prefix, section)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::from(&self.stream)
    }
}

/// `PREFIX_SOME_KEY` overrides `section.some_key`. The key keeps its
/// underscores, so multi-word fields map one to one.
fn with_env_section(
    builder: ConfigBuilder<DefaultState>,
    prefix: &str,
    section: &str,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let vars = Environment::with_prefix(prefix)
        .prefix_separator("_")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("tool_triggers")
        .with_list_parse_key("origins")
        .collect()?;

    let mut builder = builder;
    for (key, value) in vars {
        builder = builder.set_override(format!("{}.{}", section, key), value)?;
    }
    Ok(builder)
}
