use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use redash_query::{Credentials, PollPolicy};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub redash_url: Option<String>,
    #[serde(default)]
    pub redash_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Ceiling for a single HTTP call to Redash
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollConfig {
    /// Zero durations would turn the poll loop into a busy spin or make
    /// every request fail at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("poll.interval_ms", self.interval_ms),
            ("poll.timeout_secs", self.timeout_secs),
            ("poll.request_timeout_secs", self.request_timeout_secs),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::Message(format!("{} must be greater than 0", name))),
            None => Ok(()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl HealthConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables `REDASH_MCP_<SECTION>__<KEY>`, e.g. `REDASH_MCP_POLL__TIMEOUT_SECS`
    ///
    /// `REDASH_URL` and `REDASH_API_KEY` are read from the environment only.
    /// Their absence is not an error here; it is reported on each query.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        let mut cfg = Self::build(builder, Self::environment())?;

        cfg.redash_url = std::env::var("REDASH_URL").ok();
        cfg.redash_api_key = std::env::var("REDASH_API_KEY").ok();

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config: Self = builder.build()?.try_deserialize()?;
        config.poll.validate()?;
        Ok(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix("REDASH_MCP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn build(
        builder: ConfigBuilder<DefaultState>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let config: Self = builder.add_source(environment).build()?.try_deserialize()?;
        config.poll.validate()?;
        Ok(config)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from(&self.poll)
    }

    /// Validate the Redash secrets into credentials
    pub fn credentials(&self) -> redash_query::Result<Credentials> {
        Credentials::from_parts(self.redash_url.clone(), self.redash_api_key.clone())
    }
}
