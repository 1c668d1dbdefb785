//! Configuration loading for datafun.
//! Reads datafun.toml from the current directory or the path in DATAFUN_CONFIG.
//! A missing file is not an error: every setting has a default.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use datafun_common::DatafunError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Sessions idle for longer than this are dropped, uploads included.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Upper bound on live sessions; the least recently seen goes first.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host()             -> String { "127.0.0.1".to_string() }
fn default_port()             -> u16    { 3001 }
fn default_static_dir()       -> String { "static".to_string() }
fn default_max_upload_bytes() -> usize  { 10 * 1024 * 1024 }
fn default_session_ttl_secs() -> u64    { 30 * 60 }
fn default_max_sessions()     -> usize  { 1000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            session_ttl_secs: default_session_ttl_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Rows in the generated dataset.
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Largest dataset the JSON API will generate.
    #[serde(default = "default_max_api_rows")]
    pub max_api_rows: usize,
}

fn default_rows()         -> usize { datafun_core::dataset::DEFAULT_ROWS }
fn default_max_api_rows() -> usize { 10_000 }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            max_api_rows: default_max_api_rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Simulated processing time for a contact submission.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 { 2000 }

impl Default for ContactConfig {
    fn default() -> Self {
        Self { delay_ms: default_delay_ms() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}


impl Config {
    /// Load configuration from datafun.toml.
    /// Checks DATAFUN_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("DATAFUN_CONFIG")
            .unwrap_or_else(|_| "datafun.toml".to_string());

        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.source = Some(PathBuf::from(path));
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DatafunError> {
        if self.data.rows == 0 {
            return Err(DatafunError::Config("data.rows must be positive".to_string()));
        }
        if self.server.max_sessions == 0 {
            return Err(DatafunError::Config("server.max_sessions must be positive".to_string()));
        }
        if self.data.max_api_rows < self.data.rows {
            return Err(DatafunError::Config(format!(
                "data.max_api_rows ({}) is below data.rows ({})",
                self.data.max_api_rows, self.data.rows
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| DatafunError::Config(format!("invalid server address: {}", e)))?;
        Ok(addr)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.server.session_ttl_secs)
    }

    pub fn contact_delay(&self) -> Duration {
        Duration::from_millis(self.contact.delay_ms)
    }
}
