//! Server configuration.
use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::error::ConfigError;

/// Text encoding used to decode accumulated request bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Strict UTF-8, invalid input is rejected.
    #[default]
    Utf8,
    /// ISO-8859-1, every byte maps to one character.
    Latin1,
    /// No decoding, the body is only available as bytes.
    Binary,
}

/// Server configuration.
///
/// Every field has a default, so a partial TOML document is enough:
///
/// ```
/// use switchyard::Config;
///
/// let config = Config::from_toml("port = 3000\nmax_body_size = 1024").unwrap();
/// assert_eq!(config.port, 3000);
/// assert_eq!(config.host, "127.0.0.1");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Maximum accumulated body size in bytes.
    pub max_body_size: usize,
    /// How long a deferred handler may take before a timeout response is sent.
    pub handler_timeout_ms: u64,
    pub encoding: Encoding,
    /// Write outgoing header names as `Content-Type` instead of `content-type`.
    pub title_case_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            max_body_size: 2_000_000,
            handler_timeout_ms: 30_000,
            encoding: Encoding::Utf8,
            title_case_headers: true,
        }
    }
}

impl Config {
    /// Parse configuration from a TOML document.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml(&input)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    pub fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn title_case_headers(mut self, enabled: bool) -> Self {
        self.title_case_headers = enabled;
        self
    }

    /// Deferred handler timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }

    /// `host:port` string to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
