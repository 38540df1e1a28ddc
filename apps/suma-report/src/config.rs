//! # Configuration
//!
//! Resolved run settings. Each option is taken from the first source that
//! sets it:
//!
//! 1. command-line flag
//! 2. environment variable (`SUMA_*`, read by clap together with the flags)
//! 3. TOML config file (`--config`)
//! 4. built-in default
//!
//! `url`, `username` and `password` have no default.
//!
//! ```toml
//! url = "https://suma.example.com/rpc/api"
//! username = "report"
//! password = "..."
//! verify_tls = true
//! ca_cert = "/etc/pki/trust/anchors/suma-ca.pem"
//! output_path = "suma_report.csv"
//! transport = "json"
//! timeout_secs = 30
//! errata_type = "Security Advisory"
//! include_empty = false
//! ```

use crate::cli::Cli;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use suma_client::{HttpSettings, SECURITY_ADVISORY, TransportKind};
use thiserror::Error;

/// Default report file, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "suma_report.csv";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting '{0}' (flag, SUMA_* variable or config file)")]
    Missing(&'static str),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

// =============================================================================
// CONFIG FILE
// =============================================================================

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_tls: Option<bool>,
    pub ca_cert: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub transport: Option<TransportKind>,
    pub timeout_secs: Option<u64>,
    pub errata_type: Option<String>,
    pub include_empty: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// =============================================================================
// RESOLVED CONFIG
// =============================================================================

/// Settings for one report run.
#[derive(Clone)]
pub struct Config {
    pub url: String,
    pub username: String,
    pub password: String,
    pub verify_tls: bool,
    pub ca_cert: Option<PathBuf>,
    pub output_path: PathBuf,
    pub transport: TransportKind,
    pub timeout: Duration,
    pub errata_type: String,
    pub include_empty: bool,
}

impl Config {
    /// Config with the given connection settings and defaults elsewhere.
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            verify_tls: true,
            ca_cert: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            transport: TransportKind::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            errata_type: SECURITY_ADVISORY.to_string(),
            include_empty: false,
        }
    }

    /// Load the config file named by `cli` (if any) and merge it under the flags.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Merge flags (and their env fallbacks) over file values over defaults.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let url = cli.url.clone().or(file.url).ok_or(ConfigError::Missing("url"))?;
        let username = cli
            .username
            .clone()
            .or(file.username)
            .ok_or(ConfigError::Missing("username"))?;
        let password = cli
            .password
            .clone()
            .or(file.password)
            .ok_or(ConfigError::Missing("password"))?;

        let verify_tls = if cli.insecure {
            false
        } else {
            cli.verify_tls.or(file.verify_tls).unwrap_or(true)
        };

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let config = Self {
            url,
            username,
            password,
            verify_tls,
            ca_cert: cli.ca_cert.clone().or(file.ca_cert),
            output_path: cli
                .output
                .clone()
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            transport: cli.transport.or(file.transport).unwrap_or_default(),
            timeout: Duration::from_secs(timeout_secs),
            errata_type: cli
                .errata_type
                .clone()
                .or(file.errata_type)
                .unwrap_or_else(|| SECURITY_ADVISORY.to_string()),
            include_empty: cli.include_empty || file.include_empty.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "url '{}' must start with http:// or https://",
                self.url
            )));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Missing("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing("password"));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".to_string()));
        }
        if self.errata_type.trim().is_empty() {
            return Err(ConfigError::Invalid("errata_type must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            verify_tls: self.verify_tls,
            ca_cert: self.ca_cert.clone(),
            timeout: self.timeout,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("ca_cert", &self.ca_cert)
            .field("output_path", &self.output_path)
            .field("transport", &self.transport)
            .field("timeout", &self.timeout)
            .field("errata_type", &self.errata_type)
            .field("include_empty", &self.include_empty)
            .finish()
    }
}
