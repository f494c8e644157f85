//! Provider configuration.
//!
//! Read from `~/.config/owrt/config.toml` (or `--config PATH`), then
//! overridden by `OWRT_ENDPOINT`, `OWRT_USERNAME` and `OWRT_PASSWORD`.
//!
//! ```toml
//! endpoint = "http://192.168.1.1"
//! username = "root"
//! password = "secret"
//! timeout_secs = 30
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 500
//! ```

use anyhow::{Context, Result, bail};
use lucirpc::{Credentials, RetryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "OWRT_ENDPOINT";
pub const ENV_USERNAME: &str = "OWRT_USERNAME";
pub const ENV_PASSWORD: &str = "OWRT_PASSWORD";

/// Connection settings for the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the LuCI web interface
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    pub retry: RetrySettings,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://192.168.1.1".to_string(),
            username: "root".to_string(),
            password: String::new(),
            timeout_secs: 30,
            retry: RetrySettings::default(),
        }
    }
}

/// Retry policy for transient transport failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            backoff_factor: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

/// Default config file location.
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("owrt").join("config.toml"))
}

impl ProviderConfig {
    /// Load the config, apply environment overrides and validate.
    ///
    /// An explicit path must exist; the default path may be missing, in
    /// which case defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
                Self::from_file(&path)?
            }
            None => {
                let path = default_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    log::debug!("no config at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Override fields from the environment. `lookup` is `std::env::var`
    /// in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = password;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            bail!(
                "endpoint must start with http:// or https://, got '{}'",
                self.endpoint
            );
        }
        if self.username.is_empty() {
            bail!("username must not be empty");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 1.0 {
            bail!("retry.backoff_factor must be a number >= 1.0");
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
