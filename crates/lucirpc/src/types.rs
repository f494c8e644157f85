//! Core types exchanged with the UCI service.
//!
//! UCI has no typed values: every option is either a single string or an
//! ordered list of strings. [`OptionValue`] keeps the integer shape as well
//! because LuCI happily accepts and sometimes returns JSON numbers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A single option value as it travels over the wire.
///
/// # Example
///
/// ```
/// use lucirpc::OptionValue;
///
/// let value: OptionValue = serde_json::from_str(r#"["lan", "wan"]"#).unwrap();
/// assert_eq!(value, OptionValue::List(vec!["lan".into(), "wan".into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Scalar string option (`option name 'lan'`)
    String(String),
    /// Scalar numeric option
    Integer(i64),
    /// List option (`list network 'lan'`), order preserved
    List(Vec<String>),
}

impl OptionValue {
    /// Short name of the value's shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// The option bag of one section, keyed by option name.
pub type Options = BTreeMap<String, OptionValue>;

/// How a section is addressed within its config.
///
/// Named sections (`config zone 'lan'`) are addressed by name. Anonymous
/// sections are addressed by their position among sections of the same
/// type, which UCI spells `@zone[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionId {
    /// Explicit section name
    Named(String),
    /// Zero-based position among sections of the same type
    Ordinal(usize),
}

impl SectionId {
    /// Build the UCI section selector for a section of `section_type`.
    ///
    /// ```
    /// use lucirpc::SectionId;
    ///
    /// assert_eq!(SectionId::Named("lan".into()).selector("zone"), "lan");
    /// assert_eq!(SectionId::Ordinal(2).selector("zone"), "@zone[2]");
    /// ```
    pub fn selector(&self, section_type: &str) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Ordinal(index) => format!("@{section_type}[{index}]"),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Ordinal(index) => write!(f, "@{index}"),
        }
    }
}

/// Login credentials for the LuCI RPC `auth` endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name (usually `root`)
    pub username: String,
    /// Login password
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for retrying transient transport failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff_factor,
            ..Default::default()
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Create a config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}
