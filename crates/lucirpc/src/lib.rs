//! # lucirpc
//!
//! Blocking client for the UCI service exposed by LuCI's JSON-RPC module
//! (`luci-mod-rpc`) on OpenWrt devices.
//!
//! The crate deals in whole sections: add one, read its option bag, write
//! or remove options in it, delete it. Sections are addressed by name or by their
//! position among sections of the same type (see [`SectionId`]).
//!
//! ## Example
//!
//! ```no_run
//! use lucirpc::{Client, Credentials, Options, SectionId};
//!
//! let client = Client::connect("http://192.168.1.1", Credentials::new("root", "secret"));
//!
//! let index = client.add("firewall", "zone").unwrap();
//! let mut options = Options::new();
//! options.insert("name".into(), "guest".into());
//! client.set("firewall", "zone", &SectionId::Ordinal(index), &options, &[]).unwrap();
//! ```
//!
//! ## Retry Logic
//!
//! Transient transport failures (connection errors, 5xx answers) are
//! retried with exponential backoff according to the client's
//! [`RetryConfig`]. Missing sections and RPC errors are returned at once.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod retry;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{Credentials, OptionValue, Options, RetryConfig, SectionId};

use backend::Backend;
use backend::http::HttpBackend;
use retry::{LogCallback, RetryCallback};

/// High-level client for UCI operations.
///
/// The client wraps a backend and applies the retry policy to every call.
/// It is `Send + Sync` and meant to be shared (by reference or `Arc`)
/// between concurrent operations.
pub struct Client {
    backend: Box<dyn Backend>,
    retry: RetryConfig,
    callback: Box<dyn RetryCallback>,
}

impl Client {
    /// Create a client for a device running `luci-mod-rpc`.
    pub fn connect(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_backend(Box::new(HttpBackend::new(endpoint, credentials)))
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            retry: RetryConfig::default(),
            callback: Box::new(LogCallback),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The retry policy in effect.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    fn call<T>(&self, operation: impl FnMut() -> Result<T>) -> Result<T> {
        retry::with_retry(&self.retry, Some(self.callback.as_ref()), operation)
    }

    /// Append an anonymous section and return its position within its type.
    pub fn add(&self, config: &str, section_type: &str) -> Result<usize> {
        self.call(|| self.backend.add(config, section_type))
    }

    /// Fetch a section's option bag.
    pub fn get(&self, config: &str, section_type: &str, section: &SectionId) -> Result<Options> {
        self.call(|| self.backend.get(config, section_type, section))
    }

    /// Write options into an existing section and remove the ones in `unset`.
    pub fn set(
        &self,
        config: &str,
        section_type: &str,
        section: &SectionId,
        options: &Options,
        unset: &[String],
    ) -> Result<()> {
        self.call(|| self.backend.set(config, section_type, section, options, unset))
    }

    /// Remove a section.
    pub fn delete(&self, config: &str, section_type: &str, section: &SectionId) -> Result<()> {
        self.call(|| self.backend.delete(config, section_type, section))
    }
}
