// Resource lifecycle commands
pub mod resource;

// Schema inspection
pub mod schema;

use anyhow::Result;
use lucirpc::backend::http::HttpBackend;
use lucirpc::backend::memory::MemoryBackend;
use lucirpc::{Client, RetryConfig};
use std::path::PathBuf;
use std::sync::Arc;

use crate::Context;
use crate::config::ProviderConfig;
use crate::offline;
use crate::ui;

/// The client for one invocation, plus the offline store it writes to.
pub struct Session {
    pub client: Client,
    store: Option<(Arc<MemoryBackend>, PathBuf)>,
}

impl Session {
    /// Persist offline changes. Does nothing against a real device.
    pub fn save(&self) -> Result<()> {
        match &self.store {
            Some((backend, path)) => offline::save(path, backend),
            None => Ok(()),
        }
    }
}

/// Build the RPC client for this invocation.
pub fn connect(ctx: &Context) -> Result<Session> {
    if ctx.offline {
        let path = offline::store_path()?;
        log::info!("offline mode: operating on {}", path.display());
        if !ctx.quiet && !ctx.json {
            ui::info(&format!("Offline: changes are made to {}", path.display()));
        }
        let backend = Arc::new(offline::load(&path)?);
        let client = Client::with_backend(Box::new(Arc::clone(&backend)))
            .with_retry(RetryConfig::no_retry());
        return Ok(Session {
            client,
            store: Some((backend, path)),
        });
    }

    let config = ProviderConfig::load(ctx.config.as_deref())?;
    log::debug!("connecting to {} as {}", config.endpoint, config.username);
    let backend =
        HttpBackend::with_timeout(config.endpoint.clone(), config.credentials(), config.timeout());
    Ok(Session {
        client: Client::with_backend(Box::new(backend)).with_retry(config.retry.to_retry_config()),
        store: None,
    })
}
