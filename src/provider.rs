//! Provider registry.
//!
//! Owns one handler per resource type. Tables are built here, once, when
//! the registry is constructed; every command borrows them from it.

use crate::resource::{
    firewall_forwarding, firewall_rule, firewall_zone, network_bridge_vlan,
};
use anyhow::{Result, bail};
use binding::{DataSourceHandler, ResourceHandler, TypedHandler};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Provider {
    resources: BTreeMap<String, Arc<dyn ResourceHandler>>,
    data_sources: BTreeMap<String, Arc<dyn DataSourceHandler>>,
}

impl Provider {
    pub fn new() -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        };
        provider.register(firewall_forwarding::handler());
        provider.register(firewall_rule::handler());
        provider.register(firewall_zone::handler());
        provider.register(network_bridge_vlan::handler());
        provider
    }

    /// Every type is both a managed resource and a data source.
    fn register<M>(&mut self, handler: TypedHandler<M>)
    where
        M: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        let name = ResourceHandler::type_name(handler.as_ref()).to_string();
        log::trace!("registering {name}");
        self.resources.insert(name.clone(), handler.clone());
        self.data_sources.insert(name, handler);
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn ResourceHandler> {
        match self.resources.get(type_name) {
            Some(handler) => Ok(handler.as_ref()),
            None => bail!(
                "Unknown resource type '{type_name}'. Known types: {}",
                self.type_names().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSourceHandler> {
        match self.data_sources.get(type_name) {
            Some(handler) => Ok(handler.as_ref()),
            None => bail!(
                "Unknown data source type '{type_name}'. Known types: {}",
                self.type_names().collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}
