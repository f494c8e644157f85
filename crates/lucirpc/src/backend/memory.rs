//! In-memory backend.
//!
//! Keeps UCI sections in process with the same addressing rules as the
//! real service: named sections by name, anonymous ones by position among
//! sections of their type. Every call is recorded so tests can assert on
//! the exact remote traffic an operation produced. The stored sections can
//! be taken out as a [`Snapshot`] and loaded back, so a store can outlive
//! the process.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{Options, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// A remote call as observed by the [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Call {
    Add {
        config: String,
        section_type: String,
    },
    Get {
        config: String,
        section_type: String,
        section: SectionId,
    },
    Set {
        config: String,
        section_type: String,
        section: SectionId,
        options: Options,
        unset: Vec<String>,
    },
    Delete {
        config: String,
        section_type: String,
        section: SectionId,
    },
}

/// One stored section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSection {
    /// Section name; `None` for anonymous sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// UCI section type
    pub section_type: String,
    /// Option bag
    #[serde(default)]
    pub options: Options,
}

/// Every stored section, per config, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sections keyed by config name
    #[serde(default)]
    pub configs: BTreeMap<String, Vec<StoredSection>>,
}

#[derive(Debug, Default)]
struct State {
    configs: BTreeMap<String, Vec<StoredSection>>,
    calls: Vec<Call>,
    offline: bool,
}

impl State {
    fn position(&self, config: &str, section_type: &str, section: &SectionId) -> Option<usize> {
        let sections = self.configs.get(config)?;
        match section {
            SectionId::Named(name) => sections
                .iter()
                .position(|s| s.name.as_deref() == Some(name) && s.section_type == section_type),
            SectionId::Ordinal(index) => sections
                .iter()
                .enumerate()
                .filter(|(_, s)| s.section_type == section_type)
                .nth(*index)
                .map(|(i, _)| i),
        }
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(Error::Network {
                message: "backend is offline".to_string(),
            });
        }
        Ok(())
    }
}

/// Thread-safe in-memory UCI store.
///
/// # Example
///
/// ```
/// use lucirpc::backend::Backend;
/// use lucirpc::backend::memory::MemoryBackend;
/// use lucirpc::{Options, SectionId};
///
/// let backend = MemoryBackend::new();
/// let index = backend.add("firewall", "zone").unwrap();
/// assert_eq!(index, 0);
///
/// let mut options = Options::new();
/// options.insert("name".into(), "lan".into());
/// backend.set("firewall", "zone", &SectionId::Ordinal(0), &options, &[]).unwrap();
///
/// let read = backend.get("firewall", "zone", &SectionId::Ordinal(0)).unwrap();
/// assert_eq!(read, options);
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the sections of `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(State {
                configs: snapshot.configs,
                ..State::default()
            }),
        }
    }

    /// Copy out the stored sections.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            configs: self.lock().configs.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave the maps half-written.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seed a named section, replacing any section with the same name.
    pub fn insert_named(&self, config: &str, section_type: &str, name: &str, options: Options) {
        let mut state = self.lock();
        let sections = state.configs.entry(config.to_string()).or_default();
        sections.retain(|s| s.name.as_deref() != Some(name));
        sections.push(StoredSection {
            name: Some(name.to_string()),
            section_type: section_type.to_string(),
            options,
        });
    }

    /// Seed an anonymous section and return its position among its type.
    pub fn insert_anonymous(&self, config: &str, section_type: &str, options: Options) -> usize {
        let mut state = self.lock();
        let sections = state.configs.entry(config.to_string()).or_default();
        sections.push(StoredSection {
            name: None,
            section_type: section_type.to_string(),
            options,
        });
        sections
            .iter()
            .filter(|s| s.section_type == section_type)
            .count()
            - 1
    }

    /// Number of sections of a type currently stored.
    pub fn count(&self, config: &str, section_type: &str) -> usize {
        self.lock()
            .configs
            .get(config)
            .map(|sections| {
                sections
                    .iter()
                    .filter(|s| s.section_type == section_type)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Make every subsequent call fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl Backend for MemoryBackend {
    fn add(&self, config: &str, section_type: &str) -> Result<usize> {
        let mut state = self.lock();
        state.calls.push(Call::Add {
            config: config.to_string(),
            section_type: section_type.to_string(),
        });
        state.check_online()?;
        drop(state);

        Ok(self.insert_anonymous(config, section_type, Options::new()))
    }

    fn get(&self, config: &str, section_type: &str, section: &SectionId) -> Result<Options> {
        let mut state = self.lock();
        state.calls.push(Call::Get {
            config: config.to_string(),
            section_type: section_type.to_string(),
            section: section.clone(),
        });
        state.check_online()?;

        let index = state
            .position(config, section_type, section)
            .ok_or_else(|| Error::not_found(config, section.selector(section_type)))?;
        Ok(state.configs[config][index].options.clone())
    }

    fn set(
        &self,
        config: &str,
        section_type: &str,
        section: &SectionId,
        options: &Options,
        unset: &[String],
    ) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::Set {
            config: config.to_string(),
            section_type: section_type.to_string(),
            section: section.clone(),
            options: options.clone(),
            unset: unset.to_vec(),
        });
        state.check_online()?;

        let index = state
            .position(config, section_type, section)
            .ok_or_else(|| Error::not_found(config, section.selector(section_type)))?;
        if let Some(stored) = state
            .configs
            .get_mut(config)
            .and_then(|sections| sections.get_mut(index))
        {
            stored
                .options
                .extend(options.iter().map(|(k, v)| (k.clone(), v.clone())));
            for option in unset {
                stored.options.remove(option);
            }
        }
        Ok(())
    }

    fn delete(&self, config: &str, section_type: &str, section: &SectionId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::Delete {
            config: config.to_string(),
            section_type: section_type.to_string(),
            section: section.clone(),
        });
        state.check_online()?;

        let index = state
            .position(config, section_type, section)
            .ok_or_else(|| Error::not_found(config, section.selector(section_type)))?;
        if let Some(sections) = state.configs.get_mut(config) {
            sections.remove(index);
        }
        Ok(())
    }
}
