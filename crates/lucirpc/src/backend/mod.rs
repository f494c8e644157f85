//! Backend abstraction for UCI operations.
//!
//! The [`Backend`] trait is the whole remote surface the rest of the
//! workspace depends on: four section-level calls against a config and a
//! section type. Implementations:
//! - [`http::HttpBackend`] talks to LuCI's JSON-RPC endpoint
//! - [`memory::MemoryBackend`] keeps sections in process, for tests and
//!   offline runs

pub mod http;
pub mod memory;

use crate::error::Result;
use crate::types::{Options, SectionId};
use std::sync::Arc;

/// Backend trait for UCI section operations.
///
/// Implementations must be safe to call from several threads at once;
/// independent lifecycle operations share one backend.
pub trait Backend: Send + Sync {
    /// Append an anonymous section of `section_type` to `config`.
    ///
    /// Returns the new section's position among sections of that type.
    fn add(&self, config: &str, section_type: &str) -> Result<usize>;

    /// Fetch the option bag of a section.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when the
    /// section does not exist or exists with a different type.
    fn get(&self, config: &str, section_type: &str, section: &SectionId) -> Result<Options>;

    /// Write options into an existing section and remove the options
    /// named in `unset`.
    ///
    /// Options mentioned in neither are left untouched. Fails with
    /// [`Error::NotFound`](crate::Error::NotFound) when the section does not
    /// exist or exists with a different type; nothing is written then.
    fn set(
        &self,
        config: &str,
        section_type: &str,
        section: &SectionId,
        options: &Options,
        unset: &[String],
    ) -> Result<()>;

    /// Remove a section.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when there is
    /// nothing to remove, or when the section has a different type.
    fn delete(&self, config: &str, section_type: &str, section: &SectionId) -> Result<()>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn add(&self, config: &str, section_type: &str) -> Result<usize> {
        (**self).add(config, section_type)
    }

    fn get(&self, config: &str, section_type: &str, section: &SectionId) -> Result<Options> {
        (**self).get(config, section_type, section)
    }

    fn set(
        &self,
        config: &str,
        section_type: &str,
        section: &SectionId,
        options: &Options,
        unset: &[String],
    ) -> Result<()> {
        (**self).set(config, section_type, section, options, unset)
    }

    fn delete(&self, config: &str, section_type: &str, section: &SectionId) -> Result<()> {
        (**self).delete(config, section_type, section)
    }
}
