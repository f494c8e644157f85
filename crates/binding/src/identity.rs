//! Resource identifiers.
//!
//! An identifier names one UCI section independently of host state:
//!
//! ```text
//! firewall.zone.lan        named section "lan"
//! firewall.zone.@2         third anonymous-or-named section of type zone
//! network.bridge-vlan.@0
//! ```
//!
//! Ordinals are positions among sections of the same type at the time the
//! identifier was produced. They are not stable if other actors add or
//! remove sections of that type in between.

use crate::error::{Error, Result};
use lucirpc::SectionId;
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '.';
const ORDINAL_PREFIX: char = '@';

/// A parsed resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub config: String,
    pub section_type: String,
    pub section: SectionId,
}

impl ResourceId {
    pub fn new(config: impl Into<String>, section_type: impl Into<String>, section: SectionId) -> Self {
        Self {
            config: config.into(),
            section_type: section_type.into(),
            section,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.config, self.section_type, self.section
        )
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        let [config, section_type, section] = parts.as_slice() else {
            return Err(Error::malformed(
                s,
                format!(
                    "expected 3 components separated by '{SEPARATOR}', found {}",
                    parts.len()
                ),
            ));
        };

        if !is_uci_name(config) {
            return Err(Error::malformed(s, format!("invalid config name {config:?}")));
        }
        if !is_uci_type(section_type) {
            return Err(Error::malformed(
                s,
                format!("invalid section type {section_type:?}"),
            ));
        }

        Ok(Self::new(*config, *section_type, parse_section(s, section)?))
    }
}

fn parse_section(id: &str, section: &str) -> Result<SectionId> {
    match section.strip_prefix(ORDINAL_PREFIX) {
        Some(digits) => {
            let canonical = !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
                && (digits == "0" || !digits.starts_with('0'));
            if !canonical {
                return Err(Error::malformed(id, format!("invalid ordinal {section:?}")));
            }
            digits
                .parse()
                .map(SectionId::Ordinal)
                .map_err(|_| Error::malformed(id, format!("ordinal {section:?} is out of range")))
        }
        None if is_uci_name(section) => Ok(SectionId::Named(section.to_string())),
        None => Err(Error::malformed(id, format!("invalid section name {section:?}"))),
    }
}

fn is_uci_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_uci_type(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Produces and checks identifiers for one config and section type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityManager {
    config: String,
    section_type: String,
}

impl IdentityManager {
    pub fn new(config: impl Into<String>, section_type: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            section_type: section_type.into(),
        }
    }

    pub fn config(&self) -> &str {
        &self.config
    }

    pub fn section_type(&self) -> &str {
        &self.section_type
    }

    /// Build the identifier for a section of this type.
    pub fn synthesize(&self, section: SectionId) -> String {
        ResourceId::new(self.config.clone(), self.section_type.clone(), section).to_string()
    }

    /// Parse an identifier and check that it belongs to this type.
    ///
    /// ```
    /// use binding::identity::IdentityManager;
    /// use lucirpc::SectionId;
    ///
    /// let zones = IdentityManager::new("firewall", "zone");
    /// assert_eq!(zones.parse("firewall.zone.lan").unwrap(), SectionId::Named("lan".into()));
    /// assert!(zones.parse("firewall.rule.lan").is_err());
    /// ```
    pub fn parse(&self, id: &str) -> Result<SectionId> {
        let parsed: ResourceId = id.parse()?;
        if parsed.config != self.config || parsed.section_type != self.section_type {
            return Err(Error::malformed(
                id,
                format!(
                    "expected an identifier of the form {}{SEPARATOR}{}{SEPARATOR}<section>",
                    self.config, self.section_type
                ),
            ));
        }
        Ok(parsed.section)
    }
}
