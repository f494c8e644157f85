//! Translation of engine errors into host diagnostics.
//!
//! Each error kind maps to a fixed summary line so hosts (and users
//! grepping logs) can rely on it; the detail carries the specifics.

use crate::error::{Error, ViolationKind};
use serde::Serialize;
use std::fmt;

pub const SUMMARY_INVALID_VALUE: &str = "Invalid attribute value";
pub const SUMMARY_MISSING_REQUIRED: &str = "Missing required attribute";
pub const SUMMARY_MALFORMED_ID: &str = "Malformed resource identifier";
pub const SUMMARY_DECODE: &str = "Unable to decode remote option";
pub const SUMMARY_REMOTE: &str = "Remote call failed";
pub const SUMMARY_NOT_FOUND: &str = "Section not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// One message for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(resource_type: &str, summary: &str, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.to_string(),
            detail: detail.into(),
            resource_type: resource_type.to_string(),
            id: None,
            attribute: None,
        }
    }

    pub fn warning(resource_type: &str, summary: &str, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(resource_type, summary, detail)
        }
    }

    pub fn with_id(mut self, id: Option<&str>) -> Self {
        self.id = id.map(str::to_string);
        self
    }

    pub fn with_attribute(mut self, attribute: Option<&str>) -> Self {
        self.attribute = attribute.map(str::to_string);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity}: {}", self.summary)?;
        match (&self.id, &self.attribute) {
            (Some(id), Some(attribute)) => write!(f, " ({} {id}, {attribute})", self.resource_type)?,
            (Some(id), None) => write!(f, " ({} {id})", self.resource_type)?,
            (None, Some(attribute)) => write!(f, " ({}, {attribute})", self.resource_type)?,
            (None, None) => write!(f, " ({})", self.resource_type)?,
        }
        write!(f, ": {}", self.detail)
    }
}

/// Ordered list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate an engine error.
    ///
    /// `id` is the identifier known to the caller; an identifier carried by
    /// the error itself takes precedence. A validation error yields one
    /// diagnostic per violation.
    pub fn from_error(resource_type: &str, id: Option<&str>, error: &Error) -> Self {
        let id = error.id().filter(|id| !id.is_empty()).or(id);
        let entries = match error {
            Error::Validation { violations } => violations
                .iter()
                .map(|v| {
                    let summary = match v.kind {
                        ViolationKind::Missing => SUMMARY_MISSING_REQUIRED,
                        ViolationKind::Invalid => SUMMARY_INVALID_VALUE,
                    };
                    Diagnostic::error(resource_type, summary, v.message.clone())
                        .with_id(id)
                        .with_attribute(Some(&v.attribute))
                })
                .collect(),
            _ => {
                let summary = match error {
                    Error::Codec { .. } => SUMMARY_DECODE,
                    Error::MissingRequiredAttribute { .. } => SUMMARY_MISSING_REQUIRED,
                    Error::MalformedIdentifier { .. } => SUMMARY_MALFORMED_ID,
                    Error::NotFound { .. } => SUMMARY_NOT_FOUND,
                    Error::Remote { .. } | Error::Validation { .. } => SUMMARY_REMOTE,
                };
                vec![
                    Diagnostic::error(resource_type, summary, error.to_string())
                        .with_id(id)
                        .with_attribute(error.attribute()),
                ]
            }
        };
        Self(entries)
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
