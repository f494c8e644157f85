//! Error types for binding operations.

use crate::codec::CodecError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle operation, used to give remote errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
    DataSourceRead,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::DataSourceRead => "data source read",
        };
        write!(f, "{name}")
    }
}

/// Why an attribute value was rejected before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required attribute has no value
    Missing,
    /// A validator rejected the value
    Invalid,
}

/// One rejected attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub attribute: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn missing(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind: ViolationKind::Missing,
            message: format!("attribute {attribute:?} is required"),
        }
    }

    pub fn invalid(attribute: &str, message: impl Into<String>) -> Self {
        Self {
            attribute: attribute.to_string(),
            kind: ViolationKind::Invalid,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::Missing => write!(f, "{}", self.message),
            ViolationKind::Invalid => write!(f, "{}: {}", self.attribute, self.message),
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by the binding engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A remote option has the wrong shape for its attribute
    #[error("attribute {attribute:?}: cannot decode option {option:?}: {source}")]
    Codec {
        attribute: String,
        option: String,
        #[source]
        source: CodecError,
    },

    /// One or more attribute values were rejected; carries all of them
    #[error("invalid attribute values: {}", join_violations(.violations))]
    Validation { violations: Vec<Violation> },

    /// The remote section lacks an option the model requires
    #[error("attribute {attribute:?} is required but option {option:?} is not set")]
    MissingRequiredAttribute { attribute: String, option: String },

    /// The resource identifier does not address a section of this type
    #[error("malformed identifier {id:?}: {reason}")]
    MalformedIdentifier { id: String, reason: String },

    /// The addressed section does not exist
    #[error("section {id} not found")]
    NotFound { id: String },

    /// The RPC client failed
    #[error("{operation} {}: {source}", .id.as_deref().unwrap_or("(new section)"))]
    Remote {
        operation: Operation,
        id: Option<String>,
        #[source]
        source: lucirpc::Error,
    },
}

impl Error {
    pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap an RPC error, turning a missing section into [`Error::NotFound`].
    pub(crate) fn remote(operation: Operation, id: Option<&str>, source: lucirpc::Error) -> Self {
        match (id, source.is_not_found()) {
            (Some(id), true) => Self::NotFound { id: id.to_string() },
            _ => Self::Remote {
                operation,
                id: id.map(str::to_string),
                source,
            },
        }
    }

    /// Whether the addressed section is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The resource identifier the error refers to, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::MalformedIdentifier { id, .. } | Self::NotFound { id } => Some(id),
            Self::Remote { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    /// The attribute the error refers to, if it is about exactly one.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::Codec { attribute, .. } | Self::MissingRequiredAttribute { attribute, .. } => {
                Some(attribute)
            }
            Self::Validation { violations } if violations.len() == 1 => {
                Some(&violations[0].attribute)
            }
            _ => None,
        }
    }
}
