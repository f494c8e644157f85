//! Schema descriptors handed to the host.

use crate::codec::ValueKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Host-facing description of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    pub description: String,
    pub kind: ValueKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
}

impl AttributeSchema {
    /// The same attribute as seen from a data source: everything except the
    /// lookup key is filled in by the read.
    pub fn as_computed(&self) -> Self {
        Self {
            required: false,
            optional: false,
            computed: true,
            validators: Vec::new(),
            ..self.clone()
        }
    }
}

/// Host-facing description of a resource or data source type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    pub description: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
}
