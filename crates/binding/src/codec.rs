//! Conversion between typed attribute values and remote option values.
//!
//! Decoding checks arity: a list option never decodes as a scalar and a
//! scalar never decodes as a list. Encoding is total.

use lucirpc::OptionValue;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The value kinds an attribute can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Int64,
    ListOfString,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int64 => "integer",
            Self::ListOfString => "list of strings",
        };
        write!(f, "{name}")
    }
}

/// A remote option could not be decoded into the attribute's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The option has the wrong arity or shape
    #[error("expected {expected}, remote sent a {found}")]
    Shape {
        expected: ValueKind,
        found: &'static str,
    },

    /// A scalar that should hold an integer does not
    #[error("{value:?} is not a 64-bit integer")]
    Integer { value: String },
}

/// A typed value that can travel as a UCI option.
pub trait OptionCodec: Sized + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The kind reported in schemas.
    const KIND: ValueKind;

    /// Decode a raw option value.
    fn decode(raw: &OptionValue) -> Result<Self, CodecError>;

    /// Encode into a raw option value.
    fn encode(&self) -> OptionValue;
}

impl OptionCodec for String {
    const KIND: ValueKind = ValueKind::String;

    fn decode(raw: &OptionValue) -> Result<Self, CodecError> {
        match raw {
            OptionValue::String(s) => Ok(s.clone()),
            OptionValue::Integer(i) => Ok(i.to_string()),
            OptionValue::List(_) => Err(CodecError::Shape {
                expected: Self::KIND,
                found: raw.shape(),
            }),
        }
    }

    fn encode(&self) -> OptionValue {
        OptionValue::String(self.clone())
    }
}

impl OptionCodec for i64 {
    const KIND: ValueKind = ValueKind::Int64;

    fn decode(raw: &OptionValue) -> Result<Self, CodecError> {
        match raw {
            OptionValue::Integer(i) => Ok(*i),
            OptionValue::String(s) => s.trim().parse().map_err(|_| CodecError::Integer {
                value: s.clone(),
            }),
            OptionValue::List(_) => Err(CodecError::Shape {
                expected: Self::KIND,
                found: raw.shape(),
            }),
        }
    }

    // UCI stores everything as text.
    fn encode(&self) -> OptionValue {
        OptionValue::String(self.to_string())
    }
}

impl OptionCodec for Vec<String> {
    const KIND: ValueKind = ValueKind::ListOfString;

    fn decode(raw: &OptionValue) -> Result<Self, CodecError> {
        match raw {
            OptionValue::List(items) => Ok(items.clone()),
            OptionValue::String(_) | OptionValue::Integer(_) => Err(CodecError::Shape {
                expected: Self::KIND,
                found: raw.shape(),
            }),
        }
    }

    fn encode(&self) -> OptionValue {
        OptionValue::List(self.clone())
    }
}
