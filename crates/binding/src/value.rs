//! Host-side attribute values.
//!
//! A model field is never represented by a bare `T`: the host needs to tell
//! "not set" apart from "set to an empty string", and during planning some
//! values are not known yet. [`Value`] makes all three states explicit.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The state of one model attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value<T> {
    /// The attribute has a concrete value
    Known(T),
    /// The attribute is not set
    #[default]
    Absent,
    /// The value will only be known after apply
    Unknown,
}

impl<T> Value<T> {
    /// Check if a concrete value is present.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Check if the attribute is unset.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Check if the value is still unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Borrow the concrete value, if any.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Absent | Self::Unknown => None,
        }
    }

    /// Take the concrete value, if any.
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Absent | Self::Unknown => None,
        }
    }

    /// `Some` becomes `Known`, `None` becomes `Absent`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Known)
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl From<&str> for Value<String> {
    fn from(value: &str) -> Self {
        Self::Known(value.to_string())
    }
}

// Unknown has no JSON spelling; it only exists inside a plan and is
// serialized as null like Absent.
impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(value) => serializer.serialize_some(value),
            Self::Absent | Self::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Value<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from_option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: Value<String>,
        mtu: Value<i64>,
    }

    #[test]
    fn test_default_is_absent() {
        let value: Value<String> = Value::default();
        assert!(value.is_absent());
        assert_eq!(value.as_known(), None);
    }

    #[test]
    fn test_empty_string_is_not_absent() {
        let value = Value::from("");
        assert!(value.is_known());
        assert_eq!(value.as_known().map(String::as_str), Some(""));
    }

    #[test]
    fn test_deserialize_missing_and_null_as_absent() {
        let sample: Sample = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_serialize_known_and_absent() {
        let sample = Sample {
            name: Value::from("lan"),
            mtu: Value::Absent,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "lan", "mtu": null }));
    }

    #[test]
    fn test_unknown_serializes_as_null() {
        let value: Value<i64> = Value::Unknown;
        assert_eq!(serde_json::to_string(&value).unwrap(), "null");
        assert!(value.into_known().is_none());
    }
}
