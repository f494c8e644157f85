//! Attribute descriptors.
//!
//! An [`Attribute`] ties one model field to one UCI option. It knows how to
//! project the option into the model ([`SchemaAttribute::read_response`])
//! and the model back into a request bag
//! ([`SchemaAttribute::upsert_request`]). Field access goes through plain
//! function pointers supplied when the table is declared, so no reflection
//! is involved.
//!
//! # Example
//!
//! ```
//! use binding::attribute::{Existence, StringAttribute};
//! use binding::validator::one_of;
//! use binding::Value;
//!
//! #[derive(Default)]
//! struct Zone {
//!     input: Value<String>,
//! }
//!
//! let input = StringAttribute::new(
//!     "Policy for incoming traffic",
//!     "input",
//!     |m: &Zone| &m.input,
//!     |m: &mut Zone, v| m.input = v,
//! )
//! .existence(Existence::Required)
//! .validator(one_of(&["ACCEPT", "REJECT", "DROP"]));
//! ```

use crate::codec::{OptionCodec, ValueKind};
use crate::error::{Error, Result, Violation};
use crate::schema::AttributeSchema;
use crate::validator::Validator;
use crate::value::Value;
use lucirpc::Options;
use serde::Serialize;

/// Whether an attribute must, may, or cannot be supplied by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Existence {
    /// Always supplied; must be present on the remote section too
    Required,
    /// May be left unset; unset means the option is omitted
    Optional,
    /// Filled in from the remote side only, never written
    Computed,
}

impl Existence {
    /// Whether the attribute is sent to the remote store.
    pub fn is_writable(self) -> bool {
        !matches!(self, Self::Computed)
    }
}

/// Object-safe view of an attribute descriptor for models of type `M`.
pub trait SchemaAttribute<M>: Send + Sync {
    /// The attribute's existence policy.
    fn existence(&self) -> Existence;

    /// The UCI option backing this attribute, if any.
    fn option(&self) -> Option<&str>;

    /// Project the remote option bag into the model field.
    fn read_response(&self, name: &str, options: &Options, model: &mut M) -> Result<()>;

    /// Check the model field before a write.
    ///
    /// Returns at most one violation: validators run in declaration order
    /// and the first one that rejects the value decides.
    fn validate(&self, name: &str, model: &M) -> Vec<Violation>;

    /// Project the model field into a request bag.
    ///
    /// Only known values are written; an unset field leaves no key behind.
    fn upsert_request(&self, model: &M, options: &mut Options);

    /// Describe the attribute for the host.
    fn schema(&self) -> AttributeSchema;
}

/// Descriptor for a model field of type `T` stored in UCI option `option`.
pub struct Attribute<M, T: OptionCodec> {
    description: String,
    option: String,
    existence: Existence,
    validators: Vec<Box<dyn Validator<T>>>,
    get: fn(&M) -> &Value<T>,
    set: fn(&mut M, Value<T>),
}

/// Attribute holding a single string.
pub type StringAttribute<M> = Attribute<M, String>;

/// Attribute holding a 64-bit integer.
pub type Int64Attribute<M> = Attribute<M, i64>;

/// Attribute holding an ordered list of strings.
pub type ListStringAttribute<M> = Attribute<M, Vec<String>>;

impl<M, T: OptionCodec> Attribute<M, T> {
    /// Create an optional attribute with no validators.
    pub fn new(
        description: impl Into<String>,
        option: impl Into<String>,
        get: fn(&M) -> &Value<T>,
        set: fn(&mut M, Value<T>),
    ) -> Self {
        Self {
            description: description.into(),
            option: option.into(),
            existence: Existence::Optional,
            validators: Vec::new(),
            get,
            set,
        }
    }

    /// Set the existence policy.
    pub fn existence(mut self, existence: Existence) -> Self {
        self.existence = existence;
        self
    }

    /// Add a validator; validators run in the order they were added.
    pub fn validator(mut self, validator: impl Validator<T> + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl<M, T: OptionCodec> SchemaAttribute<M> for Attribute<M, T> {
    fn existence(&self) -> Existence {
        self.existence
    }

    fn option(&self) -> Option<&str> {
        Some(&self.option)
    }

    fn read_response(&self, name: &str, options: &Options, model: &mut M) -> Result<()> {
        let value = match options.get(&self.option) {
            Some(raw) => Value::Known(T::decode(raw).map_err(|source| Error::Codec {
                attribute: name.to_string(),
                option: self.option.clone(),
                source,
            })?),
            None if self.existence == Existence::Required => {
                return Err(Error::MissingRequiredAttribute {
                    attribute: name.to_string(),
                    option: self.option.clone(),
                });
            }
            None => Value::Absent,
        };
        (self.set)(model, value);
        Ok(())
    }

    fn validate(&self, name: &str, model: &M) -> Vec<Violation> {
        if !self.existence.is_writable() {
            return Vec::new();
        }
        match (self.get)(model) {
            Value::Known(value) => self
                .validators
                .iter()
                .map(|v| v.validate(value))
                .find(|messages| !messages.is_empty())
                .map(|messages| vec![Violation::invalid(name, messages.join("; "))])
                .unwrap_or_default(),
            Value::Absent | Value::Unknown if self.existence == Existence::Required => {
                vec![Violation::missing(name)]
            }
            Value::Absent | Value::Unknown => Vec::new(),
        }
    }

    fn upsert_request(&self, model: &M, options: &mut Options) {
        if !self.existence.is_writable() {
            return;
        }
        if let Value::Known(value) = (self.get)(model) {
            options.insert(self.option.clone(), value.encode());
        }
    }

    fn schema(&self) -> AttributeSchema {
        AttributeSchema {
            description: self.description.clone(),
            kind: T::KIND,
            required: self.existence == Existence::Required,
            optional: self.existence == Existence::Optional,
            computed: self.existence == Existence::Computed,
            validators: self.validators.iter().map(|v| v.description()).collect(),
        }
    }
}

/// Name of the identifier attribute every table carries.
pub const ID_ATTRIBUTE: &str = "id";

const ID_DESCRIPTION: &str =
    "Identifier of the section, in the form <config>.<type>.<name> or <config>.<type>.@<index>.";

/// Accessors for the identifier field of a model.
///
/// The identifier never maps to a UCI option: the engine assigns it on
/// create and parses it on every other operation.
pub struct IdAttribute<M> {
    pub(crate) get: fn(&M) -> &Value<String>,
    pub(crate) set: fn(&mut M, Value<String>),
}

impl<M> IdAttribute<M> {
    /// Create the identifier descriptor from its field accessors.
    pub fn new(get: fn(&M) -> &Value<String>, set: fn(&mut M, Value<String>)) -> Self {
        Self { get, set }
    }

    /// Schema as seen by a resource: assigned by the engine.
    pub fn schema(&self) -> AttributeSchema {
        AttributeSchema {
            description: ID_DESCRIPTION.to_string(),
            kind: ValueKind::String,
            required: false,
            optional: false,
            computed: true,
            validators: Vec::new(),
        }
    }

    /// Schema as seen by a data source: the lookup key.
    pub fn lookup_schema(&self) -> AttributeSchema {
        AttributeSchema {
            required: true,
            computed: false,
            ..self.schema()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{between, one_of};
    use lucirpc::OptionValue;

    #[derive(Debug, Default, PartialEq)]
    struct Model {
        name: Value<String>,
        vlan: Value<i64>,
        ports: Value<Vec<String>>,
        status: Value<String>,
    }

    fn name() -> StringAttribute<Model> {
        StringAttribute::new(
            "name",
            "name",
            |m: &Model| &m.name,
            |m: &mut Model, v| m.name = v,
        )
        .existence(Existence::Required)
        .validator(one_of(&["lan", "wan"]))
    }

    fn vlan() -> Int64Attribute<Model> {
        Int64Attribute::new(
            "vlan",
            "vlan",
            |m: &Model| &m.vlan,
            |m: &mut Model, v| m.vlan = v,
        )
        .validator(between(1, 4094))
    }

    fn ports() -> ListStringAttribute<Model> {
        ListStringAttribute::new(
            "ports",
            "ports",
            |m: &Model| &m.ports,
            |m: &mut Model, v| m.ports = v,
        )
    }

    fn status() -> StringAttribute<Model> {
        StringAttribute::new(
            "status",
            "status",
            |m: &Model| &m.status,
            |m: &mut Model, v| m.status = v,
        )
        .existence(Existence::Computed)
    }

    #[test]
    fn test_read_response_sets_known() {
        let mut options = Options::new();
        options.insert("name".into(), "lan".into());
        options.insert("vlan".into(), "10".into());

        let mut model = Model::default();
        name().read_response("name", &options, &mut model).unwrap();
        vlan().read_response("vlan", &options, &mut model).unwrap();

        assert_eq!(model.name, Value::from("lan"));
        assert_eq!(model.vlan, Value::Known(10));
    }

    #[test]
    fn test_read_response_missing_required() {
        let mut model = Model::default();
        let err = name()
            .read_response("name", &Options::new(), &mut model)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredAttribute { ref attribute, .. } if attribute == "name"
        ));
    }

    #[test]
    fn test_read_response_missing_optional_is_absent_not_empty() {
        let mut model = Model {
            vlan: Value::Known(5),
            status: Value::Unknown,
            ..Default::default()
        };
        vlan().read_response("vlan", &Options::new(), &mut model).unwrap();
        status().read_response("status", &Options::new(), &mut model).unwrap();

        assert_eq!(model.vlan, Value::Absent);
        assert_eq!(model.status, Value::Absent);
    }

    #[test]
    fn test_read_response_codec_error_names_attribute() {
        let mut options = Options::new();
        options.insert("ports".into(), "1 2 3".into());

        let err = ports()
            .read_response("ports", &options, &mut Model::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Codec { ref attribute, ref option, .. } if attribute == "ports" && option == "ports"
        ));
    }

    #[test]
    fn test_upsert_omits_absent_and_unknown() {
        let model = Model {
            name: Value::from("lan"),
            vlan: Value::Absent,
            ports: Value::Unknown,
            status: Value::from("up"),
        };
        let mut options = Options::new();
        name().upsert_request(&model, &mut options);
        vlan().upsert_request(&model, &mut options);
        ports().upsert_request(&model, &mut options);
        status().upsert_request(&model, &mut options);

        assert_eq!(options.len(), 1);
        assert_eq!(options["name"], OptionValue::from("lan"));
    }

    #[test]
    fn test_upsert_keeps_empty_string() {
        let model = Model {
            name: Value::from(""),
            ..Default::default()
        };
        let mut options = Options::new();
        name().upsert_request(&model, &mut options);
        assert_eq!(options["name"], OptionValue::from(""));
    }

    #[test]
    fn test_validate_required_absent_and_invalid() {
        let absent = Model::default();
        assert_eq!(name().validate("name", &absent), vec![Violation::missing("name")]);

        let invalid = Model {
            name: Value::from("dmz"),
            vlan: Value::Known(0),
            ..Default::default()
        };
        assert_eq!(name().validate("name", &invalid).len(), 1);
        assert_eq!(vlan().validate("vlan", &invalid).len(), 1);
        assert!(vlan().validate("vlan", &Model::default()).is_empty());
    }

    #[test]
    fn test_validate_stops_at_first_failing_validator() {
        use crate::validator::{NotBlank, length_between};

        let label = StringAttribute::new(
            "label",
            "label",
            |m: &Model| &m.name,
            |m: &mut Model, v| m.name = v,
        )
        .validator(NotBlank)
        .validator(length_between(1, 3));

        let blank = Model {
            name: Value::from("     "),
            ..Default::default()
        };
        let violations = label.validate("label", &blank);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "value must not be blank");

        let ports = ports().validator(crate::validator::each_matches(
            regex::Regex::new(r"^\d+t?$").unwrap(),
            "port must look like 3 or 3t",
        ));
        let bad = Model {
            ports: Value::Known(vec!["x".into(), "1".into(), "y".into()]),
            ..Default::default()
        };
        let violations = ports.validate("ports", &bad);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("element 0"));
        assert!(violations[0].message.contains("element 2"));
    }

    #[test]
    fn test_schema_flags() {
        let schema = name().schema();
        assert!(schema.required && !schema.optional && !schema.computed);
        assert_eq!(schema.kind, ValueKind::String);
        assert_eq!(schema.validators.len(), 1);

        let schema = status().schema();
        assert!(schema.computed && !schema.required);
    }
}
