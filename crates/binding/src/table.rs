//! Binding tables.
//!
//! A [`BindingTable`] is the complete description of one resource type:
//! where its sections live (config and section type), which model field
//! holds the identifier, and one descriptor per remaining attribute. Tables
//! are built once at startup and shared read-only afterwards.

use crate::attribute::{ID_ATTRIBUTE, IdAttribute, SchemaAttribute};
use crate::error::{Error, Result};
use crate::identity::IdentityManager;
use crate::schema::ResourceSchema;
use crate::value::Value;
use lucirpc::Options;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A table declaration is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("attribute {name:?} is declared more than once")]
    DuplicateAttribute { name: String },

    #[error("two attributes write option {option:?}")]
    DuplicateOption { option: String },

    #[error("no identifier attribute declared")]
    MissingIdentifier,

    #[error("identifier attribute declared more than once")]
    MultipleIdentifiers,

    #[error("attribute name {name:?} is reserved for the identifier")]
    ReservedName { name: String },
}

/// Declarative mapping between a model type `M` and one UCI section type.
pub struct BindingTable<M> {
    description: String,
    identity: IdentityManager,
    id: IdAttribute<M>,
    attributes: Vec<(String, Box<dyn SchemaAttribute<M>>)>,
}

impl<M: 'static> BindingTable<M> {
    /// Start declaring a table for sections of `section_type` in `config`.
    pub fn builder(
        description: impl Into<String>,
        config: impl Into<String>,
        section_type: impl Into<String>,
    ) -> TableBuilder<M> {
        TableBuilder {
            description: description.into(),
            identity: IdentityManager::new(config, section_type),
            ids: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

impl<M> BindingTable<M> {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn identity(&self) -> &IdentityManager {
        &self.identity
    }

    pub fn config(&self) -> &str {
        self.identity.config()
    }

    pub fn section_type(&self) -> &str {
        self.identity.section_type()
    }

    /// Attribute names in declaration order, identifier excluded.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn id_value<'m>(&self, model: &'m M) -> &'m Value<String> {
        (self.id.get)(model)
    }

    pub(crate) fn assign_id(&self, model: &mut M, id: String) {
        (self.id.set)(model, Value::Known(id));
    }

    /// Run every attribute's checks and report all violations together.
    pub fn validate(&self, model: &M) -> Result<()> {
        let violations: Vec<_> = self
            .attributes
            .iter()
            .flat_map(|(name, attribute)| attribute.validate(name, model))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { violations })
        }
    }

    /// Build the option bag for a write from the model.
    pub fn upsert_request(&self, model: &M) -> Options {
        let mut options = Options::new();
        for (_, attribute) in &self.attributes {
            attribute.upsert_request(model, &mut options);
        }
        options
    }

    /// Writable options the model leaves unset.
    ///
    /// An update removes these from the section, so an attribute cleared
    /// in the plan is cleared on the device too.
    pub fn unset_options(&self, model: &M) -> Vec<String> {
        let written = self.upsert_request(model);
        self.attributes
            .iter()
            .filter(|(_, attribute)| attribute.existence().is_writable())
            .filter_map(|(_, attribute)| attribute.option())
            .filter(|option| !written.contains_key(*option))
            .map(str::to_string)
            .collect()
    }

    /// Project a remote option bag into the model, stopping at the first
    /// attribute that cannot be read.
    pub fn read_response(&self, options: &Options, model: &mut M) -> Result<()> {
        for (name, attribute) in &self.attributes {
            attribute.read_response(name, options, model)?;
        }
        Ok(())
    }

    /// Schema of the managed resource.
    pub fn resource_schema(&self) -> ResourceSchema {
        let mut attributes: BTreeMap<_, _> = self
            .attributes
            .iter()
            .map(|(name, attribute)| (name.clone(), attribute.schema()))
            .collect();
        attributes.insert(ID_ATTRIBUTE.to_string(), self.id.schema());
        ResourceSchema {
            description: self.description.clone(),
            attributes,
        }
    }

    /// Schema of the read-only data source: the identifier is the lookup
    /// key, everything else comes back from the device.
    pub fn data_source_schema(&self) -> ResourceSchema {
        let mut attributes: BTreeMap<_, _> = self
            .attributes
            .iter()
            .map(|(name, attribute)| (name.clone(), attribute.schema().as_computed()))
            .collect();
        attributes.insert(ID_ATTRIBUTE.to_string(), self.id.lookup_schema());
        ResourceSchema {
            description: self.description.clone(),
            attributes,
        }
    }
}

/// Builder returned by [`BindingTable::builder`].
pub struct TableBuilder<M> {
    description: String,
    identity: IdentityManager,
    ids: Vec<IdAttribute<M>>,
    attributes: Vec<(String, Box<dyn SchemaAttribute<M>>)>,
}

impl<M: 'static> TableBuilder<M> {
    /// Declare the identifier field.
    pub fn id(mut self, id: IdAttribute<M>) -> Self {
        self.ids.push(id);
        self
    }

    /// Declare an attribute; declaration order is the read order.
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        attribute: impl SchemaAttribute<M> + 'static,
    ) -> Self {
        self.attributes.push((name.into(), Box::new(attribute)));
        self
    }

    /// Check the declaration and produce the table.
    pub fn build(self) -> std::result::Result<BindingTable<M>, TableError> {
        let mut names = HashSet::new();
        let mut options = HashSet::new();
        for (name, attribute) in &self.attributes {
            if name == ID_ATTRIBUTE {
                return Err(TableError::ReservedName { name: name.clone() });
            }
            if !names.insert(name.as_str()) {
                return Err(TableError::DuplicateAttribute { name: name.clone() });
            }
            if let Some(option) = attribute.option()
                && !options.insert(option)
            {
                return Err(TableError::DuplicateOption {
                    option: option.to_string(),
                });
            }
        }

        let mut ids = self.ids.into_iter();
        let id = ids.next().ok_or(TableError::MissingIdentifier)?;
        if ids.next().is_some() {
            return Err(TableError::MultipleIdentifiers);
        }

        Ok(BindingTable {
            description: self.description,
            identity: self.identity,
            id,
            attributes: self.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Existence, Int64Attribute, StringAttribute};
    use crate::error::ViolationKind;
    use crate::validator::{between, one_of};

    #[derive(Debug, Default, PartialEq)]
    struct Zone {
        id: Value<String>,
        name: Value<String>,
        input: Value<String>,
        mtu: Value<i64>,
    }

    fn id() -> IdAttribute<Zone> {
        IdAttribute::new(|m: &Zone| &m.id, |m: &mut Zone, v| m.id = v)
    }

    fn name() -> StringAttribute<Zone> {
        StringAttribute::new("Zone name", "name", |m: &Zone| &m.name, |m: &mut Zone, v| {
            m.name = v;
        })
        .existence(Existence::Required)
    }

    fn input() -> StringAttribute<Zone> {
        StringAttribute::new("Input policy", "input", |m: &Zone| &m.input, |m: &mut Zone, v| {
            m.input = v;
        })
        .existence(Existence::Required)
        .validator(one_of(&["ACCEPT", "REJECT", "DROP"]))
    }

    fn mtu() -> Int64Attribute<Zone> {
        Int64Attribute::new("MTU", "mtu", |m: &Zone| &m.mtu, |m: &mut Zone, v| m.mtu = v)
            .validator(between(576, 9000))
    }

    fn table() -> BindingTable<Zone> {
        BindingTable::builder("Firewall zone", "firewall", "zone")
            .id(id())
            .attribute("name", name())
            .attribute("input", input())
            .attribute("mtu", mtu())
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_rejects_duplicate_attribute() {
        let err = BindingTable::builder("t", "firewall", "zone")
            .id(id())
            .attribute("name", name())
            .attribute("name", input())
            .build()
            .err();
        assert_eq!(
            err,
            Some(TableError::DuplicateAttribute {
                name: "name".into()
            })
        );
    }

    #[test]
    fn test_build_rejects_duplicate_option() {
        let err = BindingTable::builder("t", "firewall", "zone")
            .id(id())
            .attribute("name", name())
            .attribute("label", name())
            .build()
            .err();
        assert_eq!(
            err,
            Some(TableError::DuplicateOption {
                option: "name".into()
            })
        );
    }

    #[test]
    fn test_build_requires_exactly_one_identifier() {
        let missing = BindingTable::<Zone>::builder("t", "firewall", "zone")
            .attribute("name", name())
            .build()
            .err();
        assert_eq!(missing, Some(TableError::MissingIdentifier));

        let twice = BindingTable::builder("t", "firewall", "zone")
            .id(id())
            .id(id())
            .build()
            .err();
        assert_eq!(twice, Some(TableError::MultipleIdentifiers));
    }

    #[test]
    fn test_build_reserves_id_name() {
        let err = BindingTable::builder("t", "firewall", "zone")
            .id(id())
            .attribute("id", name())
            .build()
            .err();
        assert_eq!(err, Some(TableError::ReservedName { name: "id".into() }));
    }

    #[test]
    fn test_validate_aggregates_across_attributes() {
        let model = Zone {
            name: Value::Absent,
            input: Value::from("ALLOW"),
            mtu: Value::Known(1),
            ..Default::default()
        };
        let Err(Error::Validation { violations }) = table().validate(&model) else {
            panic!("expected validation error");
        };
        let summary: Vec<_> = violations
            .iter()
            .map(|v| (v.attribute.as_str(), v.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("name", ViolationKind::Missing),
                ("input", ViolationKind::Invalid),
                ("mtu", ViolationKind::Invalid),
            ]
        );
    }

    #[test]
    fn test_upsert_then_read_round_trips() {
        let table = table();
        let model = Zone {
            id: Value::from("firewall.zone.lan"),
            name: Value::from("lan"),
            input: Value::from("ACCEPT"),
            mtu: Value::Known(1500),
        };
        let options = table.upsert_request(&model);
        assert!(!options.contains_key("id"));

        let mut read = Zone {
            id: model.id.clone(),
            ..Default::default()
        };
        table.read_response(&options, &mut read).unwrap();
        assert_eq!(read, model);
    }

    #[test]
    fn test_unset_options_lists_cleared_writable_options() {
        let table = table();
        let model = Zone {
            id: Value::from("firewall.zone.lan"),
            name: Value::from("lan"),
            input: Value::Unknown,
            mtu: Value::Absent,
        };
        assert_eq!(table.unset_options(&model), vec!["input", "mtu"]);

        let full = Zone {
            input: Value::from("DROP"),
            mtu: Value::Known(1500),
            ..model
        };
        assert!(table.unset_options(&full).is_empty());
    }

    #[test]
    fn test_resource_schema_includes_computed_id() {
        let schema = table().resource_schema();
        assert_eq!(schema.attributes.len(), 4);
        assert!(schema.attributes["id"].computed);
        assert!(schema.attributes["name"].required);
        assert!(schema.attributes["mtu"].optional);
    }

    #[test]
    fn test_data_source_schema_keys_on_id() {
        let schema = table().data_source_schema();
        assert!(schema.attributes["id"].required);
        assert!(schema.attributes["name"].computed);
        assert!(!schema.attributes["name"].required);
        assert!(schema.attributes["input"].validators.is_empty());
    }

    #[test]
    fn test_attribute_names_keep_declaration_order() {
        let table = table();
        assert_eq!(
            table.attribute_names().collect::<Vec<_>>(),
            vec!["name", "input", "mtu"]
        );
        assert_eq!(table.config(), "firewall");
        assert_eq!(table.section_type(), "zone");
    }
}
