//! `openwrt_firewall_forwarding`: traffic forwarding between two zones.

use super::finish;
use binding::validator::NotBlank;
use binding::{BindingTable, Existence, IdAttribute, StringAttribute, TypedHandler, Value};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "openwrt_firewall_forwarding";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Forwarding {
    pub id: Value<String>,
    pub src: Value<String>,
    pub dest: Value<String>,
}

pub fn table() -> BindingTable<Forwarding> {
    finish(
        TYPE_NAME,
        BindingTable::builder(
            "Allows traffic to flow from one firewall zone to another.",
            "firewall",
            "forwarding",
        )
        .id(IdAttribute::new(
            |m: &Forwarding| &m.id,
            |m: &mut Forwarding, v| m.id = v,
        ))
        .attribute(
            "src",
            StringAttribute::new(
                "Name of the zone traffic originates from.",
                "src",
                |m: &Forwarding| &m.src,
                |m: &mut Forwarding, v| m.src = v,
            )
            .existence(Existence::Required)
            .validator(NotBlank),
        )
        .attribute(
            "dest",
            StringAttribute::new(
                "Name of the zone traffic is forwarded to.",
                "dest",
                |m: &Forwarding| &m.dest,
                |m: &mut Forwarding, v| m.dest = v,
            )
            .existence(Existence::Required)
            .validator(NotBlank),
        ),
    )
}

pub fn handler() -> TypedHandler<Forwarding> {
    TypedHandler::new(TYPE_NAME, table())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let table = table();
        assert_eq!(table.config(), "firewall");
        assert_eq!(table.section_type(), "forwarding");
        assert_eq!(table.attribute_names().collect::<Vec<_>>(), vec!["src", "dest"]);
    }

    #[test]
    fn test_blank_zone_rejected() {
        let model = Forwarding {
            src: Value::from(" "),
            dest: Value::from("wan"),
            ..Default::default()
        };
        assert!(table().validate(&model).is_err());
    }
}
