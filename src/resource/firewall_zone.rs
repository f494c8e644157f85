//! `openwrt_firewall_zone`: a firewall zone and its default policies.

use super::{ACTIONS, finish};
use binding::validator::{NotBlank, length_between, one_of};
use binding::{
    BindingTable, Existence, IdAttribute, ListStringAttribute, StringAttribute, TypedHandler,
    Value,
};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "openwrt_firewall_zone";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Zone {
    pub id: Value<String>,
    pub name: Value<String>,
    pub input: Value<String>,
    pub output: Value<String>,
    pub forward: Value<String>,
    pub network: Value<Vec<String>>,
}

fn policy(
    description: &str,
    option: &str,
    get: fn(&Zone) -> &Value<String>,
    set: fn(&mut Zone, Value<String>),
) -> StringAttribute<Zone> {
    StringAttribute::new(description, option, get, set)
        .existence(Existence::Required)
        .validator(one_of(&ACTIONS))
}

pub fn table() -> BindingTable<Zone> {
    finish(
        TYPE_NAME,
        BindingTable::builder("A firewall zone grouping networks.", "firewall", "zone")
            .id(IdAttribute::new(|m: &Zone| &m.id, |m: &mut Zone, v| m.id = v))
            .attribute(
                "name",
                StringAttribute::new(
                    "The name of the zone.",
                    "name",
                    |m: &Zone| &m.name,
                    |m: &mut Zone, v| m.name = v,
                )
                .existence(Existence::Required)
                .validator(NotBlank)
                .validator(length_between(1, 11)),
            )
            .attribute(
                "input",
                policy(
                    "Policy for traffic entering the zone.",
                    "input",
                    |m| &m.input,
                    |m, v| m.input = v,
                ),
            )
            .attribute(
                "output",
                policy(
                    "Policy for traffic leaving the zone.",
                    "output",
                    |m| &m.output,
                    |m, v| m.output = v,
                ),
            )
            .attribute(
                "forward",
                policy(
                    "Policy for traffic forwarded within the zone.",
                    "forward",
                    |m| &m.forward,
                    |m, v| m.forward = v,
                ),
            )
            .attribute(
                "network",
                ListStringAttribute::new(
                    "Interfaces attached to the zone.",
                    "network",
                    |m: &Zone| &m.network,
                    |m: &mut Zone, v| m.network = v,
                ),
            ),
    )
}

pub fn handler() -> TypedHandler<Zone> {
    TypedHandler::new(TYPE_NAME, table())
}
