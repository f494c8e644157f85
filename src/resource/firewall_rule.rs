//! `openwrt_firewall_rule`: a traffic rule between two zones.

use super::{ACTIONS, finish};
use binding::validator::{NotBlank, one_of};
use binding::{
    BindingTable, Existence, IdAttribute, ListStringAttribute, StringAttribute, TypedHandler,
    Value,
};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "openwrt_firewall_rule";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rule {
    pub id: Value<String>,
    pub name: Value<String>,
    pub src: Value<String>,
    pub dest: Value<String>,
    pub target: Value<String>,
    pub proto: Value<Vec<String>>,
    pub dest_port: Value<String>,
}

fn required(
    description: &str,
    option: &str,
    get: fn(&Rule) -> &Value<String>,
    set: fn(&mut Rule, Value<String>),
) -> StringAttribute<Rule> {
    StringAttribute::new(description, option, get, set)
        .existence(Existence::Required)
        .validator(NotBlank)
}

pub fn table() -> BindingTable<Rule> {
    finish(
        TYPE_NAME,
        BindingTable::builder("A firewall traffic rule.", "firewall", "rule")
            .id(IdAttribute::new(|m: &Rule| &m.id, |m: &mut Rule, v| m.id = v))
            .attribute(
                "name",
                required("Name of the rule.", "name", |m| &m.name, |m, v| m.name = v),
            )
            .attribute(
                "src",
                required("Zone the traffic comes from.", "src", |m| &m.src, |m, v| m.src = v),
            )
            .attribute(
                "dest",
                required("Zone the traffic goes to.", "dest", |m| &m.dest, |m, v| m.dest = v),
            )
            .attribute(
                "target",
                StringAttribute::new(
                    "Action taken on matching traffic.",
                    "target",
                    |m: &Rule| &m.target,
                    |m: &mut Rule, v| m.target = v,
                )
                .existence(Existence::Required)
                .validator(one_of(&ACTIONS)),
            )
            .attribute(
                "proto",
                ListStringAttribute::new(
                    "Protocols the rule matches, e.g. tcp or udp.",
                    "proto",
                    |m: &Rule| &m.proto,
                    |m: &mut Rule, v| m.proto = v,
                ),
            )
            .attribute(
                "dest_port",
                StringAttribute::new(
                    "Destination port or port range, e.g. 22 or 8000-8080.",
                    "dest_port",
                    |m: &Rule| &m.dest_port,
                    |m: &mut Rule, v| m.dest_port = v,
                )
                .validator(NotBlank),
            ),
    )
}

pub fn handler() -> TypedHandler<Rule> {
    TypedHandler::new(TYPE_NAME, table())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lives_in_rule_sections() {
        let table = table();
        assert_eq!(table.config(), "firewall");
        assert_eq!(table.section_type(), "rule");
    }

    #[test]
    fn test_optional_options_are_omitted() {
        let rule = Rule {
            name: Value::from("Allow-SSH"),
            src: Value::from("wan"),
            dest: Value::from("lan"),
            target: Value::from("ACCEPT"),
            ..Default::default()
        };
        let table = table();
        assert!(table.validate(&rule).is_ok());

        let options = table.upsert_request(&rule);
        assert_eq!(
            options.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["dest", "name", "src", "target"]
        );
    }
}
