//! `openwrt_network_bridge_vlan`: VLAN filtering on a Linux bridge (DSA).

use super::finish;
use binding::validator::{NotBlank, between, each_matches, size_at_least};
use binding::{
    BindingTable, Existence, IdAttribute, Int64Attribute, ListStringAttribute, StringAttribute,
    TypedHandler, Value,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "openwrt_network_bridge_vlan";

/// A bridge port, optionally followed by `:` and any of `t` (tagged),
/// `u` (untagged) and `*` (PVID). The legacy swconfig spelling `3t` is a
/// plain name under this pattern.
const PORT_PATTERN: &str = r"^[0-9A-Za-z_.-]+(:[tu*]+)?$";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeVlan {
    pub id: Value<String>,
    pub device: Value<String>,
    pub vlan: Value<i64>,
    pub ports: Value<Vec<String>>,
}

pub fn table() -> BindingTable<BridgeVlan> {
    let port = Regex::new(PORT_PATTERN).expect("port pattern should compile");

    finish(
        TYPE_NAME,
        BindingTable::builder("VLAN configuration of a bridge device.", "network", "bridge-vlan")
            .id(IdAttribute::new(
                |m: &BridgeVlan| &m.id,
                |m: &mut BridgeVlan, v| m.id = v,
            ))
            .attribute(
                "device",
                StringAttribute::new(
                    "The bridge device to configure, e.g. br-lan.",
                    "device",
                    |m: &BridgeVlan| &m.device,
                    |m: &mut BridgeVlan, v| m.device = v,
                )
                .existence(Existence::Required)
                .validator(NotBlank),
            )
            .attribute(
                "vlan",
                Int64Attribute::new(
                    "The VLAN id.",
                    "vlan",
                    |m: &BridgeVlan| &m.vlan,
                    |m: &mut BridgeVlan, v| m.vlan = v,
                )
                .existence(Existence::Required)
                .validator(between(1, 4094)),
            )
            .attribute(
                "ports",
                ListStringAttribute::new(
                    "Bridge ports that are members of the VLAN, e.g. lan1:u* or lan2:t.",
                    "ports",
                    |m: &BridgeVlan| &m.ports,
                    |m: &mut BridgeVlan, v| m.ports = v,
                )
                .existence(Existence::Required)
                .validator(size_at_least(1))
                .validator(each_matches(
                    port,
                    "must be a port name optionally followed by :t, :u or :*",
                )),
            ),
    )
}

pub fn handler() -> TypedHandler<BridgeVlan> {
    TypedHandler::new(TYPE_NAME, table())
}
