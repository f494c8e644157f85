//! Resource types managed by the provider.
//!
//! Each module is pure data: a serde model, the binding table mapping its
//! fields to UCI options, and a handler constructor for the registry.

pub mod firewall_forwarding;
pub mod firewall_rule;
pub mod firewall_zone;
pub mod network_bridge_vlan;

use binding::{BindingTable, TableBuilder};

/// Firewall policies accepted for zone defaults and rule targets.
pub const ACTIONS: [&str; 3] = ["ACCEPT", "REJECT", "DROP"];

/// Build a table declared at compile time.
///
/// Panics with the resource type and the offending attribute if the
/// declaration is inconsistent; this only ever happens at startup.
pub fn finish<M: 'static>(type_name: &str, builder: TableBuilder<M>) -> BindingTable<M> {
    builder
        .build()
        .unwrap_or_else(|e| panic!("invalid binding table for {type_name}: {e}"))
}
