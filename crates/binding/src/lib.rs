//! # Binding
//!
//! Table-driven lifecycle for resources stored as UCI sections.
//!
//! Each resource type is declared once as a [`BindingTable`]: the config
//! and section type it lives in, the model field that carries its
//! identifier, and one attribute descriptor per option. The engine derives
//! create, read, update, delete and import from that table alone.
//!
//! ## Core Concepts
//!
//! - **Value**: a model field is `Known`, `Absent` or `Unknown`, never a
//!   zero value standing in for "unset"
//! - **Attribute**: ties a model field to a UCI option, with an existence
//!   policy and validators
//! - **BindingTable**: the full declaration of one resource type, checked
//!   once at startup
//! - **Resource / DataSource**: lifecycle operations over a table and a
//!   [`lucirpc::Client`]
//! - **Diagnostics**: host-facing translation of every error
//!
//! ## Example
//!
//! ```ignore
//! use binding::{BindingTable, Existence, IdAttribute, Resource, StringAttribute, Value};
//! use binding::validator::one_of;
//!
//! #[derive(Debug, Default)]
//! struct Forwarding {
//!     id: Value<String>,
//!     src: Value<String>,
//!     dest: Value<String>,
//! }
//!
//! let table = BindingTable::builder("Zone forwarding", "firewall", "forwarding")
//!     .id(IdAttribute::new(|m: &Forwarding| &m.id, |m, v| m.id = v))
//!     .attribute(
//!         "src",
//!         StringAttribute::new("Source zone", "src", |m: &Forwarding| &m.src, |m, v| m.src = v)
//!             .existence(Existence::Required),
//!     )
//!     .attribute(
//!         "dest",
//!         StringAttribute::new("Destination zone", "dest", |m: &Forwarding| &m.dest, |m, v| m.dest = v)
//!             .existence(Existence::Required),
//!     )
//!     .build()?;
//!
//! let created = Resource::new(&table, &client).create(Forwarding {
//!     src: "lan".into(),
//!     dest: "wan".into(),
//!     ..Default::default()
//! })?;
//! assert_eq!(created.id, Value::from("firewall.forwarding.@0"));
//! ```
//!
//! ## Host Boundary
//!
//! - [`ResourceHandler`]: lifecycle over JSON documents for one type
//! - [`DataSourceHandler`]: read-only lookup over JSON documents
//! - [`TypedHandler`]: implements both for any serde model with a table
//!
//! The engine never stores state and never retries; the host persists
//! state and the client owns the retry policy.

pub mod attribute;
pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod identity;
pub mod lifecycle;
pub mod schema;
pub mod table;
pub mod validator;
pub mod value;

pub use attribute::{
    Attribute, Existence, IdAttribute, Int64Attribute, ListStringAttribute, SchemaAttribute,
    StringAttribute,
};
pub use codec::{CodecError, OptionCodec, ValueKind};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Operation, Result, Violation, ViolationKind};
pub use host::{DataSourceHandler, ResourceHandler, Response, TypedHandler};
pub use identity::{IdentityManager, ResourceId};
pub use lifecycle::{DataSource, DeleteOutcome, Resource};
pub use schema::{AttributeSchema, ResourceSchema};
pub use table::{BindingTable, TableBuilder, TableError};
pub use value::Value;
