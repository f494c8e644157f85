//! Host-facing adapters.
//!
//! The host drives resources through JSON documents, so it can hold every
//! resource type behind one trait object. [`TypedHandler`] bridges a typed
//! [`BindingTable`] to [`ResourceHandler`] and [`DataSourceHandler`]:
//! decode the document, run the lifecycle operation, encode the result.
//! Failures come back as [`Diagnostics`], never as panics.

use crate::diagnostics::{Diagnostic, Diagnostics, SUMMARY_NOT_FOUND};
use crate::error::Error;
use crate::lifecycle::{DataSource, DeleteOutcome, Resource};
use crate::schema::ResourceSchema;
use crate::table::BindingTable;
use lucirpc::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

const SUMMARY_INVALID_MODEL: &str = "Invalid resource model";

/// Outcome of one host call.
///
/// `state` is what the host should store; `None` means "nothing", either
/// because the section is gone or because the call failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub state: Option<Json>,
    pub diagnostics: Diagnostics,
}

impl Response {
    fn state(state: Json) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    fn diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }

    /// True when no error diagnostic was raised.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// A managed resource type as seen by the host.
pub trait ResourceHandler: Send + Sync {
    fn type_name(&self) -> &str;
    fn schema(&self) -> ResourceSchema;
    fn create(&self, client: &Client, planned: Json) -> Response;
    fn read(&self, client: &Client, state: Json) -> Response;
    fn update(&self, client: &Client, planned: Json) -> Response;
    fn delete(&self, client: &Client, state: Json) -> Response;
    fn import(&self, client: &Client, id: &str) -> Response;
}

/// A read-only data source type as seen by the host.
pub trait DataSourceHandler: Send + Sync {
    fn type_name(&self) -> &str;
    fn schema(&self) -> ResourceSchema;
    fn read(&self, client: &Client, lookup: Json) -> Response;
}

/// Handler for model type `M`, owning its binding table.
pub struct TypedHandler<M> {
    type_name: String,
    table: BindingTable<M>,
}

impl<M> TypedHandler<M>
where
    M: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    pub fn new(type_name: impl Into<String>, table: BindingTable<M>) -> Self {
        Self {
            type_name: type_name.into(),
            table,
        }
    }

    pub fn table(&self) -> &BindingTable<M> {
        &self.table
    }

    fn decode(&self, document: &Json) -> Result<M, Diagnostics> {
        serde_json::from_value(document.clone()).map_err(|e| {
            self.single(Diagnostic::error(&self.type_name, SUMMARY_INVALID_MODEL, e.to_string())
                .with_id(id_of(document)))
        })
    }

    fn respond(&self, id: Option<&str>, result: crate::error::Result<M>) -> Response {
        match result.map(|model| serde_json::to_value(&model)) {
            Ok(Ok(state)) => Response::state(state),
            Ok(Err(e)) => Response::diagnostics(self.single(
                Diagnostic::error(&self.type_name, SUMMARY_INVALID_MODEL, e.to_string())
                    .with_id(id),
            )),
            Err(e) => Response::diagnostics(self.translate(id, &e)),
        }
    }

    fn translate(&self, id: Option<&str>, error: &Error) -> Diagnostics {
        Diagnostics::from_error(&self.type_name, id, error)
    }

    fn single(&self, diagnostic: Diagnostic) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(diagnostic);
        diagnostics
    }

    fn resource<'a>(&'a self, client: &'a Client) -> Resource<'a, M> {
        Resource::new(&self.table, client)
    }
}

fn id_of(document: &Json) -> Option<&str> {
    document.get("id").and_then(Json::as_str)
}

impl<M> ResourceHandler for TypedHandler<M>
where
    M: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> ResourceSchema {
        self.table.resource_schema()
    }

    fn create(&self, client: &Client, planned: Json) -> Response {
        match self.decode(&planned) {
            Ok(model) => self.respond(None, self.resource(client).create(model)),
            Err(diagnostics) => Response::diagnostics(diagnostics),
        }
    }

    fn read(&self, client: &Client, state: Json) -> Response {
        let id = id_of(&state);
        let model = match self.decode(&state) {
            Ok(model) => model,
            Err(diagnostics) => return Response::diagnostics(diagnostics),
        };
        match self.resource(client).read(model) {
            Err(e) if e.is_not_found() => Response::default(),
            result => self.respond(id, result),
        }
    }

    fn update(&self, client: &Client, planned: Json) -> Response {
        let id = id_of(&planned);
        match self.decode(&planned) {
            Ok(model) => self.respond(id, self.resource(client).update(model)),
            Err(diagnostics) => Response::diagnostics(diagnostics),
        }
    }

    fn delete(&self, client: &Client, state: Json) -> Response {
        let id = id_of(&state);
        let model = match self.decode(&state) {
            Ok(model) => model,
            Err(diagnostics) => return Response::diagnostics(diagnostics),
        };
        match self.resource(client).delete(&model) {
            Ok(DeleteOutcome::Deleted) => Response::default(),
            Ok(DeleteOutcome::AlreadyAbsent) => Response::diagnostics(self.single(
                Diagnostic::warning(
                    &self.type_name,
                    SUMMARY_NOT_FOUND,
                    "section was already deleted",
                )
                .with_id(id),
            )),
            Err(e) => Response::diagnostics(self.translate(id, &e)),
        }
    }

    fn import(&self, client: &Client, id: &str) -> Response {
        self.respond(Some(id), self.resource(client).import(id))
    }
}

impl<M> DataSourceHandler for TypedHandler<M>
where
    M: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> ResourceSchema {
        self.table.data_source_schema()
    }

    fn read(&self, client: &Client, lookup: Json) -> Response {
        let id = id_of(&lookup);
        match self.decode(&lookup) {
            Ok(model) => self.respond(id, DataSource::new(&self.table, client).read(model)),
            Err(diagnostics) => Response::diagnostics(diagnostics),
        }
    }
}
