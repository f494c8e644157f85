//! Lifecycle orchestration.
//!
//! [`Resource`] implements create, read, update, delete and import for any
//! model type with a [`BindingTable`]; [`DataSource`] implements the single
//! read of a read-only lookup. Every operation validates before its first
//! remote call, so a rejected model never causes a partial write. Remote
//! failures are wrapped with the operation and identifier and returned
//! as-is; retrying is the client's business.

use crate::error::{Error, Operation, Result};
use crate::table::BindingTable;
use crate::value::Value;
use log::{debug, info, warn};
use lucirpc::{Client, SectionId};

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The section existed and was removed
    Deleted,
    /// There was nothing to remove
    AlreadyAbsent,
}

/// Lifecycle operations for a managed resource type.
pub struct Resource<'a, M> {
    table: &'a BindingTable<M>,
    client: &'a Client,
}

impl<'a, M> Resource<'a, M> {
    pub fn new(table: &'a BindingTable<M>, client: &'a Client) -> Self {
        Self { table, client }
    }

    /// Create a new section from the planned model.
    ///
    /// The section is appended anonymously, so the assigned identifier is
    /// ordinal (`<config>.<type>.@<n>`). The returned model reflects what
    /// the device reports after the write. If the write or the read-back
    /// fails, the added section is removed again and the error carries the
    /// identifier it had.
    pub fn create(&self, mut model: M) -> Result<M> {
        self.table.validate(&model)?;
        let options = self.table.upsert_request(&model);
        let (config, section_type) = (self.table.config(), self.table.section_type());

        debug!("create: adding {config}.{section_type}");
        let ordinal = self
            .client
            .add(config, section_type)
            .map_err(|e| Error::remote(Operation::Create, None, e))?;
        let section = SectionId::Ordinal(ordinal);
        let id = self.table.identity().synthesize(section.clone());

        debug!("create: writing {} option(s) to {id}", options.len());
        if let Err(e) = self.client.set(config, section_type, &section, &options, &[]) {
            self.discard(&id, &section);
            return Err(Error::remote(Operation::Create, Some(&id), e));
        }

        self.table.assign_id(&mut model, id.clone());
        if let Err(e) = fetch(self.table, self.client, Operation::Create, &id, &section, &mut model) {
            self.discard(&id, &section);
            return Err(e);
        }
        info!("created {id}");
        Ok(model)
    }

    /// Refresh a model from its section.
    ///
    /// Returns [`Error::NotFound`] when the section is gone; the host should
    /// drop the resource from its state.
    pub fn read(&self, mut model: M) -> Result<M> {
        let (id, section) = self.locate(&model)?;
        fetch(self.table, self.client, Operation::Read, &id, &section, &mut model)?;
        Ok(model)
    }

    /// Write every writable attribute of the planned model to its section.
    ///
    /// Writable attributes that are absent or unknown in the plan have their
    /// options removed. Options no attribute maps are left alone.
    pub fn update(&self, mut model: M) -> Result<M> {
        let (id, section) = self.locate(&model)?;
        self.table.validate(&model)?;
        let options = self.table.upsert_request(&model);
        let unset = self.table.unset_options(&model);

        debug!(
            "update: writing {} option(s) to {id}, removing {}",
            options.len(),
            unset.len()
        );
        self.client
            .set(self.table.config(), self.table.section_type(), &section, &options, &unset)
            .map_err(|e| Error::remote(Operation::Update, Some(&id), e))?;

        fetch(self.table, self.client, Operation::Update, &id, &section, &mut model)?;
        info!("updated {id}");
        Ok(model)
    }

    /// Remove the section. A section that is already gone counts as deleted.
    pub fn delete(&self, model: &M) -> Result<DeleteOutcome> {
        let (id, section) = self.locate(model)?;

        debug!("delete: removing {id}");
        match self
            .client
            .delete(self.table.config(), self.table.section_type(), &section)
        {
            Ok(()) => {
                info!("deleted {id}");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.is_not_found() => {
                warn!("delete: {id} does not exist, nothing to do");
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(e) => Err(Error::remote(Operation::Delete, Some(&id), e)),
        }
    }

    fn locate(&self, model: &M) -> Result<(String, SectionId)> {
        locate(self.table, model)
    }

    /// Remove a section added by a create that did not complete.
    fn discard(&self, id: &str, section: &SectionId) {
        debug!("create: removing incomplete {id}");
        if let Err(e) = self
            .client
            .delete(self.table.config(), self.table.section_type(), section)
        {
            warn!("create: {id} was added but could not be removed again: {e}");
        }
    }
}

impl<M: Default> Resource<'_, M> {
    /// Build a model from nothing but an identifier.
    pub fn import(&self, id: &str) -> Result<M> {
        let section = self.table.identity().parse(id)?;
        let mut model = M::default();
        self.table.assign_id(&mut model, id.to_string());
        fetch(self.table, self.client, Operation::Import, id, &section, &mut model)?;
        info!("imported {id}");
        Ok(model)
    }
}

/// Read-only lookup of a section by identifier.
pub struct DataSource<'a, M> {
    table: &'a BindingTable<M>,
    client: &'a Client,
}

impl<'a, M> DataSource<'a, M> {
    pub fn new(table: &'a BindingTable<M>, client: &'a Client) -> Self {
        Self { table, client }
    }

    /// Fill every attribute of `lookup` from the section its identifier
    /// names. The identifier itself is left as supplied.
    pub fn read(&self, mut lookup: M) -> Result<M> {
        let (id, section) = locate(self.table, &lookup)?;
        fetch(
            self.table,
            self.client,
            Operation::DataSourceRead,
            &id,
            &section,
            &mut lookup,
        )?;
        Ok(lookup)
    }
}

fn locate<M>(table: &BindingTable<M>, model: &M) -> Result<(String, SectionId)> {
    match table.id_value(model) {
        Value::Known(id) => Ok((id.clone(), table.identity().parse(id)?)),
        Value::Absent => Err(Error::malformed("", "identifier is not set")),
        Value::Unknown => Err(Error::malformed("", "identifier is not known yet")),
    }
}

fn fetch<M>(
    table: &BindingTable<M>,
    client: &Client,
    operation: Operation,
    id: &str,
    section: &SectionId,
    model: &mut M,
) -> Result<()> {
    debug!("{operation}: reading {id}");
    let options = client
        .get(table.config(), table.section_type(), section)
        .map_err(|e| Error::remote(operation, Some(id), e))?;
    table.read_response(&options, model)
}
