// ── Provider registry ──
//
// The provider owns every data source and resource by type name. Each entry
// point validates the user's config, runs the handler, then commits the
// staged state on success or discards it on failure.

use std::collections::BTreeMap;

use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::CoreError;
use crate::schema::SchemaMap;
use crate::session::ClientSession;
use crate::state::{ResourceData, State};
use crate::{data_sources, resources};

pub type HandlerFuture<'a> = BoxFuture<'a, Result<(), CoreError>>;

/// A read-only lookup of existing infrastructure.
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn schema(&self) -> SchemaMap;

    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a>;
}

/// A managed object with a full create/read/update/delete lifecycle.
pub trait Resource: Send + Sync {
    fn name(&self) -> &'static str;

    fn schema(&self) -> SchemaMap;

    fn create<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a>;

    /// Refresh from the server. Clearing the id reports the object gone.
    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a>;

    fn update<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a>;

    fn delete<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a>;
}

/// Every schema the provider exposes, keyed by type name.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchemas {
    pub data_sources: BTreeMap<&'static str, SchemaMap>,
    pub resources: BTreeMap<&'static str, SchemaMap>,
}

pub struct Provider {
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        let data_sources = data_sources::all()
            .into_iter()
            .map(|ds| (ds.name(), ds))
            .collect();
        let resources = resources::all()
            .into_iter()
            .map(|r| (r.name(), r))
            .collect();
        Self {
            data_sources,
            resources,
        }
    }

    pub fn schemas(&self) -> ProviderSchemas {
        ProviderSchemas {
            data_sources: self
                .data_sources
                .iter()
                .map(|(name, ds)| (*name, ds.schema()))
                .collect(),
            resources: self
                .resources
                .iter()
                .map(|(name, r)| (*name, r.schema()))
                .collect(),
        }
    }

    pub fn data_source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn data_source_schema(&self, name: &str) -> Option<SchemaMap> {
        self.data_sources.get(name).map(|ds| ds.schema())
    }

    pub fn resource_schema(&self, name: &str) -> Option<SchemaMap> {
        self.resources.get(name).map(|r| r.schema())
    }

    fn data_source(&self, name: &str) -> Result<&dyn DataSource, CoreError> {
        self.data_sources
            .get(name)
            .map(|b| &**b)
            .ok_or_else(|| unsupported("data source", name))
    }

    fn resource(&self, name: &str) -> Result<&dyn Resource, CoreError> {
        self.resources
            .get(name)
            .map(|b| &**b)
            .ok_or_else(|| unsupported("resource", name))
    }

    // ── Data sources ─────────────────────────────────────────────────

    pub async fn read_data_source(
        &self,
        session: &ClientSession,
        name: &str,
        config: Map<String, Value>,
    ) -> Result<State, CoreError> {
        let ds = self.data_source(name)?;
        let mut data = ResourceData::new(ds.schema(), config)?;
        debug!(data_source = name, "read");

        let result = ds.read(session, &mut data).await;
        finish(&mut data, result)?;
        data.state()
            .ok_or_else(|| CoreError::Internal(format!("{name} read did not set an id")))
    }

    // ── Resources ────────────────────────────────────────────────────

    pub async fn create_resource(
        &self,
        session: &ClientSession,
        name: &str,
        config: Map<String, Value>,
    ) -> Result<State, CoreError> {
        let res = self.resource(name)?;
        let mut data = ResourceData::new(res.schema(), config)?;
        debug!(resource = name, "create");

        let result = res.create(session, &mut data).await;
        finish(&mut data, result)?;
        data.state()
            .ok_or_else(|| CoreError::Internal(format!("{name} create did not set an id")))
    }

    /// `Ok(None)` when the object no longer exists.
    pub async fn read_resource(
        &self,
        session: &ClientSession,
        name: &str,
        id: &str,
        prior: Map<String, Value>,
    ) -> Result<Option<State>, CoreError> {
        let res = self.resource(name)?;
        let mut data = ResourceData::existing(res.schema(), id, prior, Map::new())?;
        debug!(resource = name, id, "read");

        let result = res.read(session, &mut data).await;
        finish(&mut data, result)?;
        Ok(data.state())
    }

    pub async fn update_resource(
        &self,
        session: &ClientSession,
        name: &str,
        id: &str,
        config: Map<String, Value>,
        prior: Map<String, Value>,
    ) -> Result<State, CoreError> {
        let res = self.resource(name)?;
        let mut data = ResourceData::existing(res.schema(), id, prior, config)?;
        debug!(resource = name, id, "update");

        let result = res.update(session, &mut data).await;
        finish(&mut data, result)?;
        data.state().ok_or_else(|| CoreError::NotFound {
            entity_type: "Resource",
            name: id.to_owned(),
        })
    }

    pub async fn delete_resource(
        &self,
        session: &ClientSession,
        name: &str,
        id: &str,
        prior: Map<String, Value>,
    ) -> Result<(), CoreError> {
        let res = self.resource(name)?;
        let mut data = ResourceData::existing(res.schema(), id, prior, Map::new())?;
        debug!(resource = name, id, "delete");

        let result = res.delete(session, &mut data).await;
        finish(&mut data, result)
    }
}

fn unsupported(kind: &str, name: &str) -> CoreError {
    CoreError::ValidationFailed {
        message: format!("{kind} {name:?} is not supported by this provider"),
    }
}

/// Commit on success, discard on failure.
fn finish(data: &mut ResourceData, result: Result<(), CoreError>) -> Result<(), CoreError> {
    match result {
        Ok(()) => {
            data.commit();
            Ok(())
        }
        Err(e) => {
            data.discard();
            Err(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_type() {
        let provider = Provider::new();
        assert_eq!(
            provider.data_source_names().collect::<Vec<_>>(),
            vec![
                "ibm_cbr_account_settings",
                "ibm_cbr_rule",
                "ibm_cbr_zone",
                "ibm_is_instance_network_interface",
                "ibm_schematics_state",
            ]
        );
        assert_eq!(
            provider.resource_names().collect::<Vec<_>>(),
            vec!["ibm_cbr_rule", "ibm_cbr_zone"]
        );
    }

    #[test]
    fn schemas_mark_inputs() {
        let schemas = Provider::new().schemas();
        let nic = &schemas.data_sources["ibm_is_instance_network_interface"];
        assert!(nic["instance_name"].required);
        assert!(nic["network_interface_name"].required);
        assert!(nic["floating_ips"].computed);

        let zone = &schemas.resources["ibm_cbr_zone"];
        assert!(zone["addresses"].required);
        assert!(zone["etag"].computed);
    }

    #[test]
    fn data_source_and_resource_share_names() {
        let provider = Provider::new();
        let ds = provider.data_source_schema("ibm_cbr_zone").unwrap();
        let res = provider.resource_schema("ibm_cbr_zone").unwrap();
        assert!(ds["zone_id"].required);
        assert!(!res.contains_key("zone_id"));
        assert!(provider.resource_schema("ibm_schematics_state").is_none());
    }
}
