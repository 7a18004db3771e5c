// ibm_cbr_zone (data source): read a zone by ID.

use tracing::debug;

use ibmtf_api::cbr::GetZoneOptions;

use crate::cbr::{Mode, set_zone, zone_schema};
use crate::error::CoreError;
use crate::provider::{DataSource, HandlerFuture};
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::session::ClientSession;
use crate::state::ResourceData;

pub struct CbrZone;

impl DataSource for CbrZone {
    fn name(&self) -> &'static str {
        "ibm_cbr_zone"
    }

    fn schema(&self) -> SchemaMap {
        let mut schema = zone_schema(Mode::Computed);
        schema.insert(
            "zone_id",
            Schema::required(ValueType::String).describe("The ID of the zone."),
        );
        schema
    }

    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let zone_id = data.require_str("zone_id")?.to_owned();
            debug!(zone_id = %zone_id, "reading zone");

            let zone = session
                .cbr()
                .get_zone(&GetZoneOptions::new(&zone_id))
                .await
                .map_err(|e| CoreError::api_context("GetZone failed", e))?
                .into_result();

            data.set_id(zone.id.clone());
            set_zone(data, &zone)
        })
    }
}
