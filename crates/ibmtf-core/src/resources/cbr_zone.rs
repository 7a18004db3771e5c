// ibm_cbr_zone (resource): network zones for context-based restrictions.

use tracing::{debug, info};

use ibmtf_api::DetailedResponse;
use ibmtf_api::cbr::{
    Address, CreateZoneOptions, DeleteZoneOptions, GetZoneOptions, ReplaceZoneOptions, Zone,
};

use super::{list_input, pick_etag, with_etag};
use crate::cbr::{Mode, set_zone, zone_schema};
use crate::error::CoreError;
use crate::flatten::expand_addresses;
use crate::provider::{HandlerFuture, Resource};
use crate::schema::SchemaMap;
use crate::session::ClientSession;
use crate::state::ResourceData;

pub struct CbrZone;

/// Inputs shared by create and replace.
struct ZoneInputs {
    name: Option<String>,
    account_id: Option<String>,
    description: Option<String>,
    addresses: Vec<Address>,
    excluded: Option<Vec<Address>>,
}

impl ZoneInputs {
    fn from_data(data: &ResourceData) -> Result<Self, CoreError> {
        let addresses = expand_addresses(list_input(data, "addresses"), "addresses")?;
        let excluded = match data.config_list("excluded") {
            Some(items) => Some(expand_addresses(items, "excluded")?),
            None => None,
        };
        Ok(Self {
            name: data.config_str("name").map(str::to_owned),
            account_id: data.config_str("account_id").map(str::to_owned),
            description: data.config_str("description").map(str::to_owned),
            addresses,
            excluded,
        })
    }
}

fn record(data: &mut ResourceData, resp: &DetailedResponse<Zone>) -> Result<(), CoreError> {
    set_zone(data, &resp.result)?;
    if let Some(etag) = resp.etag() {
        data.set("etag", etag)?;
    }
    Ok(())
}

impl Resource for CbrZone {
    fn name(&self) -> &'static str {
        "ibm_cbr_zone"
    }

    fn schema(&self) -> SchemaMap {
        with_etag(zone_schema(Mode::Input))
    }

    fn create<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let inputs = ZoneInputs::from_data(data)?;
            let opts = CreateZoneOptions {
                name: inputs.name,
                account_id: inputs.account_id,
                description: inputs.description,
                addresses: Some(inputs.addresses),
                excluded: inputs.excluded,
                ..CreateZoneOptions::default()
            };

            let resp = session
                .cbr()
                .create_zone(&opts)
                .await
                .map_err(|e| CoreError::api_context("CreateZone failed", e))?;
            info!(zone_id = %resp.result.id, "zone created");

            data.set_id(resp.result.id.clone());
            record(data, &resp)
        })
    }

    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let zone_id = data.id().unwrap_or_default().to_owned();
            match session.cbr().get_zone(&GetZoneOptions::new(&zone_id)).await {
                Ok(resp) => record(data, &resp),
                Err(e) if e.is_not_found() => {
                    debug!(zone_id = %zone_id, "zone gone, dropping from state");
                    data.set_id("");
                    Ok(())
                }
                Err(e) => Err(CoreError::api_context("GetZone failed", e)),
            }
        })
    }

    fn update<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let zone_id = data.id().unwrap_or_default().to_owned();
            let current = session
                .cbr()
                .get_zone(&GetZoneOptions::new(&zone_id))
                .await
                .map_err(|e| CoreError::api_context("GetZone failed", e))?;
            let if_match = pick_etag(current.etag(), data)?;

            let inputs = ZoneInputs::from_data(data)?;
            let mut opts = ReplaceZoneOptions::new(&zone_id, if_match);
            opts.name = inputs.name;
            opts.account_id = inputs.account_id;
            opts.description = inputs.description;
            opts.addresses = Some(inputs.addresses);
            opts.excluded = inputs.excluded;

            let resp = session
                .cbr()
                .replace_zone(&opts)
                .await
                .map_err(|e| CoreError::api_context("ReplaceZone failed", e))?;
            info!(zone_id = %zone_id, "zone replaced");
            record(data, &resp)
        })
    }

    fn delete<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let zone_id = data.id().unwrap_or_default().to_owned();
            match session
                .cbr()
                .delete_zone(&DeleteZoneOptions::new(&zone_id))
                .await
            {
                Ok(_) => info!(zone_id = %zone_id, "zone deleted"),
                Err(e) if e.is_not_found() => debug!(zone_id = %zone_id, "zone already gone"),
                Err(e) => return Err(CoreError::api_context("DeleteZone failed", e)),
            }
            data.set_id("");
            Ok(())
        })
    }
}
