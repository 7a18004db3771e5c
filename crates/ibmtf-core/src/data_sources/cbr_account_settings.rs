// ibm_cbr_account_settings: per-account CBR quotas.

use tracing::debug;

use ibmtf_api::cbr::GetAccountSettingsOptions;

use crate::error::CoreError;
use crate::provider::{DataSource, HandlerFuture};
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::session::ClientSession;
use crate::state::ResourceData;

pub struct CbrAccountSettings;

impl DataSource for CbrAccountSettings {
    fn name(&self) -> &'static str {
        "ibm_cbr_account_settings"
    }

    fn schema(&self) -> SchemaMap {
        let computed = |ty, desc| Schema::computed(ty).describe(desc);
        SchemaMap::from([
            (
                "account_id",
                Schema::required(ValueType::String).describe("The ID of the account."),
            ),
            ("crn", computed(ValueType::String, "The CRN of the account settings.")),
            ("href", computed(ValueType::String, "The API URL of the settings.")),
            ("rule_count_limit", computed(ValueType::Int, "The maximum number of rules.")),
            ("zone_count_limit", computed(ValueType::Int, "The maximum number of zones.")),
            ("current_rule_count", computed(ValueType::Int, "The current number of rules.")),
            ("current_zone_count", computed(ValueType::Int, "The current number of zones.")),
            ("created_at", computed(ValueType::String, "The time the settings were created.")),
            ("created_by_id", computed(ValueType::String, "IAM ID of the creator.")),
            (
                "last_modified_at",
                computed(ValueType::String, "The last time the settings were modified."),
            ),
            (
                "last_modified_by_id",
                computed(ValueType::String, "IAM ID of the last modifier."),
            ),
        ])
    }

    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let account_id = data.require_str("account_id")?.to_owned();
            debug!(account_id = %account_id, "reading account settings");

            let settings = session
                .cbr()
                .get_account_settings(&GetAccountSettingsOptions::new(&account_id))
                .await
                .map_err(|e| CoreError::api_context("GetAccountSettings failed", e))?
                .into_result();

            data.set_id(settings.id.clone());
            data.set("crn", &settings.crn)?;
            data.set("href", &settings.href)?;
            data.set("rule_count_limit", settings.rule_count_limit)?;
            data.set("zone_count_limit", settings.zone_count_limit)?;
            data.set("current_rule_count", settings.current_rule_count)?;
            data.set("current_zone_count", settings.current_zone_count)?;
            data.set("created_at", &settings.created_at)?;
            data.set("created_by_id", &settings.created_by_id)?;
            data.set("last_modified_at", &settings.last_modified_at)?;
            data.set("last_modified_by_id", &settings.last_modified_by_id)?;
            Ok(())
        })
    }
}
