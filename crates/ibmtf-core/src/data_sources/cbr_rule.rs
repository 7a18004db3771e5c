// ibm_cbr_rule (data source): read a rule by ID.

use tracing::debug;

use ibmtf_api::cbr::GetRuleOptions;

use crate::cbr::{Mode, rule_schema, set_rule};
use crate::error::CoreError;
use crate::provider::{DataSource, HandlerFuture};
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::session::ClientSession;
use crate::state::ResourceData;

pub struct CbrRule;

impl DataSource for CbrRule {
    fn name(&self) -> &'static str {
        "ibm_cbr_rule"
    }

    fn schema(&self) -> SchemaMap {
        let mut schema = rule_schema(Mode::Computed);
        schema.insert(
            "rule_id",
            Schema::required(ValueType::String).describe("The ID of the rule."),
        );
        schema
    }

    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let rule_id = data.require_str("rule_id")?.to_owned();
            debug!(rule_id = %rule_id, "reading rule");

            let rule = session
                .cbr()
                .get_rule(&GetRuleOptions::new(&rule_id))
                .await
                .map_err(|e| CoreError::api_context("GetRule failed", e))?
                .into_result();

            data.set_id(rule.id.clone());
            set_rule(data, &rule)
        })
    }
}
