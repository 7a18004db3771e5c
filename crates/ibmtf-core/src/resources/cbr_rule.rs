// ibm_cbr_rule (resource): context-based restriction rules.

use tracing::{debug, info};

use ibmtf_api::DetailedResponse;
use ibmtf_api::cbr::{
    CreateRuleOptions, DeleteRuleOptions, GetRuleOptions, ReplaceRuleOptions,
    Resource as CbrResource, Rule, RuleContext,
};

use super::{list_input, pick_etag, with_etag};
use crate::cbr::{Mode, rule_schema, set_rule};
use crate::error::CoreError;
use crate::flatten::{expand_resources, expand_rule_contexts};
use crate::provider::{HandlerFuture, Resource};
use crate::schema::SchemaMap;
use crate::session::ClientSession;
use crate::state::ResourceData;

pub struct CbrRule;

fn inputs(
    data: &ResourceData,
) -> Result<(Option<String>, Vec<RuleContext>, Vec<CbrResource>), CoreError> {
    Ok((
        data.config_str("description").map(str::to_owned),
        expand_rule_contexts(list_input(data, "contexts"))?,
        expand_resources(list_input(data, "resources"))?,
    ))
}

fn record(data: &mut ResourceData, resp: &DetailedResponse<Rule>) -> Result<(), CoreError> {
    set_rule(data, &resp.result)?;
    if let Some(etag) = resp.etag() {
        data.set("etag", etag)?;
    }
    Ok(())
}

impl Resource for CbrRule {
    fn name(&self) -> &'static str {
        "ibm_cbr_rule"
    }

    fn schema(&self) -> SchemaMap {
        with_etag(rule_schema(Mode::Input))
    }

    fn create<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let (description, contexts, resources) = inputs(data)?;
            let opts = CreateRuleOptions {
                description,
                contexts: Some(contexts),
                resources: Some(resources),
                ..CreateRuleOptions::default()
            };

            let resp = session
                .cbr()
                .create_rule(&opts)
                .await
                .map_err(|e| CoreError::api_context("CreateRule failed", e))?;
            info!(rule_id = %resp.result.id, "rule created");

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
            let rule_id = data.id().unwrap_or_default().to_owned();
            match session.cbr().get_rule(&GetRuleOptions::new(&rule_id)).await {
                Ok(resp) => record(data, &resp),
                Err(e) if e.is_not_found() => {
                    debug!(rule_id = %rule_id, "rule gone, dropping from state");
                    data.set_id("");
                    Ok(())
                }
                Err(e) => Err(CoreError::api_context("GetRule failed", e)),
            }
        })
    }

    fn update<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let rule_id = data.id().unwrap_or_default().to_owned();
            let current = session
                .cbr()
                .get_rule(&GetRuleOptions::new(&rule_id))
                .await
                .map_err(|e| CoreError::api_context("GetRule failed", e))?;
            let if_match = pick_etag(current.etag(), data)?;

            let (description, contexts, resources) = inputs(data)?;
            let mut opts = ReplaceRuleOptions::new(&rule_id, if_match);
            opts.description = description;
            opts.contexts = Some(contexts);
            opts.resources = Some(resources);

            let resp = session
                .cbr()
                .replace_rule(&opts)
                .await
                .map_err(|e| CoreError::api_context("ReplaceRule failed", e))?;
            info!(rule_id = %rule_id, "rule replaced");
            record(data, &resp)
        })
    }

    fn delete<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let rule_id = data.id().unwrap_or_default().to_owned();
            match session
                .cbr()
                .delete_rule(&DeleteRuleOptions::new(&rule_id))
                .await
            {
                Ok(_) => info!(rule_id = %rule_id, "rule deleted"),
                Err(e) if e.is_not_found() => debug!(rule_id = %rule_id, "rule already gone"),
                Err(e) => return Err(CoreError::api_context("DeleteRule failed", e)),
            }
            data.set_id("");
            Ok(())
        })
    }
}
