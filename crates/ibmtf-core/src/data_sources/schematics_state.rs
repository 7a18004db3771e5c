// ibm_schematics_state: the Terraform state of one template in a
// Schematics workspace.

use chrono::Utc;
use tracing::debug;

use ibmtf_api::schematics::GetWorkspaceTemplateStateOptions;

use crate::error::CoreError;
use crate::provider::{DataSource, HandlerFuture};
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::session::ClientSession;
use crate::state::ResourceData;

pub struct SchematicsState;

impl DataSource for SchematicsState {
    fn name(&self) -> &'static str {
        "ibm_schematics_state"
    }

    fn schema(&self) -> SchemaMap {
        SchemaMap::from([
            (
                "workspace_id",
                Schema::required(ValueType::String)
                    .describe("The ID of the workspace holding the template."),
            ),
            (
                "template_id",
                Schema::required(ValueType::String)
                    .describe("The template_data.id of the Terraform template in the workspace."),
            ),
            (
                "state_store",
                Schema::computed(ValueType::String).describe("The state, as compact JSON."),
            ),
            (
                "state_store_json",
                Schema::computed(ValueType::String).describe("The state, as indented JSON."),
            ),
            (
                "resource_controller_url",
                Schema::computed(ValueType::String)
                    .describe("The IBM Cloud dashboard URL for exploring this workspace."),
            ),
        ])
    }

    fn read<'a>(
        &'a self,
        session: &'a ClientSession,
        data: &'a mut ResourceData,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let opts = GetWorkspaceTemplateStateOptions::new(
                data.require_str("workspace_id")?,
                data.require_str("template_id")?,
            );
            debug!(workspace_id = %opts.w_id, template_id = %opts.t_id, "reading template state");

            let resp = session
                .schematics()
                .get_workspace_template_state(&opts)
                .await
                .map_err(|e| CoreError::api_context("GetWorkspaceTemplateState failed", e))?;

            if resp.status != 200 {
                return Err(CoreError::Api {
                    message: format!(
                        "GetWorkspaceTemplateState failed: unexpected status {}",
                        resp.status
                    ),
                    status: Some(resp.status),
                    body: Some(resp.result.to_string()),
                });
            }

            let state = resp.into_result();
            data.set_id(Utc::now().to_rfc3339());
            data.set("state_store", serde_json::to_string(&state)?)?;
            data.set("state_store_json", serde_json::to_string_pretty(&state)?)?;
            data.set(
                "resource_controller_url",
                format!("{}/schematics", session.console_url()),
            )?;
            Ok(())
        })
    }
}
