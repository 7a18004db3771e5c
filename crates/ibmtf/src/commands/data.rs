//! Data source command handler.

use ibmtf_api::schematics::GetWorkspaceOptions;
use ibmtf_core::{ClientSession, CoreError, Provider};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::{DataArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    provider: &Provider,
    args: &DataArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let schema = super::known_schema(
        "data source",
        &args.name,
        provider.data_source_schema(&args.name),
    )?;
    let config = util::collect_inputs(&args.input, &schema)?;

    let conn = super::connect(global)?;
    if args.name == "ibm_schematics_state" {
        check_template(&conn.session, &config).await?;
    }
    let state = provider
        .read_data_source(&conn.session, &args.name, config)
        .await?;

    let out = util::render_state(global, &state)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// The template must be one of the workspace's `template_data` entries.
async fn check_template(
    session: &ClientSession,
    config: &Map<String, Value>,
) -> Result<(), CliError> {
    let input = |key: &str| config.get(key).and_then(Value::as_str);
    let (Some(w_id), Some(t_id)) = (input("workspace_id"), input("template_id")) else {
        return Ok(());
    };

    let workspace = session
        .schematics()
        .get_workspace(&GetWorkspaceOptions::new(w_id))
        .await
        .map_err(|e| CoreError::api_context("GetWorkspace failed", e))?
        .into_result();
    debug!(workspace_id = %w_id, templates = workspace.template_data.len(), "workspace found");

    if workspace
        .template_data
        .iter()
        .any(|t| t.id.as_deref() == Some(t_id))
    {
        return Ok(());
    }
    Err(CliError::Validation {
        field: "template_id".into(),
        reason: format!("{t_id:?} is not a template of workspace {w_id:?}"),
    })
}
