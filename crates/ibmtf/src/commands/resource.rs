//! Resource lifecycle command handlers.

use ibmtf_core::Provider;
use tracing::info;

use crate::cli::{GlobalOpts, ResourceArgs, ResourceCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn resource_schema(provider: &Provider, name: &str) -> Result<ibmtf_core::SchemaMap, CliError> {
    super::known_schema("resource", name, provider.resource_schema(name))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    provider: &Provider,
    args: ResourceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResourceCommand::Create { name, input } => {
            let schema = resource_schema(provider, &name)?;
            let config = util::collect_inputs(&input, &schema)?;

            let conn = super::connect(global)?;
            let bar = util::spinner(format!("Creating {name}"), global.quiet);
            let result = provider.create_resource(&conn.session, &name, config).await;
            bar.finish_and_clear();
            let state = result?;
            info!(resource = %name, id = %state.id, "created");

            let out = util::render_state(global, &state)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::Read { name, target } => {
            resource_schema(provider, &name)?;
            let (id, prior) = util::resolve_target(&target)?;

            let conn = super::connect(global)?;
            let state = provider
                .read_resource(&conn.session, &name, &id, prior)
                .await?
                .ok_or(CliError::NotFound {
                    resource_type: name,
                    identifier: id,
                })?;

            let out = util::render_state(global, &state)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::Update {
            name,
            target,
            input,
        } => {
            let schema = resource_schema(provider, &name)?;
            let (id, prior) = util::resolve_target(&target)?;
            let config = util::collect_inputs(&input, &schema)?;

            let conn = super::connect(global)?;
            let bar = util::spinner(format!("Updating {name} {id}"), global.quiet);
            let result = provider
                .update_resource(&conn.session, &name, &id, config, prior)
                .await;
            bar.finish_and_clear();
            let state = result?;
            info!(resource = %name, id = %state.id, "updated");

            let out = util::render_state(global, &state)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::Delete { name, target } => {
            resource_schema(provider, &name)?;
            let (id, prior) = util::resolve_target(&target)?;

            if !util::confirm(
                &format!("delete {name}"),
                &format!("Delete {name} {id}? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }

            let conn = super::connect(global)?;
            let bar = util::spinner(format!("Deleting {name} {id}"), global.quiet);
            let result = provider
                .delete_resource(&conn.session, &name, &id, prior)
                .await;
            bar.finish_and_clear();
            result?;
            if !global.quiet {
                eprintln!("✓ Deleted {name} {id}");
            }
            Ok(())
        }
    }
}
