//! Command dispatch: bridges CLI args -> provider calls -> output formatting.

pub mod cbr;
pub mod config_cmd;
pub mod data;
pub mod resource;
pub mod schema;
pub mod util;

use ibmtf_core::{ClientSession, Provider, SchemaMap};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// An authenticated session plus the profile's default account.
pub struct Connection {
    pub session: ClientSession,
    pub account_id: Option<String>,
}

/// Resolve credentials and build the service clients.
pub fn connect(global: &GlobalOpts) -> Result<Connection, CliError> {
    let resolved = config::resolve(global)?;
    let session = ClientSession::new(&resolved.provider)?;
    tracing::debug!(region = %resolved.provider.region, "session ready");
    Ok(Connection {
        session,
        account_id: resolved.account_id,
    })
}

/// Schema lookup that fails before any credentials are resolved.
pub fn known_schema(
    kind: &str,
    name: &str,
    schema: Option<SchemaMap>,
) -> Result<SchemaMap, CliError> {
    schema.ok_or_else(|| CliError::Validation {
        field: kind.into(),
        reason: format!("{name:?} is not supported; run `ibmtf schema` to list types"),
    })
}

/// Dispatch a provider-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    provider: &Provider,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Schema(args) => schema::handle(provider, &args, global),
        Command::Data(args) => data::handle(provider, &args, global).await,
        Command::Resource(args) => resource::handle(provider, args, global).await,
        Command::Cbr(args) => cbr::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
