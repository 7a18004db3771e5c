// ibmtf-core: Provider layer between ibmtf-api and consumers (CLI, plugin host).

mod cbr;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod flatten;
pub mod lookup;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod session;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Credentials, ProviderConfig};
pub use error::{CoreError, Diagnostic, Diagnostics, Severity};
pub use provider::{DataSource, HandlerFuture, Provider, ProviderSchemas, Resource};
pub use schema::{Elem, Schema, SchemaMap, ValueType};
pub use session::ClientSession;
pub use state::{ResourceData, State};
