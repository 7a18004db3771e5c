// Managed resources.

mod cbr_rule;
mod cbr_zone;

pub use cbr_rule::CbrRule;
pub use cbr_zone::CbrZone;

use serde_json::Value;

use crate::error::CoreError;
use crate::provider::Resource;
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::state::ResourceData;

pub(crate) fn all() -> Vec<Box<dyn Resource>> {
    vec![Box::new(CbrZone), Box::new(CbrRule)]
}

pub(crate) fn with_etag(mut schema: SchemaMap) -> SchemaMap {
    schema.insert(
        "etag",
        Schema::computed(ValueType::String).describe("The ETag of the last read or write."),
    );
    schema
}

/// The `ETag` to send as `If-Match`: the fresh one from a read, otherwise
/// the one recorded in state.
pub(crate) fn pick_etag(fresh: Option<&str>, data: &ResourceData) -> Result<String, CoreError> {
    fresh
        .or_else(|| data.get_str("etag"))
        .filter(|e| !e.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| CoreError::ValidationFailed {
            message: "no ETag available for the update".into(),
        })
}

/// A list input from config, empty when absent.
pub(crate) fn list_input<'a>(data: &'a ResourceData, key: &str) -> &'a [Value] {
    data.config_list(key).map(Vec::as_slice).unwrap_or_default()
}

