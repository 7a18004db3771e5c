// ── Declarative schema surface ──
//
// Every data source and resource declares a fixed attribute map. Keys are
// kept in a `BTreeMap` so schema dumps and validation messages come out in
// a stable order.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Diagnostics;

/// Attribute value kinds understood by the host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Bool,
    Float,
    List,
    Set,
    Map,
}

impl ValueType {
    /// Whether `value` has this type's JSON shape.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::Float => value.is_number(),
            Self::List | Self::Set => value.is_array(),
            Self::Map => value.is_object(),
        }
    }
}

/// Element type of a collection attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Elem {
    Value(ValueType),
    Block(SchemaMap),
}

pub type SchemaMap = BTreeMap<&'static str, Schema>;

/// One attribute declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Elem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl Schema {
    fn base(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: false,
            optional: false,
            computed: false,
            description: None,
            elem: None,
            max_items: None,
        }
    }

    pub fn required(value_type: ValueType) -> Self {
        Self {
            required: true,
            ..Self::base(value_type)
        }
    }

    pub fn optional(value_type: ValueType) -> Self {
        Self {
            optional: true,
            ..Self::base(value_type)
        }
    }

    pub fn computed(value_type: ValueType) -> Self {
        Self {
            computed: true,
            ..Self::base(value_type)
        }
    }

    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Nested block element for a list or set.
    #[must_use]
    pub fn block(mut self, schema: SchemaMap) -> Self {
        self.elem = Some(Elem::Block(schema));
        self
    }

    /// Scalar element type for a list, set or map.
    #[must_use]
    pub fn elem(mut self, value_type: ValueType) -> Self {
        self.elem = Some(Elem::Value(value_type));
        self
    }

    #[must_use]
    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    /// User-suppliable (required or optional).
    pub fn is_input(&self) -> bool {
        self.required || self.optional
    }
}

// ── Validation ───────────────────────────────────────────────────────

/// Check user-supplied attributes against a schema.
///
/// Every problem is recorded: missing required attributes, computed-only
/// or unknown attributes, and type mismatches (recursing into blocks).
pub fn validate(schema: &SchemaMap, config: &Map<String, Value>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    validate_into(&mut diags, "", schema, config);
    diags
}

fn validate_into(
    diags: &mut Diagnostics,
    prefix: &str,
    schema: &SchemaMap,
    config: &Map<String, Value>,
) {
    for (key, attr) in schema {
        if attr.required && config.get(*key).is_none_or(Value::is_null) {
            diags.error(format!("{prefix}{key} is required"));
        }
    }

    for (key, value) in config {
        let path = format!("{prefix}{key}");
        let Some(attr) = schema.get(key.as_str()) else {
            diags.error(format!("{path} is not a known attribute"));
            continue;
        };
        if value.is_null() {
            continue;
        }
        if !attr.is_input() {
            diags.error(format!("{path} is computed and cannot be set"));
            continue;
        }
        validate_value(diags, &path, attr, value);
    }
}

fn validate_value(diags: &mut Diagnostics, path: &str, attr: &Schema, value: &Value) {
    if !attr.value_type.accepts(value) {
        diags.error(format!("{path} must be of type {}", attr.value_type));
        return;
    }

    match value {
        Value::Array(items) => {
            if let Some(max) = attr.max_items {
                if items.len() > max {
                    diags.error(format!("{path} accepts at most {max} item(s)"));
                }
            }
            for (i, item) in items.iter().enumerate() {
                validate_elem(diags, &format!("{path}.{i}"), attr.elem.as_ref(), item);
            }
        }
        Value::Object(map) if attr.value_type == ValueType::Map => {
            for (k, item) in map {
                validate_elem(diags, &format!("{path}.{k}"), attr.elem.as_ref(), item);
            }
        }
        _ => {}
    }
}

fn validate_elem(diags: &mut Diagnostics, path: &str, elem: Option<&Elem>, item: &Value) {
    match elem {
        Some(Elem::Value(ty)) if !ty.accepts(item) => {
            diags.error(format!("{path} must be of type {ty}"));
        }
        Some(Elem::Block(block)) => match item.as_object() {
            Some(obj) => validate_into(diags, &format!("{path}."), block, obj),
            None => diags.error(format!("{path} must be an object")),
        },
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> SchemaMap {
        let mut tag = SchemaMap::new();
        tag.insert("name", Schema::required(ValueType::String));
        tag.insert("operator", Schema::optional(ValueType::String));

        let mut schema = SchemaMap::new();
        schema.insert("name", Schema::required(ValueType::String).describe("Name."));
        schema.insert("count", Schema::optional(ValueType::Int));
        schema.insert("crn", Schema::computed(ValueType::String));
        schema.insert(
            "tags",
            Schema::optional(ValueType::List).block(tag).max_items(2),
        );
        schema
    }

    fn config(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn accepts_valid_config() {
        let diags = validate(
            &sample(),
            &config(json!({"name": "a", "count": 3, "tags": [{"name": "t"}]})),
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn reports_every_problem() {
        let diags = validate(
            &sample(),
            &config(json!({"count": "3", "crn": "x", "bogus": 1})),
        );
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec![
                "name is required",
                "count must be of type int",
                "crn is computed and cannot be set",
                "bogus is not a known attribute",
            ]
        );
    }

    #[test]
    fn validates_nested_blocks() {
        let diags = validate(
            &sample(),
            &config(json!({
                "name": "a",
                "tags": [{"operator": "eq"}, {"name": 5}, "nope"]
            })),
        );
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec![
                "tags accepts at most 2 item(s)",
                "tags.0.name is required",
                "tags.1.name must be of type string",
                "tags.2 must be an object",
            ]
        );
    }

    #[test]
    fn serializes_for_schema_dump() {
        let mut schema = SchemaMap::new();
        schema.insert(
            "ids",
            Schema::computed(ValueType::List).elem(ValueType::String),
        );
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            json!({"ids": {
                "type": "list",
                "required": false,
                "optional": false,
                "computed": true,
                "elem": {"value": "string"}
            }})
        );
    }
}
