//! Schema command handler.

use serde::Serialize;
use tabled::Tabled;

use ibmtf_core::{Elem, Provider, Schema, SchemaMap};

use crate::cli::{GlobalOpts, OutputFormat, SchemaArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Attributes")]
    attributes: usize,
}

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Type")]
    value_type: String,
    #[tabled(rename = "Mode")]
    mode: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

/// Both schemas registered under one type name.
#[derive(Serialize)]
struct NamedSchema<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_source: Option<SchemaMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<SchemaMap>,
}

fn mode(schema: &Schema) -> &'static str {
    match (schema.required, schema.optional, schema.computed) {
        (true, ..) => "required",
        (false, true, true) => "optional+computed",
        (false, true, false) => "optional",
        _ => "computed",
    }
}

fn type_label(schema: &Schema) -> String {
    match schema.elem {
        Some(Elem::Value(inner)) => format!("{}({inner})", schema.value_type),
        Some(Elem::Block(_)) => format!("{}(block)", schema.value_type),
        None => schema.value_type.to_string(),
    }
}

/// Flatten nested blocks into dotted attribute paths.
fn attribute_rows(
    kind: &'static str,
    prefix: &str,
    schema: &SchemaMap,
    rows: &mut Vec<AttributeRow>,
) {
    for (name, attr) in schema {
        let path = if prefix.is_empty() {
            (*name).to_owned()
        } else {
            format!("{prefix}.{name}")
        };
        rows.push(AttributeRow {
            kind,
            attribute: path.clone(),
            value_type: type_label(attr),
            mode: mode(attr),
            description: attr.description.unwrap_or_default(),
        });
        if let Some(Elem::Block(ref nested)) = attr.elem {
            attribute_rows(kind, &path, nested, rows);
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(provider: &Provider, args: &SchemaArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.name {
        None => {
            let schemas = provider.schemas();
            match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    let mut rows: Vec<TypeRow> = schemas
                        .data_sources
                        .iter()
                        .map(|(&name, s)| TypeRow {
                            name,
                            kind: "data source",
                            attributes: s.len(),
                        })
                        .collect();
                    rows.extend(schemas.resources.iter().map(|(&name, s)| TypeRow {
                        name,
                        kind: "resource",
                        attributes: s.len(),
                    }));
                    if matches!(global.output, OutputFormat::Plain) {
                        rows.iter().map(|r| r.name).collect::<Vec<_>>().join("\n")
                    } else {
                        output::render_table(&rows)
                    }
                }
                _ => output::render_single(
                    &global.output,
                    &schemas,
                    |_| String::new(),
                    |_| String::new(),
                )?,
            }
        }
        Some(ref name) => {
            let named = NamedSchema {
                name,
                data_source: provider.data_source_schema(name),
                resource: provider.resource_schema(name),
            };
            if named.data_source.is_none() && named.resource.is_none() {
                return Err(CliError::Validation {
                    field: "type".into(),
                    reason: format!("{name:?} is not supported; run `ibmtf schema` to list types"),
                });
            }
            output::render_single(
                &global.output,
                &named,
                |n| {
                    let mut rows = Vec::new();
                    if let Some(ref s) = n.data_source {
                        attribute_rows("data source", "", s, &mut rows);
                    }
                    if let Some(ref s) = n.resource {
                        attribute_rows("resource", "", s, &mut rows);
                    }
                    output::render_table(&rows)
                },
                |n| {
                    n.resource
                        .as_ref()
                        .or(n.data_source.as_ref())
                        .map(|s| s.keys().copied().collect::<Vec<_>>().join("\n"))
                        .unwrap_or_default()
                },
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ibmtf_core::ValueType;

    use super::*;

    #[test]
    fn nested_blocks_flatten_to_paths() {
        let schema: SchemaMap = BTreeMap::from([(
            "addresses",
            Schema::required(ValueType::List).block(BTreeMap::from([(
                "value",
                Schema::optional(ValueType::String),
            )])),
        )]);
        let mut rows = Vec::new();
        attribute_rows("resource", "", &schema, &mut rows);

        let paths: Vec<_> = rows
            .iter()
            .map(|r| (r.attribute.as_str(), r.value_type.as_str(), r.mode))
            .collect();
        assert_eq!(
            paths,
            [
                ("addresses", "list(block)", "required"),
                ("addresses.value", "string", "optional"),
            ]
        );
    }
}
