//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color ────────────────────────────────────────────────────────────

pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// `key: value` lines with aligned keys, keys bold when colored.
pub fn detail_lines(pairs: &[(&str, String)], color: bool) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    pairs
        .iter()
        .map(|(key, value)| {
            let label = format!("{key}:");
            if color {
                format!("{:<width$} {value}", label.bold())
            } else {
                format!("{label:<width$} {value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scalar as plain text; composite values as compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single item. Table mode uses `detail_fn`'s pre-formatted text.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    let value = yaml_value(serde_json::to_value(data)?);
    serde_yaml::to_string(&value)
        .map_err(|e| CliError::Internal(format!("YAML output failed: {e}")))
}

/// JSON numbers keep their source text, which `serde_yaml` would emit as a
/// nested map; convert them to YAML scalars first.
fn yaml_value(value: Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(b),
        Value::Number(n) => yaml_number(&n),
        Value::String(s) => serde_yaml::Value::String(s),
        Value::Array(items) => {
            serde_yaml::Value::Sequence(items.into_iter().map(yaml_value).collect())
        }
        Value::Object(map) => serde_yaml::Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (serde_yaml::Value::String(k), yaml_value(v)))
                .collect(),
        ),
    }
}

fn yaml_number(n: &serde_json::Number) -> serde_yaml::Value {
    if let Some(u) = n.as_u64() {
        return u.into();
    }
    if let Some(i) = n.as_i64() {
        return i.into();
    }
    let text = n.to_string();
    serde_yaml::from_str(&text).unwrap_or(serde_yaml::Value::String(text))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_lines_align_keys() {
        let out = detail_lines(&[("ID", "z-1".into()), ("Name", "office".into())], false);
        assert_eq!(out, "ID:   z-1\nName: office");
    }

    #[test]
    fn value_text_flattens_scalars() {
        assert_eq!(value_text(&json!("eth0")), "eth0");
        assert_eq!(value_text(&json!(1000)), "1000");
        assert_eq!(value_text(&Value::Null), "-");
        assert_eq!(value_text(&json!([{"id": "sg-1"}])), r#"[{"id":"sg-1"}]"#);
    }

    #[test]
    fn yaml_numbers_are_scalars() {
        let doc: Value = serde_json::from_str(r#"{"count": 3, "offset": -2, "ratio": 1.50}"#)
            .unwrap_or_default();
        let out = render_single(&OutputFormat::Yaml, &doc, |_| String::new(), |_| String::new())
            .unwrap_or_default();
        assert_eq!(out, "count: 3\noffset: -2\nratio: 1.5\n");
    }
}
