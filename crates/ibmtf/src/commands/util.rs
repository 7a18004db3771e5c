//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use ibmtf_core::{SchemaMap, State, ValueType};

use crate::cli::{GlobalOpts, InputArgs, TargetArgs};
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is mandatory.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Spinner on stderr for slow writes; hidden when quiet or not a terminal.
pub fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

// ── Attribute inputs ────────────────────────────────────────────────

/// Merge `--from-file` and `--set` into one attribute map.
pub fn collect_inputs(
    input: &InputArgs,
    schema: &SchemaMap,
) -> Result<Map<String, Value>, CliError> {
    let mut config = match input.from_file {
        Some(ref path) => match read_json_file(path)? {
            Value::Object(map) => map,
            _ => {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "expected a JSON object of attributes".into(),
                });
            }
        },
        None => Map::new(),
    };

    for raw in &input.set {
        let (key, value) = parse_assignment(raw, schema)?;
        config.insert(key, value);
    }
    Ok(config)
}

/// Parse `key=value`, typing the value by the attribute's declared kind.
///
/// Keys the schema doesn't know stay strings; the provider rejects them.
pub fn parse_assignment(raw: &str, schema: &SchemaMap) -> Result<(String, Value), CliError> {
    let Some((key, text)) = raw.split_once('=') else {
        return Err(CliError::Validation {
            field: "set".into(),
            reason: format!("expected KEY=VALUE, got {raw:?}"),
        });
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "set".into(),
            reason: format!("missing key in {raw:?}"),
        });
    }

    let bad = |what: &str| CliError::Validation {
        field: key.into(),
        reason: format!("{text:?} is not {what}"),
    };

    let value = match schema.get(key).map(|s| s.value_type) {
        Some(ValueType::Int) => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| bad("an integer"))?,
        Some(ValueType::Bool) => text
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| bad("true or false"))?,
        Some(ValueType::Float) => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| bad("a number"))?,
        Some(ValueType::List | ValueType::Set | ValueType::Map) => {
            serde_json::from_str(text).map_err(|_| bad("valid JSON"))?
        }
        Some(ValueType::String) | None => Value::String(text.to_owned()),
    };
    Ok((key.to_owned(), value))
}

// ── Existing objects ────────────────────────────────────────────────

#[derive(Deserialize)]
struct StateFile {
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

/// The id and prior attributes a resource command acts on.
///
/// `--id` wins over the id recorded in `--state`.
pub fn resolve_target(target: &TargetArgs) -> Result<(String, Map<String, Value>), CliError> {
    let (state_id, prior) = match target.state {
        Some(ref path) => {
            let file: StateFile =
                serde_json::from_value(read_json_file(path)?).map_err(|e| CliError::Validation {
                    field: "state".into(),
                    reason: format!("expected {{\"id\": ..., \"attributes\": {{...}}}}: {e}"),
                })?;
            (Some(file.id), file.attributes)
        }
        None => (None, Map::new()),
    };

    let id = target
        .id
        .clone()
        .or(state_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CliError::Validation {
            field: "id".into(),
            reason: "pass --id or a --state file".into(),
        })?;
    Ok((id, prior))
}

// ── State output ────────────────────────────────────────────────────

/// Render committed state: attribute listing in table mode, `{id, attributes}` otherwise.
pub fn render_state(global: &GlobalOpts, state: &State) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_single(
        &global.output,
        state,
        |s| {
            let mut pairs = vec![("id", s.id.clone())];
            pairs.extend(
                s.attributes
                    .iter()
                    .map(|(k, v)| (k.as_str(), output::value_text(v))),
            );
            output::detail_lines(&pairs, color)
        },
        |s| s.id.clone(),
    )
}
