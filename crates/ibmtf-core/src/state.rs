// ── Resource state staging ──
//
// Handlers read inputs and write attributes through `ResourceData`. Writes
// are staged; the provider commits them only when the handler returns `Ok`,
// so a failed read or write never leaves half-set attributes behind.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::schema::{self, SchemaMap};

/// Committed state of one object, as handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub id: String,
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: SchemaMap,
    config: Map<String, Value>,
    id: Option<String>,
    attributes: Map<String, Value>,
    staged: Map<String, Value>,
    staged_id: Option<String>,
}

impl ResourceData {
    /// Fresh data for a data source read or a resource create.
    ///
    /// Fails with `ValidationFailed` listing every config problem.
    pub fn new(schema: SchemaMap, config: Map<String, Value>) -> Result<Self, CoreError> {
        schema::validate(&schema, &config).into_result()?;
        Ok(Self {
            schema,
            config,
            id: None,
            attributes: Map::new(),
            staged: Map::new(),
            staged_id: None,
        })
    }

    /// Data for an object already in state.
    ///
    /// `config` carries the desired inputs (empty for plain reads and deletes,
    /// which skips validation); `attributes` the previously committed values.
    pub fn existing(
        schema: SchemaMap,
        id: impl Into<String>,
        attributes: Map<String, Value>,
        config: Map<String, Value>,
    ) -> Result<Self, CoreError> {
        if !config.is_empty() {
            schema::validate(&schema, &config).into_result()?;
        }
        Ok(Self {
            schema,
            config,
            id: Some(id.into()),
            attributes,
            staged: Map::new(),
            staged_id: None,
        })
    }

    pub fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current value: staged, then config, then committed.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(v) = self.staged.get(key) {
            return (!v.is_null()).then_some(v);
        }
        self.config
            .get(key)
            .or_else(|| self.attributes.get(key))
            .filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Desired input from config only, ignoring staged and committed values.
    ///
    /// Replace is a full PUT, so an optional missing here must be sent as
    /// absent rather than carried over from prior state.
    pub fn get_config(&self, key: &str) -> Option<&Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.get_config(key).and_then(Value::as_str)
    }

    pub fn config_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.get_config(key).and_then(Value::as_array)
    }

    /// Non-empty string attribute, or `ValidationFailed`.
    pub fn require_str(&self, key: &str) -> Result<&str, CoreError> {
        self.get_str(key)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::ValidationFailed {
                message: format!("{key} is required"),
            })
    }

    /// The id, staged or committed. Empty means the object is gone.
    pub fn id(&self) -> Option<&str> {
        self.staged_id.as_deref().or(self.id.as_deref())
    }

    // ── Writes (staged) ──────────────────────────────────────────────

    /// Stage an attribute. `None` (or anything serializing to null)
    /// removes the attribute on commit.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<(), CoreError> {
        let Some((name, _)) = self.schema.get_key_value(key) else {
            return Err(CoreError::UnknownAttribute {
                name: key.to_owned(),
            });
        };
        let value = serde_json::to_value(value)?;
        self.staged.insert((*name).to_owned(), value);
        Ok(())
    }

    /// Stage the id. An empty id marks the object as gone.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.staged_id = Some(id.into());
    }

    // ── Commit / discard ─────────────────────────────────────────────

    /// Apply staged values. Inputs from config are recorded alongside.
    pub fn commit(&mut self) {
        if let Some(id) = self.staged_id.take() {
            self.id = Some(id);
        }
        if self.id.as_deref() == Some("") {
            self.id = None;
            self.attributes.clear();
            self.staged.clear();
            return;
        }

        for (key, value) in &self.config {
            if self.schema.get(key.as_str()).is_some_and(|s| s.is_input()) {
                self.attributes.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in std::mem::take(&mut self.staged) {
            if value.is_null() {
                self.attributes.remove(&key);
            } else {
                self.attributes.insert(key, value);
            }
        }
    }

    /// Drop everything staged since the last commit.
    pub fn discard(&mut self) {
        self.staged.clear();
        self.staged_id = None;
    }

    /// Committed state, or `None` when the object has no id.
    pub fn state(&self) -> Option<State> {
        self.id.as_ref().map(|id| State {
            id: id.clone(),
            attributes: self.attributes.clone(),
        })
    }
}
