// Per-run validation state and result

use crate::namespace::Namespace;
use crate::path::{get_path, set_path, split_path};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Key of the sidecar holding defaults of fields no namespace provided
pub const DEFAULT_SIDECAR: &str = "default";

/// Declared field name to actual source key
pub type AliasMap = HashMap<String, String>;

/// State of one validation run, and its result once the run passes.
///
/// `data` is the raw snapshot and is never written after assembly. `parsed`
/// starts as a copy of it and receives the legal value of every passing field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationContext {
    data: Value,
    parsed: Value,
}

impl ValidationContext {
    /// Start a run from the assembled namespace tree
    pub(crate) fn new(tree: Value) -> Self {
        let mut parsed = tree.clone();
        set_path(&mut parsed, &[DEFAULT_SIDECAR], Value::Object(Map::new()));
        Self { data: tree, parsed }
    }

    /// Raw snapshot `{query, body, path, header}`
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Working snapshot with coerced values and the default sidecar
    pub fn parsed(&self) -> &Value {
        &self.parsed
    }

    /// Take the working snapshot
    pub fn into_parsed(self) -> Value {
        self.parsed
    }

    /// Read a coerced value by dotted path, e.g. `query.id` or `body.user.name`.
    ///
    /// A miss (or `null`) falls back to the default sidecar under the path's
    /// last segment, so `get("query.page")` finds a defaulted `page`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments = split_path(path);
        get_path(&self.parsed, &segments)
            .filter(|v| !v.is_null())
            .or_else(|| {
                let key = *segments.last()?;
                get_path(&self.parsed, &[DEFAULT_SIDECAR, key]).filter(|v| !v.is_null())
            })
    }

    /// Read and deserialize a coerced value
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.get(path)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Read a value from the raw snapshot
    pub fn get_raw(&self, path: &str) -> Option<&Value> {
        get_path(&self.data, &split_path(path))
    }

    /// Value written to the default sidecar for `key`
    pub fn default_value(&self, key: &str) -> Option<&Value> {
        get_path(&self.parsed, &[DEFAULT_SIDECAR, key])
    }

    /// Record a field's legal value where it was read from, or in the default sidecar
    pub(crate) fn write_back(&mut self, namespace: Option<Namespace>, key: &str, value: Value) {
        match namespace {
            Some(ns) => set_path(&mut self.parsed, &[ns.as_str(), key], value),
            None => set_path(&mut self.parsed, &[DEFAULT_SIDECAR, key], value),
        }
    }
}
