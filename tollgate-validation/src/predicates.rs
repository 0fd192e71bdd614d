// Predicate registry and built-in predicates

use crate::errors::{SchemaError, SchemaResult};
use crate::rule::OPTIONAL_RULE;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// A named check over a stringified value and the rule's extra parameters
pub type PredicateFn = Arc<dyn Fn(&str, &[Value]) -> bool + Send + Sync>;

// Common regex patterns
static INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+$").unwrap());

static FLOAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+)?(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?$").unwrap()
});

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:[0-9]*\.)?[0-9]+$").unwrap());

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static HEX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:0[xXhH])?[0-9a-fA-F]+$").unwrap());

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

/// Mapping from predicate name to predicate function.
///
/// The registry is injected into a [`Validator`](crate::Validator), so the set of
/// supported rule names is known when the schema is checked.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, PredicateFn>,
}

impl PredicateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in predicates
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, predicate) in builtin_predicates() {
            registry.predicates.insert(name.to_string(), predicate);
        }
        registry
    }

    /// Register a predicate, replacing any existing one with the same name.
    ///
    /// The optional marker name is reserved and cannot be registered.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F) -> SchemaResult<()>
    where
        F: Fn(&str, &[Value]) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        if name == OPTIONAL_RULE {
            return Err(SchemaError::ReservedName(name));
        }
        self.predicates.insert(name, Arc::new(predicate));
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, predicate: F) -> SchemaResult<Self>
    where
        F: Fn(&str, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.register(name, predicate)?;
        Ok(self)
    }

    /// Check if a predicate is registered
    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Registered predicate names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke a predicate by name
    pub fn call(&self, name: &str, value: &str, params: &[Value]) -> SchemaResult<bool> {
        let predicate = self
            .predicates
            .get(name)
            .ok_or_else(|| SchemaError::UnknownPredicate(name.to_string()))?;
        Ok(predicate(value, params))
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("predicates", &self.names())
            .finish()
    }
}

fn predicate<F>(f: F) -> PredicateFn
where
    F: Fn(&str, &[Value]) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

fn builtin_predicates() -> Vec<(&'static str, PredicateFn)> {
    vec![
        ("isInt", predicate(is_int)),
        ("isFloat", predicate(is_float)),
        ("isBoolean", predicate(is_boolean)),
        ("isNumeric", predicate(|v, _| NUMERIC_REGEX.is_match(v))),
        ("isAlpha", predicate(|v, _| ALPHA_REGEX.is_match(v))),
        ("isAlphanumeric", predicate(|v, _| ALPHANUMERIC_REGEX.is_match(v))),
        ("isEmail", predicate(|v, _| EMAIL_REGEX.is_match(v))),
        ("isURL", predicate(|v, _| URL_REGEX.is_match(v))),
        ("isUUID", predicate(|v, _| UUID_REGEX.is_match(v))),
        ("isHexadecimal", predicate(|v, _| HEX_REGEX.is_match(v))),
        ("isLength", predicate(is_length)),
        ("isEmpty", predicate(|v, _| v.is_empty())),
        ("isIn", predicate(is_in)),
        ("equals", predicate(equals)),
        ("contains", predicate(contains)),
        ("matches", predicate(matches)),
        ("isJSON", predicate(is_json)),
    ]
}

/// Read a numeric bound from an options object in `params[0]`
fn option_f64(params: &[Value], key: &str) -> Option<f64> {
    params.first()?.get(key)?.as_f64()
}

/// Length bounds, either `{min, max}` or positional `min, max`
fn length_bounds(params: &[Value]) -> (Option<f64>, Option<f64>) {
    match params.first() {
        Some(Value::Object(_)) => (option_f64(params, "min"), option_f64(params, "max")),
        Some(Value::Number(min)) => (min.as_f64(), params.get(1).and_then(Value::as_f64)),
        _ => (None, None),
    }
}

fn within(n: f64, params: &[Value]) -> bool {
    option_f64(params, "min").is_none_or(|min| n >= min)
        && option_f64(params, "max").is_none_or(|max| n <= max)
}

fn is_int(value: &str, params: &[Value]) -> bool {
    INT_REGEX.is_match(value) && value.parse::<f64>().is_ok_and(|n| within(n, params))
}

fn is_float(value: &str, params: &[Value]) -> bool {
    if matches!(value, "" | "." | "-" | "+") || !FLOAT_REGEX.is_match(value) {
        return false;
    }
    value.parse::<f64>().is_ok_and(|n| within(n, params))
}

fn is_boolean(value: &str, _params: &[Value]) -> bool {
    matches!(value, "true" | "false" | "1" | "0")
}

fn is_length(value: &str, params: &[Value]) -> bool {
    let len = value.chars().count() as f64;
    let (min, max) = length_bounds(params);
    len >= min.unwrap_or(0.0) && max.is_none_or(|max| len <= max)
}

fn param_str(param: &Value) -> String {
    match param {
        Value::String(s) => s.clone(),
        other => crate::rule::stringify(other),
    }
}

fn is_in(value: &str, params: &[Value]) -> bool {
    match params.first() {
        Some(Value::Array(options)) => options.iter().any(|o| param_str(o) == value),
        Some(Value::Object(options)) => options.contains_key(value),
        _ => false,
    }
}

fn equals(value: &str, params: &[Value]) -> bool {
    params.first().is_some_and(|p| param_str(p) == value)
}

fn contains(value: &str, params: &[Value]) -> bool {
    params.first().is_some_and(|p| value.contains(&param_str(p)))
}

fn matches(value: &str, params: &[Value]) -> bool {
    let Some(pattern) = params.first().and_then(Value::as_str) else {
        warn!("matches rule declared without a pattern");
        return false;
    };
    let pattern = match params.get(1).and_then(Value::as_str) {
        Some(flags) if flags.contains('i') => format!("(?i){}", pattern),
        _ => pattern.to_string(),
    };
    match Regex::new(&pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "matches rule has an invalid pattern");
            false
        }
    }
}

fn is_json(value: &str, _params: &[Value]) -> bool {
    serde_json::from_str::<Value>(value).is_ok_and(|v| v.is_object() || v.is_array())
}
