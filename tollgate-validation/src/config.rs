//! Validator configuration
//!
//! Defaults reproduce the historical behavior. Every setting can also be
//! read from the environment:
//!
//! - `TOLLGATE_PRESENCE=truthy|strict`
//! - `TOLLGATE_BOOLEAN_CAST=truthy|parse`
//! - `TOLLGATE_FALLBACK_MESSAGE=...`
//! - `TOLLGATE_REQUIRED_MESSAGE=...`

use serde::Deserialize;
use serde_json::Value;
use std::env;

/// Default message for a failed rule without its own message
pub const DEFAULT_FALLBACK_MESSAGE: &str = "is invalid";

/// Default message for a missing required field
pub const DEFAULT_REQUIRED_MESSAGE: &str = "is required";

/// How a namespace entry is judged present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Falsy values (`0`, `""`, `false`, `null`) count as absent.
    ///
    /// A query parameter `?page=0` is therefore indistinguishable from a
    /// missing one and falls through to the next namespace.
    #[default]
    Truthy,
    /// Only a missing key or `null` counts as absent
    Strict,
}

impl Presence {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "truthy" | "loose" | "compat" => Some(Presence::Truthy),
            "strict" => Some(Presence::Strict),
            _ => None,
        }
    }

    /// Check whether a looked-up value counts as provided
    pub fn is_present(&self, value: &Value) -> bool {
        match self {
            Presence::Truthy => is_truthy(value),
            Presence::Strict => !value.is_null(),
        }
    }
}

/// How `isBoolean` fields are coerced once their chain passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanCast {
    /// Truthiness of the raw value; any non-empty string is `true`
    #[default]
    Truthy,
    /// `"false"` and `"0"` become `false`, everything else uses truthiness
    Parse,
}

impl BooleanCast {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "truthy" => Some(BooleanCast::Truthy),
            "parse" => Some(BooleanCast::Parse),
            _ => None,
        }
    }

    /// Apply the cast to a raw value
    pub fn cast(&self, value: &Value) -> bool {
        match (self, value) {
            (BooleanCast::Parse, Value::String(s)) => {
                !matches!(s.trim().to_lowercase().as_str(), "false" | "0" | "")
            }
            _ => is_truthy(value),
        }
    }
}

/// Configuration for a [`Validator`](crate::Validator)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Namespace presence policy
    pub presence: Presence,
    /// Coercion used for `isBoolean` fields
    pub boolean_cast: BooleanCast,
    /// Message used when a failing rule or check has none
    pub fallback_message: String,
    /// Message used for a missing required field
    pub required_message: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            presence: Presence::Truthy,
            boolean_cast: BooleanCast::Truthy,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            required_message: DEFAULT_REQUIRED_MESSAGE.to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unrecognized values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let presence = env::var("TOLLGATE_PRESENCE")
            .ok()
            .and_then(|s| Presence::from_str(&s))
            .unwrap_or(defaults.presence);

        let boolean_cast = env::var("TOLLGATE_BOOLEAN_CAST")
            .ok()
            .and_then(|s| BooleanCast::from_str(&s))
            .unwrap_or(defaults.boolean_cast);

        let fallback_message = env::var("TOLLGATE_FALLBACK_MESSAGE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.fallback_message);

        let required_message = env::var("TOLLGATE_REQUIRED_MESSAGE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.required_message);

        Self {
            presence,
            boolean_cast,
            fallback_message,
            required_message,
        }
    }

    /// Only treat missing keys and `null` as absent
    pub fn strict() -> Self {
        Self::default().with_presence(Presence::Strict)
    }

    /// Set the presence policy
    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    /// Set the boolean coercion
    pub fn with_boolean_cast(mut self, cast: BooleanCast) -> Self {
        self.boolean_cast = cast;
        self
    }

    /// Set the generic failure message
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    /// Set the required-field message
    pub fn with_required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = message.into();
        self
    }
}

/// Loose truthiness: `null`, `false`, zero and the empty string are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
