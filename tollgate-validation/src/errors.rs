// Validation errors

use std::fmt;
use thiserror::Error;

/// Result type for schema construction
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema authoring mistakes.
///
/// These indicate a bug in the declared schema rather than bad input, so they
/// are never folded into a pass/fail verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A rule names a predicate the registry does not know
    #[error("unknown predicate \"{0}\"")]
    UnknownPredicate(String),

    /// An element of a declared rule sequence is not a rule
    #[error("parameter \"{member}\" isn't a rule: {reason}")]
    NotARule { member: String, reason: String },

    /// A member follows the custom check naming convention but no check was supplied
    #[error("no custom check registered for \"{0}\"")]
    UnknownCheck(String),

    /// Attempt to register a predicate under a reserved name
    #[error("predicate name \"{0}\" is reserved")]
    ReservedName(String),

    /// The declaration document itself is malformed
    #[error("invalid schema declaration: {0}")]
    InvalidDeclaration(String),
}

impl SchemaError {
    /// Create a not-a-rule error for a schema member
    pub fn not_a_rule(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotARule {
            member: member.into(),
            reason: reason.into(),
        }
    }
}

/// What kind of check produced a [`ParameterError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Field absent from every namespace without an optional marker
    Required,
    /// A present value failed the named rule
    Rule { rule: String },
    /// A custom check reported failure
    Check,
}

impl FailureKind {
    /// Short machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Required => "required",
            FailureKind::Rule { .. } => "rule",
            FailureKind::Check => "check",
        }
    }
}

/// The single first-failure error of a validation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterError {
    /// Source name of the failing field (empty for custom checks)
    pub field: String,

    /// Failure message from the rule, check or configuration fallback
    pub message: String,

    /// Which stage failed
    pub kind: FailureKind,
}

impl ParameterError {
    /// Missing required field
    pub fn required(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: FailureKind::Required,
        }
    }

    /// Rule violation on a present value
    pub fn rule(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: FailureKind::Rule { rule: rule.into() },
        }
    }

    /// Custom check failure. Custom checks don't report a field name.
    pub fn check(message: impl Into<String>) -> Self {
        Self {
            field: String::new(),
            message: message.into(),
            kind: FailureKind::Check,
        }
    }

    /// HTTP status a host should answer with
    pub fn status_code(&self) -> u16 {
        400
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "field": self.field,
            "message": self.message,
            "kind": self.kind.as_str(),
        });
        if let FailureKind::Rule { rule } = &self.kind {
            body["rule"] = serde_json::Value::String(rule.clone());
        }
        body
    }
}

impl ParameterError {
    /// Field name and message joined by `separator`; the message alone for checks.
    ///
    /// `Display` joins with a single space. `joined("")` gives the bare
    /// concatenation, for hosts whose messages carry their own leading space.
    pub fn joined(&self, separator: &str) -> String {
        if self.field.is_empty() {
            self.message.clone()
        } else {
            format!("{}{}{}", self.field, separator, self.message)
        }
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined(" "))
    }
}

impl std::error::Error for ParameterError {}

/// Terminal error of [`Validator::validate`](crate::Validator::validate)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Bad input: the first failing field or check
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Bad schema, surfaced at first use
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl ValidationError {
    /// The parameter failure, if this is one
    pub fn as_parameter(&self) -> Option<&ParameterError> {
        match self {
            ValidationError::Parameter(e) => Some(e),
            ValidationError::Schema(_) => None,
        }
    }

    /// Check if this error is caused by the schema rather than the input
    pub fn is_schema_error(&self) -> bool {
        matches!(self, ValidationError::Schema(_))
    }
}
