//! Schema declaration
//!
//! A schema is an ordered list of members. Each member is either a rule
//! chain bound to a field name or a custom asynchronous check. Members run in
//! declaration order.
//!
//! Schemas are normally built explicitly:
//!
//! ```
//! use tollgate_validation::{Rule, Schema};
//!
//! let schema = Schema::new()
//!     .field("id", Rule::new("isInt", "must be an integer"))
//!     .field("page", vec![Rule::optional(1), Rule::new("isInt", "")])
//!     .check_fn("validatePair", |data| async move {
//!         let _ = data;
//!         Ok(())
//!     });
//!
//! assert_eq!(schema.len(), 3);
//! ```
//!
//! or loaded from a JSON declaration with [`Schema::from_json`], where members
//! named `validateXxx` are bound to supplied custom checks by name.

use crate::errors::{SchemaError, SchemaResult};
use crate::predicates::PredicateRegistry;
use crate::rule::{Rule, RuleField};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

static CHECK_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^validate[A-Z]\w+").unwrap());

/// Custom checks available to [`Schema::from_json`], by member name
pub type CheckMap = HashMap<String, Arc<dyn CustomCheck>>;

/// Failure reported by a custom check.
///
/// An empty message is replaced by the configured fallback message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CheckError {
    pub message: String,
}

impl CheckError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for CheckError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CheckError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A whole-request check, run against the raw input snapshot.
///
/// Returning `Err` fails the run; returning `Ok` writes nothing back.
#[async_trait]
pub trait CustomCheck: Send + Sync {
    async fn check(&self, data: &Value) -> Result<(), CheckError>;
}

/// Adapter turning an async closure into a [`CustomCheck`].
///
/// The closure receives its own copy of the raw snapshot.
pub struct FnCheck<F>(pub F);

#[async_trait]
impl<F, Fut> CustomCheck for FnCheck<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CheckError>> + Send,
{
    async fn check(&self, data: &Value) -> Result<(), CheckError> {
        (self.0)(data.clone()).await
    }
}

/// Wrap an async closure as a shareable custom check
pub fn check_fn<F, Fut>(f: F) -> Arc<dyn CustomCheck>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CheckError>> + Send + 'static,
{
    Arc::new(FnCheck(f))
}

/// Check if a member name follows the custom check naming convention
pub fn is_check_name(name: &str) -> bool {
    CHECK_NAME_REGEX.is_match(name)
}

/// Anything that can be declared as a field's rule chain
pub trait IntoRules {
    fn into_rules(self) -> Vec<Rule>;
}

impl IntoRules for Rule {
    fn into_rules(self) -> Vec<Rule> {
        vec![self]
    }
}

impl IntoRules for Vec<Rule> {
    fn into_rules(self) -> Vec<Rule> {
        self
    }
}

impl<const N: usize> IntoRules for [Rule; N] {
    fn into_rules(self) -> Vec<Rule> {
        self.into()
    }
}

impl IntoRules for RuleField {
    fn into_rules(self) -> Vec<Rule> {
        self.rules().to_vec()
    }
}

/// One declared schema member
#[derive(Clone)]
pub enum Member {
    /// Rule chain bound to a field name
    Field { name: String, field: RuleField },
    /// Custom check
    Check {
        name: String,
        check: Arc<dyn CustomCheck>,
    },
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Field { name, .. } | Member::Check { name, .. } => name,
        }
    }

    pub fn is_check(&self) -> bool {
        matches!(self, Member::Check { .. })
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Field { name, field } => f
                .debug_struct("Field")
                .field("name", name)
                .field("rules", &field.rules())
                .finish(),
            Member::Check { name, .. } => f.debug_struct("Check").field("name", name).finish(),
        }
    }
}

/// Ordered set of declared members
#[derive(Debug, Clone, Default)]
pub struct Schema {
    members: Vec<Member>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule-checked field.
    ///
    /// Redeclaring a name replaces the earlier member in its original position.
    pub fn field(self, name: impl Into<String>, rules: impl IntoRules) -> Self {
        let name = name.into();
        let field = RuleField::new(rules.into_rules());
        self.push(Member::Field { name, field })
    }

    /// Declare a custom check
    pub fn check(self, name: impl Into<String>, check: impl CustomCheck + 'static) -> Self {
        self.check_arc(name, Arc::new(check))
    }

    /// Declare a shared custom check
    pub fn check_arc(self, name: impl Into<String>, check: Arc<dyn CustomCheck>) -> Self {
        let name = name.into();
        self.push(Member::Check { name, check })
    }

    /// Declare a custom check from an async closure
    pub fn check_fn<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CheckError>> + Send + 'static,
    {
        self.check_arc(name, check_fn(f))
    }

    fn push(mut self, member: Member) -> Self {
        match self.members.iter_mut().find(|m| m.name() == member.name()) {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
        self
    }

    /// Build a schema from a JSON declaration object.
    ///
    /// Member order follows the document. A member named like `validateXxx`
    /// is bound to the check of that name in `checks`; every other member must
    /// be a rule object or an array of rule objects.
    pub fn from_json(declaration: &Value, checks: &CheckMap) -> SchemaResult<Self> {
        let Value::Object(members) = declaration else {
            return Err(SchemaError::InvalidDeclaration(
                "schema declaration must be a JSON object".to_string(),
            ));
        };

        let mut schema = Schema::new();
        for (name, value) in members {
            schema = if is_check_name(name) {
                let check = checks
                    .get(name)
                    .ok_or_else(|| SchemaError::UnknownCheck(name.clone()))?;
                schema.check_arc(name, Arc::clone(check))
            } else {
                schema.field(name, parse_rules(name, value)?)
            };
        }
        Ok(schema)
    }

    /// Members in declaration order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Ensure every rule names a registered predicate
    pub fn verify(&self, registry: &PredicateRegistry) -> SchemaResult<()> {
        let unknown = self
            .members
            .iter()
            .filter_map(|member| match member {
                Member::Field { field, .. } => Some(field.rules()),
                Member::Check { .. } => None,
            })
            .flatten()
            .find(|rule| !rule.is_optional() && !registry.contains(&rule.name));

        match unknown {
            Some(rule) => Err(SchemaError::UnknownPredicate(rule.name.clone())),
            None => Ok(()),
        }
    }
}

fn parse_rule(member: &str, value: &Value) -> SchemaResult<Rule> {
    if !value.is_object() {
        return Err(SchemaError::not_a_rule(
            member,
            format!("expected a rule object, found {}", value),
        ));
    }
    serde_json::from_value(value.clone()).map_err(|e| SchemaError::not_a_rule(member, e.to_string()))
}

fn parse_rules(member: &str, value: &Value) -> SchemaResult<Vec<Rule>> {
    match value {
        Value::Array(items) => items.iter().map(|item| parse_rule(member, item)).collect(),
        other => Ok(vec![parse_rule(member, other)?]),
    }
}
