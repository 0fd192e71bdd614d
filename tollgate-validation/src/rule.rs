// Rules and rule chains

use crate::config::ValidatorConfig;
use crate::errors::SchemaResult;
use crate::predicates::PredicateRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::trace;

/// Rule name marking a field as optional; `params[0]` is its default
pub const OPTIONAL_RULE: &str = "isOptional";

/// Rule names that determine the coerced type of a passing field
pub const INT_RULE: &str = "isInt";
pub const FLOAT_RULE: &str = "isFloat";
pub const BOOLEAN_RULE: &str = "isBoolean";

static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+").unwrap());

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?").unwrap()
});

/// A single named constraint with an optional message and extra parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Predicate name
    #[serde(alias = "rule")]
    pub name: String,

    /// Message reported when the predicate rejects the value
    #[serde(default, alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Extra predicate arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
}

impl Rule {
    /// Create a rule without parameters
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_params(name, message, Vec::new())
    }

    /// Create a rule with predicate parameters
    pub fn with_params(
        name: impl Into<String>,
        message: impl Into<String>,
        params: Vec<Value>,
    ) -> Self {
        let message = message.into();
        Self {
            name: name.into(),
            message: (!message.is_empty()).then_some(message),
            params,
        }
    }

    /// Optional marker with a default value
    pub fn optional(default: impl Into<Value>) -> Self {
        Self {
            name: OPTIONAL_RULE.to_string(),
            message: None,
            params: vec![default.into()],
        }
    }

    /// Optional marker without a default
    pub fn optional_without_default() -> Self {
        Self {
            name: OPTIONAL_RULE.to_string(),
            message: None,
            params: Vec::new(),
        }
    }

    /// Check if this is the optional marker
    pub fn is_optional(&self) -> bool {
        self.name == OPTIONAL_RULE
    }

    /// Evaluate the rule against one raw value.
    ///
    /// An unregistered predicate name is an error, never a verdict.
    pub fn evaluate(
        &self,
        value: &Value,
        registry: &PredicateRegistry,
        config: &ValidatorConfig,
    ) -> SchemaResult<RuleOutcome> {
        if self.is_optional() {
            return Ok(RuleOutcome::pass());
        }

        let text = stringify(value);
        if registry.call(&self.name, &text, &self.params)? {
            Ok(RuleOutcome::pass())
        } else {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| config.fallback_message.clone());
            Ok(RuleOutcome::fail(message))
        }
    }
}

/// Verdict of one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub pass: bool,
    pub message: String,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            pass: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            pass: false,
            message: message.into(),
        }
    }
}

/// Verdict of a whole rule chain, carrying the coerced value on success
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutcome {
    pub pass: bool,
    pub message: String,

    /// Coerced value; only ever set on a pass, and may be unset for an
    /// optional field without a default
    pub legal_value: Option<Value>,

    /// Name of the rule that failed, if a rule failed
    pub rule: Option<String>,
}

impl FieldOutcome {
    /// Passing outcome
    pub fn pass(legal_value: Option<Value>) -> Self {
        Self {
            pass: true,
            message: String::new(),
            legal_value,
            rule: None,
        }
    }

    /// Failing outcome for a missing required value
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            pass: false,
            message: message.into(),
            legal_value: None,
            rule: None,
        }
    }

    /// Failing outcome for a rejected rule
    pub fn rejected(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pass: false,
            message: message.into(),
            legal_value: None,
            rule: Some(rule.into()),
        }
    }
}

/// The ordered rule chain of one field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleField {
    rules: Vec<Rule>,
}

impl RuleField {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Validate a resolved raw value, `None` meaning no namespace held one.
    ///
    /// The chain stops at the first failing rule.
    pub fn validate(
        &self,
        raw: Option<&Value>,
        registry: &PredicateRegistry,
        config: &ValidatorConfig,
    ) -> SchemaResult<FieldOutcome> {
        let Some(value) = raw.filter(|v| !v.is_null()) else {
            return Ok(match self.optional_rule() {
                Some(rule) => FieldOutcome::pass(rule.params.first().cloned()),
                None => FieldOutcome::required(config.required_message.clone()),
            });
        };

        for rule in &self.rules {
            let outcome = rule.evaluate(value, registry, config)?;
            if !outcome.pass {
                trace!(rule = %rule.name, "rule rejected value");
                return Ok(FieldOutcome::rejected(&rule.name, outcome.message));
            }
        }

        Ok(FieldOutcome::pass(Some(self.convert(value, config))))
    }

    /// Check if the chain carries the optional marker
    pub fn is_optional(&self) -> bool {
        self.optional_rule().is_some()
    }

    fn optional_rule(&self) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.is_optional())
    }

    /// Coerce by the first type-determining rule in chain order
    fn convert(&self, value: &Value, config: &ValidatorConfig) -> Value {
        for rule in &self.rules {
            match rule.name.as_str() {
                INT_RULE => {
                    return parse_int(value)
                        .map(Value::Number)
                        .unwrap_or_else(|| value.clone());
                }
                FLOAT_RULE => {
                    return parse_float(value)
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                        .unwrap_or_else(|| value.clone());
                }
                BOOLEAN_RULE => return Value::Bool(config.boolean_cast.cast(value)),
                _ => {}
            }
        }
        value.clone()
    }
}

impl From<Vec<Rule>> for RuleField {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

/// String form of a value as handed to predicates
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Leading-integer parse: `"42abc"` is 42, `"3.5"` is 3.
///
/// Integers beyond the `u64` range come back as floats rather than saturating.
fn parse_int(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.clone()),
        Value::Number(n) => n.as_f64().and_then(|f| truncated(f.trunc())),
        Value::String(s) => {
            let digits = LEADING_INT.find(s.trim_start())?.as_str();
            digits
                .parse::<i64>()
                .map(Number::from)
                .or_else(|_| digits.parse::<u64>().map(Number::from))
                .ok()
                .or_else(|| digits.parse::<f64>().ok().and_then(truncated))
        }
        _ => None,
    }
}

fn truncated(f: f64) -> Option<Number> {
    if (i64::MIN as f64..i64::MAX as f64).contains(&f) {
        Some(Number::from(f as i64))
    } else {
        Number::from_f64(f)
    }
}

/// Leading-float parse: `"3.5kg"` is 3.5
fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => LEADING_FLOAT.find(s.trim_start())?.as_str().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BooleanCast;
    use crate::errors::SchemaError;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn defaults() -> (PredicateRegistry, ValidatorConfig) {
        (PredicateRegistry::with_defaults(), ValidatorConfig::default())
    }

    #[test]
    fn test_rule_pass_and_fail() {
        let (registry, config) = defaults();
        let rule = Rule::new("isInt", "must be an integer");

        assert_eq!(rule.evaluate(&json!("12"), &registry, &config), Ok(RuleOutcome::pass()));
        assert_eq!(
            rule.evaluate(&json!("twelve"), &registry, &config),
            Ok(RuleOutcome::fail("must be an integer"))
        );
    }

    #[test]
    fn test_rule_fallback_message() {
        let (registry, config) = defaults();
        let rule = Rule::new("isEmail", "");
        assert_eq!(rule.message, None);
        let outcome = rule.evaluate(&json!("nope"), &registry, &config).unwrap();
        assert_eq!(outcome.message, config.fallback_message);
    }

    #[test]
    fn test_optional_rule_always_passes() {
        let registry = PredicateRegistry::new();
        let config = ValidatorConfig::default();
        let rule = Rule::optional(5);
        assert!(rule.evaluate(&json!("anything"), &registry, &config).unwrap().pass);
    }

    #[test]
    fn test_unknown_predicate_is_not_a_verdict() {
        let (registry, config) = defaults();
        let rule = Rule::new("isPrime", "not prime");
        assert_eq!(
            rule.evaluate(&json!("7"), &registry, &config),
            Err(SchemaError::UnknownPredicate("isPrime".to_string()))
        );
    }

    #[test]
    fn test_predicates_receive_stringified_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let registry = PredicateRegistry::new()
            .with("record", move |v, _| {
                log.lock().unwrap().push(v.to_string());
                true
            })
            .unwrap();
        let config = ValidatorConfig::default();
        let rule = Rule::new("record", "");

        for value in [json!(7), json!(2.0), json!(true), json!(["a", 1]), json!({"k": 1})] {
            rule.evaluate(&value, &registry, &config).unwrap();
        }
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["7", "2", "true", "a,1", "[object Object]"]
        );
    }

    #[test]
    fn test_chain_short_circuits() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (Arc::clone(&calls), Arc::clone(&calls));
        let registry = PredicateRegistry::new()
            .with("reject", move |_, _| {
                first.lock().unwrap().push("reject");
                false
            })
            .unwrap()
            .with("after", move |_, _| {
                second.lock().unwrap().push("after");
                true
            })
            .unwrap();
        let config = ValidatorConfig::default();
        let field = RuleField::new(vec![
            Rule::new("reject", "rejected"),
            Rule::new("after", "unreachable"),
        ]);

        let outcome = field.validate(Some(&json!("x")), &registry, &config).unwrap();
        assert!(!outcome.pass);
        assert_eq!(outcome.message, "rejected");
        assert_eq!(outcome.rule.as_deref(), Some("reject"));
        assert_eq!(outcome.legal_value, None);
        assert_eq!(*calls.lock().unwrap(), vec!["reject"]);
    }

    #[test]
    fn test_missing_required_value() {
        let (registry, config) = defaults();
        let field = RuleField::new(vec![Rule::new("isInt", "")]);
        let outcome = field.validate(None, &registry, &config).unwrap();
        assert!(!outcome.pass);
        assert_eq!(outcome.message, config.required_message);
        assert_eq!(outcome.legal_value, None);
    }

    #[test]
    fn test_missing_optional_value_uses_default() {
        let (registry, config) = defaults();
        let field = RuleField::new(vec![Rule::new("isInt", ""), Rule::optional(10)]);
        let outcome = field.validate(None, &registry, &config).unwrap();
        assert_eq!(outcome, FieldOutcome::pass(Some(json!(10))));

        let field = RuleField::new(vec![Rule::optional_without_default()]);
        let outcome = field.validate(Some(&Value::Null), &registry, &config).unwrap();
        assert!(outcome.pass);
        assert_eq!(outcome.legal_value, None);
    }

    #[test]
    fn test_present_optional_value_runs_chain() {
        let (registry, config) = defaults();
        let field = RuleField::new(vec![Rule::optional(1), Rule::new("isInt", "bad page")]);
        let outcome = field.validate(Some(&json!("x")), &registry, &config).unwrap();
        assert!(!outcome.pass);
        assert_eq!(outcome.message, "bad page");
    }

    #[test]
    fn test_coercion_by_first_type_rule() {
        let (registry, config) = defaults();

        let field = RuleField::new(vec![Rule::new("isInt", ""), Rule::new("isFloat", "")]);
        let outcome = field.validate(Some(&json!("3")), &registry, &config).unwrap();
        assert_eq!(outcome.legal_value, Some(json!(3)));

        let field = RuleField::new(vec![Rule::new("isFloat", "")]);
        let outcome = field.validate(Some(&json!("3.5")), &registry, &config).unwrap();
        assert_eq!(outcome.legal_value, Some(json!(3.5)));

        let field = RuleField::new(vec![Rule::new("isBoolean", "")]);
        let outcome = field.validate(Some(&json!("true")), &registry, &config).unwrap();
        assert_eq!(outcome.legal_value, Some(json!(true)));

        let field = RuleField::new(vec![Rule::new("isLength", "")]);
        let outcome = field.validate(Some(&json!("abc")), &registry, &config).unwrap();
        assert_eq!(outcome.legal_value, Some(json!("abc")));
    }

    #[test]
    fn test_int_coercion_of_decimal_text() {
        let registry = PredicateRegistry::new()
            .with("isInt", |_, _| true)
            .unwrap()
            .with("isFloat", |_, _| true)
            .unwrap();
        let config = ValidatorConfig::default();
        let field = RuleField::new(vec![Rule::new("isInt", ""), Rule::new("isFloat", "")]);
        let outcome = field.validate(Some(&json!("3.5")), &registry, &config).unwrap();
        assert_eq!(outcome.legal_value, Some(json!(3)));
    }

    #[test]
    fn test_int_coercion_keeps_large_integers() {
        let (registry, config) = defaults();
        let field = RuleField::new(vec![Rule::new("isInt", "")]);

        let outcome = field.validate(Some(&json!(u64::MAX)), &registry, &config).unwrap();
        assert_eq!(outcome.legal_value, Some(json!(18446744073709551615u64)));

        let outcome = field
            .validate(Some(&json!("18446744073709551615")), &registry, &config)
            .unwrap();
        assert_eq!(outcome.legal_value, Some(json!(u64::MAX)));

        let outcome = field
            .validate(Some(&json!("99999999999999999999")), &registry, &config)
            .unwrap();
        assert_eq!(outcome.legal_value, Some(json!(1e20)));
    }

    #[test]
    fn test_integral_floats_pass_int_rule() {
        let (registry, config) = defaults();
        let field = RuleField::new(vec![Rule::new("isInt", "")]);

        assert_eq!(stringify(&json!(1e15)), "1000000000000000");
        assert_eq!(stringify(&json!(1e20)), "100000000000000000000");
        assert_eq!(stringify(&json!(-0.0)), "0");

        let outcome = field.validate(Some(&json!(1e15)), &registry, &config).unwrap();
        assert!(outcome.pass);
        assert_eq!(outcome.legal_value, Some(json!(1_000_000_000_000_000i64)));
    }

    #[test]
    fn test_boolean_cast_modes() {
        let registry = PredicateRegistry::with_defaults();
        let field = RuleField::new(vec![Rule::new("isBoolean", "")]);

        let truthy = ValidatorConfig::default();
        let outcome = field.validate(Some(&json!("false")), &registry, &truthy).unwrap();
        assert_eq!(outcome.legal_value, Some(json!(true)));

        let parse = ValidatorConfig::default().with_boolean_cast(BooleanCast::Parse);
        let outcome = field.validate(Some(&json!("false")), &registry, &parse).unwrap();
        assert_eq!(outcome.legal_value, Some(json!(false)));
    }

    #[test]
    fn test_leading_number_parsing() {
        assert_eq!(parse_int(&json!("42abc")), Some(Number::from(42)));
        assert_eq!(parse_int(&json!("  -8")), Some(Number::from(-8)));
        assert_eq!(parse_int(&json!(9.9)), Some(Number::from(9)));
        assert_eq!(parse_int(&json!("abc")), None);
        assert_eq!(parse_float(&json!("3.5kg")), Some(3.5));
        assert_eq!(parse_float(&json!(".25")), Some(0.25));
        assert_eq!(parse_float(&json!("e5")), None);
    }

    #[test]
    fn test_rule_deserialize() {
        let rule: Rule = serde_json::from_value(json!({
            "rule": "isLength",
            "msg": "too long",
            "params": [{"max": 3}]
        }))
        .unwrap();
        assert_eq!(rule, Rule::with_params("isLength", "too long", vec![json!({"max": 3})]));

        let rule: Rule = serde_json::from_value(json!({"name": "isInt"})).unwrap();
        assert_eq!(rule.message, None);
        assert!(rule.params.is_empty());

        assert!(serde_json::from_value::<Rule>(json!({"nmae": "isInt"})).is_err());
    }
}
