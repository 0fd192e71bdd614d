// Validation runs

use crate::config::ValidatorConfig;
use crate::context::{AliasMap, ValidationContext};
use crate::errors::{ParameterError, SchemaResult, ValidationError};
use crate::namespace::{Namespaces, RequestParts};
use crate::predicates::PredicateRegistry;
use crate::rule::RuleField;
use crate::schema::{CustomCheck, Member, Schema};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Runs a schema against requests.
///
/// A validator is immutable and can be shared between concurrent requests;
/// all per-run state lives in the [`ValidationContext`] each run creates.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    registry: Arc<PredicateRegistry>,
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator, rejecting rules the registry doesn't know
    pub fn new(schema: Schema, registry: impl Into<Arc<PredicateRegistry>>) -> SchemaResult<Self> {
        let registry = registry.into();
        if let Err(e) = schema.verify(&registry) {
            error!(error = %e, "Rejected validation schema");
            return Err(e);
        }
        Ok(Self {
            schema,
            registry,
            config: ValidatorConfig::default(),
        })
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    /// Validate one request.
    ///
    /// Members run strictly in declaration order and the run stops at the
    /// first failure. `alias` maps declared field names to the keys actually
    /// looked up in (and written back to) the namespaces.
    pub async fn validate<R>(
        &self,
        request: &R,
        alias: &AliasMap,
    ) -> Result<ValidationContext, ValidationError>
    where
        R: RequestParts + ?Sized,
    {
        let namespaces = Namespaces::from_request(request);
        let mut ctx = ValidationContext::new(namespaces.to_tree());

        debug!(members = self.schema.len(), "Starting validation run");

        for member in self.schema.members() {
            match member {
                Member::Check { name, check } => {
                    trace!(member = %name, "Running custom check");
                    self.run_check(name, check.as_ref(), ctx.data()).await?;
                }
                Member::Field { name, field } => {
                    let key = alias
                        .get(name)
                        .map(String::as_str)
                        .filter(|k| !k.is_empty())
                        .unwrap_or(name);
                    self.run_field(key, field, &namespaces, &mut ctx)?;
                }
            }
        }

        debug!(members = self.schema.len(), "Validation run passed");
        Ok(ctx)
    }

    fn run_field(
        &self,
        key: &str,
        field: &RuleField,
        namespaces: &Namespaces,
        ctx: &mut ValidationContext,
    ) -> Result<(), ValidationError> {
        let found = namespaces.find(key, self.config.presence);
        trace!(
            member = %key,
            namespace = found.map(|(ns, _)| ns.as_str()).unwrap_or("none"),
            "Resolving field"
        );

        let outcome = field
            .validate(found.map(|(_, value)| value), &self.registry, &self.config)
            .inspect_err(|e| error!(member = %key, error = %e, "Schema error during validation"))?;

        if !outcome.pass {
            let failure = match outcome.rule {
                Some(rule) => ParameterError::rule(key, rule, outcome.message),
                None => ParameterError::required(key, outcome.message),
            };
            debug!(member = %key, error = %failure, "Field failed validation");
            return Err(failure.into());
        }

        let legal_value = outcome.legal_value.unwrap_or(Value::Null);
        ctx.write_back(found.map(|(ns, _)| ns), key, legal_value);
        Ok(())
    }

    /// Await a custom check, converting an error or a panic into a failure
    async fn run_check(
        &self,
        name: &str,
        check: &dyn CustomCheck,
        data: &Value,
    ) -> Result<(), ValidationError> {
        let message = match AssertUnwindSafe(check.check(data)).catch_unwind().await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.message,
            Err(payload) => {
                error!(member = %name, "Custom check panicked");
                panic_message(payload.as_ref())
            }
        };

        let message = if message.is_empty() {
            self.config.fallback_message.clone()
        } else {
            message
        };
        debug!(member = %name, message = %message, "Custom check failed");
        Err(ParameterError::check(message).into())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    }
}
