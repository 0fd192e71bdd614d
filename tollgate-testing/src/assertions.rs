// Test assertions for validation results

use tollgate_validation::{FailureKind, ParameterError, ValidationContext, ValidationError};

fn parameter_error(result: &Result<ValidationContext, ValidationError>) -> &ParameterError {
    match result {
        Ok(ctx) => panic!("Expected a validation failure, got {:?}", ctx.parsed()),
        Err(ValidationError::Parameter(err)) => err,
        Err(other) => panic!("Expected a parameter error, got '{}'", other),
    }
}

/// Assert that a run passed and return its context
pub fn assert_valid(result: Result<ValidationContext, ValidationError>) -> ValidationContext {
    match result {
        Ok(ctx) => ctx,
        Err(err) => panic!("Expected validation to pass, got '{}'", err),
    }
}

/// Assert that a run failed because `field` was missing
pub fn assert_required(result: &Result<ValidationContext, ValidationError>, field: &str) {
    let err = parameter_error(result);
    assert_eq!(
        (err.field.as_str(), &err.kind),
        (field, &FailureKind::Required),
        "Expected '{}' to be reported missing, got '{}'",
        field,
        err
    );
}

/// Assert that a run failed on `rule` of `field`
pub fn assert_rule_failure(
    result: &Result<ValidationContext, ValidationError>,
    field: &str,
    rule: &str,
) {
    let err = parameter_error(result);
    let expected = FailureKind::Rule {
        rule: rule.to_string(),
    };
    assert_eq!(
        (err.field.as_str(), &err.kind),
        (field, &expected),
        "Expected '{}' to fail '{}', got '{}'",
        field,
        rule,
        err
    );
}

/// Assert that a run failed in a custom check with `message`
pub fn assert_check_failure(result: &Result<ValidationContext, ValidationError>, message: &str) {
    let err = parameter_error(result);
    assert_eq!(err.kind, FailureKind::Check, "Expected a check failure, got '{}'", err);
    assert_eq!(err.message, message);
}

/// Assert the message of a failed run
pub fn assert_message(result: &Result<ValidationContext, ValidationError>, expected: &str) {
    let err = parameter_error(result);
    assert_eq!(
        err.to_string(),
        expected,
        "Expected message '{}', got '{}'",
        expected,
        err
    );
}
