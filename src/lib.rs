// Tollgate - Declarative request validation for Rust
//
// This library validates the query, body, path and header fields of a request
// against rule chains, coerces passing values and runs async custom checks.

// Re-export the validation engine
pub use tollgate_validation::*;

// Re-export optional crates
#[cfg(feature = "testing")]
pub use tollgate_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AliasMap,
        CheckError,
        CustomCheck,
        Namespaces,
        ParameterError,
        PredicateRegistry,
        RequestParts,
        Rule,
        Schema,
        ValidationContext,
        ValidationError,
        Validator,
        ValidatorConfig,
        check_fn,
    };
    pub use async_trait::async_trait;
}
