//! Declarative request field validation
//!
//! A [`Schema`] declares named fields, each with an ordered chain of
//! [`Rule`]s, plus custom asynchronous checks. A [`Validator`] runs the schema
//! against the query, body, path and header namespaces of a request and
//! produces either a [`ValidationContext`] holding type-coerced values or the
//! first failure.
//!
//! # Examples
//!
//! ## Validating a request
//!
//! ```
//! use tollgate_validation::{AliasMap, Namespaces, PredicateRegistry, Rule, Schema, Validator};
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::new()
//!     .field("id", Rule::new("isInt", "must be an integer"))
//!     .field("page", vec![Rule::optional(1), Rule::new("isInt", "")]);
//! let validator = Validator::new(schema, PredicateRegistry::with_defaults()).unwrap();
//!
//! let request = Namespaces::new().with_path("id", "42");
//! let ctx = validator.validate(&request, &AliasMap::new()).await.unwrap();
//!
//! // Coerced in place, raw snapshot untouched
//! assert_eq!(ctx.get_as::<i64>("path.id"), Some(42));
//! assert_eq!(ctx.get_raw("path.id"), Some(&serde_json::json!("42")));
//!
//! // Missing optional fields surface their default
//! assert_eq!(ctx.get_as::<i64>("query.page"), Some(1));
//! # });
//! ```
//!
//! ## First failure
//!
//! ```
//! use tollgate_validation::{AliasMap, Namespaces, PredicateRegistry, Rule, Schema, Validator};
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::new()
//!     .field("email", Rule::new("isEmail", "must be a valid email"))
//!     .field("name", Rule::new("isLength", ""));
//! let validator = Validator::new(schema, PredicateRegistry::with_defaults()).unwrap();
//!
//! let request = Namespaces::new().with_body("email", "not-an-email");
//! let err = validator.validate(&request, &AliasMap::new()).await.unwrap_err();
//! assert_eq!(err.to_string(), "email must be a valid email");
//! # });
//! ```
//!
//! ## Custom predicates
//!
//! ```
//! use tollgate_validation::PredicateRegistry;
//!
//! let registry = PredicateRegistry::with_defaults()
//!     .with("isEven", |value, _params| value.parse::<i64>().is_ok_and(|n| n % 2 == 0))
//!     .unwrap();
//! assert_eq!(registry.call("isEven", "4", &[]), Ok(true));
//! ```

mod config;
mod context;
mod errors;
mod namespace;
pub mod path;
mod predicates;
mod rule;
mod schema;
mod validator;

pub use config::*;
pub use context::*;
pub use errors::*;
pub use namespace::*;
pub use predicates::*;
pub use rule::*;
pub use schema::*;
pub use validator::*;
