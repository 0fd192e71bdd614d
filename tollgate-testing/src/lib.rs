//! Testing utilities for Tollgate validators.
//!
//! ## Features
//!
//! - **TestRequest** - In-memory request with query string, JSON body, headers and path params
//! - **PredicateSpy** - Records predicate calls to observe rule-chain short-circuiting
//! - **MockCheck** - Custom check with a fixed result that records what it saw
//! - **Assertions** - Assertions over validation outcomes
//!
//! ## Quick Start
//!
//! ```
//! use tollgate_testing::*;
//! use tollgate_validation::{AliasMap, PredicateRegistry, Rule, Schema, Validator};
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::new().field("page", Rule::new("isInt", "must be a number"));
//! let validator = Validator::new(schema, PredicateRegistry::with_defaults()).unwrap();
//!
//! let request = TestRequest::get("/items?page=two");
//! let result = validator.validate(&request, &AliasMap::new()).await;
//! assert_rule_failure(&result, "page", "isInt");
//! # });
//! ```

mod assertions;
mod mock;
mod request;

pub use assertions::*;
pub use mock::*;
pub use request::*;
