// Recording predicates and custom checks

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tollgate_validation::{CheckError, CustomCheck, PredicateRegistry, SchemaResult};

type CallLog = Arc<Mutex<Vec<(String, String)>>>;

/// Records every predicate invocation as `(predicate name, value)`.
///
/// Useful for asserting that a rule chain stops at its first failure.
#[derive(Clone, Default)]
pub struct PredicateSpy {
    calls: CallLog,
}

impl PredicateSpy {
    /// Create a new spy
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recording predicate named `name` that answers with `accept`
    pub fn register<F>(
        &self,
        registry: &mut PredicateRegistry,
        name: &str,
        accept: F,
    ) -> SchemaResult<()>
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        let recorded = name.to_string();
        registry.register(name, move |value: &str, _params: &[Value]| {
            calls
                .lock()
                .unwrap()
                .push((recorded.clone(), value.to_string()));
            accept(value)
        })
    }

    /// Names of the predicates called, in order
    pub fn called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// All recorded calls
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Check if a predicate was called
    pub fn was_called(&self, name: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|(n, _)| n == name)
    }

    /// Clear all recorded calls
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Custom check that records the snapshots it sees and answers with a fixed result.
#[derive(Clone)]
pub struct MockCheck {
    seen: Arc<Mutex<Vec<Value>>>,
    failure: Option<String>,
}

impl MockCheck {
    /// A check that always passes
    pub fn passing() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// A check that always fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::passing()
        }
    }

    /// Get the number of times the check ran
    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Check if the check ran at least once
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Snapshot passed to the most recent run
    pub fn last_seen(&self) -> Option<Value> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CustomCheck for MockCheck {
    async fn check(&self, data: &Value) -> Result<(), CheckError> {
        self.seen.lock().unwrap().push(data.clone());
        match &self.failure {
            Some(message) => Err(CheckError::new(message.as_str())),
            None => Ok(()),
        }
    }
}
