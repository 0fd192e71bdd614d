// Request input namespaces

use crate::config::Presence;
use serde_json::{Map, Value};
use std::fmt;

/// One of the four input sources a field may be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Query,
    Body,
    Path,
    Header,
}

impl Namespace {
    /// Lookup order used when resolving a field
    pub const PRECEDENCE: [Namespace; 4] = [
        Namespace::Query,
        Namespace::Body,
        Namespace::Path,
        Namespace::Header,
    ];

    /// Key of this namespace in the snapshot tree
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Query => "query",
            Namespace::Body => "body",
            Namespace::Path => "path",
            Namespace::Header => "header",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability of a host request object: expose its four input namespaces.
///
/// Bodies are expected to be decoded already; a body that isn't a JSON object
/// should be exposed as an empty map.
pub trait RequestParts {
    /// Query string parameters
    fn query(&self) -> Map<String, Value>;

    /// Decoded body payload
    fn body(&self) -> Map<String, Value>;

    /// Route path parameters
    fn path_params(&self) -> Map<String, Value>;

    /// Header values
    fn headers(&self) -> Map<String, Value>;
}

/// The four namespaces of one request, assembled and owned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespaces {
    pub query: Map<String, Value>,
    pub body: Map<String, Value>,
    pub path: Map<String, Value>,
    pub header: Map<String, Value>,
}

impl Namespaces {
    /// Create empty namespaces
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the namespaces of a request. Header names are lower-cased.
    pub fn from_request<R: RequestParts + ?Sized>(request: &R) -> Self {
        Self {
            query: request.query(),
            body: request.body(),
            path: request.path_params(),
            header: request
                .headers()
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a body entry
    pub fn with_body(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Add a path parameter
    pub fn with_path(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.path.insert(key.into(), value.into());
        self
    }

    /// Add a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }

    /// Get one namespace
    pub fn get(&self, namespace: Namespace) -> &Map<String, Value> {
        match namespace {
            Namespace::Query => &self.query,
            Namespace::Body => &self.body,
            Namespace::Path => &self.path,
            Namespace::Header => &self.header,
        }
    }

    /// Find the first namespace, in precedence order, holding a present value for `key`
    pub fn find(&self, key: &str, presence: Presence) -> Option<(Namespace, &Value)> {
        Namespace::PRECEDENCE.into_iter().find_map(|ns| {
            self.get(ns)
                .get(key)
                .filter(|value| presence.is_present(value))
                .map(|value| (ns, value))
        })
    }

    /// Snapshot tree `{query, body, path, header}`
    pub fn to_tree(&self) -> Value {
        let mut tree = Map::new();
        for ns in Namespace::PRECEDENCE {
            tree.insert(ns.as_str().to_string(), Value::Object(self.get(ns).clone()));
        }
        Value::Object(tree)
    }
}

impl RequestParts for Namespaces {
    fn query(&self) -> Map<String, Value> {
        self.query.clone()
    }

    fn body(&self) -> Map<String, Value> {
        self.body.clone()
    }

    fn path_params(&self) -> Map<String, Value> {
        self.path.clone()
    }

    fn headers(&self) -> Map<String, Value> {
        self.header.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence_order() {
        let ns = Namespaces::new()
            .with_header("id", "h")
            .with_path("id", "p")
            .with_body("id", "b")
            .with_query("id", "q");
        assert_eq!(ns.find("id", Presence::Truthy), Some((Namespace::Query, &json!("q"))));
    }

    #[test]
    fn test_falsy_values_fall_through() {
        let ns = Namespaces::new()
            .with_query("flag", 0)
            .with_body("flag", "7");
        assert_eq!(ns.find("flag", Presence::Truthy), Some((Namespace::Body, &json!("7"))));
        assert_eq!(ns.find("flag", Presence::Strict), Some((Namespace::Query, &json!(0))));
    }

    #[test]
    fn test_missing_everywhere() {
        let ns = Namespaces::new().with_query("other", "x");
        assert_eq!(ns.find("id", Presence::Truthy), None);
    }

    #[test]
    fn test_header_names_lowercased() {
        let raw = Namespaces::new().with_header("X-Token", "abc");
        let ns = Namespaces::from_request(&raw);
        assert_eq!(ns.header.get("x-token"), Some(&json!("abc")));
        assert!(ns.header.get("X-Token").is_none());
    }

    #[test]
    fn test_to_tree() {
        let tree = Namespaces::new().with_path("id", "3").to_tree();
        assert_eq!(tree, json!({"query": {}, "body": {}, "path": {"id": "3"}, "header": {}}));
    }
}
