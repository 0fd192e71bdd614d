// Test request builder

use serde_json::{Map, Value};
use tollgate_validation::{Namespaces, RequestParts};

/// In-memory request exposing the four input namespaces.
///
/// The query string of the uri is parsed like a real server would: values
/// are strings, and a key repeated in the query string yields an array.
#[derive(Debug, Clone, Default)]
pub struct TestRequest {
    method: String,
    path: String,
    query: Map<String, Value>,
    body: Vec<u8>,
    headers: Map<String, Value>,
    path_params: Map<String, Value>,
}

impl TestRequest {
    /// Create a request for `uri`, which may carry a query string
    pub fn new(method: &str, uri: &str) -> Self {
        let (path, query_string) = uri.split_once('?').unwrap_or((uri, ""));
        Self {
            method: method.to_uppercase(),
            path: path.to_string(),
            query: parse_query_string(query_string),
            ..Self::default()
        }
    }

    /// Create a GET request
    pub fn get(uri: &str) -> Self {
        Self::new("GET", uri)
    }

    /// Create a POST request
    pub fn post(uri: &str) -> Self {
        Self::new("POST", uri)
    }

    /// Create a PUT request
    pub fn put(uri: &str) -> Self {
        Self::new("PUT", uri)
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.query.insert(key.to_string(), value.into());
        self
    }

    /// Add a header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a route path parameter
    pub fn with_path_param(mut self, key: &str, value: &str) -> Self {
        self.path_params
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Set a JSON body
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = body.to_string().into_bytes();
        self
    }

    /// Set raw body bytes
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Assemble the namespaces a validator would see
    pub fn namespaces(&self) -> Namespaces {
        Namespaces::from_request(self)
    }
}

impl RequestParts for TestRequest {
    fn query(&self) -> Map<String, Value> {
        self.query.clone()
    }

    // Anything but a JSON object decodes to an empty body
    fn body(&self) -> Map<String, Value> {
        match serde_json::from_slice(&self.body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    fn path_params(&self) -> Map<String, Value> {
        self.path_params.clone()
    }

    fn headers(&self) -> Map<String, Value> {
        self.headers.clone()
    }
}

/// Parse a query string into a map of parameters
fn parse_query_string(query: &str) -> Map<String, Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
    let mut params = Map::new();
    for (key, value) in pairs {
        match params.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                params.insert(key, Value::String(value));
            }
        }
    }
    params
}
