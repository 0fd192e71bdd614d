// Dotted-path access into JSON trees

use serde_json::{Map, Value};

/// Split a dotted path into its segments, skipping empty ones
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// Read the value at `segments`, descending through objects and arrays
pub fn get_path<'a, S: AsRef<str>>(root: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |node, segment| {
        let segment = segment.as_ref();
        match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Write `value` at `segments`, creating intermediate objects.
///
/// Non-object intermediates are replaced by objects. An empty path replaces
/// the root.
pub fn set_path<S: AsRef<str>>(root: &mut Value, segments: &[S], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for segment in parents {
        node = ensure_object(node)
            .entry(segment.as_ref())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(last.as_ref().to_string(), value);
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced by an object"),
    }
}
