//! Pure JSON tree operations shared by the store adapters.
//!
//! Empty objects are never stored: removing the last child of a node removes
//! the node too, matching how hosted JSON trees behave.

use serde_json::{Map, Value};

pub(super) fn is_empty_node(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Drop nulls and empty objects recursively.
pub(super) fn normalise(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, normalise(child)))
                .filter(|(_, child)| !is_empty_node(child))
                .collect(),
        ),
        other => other,
    }
}

pub(super) fn node<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |current, segment| current.as_object()?.get(segment))
}

/// Write `value` at `segments`, creating or overwriting intermediate nodes.
/// A null or empty value removes the node and prunes emptied ancestors.
pub(super) fn write(current: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *current = if is_empty_node(&value) {
            Value::Object(Map::new())
        } else {
            value
        };
        return;
    };
    if !current.is_object() {
        if is_empty_node(&value) {
            return;
        }
        *current = Value::Object(Map::new());
    }
    let Value::Object(map) = current else {
        return;
    };
    if rest.is_empty() {
        if is_empty_node(&value) {
            map.remove(head);
        } else {
            map.insert(head.clone(), value);
        }
        return;
    }
    let child = map.entry(head.clone()).or_insert(Value::Null);
    write(child, rest, value);
    if is_empty_node(child) {
        map.remove(head);
    }
}

/// Every non-object value beneath `value`, keyed by its segments relative to
/// `value`. A scalar or array yields itself under no segments.
pub(super) fn leaves(value: &Value) -> Vec<(Vec<String>, &Value)> {
    fn walk<'a>(value: &'a Value, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, &'a Value)>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    prefix.push(key.clone());
                    walk(child, prefix, out);
                    prefix.pop();
                }
            }
            Value::Null => {}
            leaf => out.push((prefix.clone(), leaf)),
        }
    }

    let mut out = Vec::new();
    walk(value, &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn segments(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|segment| (*segment).to_owned()).collect()
    }

    #[rstest]
    fn writing_beneath_a_scalar_replaces_it_with_an_object() {
        let mut root = json!({"a": 1});
        write(&mut root, &segments(&["a", "b"]), json!(2));
        assert_eq!(root, json!({"a": {"b": 2}}));
    }

    #[rstest]
    fn leaves_flatten_nested_objects_and_keep_arrays_whole() {
        let value = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x"});
        let mut flat: Vec<_> = leaves(&value)
            .into_iter()
            .map(|(path, leaf)| (path.join("/"), leaf.clone()))
            .collect();
        flat.sort_by(|(a, _), (b, _)| a.cmp(b));
        assert_eq!(
            flat,
            vec![
                ("a/b".to_owned(), json!(1)),
                ("a/c".to_owned(), json!([1, 2])),
                ("d".to_owned(), json!("x")),
            ]
        );
        assert_eq!(leaves(&json!(true)), vec![(Vec::new(), &json!(true))]);
    }
}
