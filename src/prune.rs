//! Recursive pruning of absent values from a manifest tree.
//!
//! Manifest builders emit every key they know about and use `null` for
//! anything the caller did not supply. Pruning then removes those holes so the
//! published document only carries what was actually provided:
//!
//! - `null`, `[]` and `{}` are **vacant** and get dropped from their parent.
//! - A container that ends up with nothing in it becomes vacant itself, so
//!   emptiness collapses upward until it hits a container with real content.
//! - Scalars are never vacant. `0`, `false` and `""` are kept as-is.
//!
//! ```text
//! {"seeAlso": [null], "label": {"en": ["X"]}, "summary": null}
//!   → {"label": {"en": ["X"]}}
//! ```
//!
//! Pruning is idempotent: a pruned tree has no vacant node left to remove.

use serde_json::{Map, Value};

/// True for nodes that pruning removes from their parent: `null`, `[]`, `{}`.
pub fn is_vacant(node: &Value) -> bool {
    match node {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Prune a tree bottom-up. Returns `Value::Null` when the whole node collapses.
pub fn prune(node: Value) -> Value {
    match node {
        Value::Array(items) => {
            let kept: Vec<Value> = items
                .into_iter()
                .map(prune)
                .filter(|item| !is_vacant(item))
                .collect();
            if kept.is_empty() {
                Value::Null
            } else {
                Value::Array(kept)
            }
        }
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, prune(value)))
                .filter(|(_, value)| !is_vacant(value))
                .collect();
            if kept.is_empty() {
                Value::Null
            } else {
                Value::Object(kept)
            }
        }
        scalar => scalar,
    }
}

/// Shallow merge of two objects, `overlay` winning on key collisions.
///
/// Keys already in `base` keep their position; keys only in `overlay` are
/// appended in overlay order. Nested objects are replaced, not merged.
/// A non-object `base` is treated as empty; a non-object `overlay` replaces
/// `base` entirely.
pub fn merge_shallow(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (Value::Null, Value::Object(overlay)) => Value::Object(overlay),
        (_, overlay) => overlay,
    }
}
