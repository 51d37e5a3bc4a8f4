//! Path-addressed traversal for tree views.
//!
//! Rendering and expansion state belong to the caller. This module only looks
//! nodes up, lists children one level at a time, and produces edited copies.

use serde_json::Value;

use crate::errors::{Error, Result};
use crate::path::{PathKey, StructuralPath};

/// Node addressed by `path`. An `Index` key, or a `Key` holding a canonical
/// integer, addresses array elements; any key addresses object members by its
/// text.
pub fn lookup<'a>(root: &'a Value, path: &StructuralPath) -> Option<&'a Value> {
    path.keys().iter().try_fold(root, |node, key| match node {
        Value::Object(map) => map.get(key.to_string().as_str()),
        Value::Array(arr) => arr.get(key.as_index()?),
        _ => None,
    })
}

fn lookup_mut<'a>(root: &'a mut Value, path: &StructuralPath) -> Option<&'a mut Value> {
    path.keys().iter().try_fold(root, |node, key| match node {
        Value::Object(map) => map.get_mut(key.to_string().as_str()),
        Value::Array(arr) => arr.get_mut(key.as_index()?),
        _ => None,
    })
}

/// Copy of the subtree at `path`.
pub fn extract(root: &Value, path: &StructuralPath) -> Result<Value> {
    lookup(root, path)
        .cloned()
        .ok_or_else(|| Error::Path(path.to_pointer()))
}

/// A new document without the node at `path`. Array elements are spliced
/// out, object members deleted with the remaining key order kept. The root
/// itself cannot be removed.
pub fn remove(root: &Value, path: &StructuralPath) -> Result<Value> {
    let missing = || Error::Path(path.to_pointer());
    let parent_path = path.parent().ok_or_else(missing)?;
    let last = path.last().ok_or_else(missing)?;

    let mut doc = root.clone();
    match lookup_mut(&mut doc, &parent_path).ok_or_else(missing)? {
        Value::Array(arr) => {
            let idx = last
                .as_index()
                .filter(|i| *i < arr.len())
                .ok_or_else(missing)?;
            arr.remove(idx);
        }
        Value::Object(map) => {
            map.shift_remove(last.to_string().as_str())
                .ok_or_else(missing)?;
        }
        _ => return Err(missing()),
    }
    Ok(doc)
}

/// Direct children of a container node, in document order.
pub fn children(node: &Value) -> Vec<(PathKey, &Value)> {
    match node {
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| (PathKey::Index(i), v))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (PathKey::Key(k.clone()), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Stable string form of a path, suitable for an "expanded paths" set:
/// the path as a compact JSON array, e.g. `["a",0]`.
pub fn path_key(path: &StructuralPath) -> String {
    let items = path
        .keys()
        .iter()
        .map(|k| match k {
            PathKey::Index(i) => Value::from(*i),
            PathKey::Key(s) => Value::String(s.clone()),
        })
        .collect();
    Value::Array(items).to_string()
}

/// [`path_key`] of every object and array node, in pre-order.
pub fn container_paths(root: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_containers(root, &mut StructuralPath::root(), &mut out);
    out
}

fn collect_containers(node: &Value, path: &mut StructuralPath, out: &mut Vec<String>) {
    if !matches!(node, Value::Array(_) | Value::Object(_)) {
        return;
    }
    out.push(path_key(path));
    for (key, child) in children(node) {
        path.push(key);
        collect_containers(child, path, out);
        path.pop();
    }
}
