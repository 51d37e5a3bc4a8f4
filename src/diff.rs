//! Structural comparison of two JSON values.

use itertools::{EitherOrBoth, Itertools};
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;

use crate::document::kind_of;
use crate::path::{display_path, StructuralPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
}

/// One difference. `Added` carries only `new_value`, `Removed` only
/// `old_value`, `Modified` both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    pub kind: DiffKind,
    pub path: StructuralPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl DiffEntry {
    pub fn added(path: StructuralPath, value: Value) -> Self {
        Self {
            kind: DiffKind::Added,
            path,
            old_value: None,
            new_value: Some(value),
        }
    }

    pub fn removed(path: StructuralPath, value: Value) -> Self {
        Self {
            kind: DiffKind::Removed,
            path,
            old_value: Some(value),
            new_value: None,
        }
    }

    pub fn modified(path: StructuralPath, old: Value, new: Value) -> Self {
        Self {
            kind: DiffKind::Modified,
            path,
            old_value: Some(old),
            new_value: Some(new),
        }
    }
}

/// Differences between `a` (old) and `b` (new), in pre-order over the union of
/// both structures. Object keys come in `a`'s order followed by keys only `b`
/// has; arrays are compared index by index. `null` counts as absent.
pub fn compare(a: &Value, b: &Value) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    compare_at(&mut StructuralPath::root(), a, b, &mut out);
    debug!(entries = out.len(), "compared documents");
    out
}

fn compare_at(path: &mut StructuralPath, a: &Value, b: &Value, out: &mut Vec<DiffEntry>) {
    match (a, b) {
        (Value::Null, Value::Null) => {}
        (Value::Null, _) => out.push(DiffEntry::added(path.clone(), b.clone())),
        (_, Value::Null) => out.push(DiffEntry::removed(path.clone(), a.clone())),
        (Value::Array(xs), Value::Array(ys)) => {
            for (i, pair) in xs.iter().zip_longest(ys.iter()).enumerate() {
                match pair {
                    EitherOrBoth::Both(x, y) => {
                        path.push(i);
                        compare_at(path, x, y, out);
                        path.pop();
                    }
                    EitherOrBoth::Left(x) => out.push(DiffEntry::removed(path.child(i), x.clone())),
                    EitherOrBoth::Right(y) => out.push(DiffEntry::added(path.child(i), y.clone())),
                }
            }
        }
        (Value::Object(xm), Value::Object(ym)) => {
            let keys = xm.keys().chain(ym.keys().filter(|k| !xm.contains_key(*k)));
            for key in keys {
                match (xm.get(key), ym.get(key)) {
                    (Some(x), Some(y)) => {
                        path.push(key.as_str());
                        compare_at(path, x, y, out);
                        path.pop();
                    }
                    (Some(x), None) => {
                        out.push(DiffEntry::removed(path.child(key.as_str()), x.clone()))
                    }
                    (None, Some(y)) => {
                        out.push(DiffEntry::added(path.child(key.as_str()), y.clone()))
                    }
                    (None, None) => {}
                }
            }
        }
        _ if kind_of(a) != kind_of(b) => {
            out.push(DiffEntry::modified(path.clone(), a.clone(), b.clone()))
        }
        (Value::Number(x), Value::Number(y)) => {
            if !numbers_equal(x, y) {
                out.push(DiffEntry::modified(path.clone(), a.clone(), b.clone()));
            }
        }
        _ => {
            if a != b {
                out.push(DiffEntry::modified(path.clone(), a.clone(), b.clone()));
            }
        }
    }
}

/// `1` and `1.0` are the same number; integers compare exactly.
fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(i), Some(j)) = (x.as_i64(), y.as_i64()) {
        return i == j;
    }
    if let (Some(i), Some(j)) = (x.as_u64(), y.as_u64()) {
        return i == j;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(i), Some(j)) => i == j,
        _ => x == y,
    }
}

/// Human-readable report, one line per entry:
/// `+ path: value`, `- path: value`, `~ path: old → new`.
pub fn format_report(entries: &[DiffEntry]) -> String {
    if entries.is_empty() {
        return "No differences found.".to_string();
    }
    entries
        .iter()
        .map(|e| {
            let path = display_path(&e.path);
            let old = e.old_value.as_ref().unwrap_or(&Value::Null);
            let new = e.new_value.as_ref().unwrap_or(&Value::Null);
            match e.kind {
                DiffKind::Added => format!("+ {path}: {}", format_value(new)),
                DiffKind::Removed => format!("- {path}: {}", format_value(old)),
                DiffKind::Modified => {
                    format!("~ {path}: {} → {}", format_value(old), format_value(new))
                }
            }
        })
        .join("\n")
}

fn format_value(v: &Value) -> String {
    match v {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDiff {
    pub kind: LineKind,
    /// 1-based.
    pub line_num: usize,
    pub content: String,
}

/// Positional line comparison. A changed line yields `Removed` then `Added`.
pub fn line_diff(a: &str, b: &str) -> Vec<LineDiff> {
    let line = |kind, i: usize, content: &str| LineDiff {
        kind,
        line_num: i + 1,
        content: content.to_string(),
    };
    let mut out = Vec::new();
    for (i, pair) in a.split('\n').zip_longest(b.split('\n')).enumerate() {
        match pair {
            EitherOrBoth::Both(x, y) if x == y => out.push(line(LineKind::Unchanged, i, x)),
            EitherOrBoth::Both(x, y) => {
                out.push(line(LineKind::Removed, i, x));
                out.push(line(LineKind::Added, i, y));
            }
            EitherOrBoth::Left(x) => out.push(line(LineKind::Removed, i, x)),
            EitherOrBoth::Right(y) => out.push(line(LineKind::Added, i, y)),
        }
    }
    out
}
