use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::context::Options;
use crate::diff::{self, DiffEntry};
use crate::document;
use crate::errors::Result;
use crate::path::StructuralPath;
use crate::query;
use crate::resolver;

/// =========================
/// Text-in helpers
/// =========================

/// A resolved cursor path with both display renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathDisplay {
    pub path: StructuralPath,
    pub accessor: String,
    pub pointer: String,
}

impl From<StructuralPath> for PathDisplay {
    fn from(path: StructuralPath) -> Self {
        Self {
            accessor: path.to_accessor(),
            pointer: path.to_pointer(),
            path,
        }
    }
}

/// Path under the cursor at char `offset` of `text`.
pub fn path_at(text: &str, offset: usize) -> PathDisplay {
    resolver::resolve(text, offset).into()
}

/// Parse both texts and compare them.
pub fn compare_texts(old: &str, new: &str) -> Result<Vec<DiffEntry>> {
    let a = document::parse(old)?;
    let b = document::parse(new)?;
    Ok(diff::compare(&a, &b))
}

/// Run `expr` against the JSON in `text`. The expression is compiled before
/// the document is parsed, so a bad query is reported even for bad JSON.
pub fn query_text(text: &str, expr: &str) -> Result<Vec<Value>> {
    let q = query::compile(expr)?;
    let data = document::parse(text)?;
    Ok(q.evaluate(&data).into_iter().cloned().collect())
}

/// =========================
/// Result post-processing
/// =========================

/// First element, or null.
pub fn first(vals: &[Value]) -> Value {
    vals.first().cloned().unwrap_or(Value::Null)
}

/// Deduplicate by compact serialization, keeping first occurrences.
pub fn unique(vals: &[Value]) -> Vec<Value> {
    vals.iter()
        .unique_by(|x| x.to_string())
        .cloned()
        .collect()
}

/// `[default]` when `vals` is empty, else `vals`.
pub fn or_default(vals: Vec<Value>, default: &Value) -> Vec<Value> {
    if vals.is_empty() {
        vec![default.clone()]
    } else {
        vals
    }
}

/// Operations bound to a set of [`Options`].
#[derive(Debug, Clone, Default)]
pub struct Workbench {
    options: Options,
}

impl Workbench {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Like [`query_text`], with the configured default substituted for an
    /// empty result.
    pub fn query(&self, text: &str, expr: &str) -> Result<Vec<Value>> {
        let out = query_text(text, expr)?;
        debug!(expr, matches = out.len(), "query finished");
        Ok(match &self.options.default {
            Some(default) => or_default(out, default),
            None => out,
        })
    }

    pub fn format(&self, text: &str) -> Result<String> {
        let mut value = document::parse(text)?;
        if self.options.sort_keys {
            value = document::sort_keys(&value);
        }
        document::to_pretty(&value, self.options.indent)
    }

    pub fn suggest(&self, text: &str, partial: &str) -> Result<Vec<String>> {
        let data = document::parse(text)?;
        Ok(query::suggestions(&data, partial, self.options.suggestion_limit))
    }
}
