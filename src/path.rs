//! Structural paths over a JSON value and their two textual renderings:
//! a JS-style accessor expression (`.a[0]["b c"]`) and a pointer (`/a/0/b c`).

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// One step of a structural path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathKey {
    Index(usize),
    Key(String),
}

impl PathKey {
    /// The array index this key addresses, if any. A `Key` holding a canonical
    /// decimal integer also counts, since tree views hand out indices as text.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathKey::Index(i) => Some(*i),
            PathKey::Key(k) => parse_canonical_index(k),
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Index(i) => write!(f, "{i}"),
            PathKey::Key(k) => f.write_str(k),
        }
    }
}

impl From<usize> for PathKey {
    fn from(i: usize) -> Self {
        PathKey::Index(i)
    }
}

impl From<&str> for PathKey {
    fn from(k: &str) -> Self {
        PathKey::Key(k.to_string())
    }
}

impl From<String> for PathKey {
    fn from(k: String) -> Self {
        PathKey::Key(k)
    }
}

/// Ordered sequence of keys from the document root. Root is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuralPath {
    keys: Vec<PathKey>,
}

impl StructuralPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[PathKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn push(&mut self, key: impl Into<PathKey>) {
        self.keys.push(key.into());
    }

    pub fn pop(&mut self) -> Option<PathKey> {
        self.keys.pop()
    }

    pub fn last(&self) -> Option<&PathKey> {
        self.keys.last()
    }

    /// New path with `key` appended; `self` is left as is.
    pub fn child(&self, key: impl Into<PathKey>) -> Self {
        let mut next = self.clone();
        next.push(key);
        next
    }

    /// Path of the parent node, `None` for root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.keys.split_last()?;
        Some(Self {
            keys: init.to_vec(),
        })
    }

    pub fn to_accessor(&self) -> String {
        to_accessor(self)
    }

    pub fn to_pointer(&self) -> String {
        to_pointer(self)
    }
}

impl From<Vec<PathKey>> for StructuralPath {
    fn from(keys: Vec<PathKey>) -> Self {
        Self { keys }
    }
}

impl FromIterator<PathKey> for StructuralPath {
    fn from_iter<I: IntoIterator<Item = PathKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StructuralPath {
    type Item = &'a PathKey;
    type IntoIter = std::slice::Iter<'a, PathKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Renders the accessor expression.
impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_accessor(self))
    }
}

/// Builds a [`StructuralPath`] from a list of keys: `path!["a", 0usize]`.
#[macro_export]
macro_rules! path {
    () => { $crate::path::StructuralPath::root() };
    ($($key:expr),+ $(,)?) => {
        $crate::path::StructuralPath::from(vec![$($crate::path::PathKey::from($key)),+])
    };
}

/// `.key` for identifiers, `[n]` for indices and `["..."]` for everything else.
/// Root renders as the empty string.
pub fn to_accessor(path: &StructuralPath) -> String {
    let mut out = String::new();
    for key in path {
        match key {
            PathKey::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            PathKey::Key(k) if is_identifier(k) => {
                out.push('.');
                out.push_str(k);
            }
            PathKey::Key(k) => {
                out.push_str("[\"");
                out.push_str(&k.replace('"', "\\\""));
                out.push_str("\"]");
            }
        }
    }
    out
}

/// Pointer form. Root renders as `/`.
pub fn to_pointer(path: &StructuralPath) -> String {
    if path.is_root() {
        return "/".to_string();
    }
    let body = path
        .keys()
        .iter()
        .map(|k| escape_token(&k.to_string()))
        .join("/");
    format!("/{body}")
}

/// Inverse of [`to_pointer`]. Tokens in canonical decimal form decode as
/// indices; everything else decodes as an object key.
pub fn parse_pointer(pointer: &str) -> Result<StructuralPath> {
    if pointer.is_empty() || pointer == "/" {
        return Ok(StructuralPath::root());
    }
    let Some(body) = pointer.strip_prefix('/') else {
        return Err(Error::Pointer(format!("`{pointer}` must start with `/`")));
    };
    Ok(body
        .split('/')
        .map(|token| {
            let key = unescape_token(token);
            match parse_canonical_index(&key) {
                Some(i) => PathKey::Index(i),
                None => PathKey::Key(key),
            }
        })
        .collect())
}

/// Path as shown in diff reports: accessor form without the leading dot,
/// `(root)` for the empty path.
pub fn display_path(path: &StructuralPath) -> String {
    let accessor = to_accessor(path);
    match accessor.strip_prefix('.') {
        Some(rest) => rest.to_string(),
        None if accessor.is_empty() => "(root)".to_string(),
        None => accessor,
    }
}

/// `^[A-Za-z_$][A-Za-z0-9_$]*$`
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn escape_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(s: &str) -> String {
    s.replace("~1", "/").replace("~0", "~")
}

fn parse_canonical_index(s: &str) -> Option<usize> {
    let canonical = s == "0"
        || (!s.is_empty() && !s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        s.parse().ok()
    } else {
        None
    }
}
