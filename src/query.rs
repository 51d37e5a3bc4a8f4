//! JSONPath-subset queries: `$.a.b`, `$..key`, `[*]`, `[n]`, `[a:b]`, `['key']`.
//!
//! An expression compiles into a flat list of [`QueryToken`]s which are then
//! applied left to right to a result set that starts as `[root]`.

use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, trace};

use crate::errors::QueryError;
use crate::parser::Parser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// `.foo`, `['foo']`, `[foo]`
    Key(String),
    /// `[0]`, `[-1]`
    Index(i64),
    /// `.*` or `[*]`
    Wildcard,
    /// `[start:end]`
    Slice {
        start: Option<i64>,
        end: Option<i64>,
    },
    /// `..foo`
    Recursive(String),
}

/// A compiled expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<QueryToken>,
}

impl Query {
    pub fn compile(expr: &str) -> Result<Self, QueryError> {
        compile(expr)
    }

    pub fn tokens(&self) -> &[QueryToken] {
        &self.tokens
    }

    pub fn evaluate<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        evaluate(&self.tokens, root)
    }
}

impl From<Vec<QueryToken>> for Query {
    fn from(tokens: Vec<QueryToken>) -> Self {
        Self { tokens }
    }
}

/// Tokenize `expr`. `""` and `"$"` compile to the empty token list.
pub fn compile(expr: &str) -> Result<Query, QueryError> {
    let tokens = tokenize(expr.trim())?;
    debug!(expr, tokens = tokens.len(), "compiled query");
    Ok(Query { tokens })
}

/// Compile and run in one step.
pub fn query<'a>(root: &'a Value, expr: &str) -> Result<Vec<&'a Value>, QueryError> {
    Ok(compile(expr)?.evaluate(root))
}

fn tokenize(expr: &str) -> Result<Vec<QueryToken>, QueryError> {
    let mut p = Parser::new(expr);
    let mut tokens = Vec::new();
    p.consume_char('$');

    while !p.eof() {
        if p.consume_char('.') {
            if p.consume_char('.') {
                tokens.push(QueryToken::Recursive(p.read_key().to_string()));
            } else if p.consume_char('*') {
                tokens.push(QueryToken::Wildcard);
            } else {
                tokens.push(QueryToken::Key(p.read_key().to_string()));
            }
            continue;
        }
        if p.peek_char() == Some('[') {
            tokens.push(read_bracket(&mut p)?);
            continue;
        }
        // Bare word with no `.`/`[` prefix.
        tokens.push(QueryToken::Key(p.read_key().to_string()));
    }
    Ok(tokens)
}

fn read_bracket(p: &mut Parser<'_>) -> Result<QueryToken, QueryError> {
    let start = p.pos();
    p.consume_char('[');
    p.skip_ws();

    if matches!(p.peek_char(), Some('\'') | Some('"')) {
        let key = p.parse_quoted_string()?;
        p.skip_ws();
        if p.consume_char(']') {
            return Ok(QueryToken::Key(key));
        }
        return match p.capture_until(']') {
            Some(_) => {
                p.consume_char(']');
                Err(QueryError::TrailingText(p.fragment_from(start).into()))
            }
            None => Err(QueryError::UnterminatedBracket(p.tail_from(start).into())),
        };
    }

    let Some(content) = p.capture_until(']') else {
        return Err(QueryError::UnterminatedBracket(p.tail_from(start).into()));
    };
    p.consume_char(']');
    let content = content.trim();

    if content.is_empty() {
        return Err(QueryError::EmptyBrackets(p.fragment_from(start).into()));
    }
    if content == "*" {
        return Ok(QueryToken::Wildcard);
    }
    if content.contains(':') {
        let parts: Vec<&str> = content.split(':').collect();
        if parts.len() > 2 {
            return Err(QueryError::SliceComponents(p.fragment_from(start).into()));
        }
        let parse_bound = |s: &str| -> Result<Option<i64>, QueryError> {
            let t = s.trim();
            if t.is_empty() {
                Ok(None)
            } else {
                t.parse::<i64>()
                    .map(Some)
                    .map_err(|_| QueryError::BadSliceBound(t.to_string()))
            }
        };
        return Ok(QueryToken::Slice {
            start: parse_bound(parts[0])?,
            end: parse_bound(parts[1])?,
        });
    }
    if let Ok(n) = content.parse::<i64>() {
        return Ok(QueryToken::Index(n));
    }
    Ok(QueryToken::Key(content.to_string()))
}

/// Apply `tokens` to `root`. Items a token does not apply to are dropped.
pub fn evaluate<'a>(tokens: &[QueryToken], root: &'a Value) -> Vec<&'a Value> {
    let mut current: Vec<&Value> = vec![root];
    for token in tokens {
        current = match token {
            QueryToken::Key(k) => current
                .into_iter()
                .filter_map(|v| v.as_object().and_then(|map| map.get(k)))
                .collect(),
            QueryToken::Index(i) => current
                .into_iter()
                .filter_map(|v| match v {
                    Value::Array(arr) => index_array(arr, *i),
                    _ => None,
                })
                .collect(),
            QueryToken::Wildcard => current
                .into_iter()
                .flat_map(|v| match v {
                    Value::Array(arr) => arr.iter().collect(),
                    Value::Object(map) => map.values().collect(),
                    _ => Vec::new(),
                })
                .collect(),
            QueryToken::Slice { start, end } => current
                .into_iter()
                .flat_map(|v| match v {
                    Value::Array(arr) => slice_array(arr, *start, *end),
                    _ => &[][..],
                })
                .collect(),
            QueryToken::Recursive(k) => current
                .into_iter()
                .flat_map(|v| {
                    let mut out = Vec::new();
                    recurse_collect(v, k, &mut out);
                    out
                })
                .collect(),
        };
        trace!(?token, matches = current.len(), "applied token");
    }
    current
}

fn index_array(arr: &[Value], i: i64) -> Option<&Value> {
    let idx = if i < 0 {
        i.checked_add(arr.len() as i64)?
    } else {
        i
    };
    usize::try_from(idx).ok().and_then(|idx| arr.get(idx))
}

/// Half-open slice; negative bounds count from the end, both are clamped.
fn slice_array(arr: &[Value], start: Option<i64>, end: Option<i64>) -> &[Value] {
    let n = arr.len() as i64;
    let norm = |i: i64| -> usize {
        if i < 0 {
            (n + i).max(0) as usize
        } else {
            i.min(n) as usize
        }
    };
    let lo = norm(start.unwrap_or(0));
    let hi = norm(end.unwrap_or(n));
    if lo >= hi {
        &[]
    } else {
        &arr[lo..hi]
    }
}

/// Pre-order: `v` itself first, then its descendants.
fn recurse_collect<'a>(v: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match v {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                out.push(found);
            }
            for child in map.values() {
                recurse_collect(child, key, out);
            }
        }
        Value::Array(arr) => {
            for elt in arr {
                recurse_collect(elt, key, out);
            }
        }
        _ => {}
    }
}

/// Completion candidates for a partially typed expression: the keys (`.name`)
/// or index forms (`[0]`, `[*]`) available under the expression's parent.
pub fn suggestions(root: &Value, partial: &str, limit: usize) -> Vec<String> {
    let parent = match partial.rfind(['.', '[']) {
        Some(i) if i > 0 => &partial[..i],
        _ => "$",
    };
    let Ok(parent_query) = compile(parent) else {
        return Vec::new();
    };
    parent_query
        .evaluate(root)
        .into_iter()
        .flat_map(|v| match v {
            Value::Array(_) => vec!["[0]".to_string(), "[*]".to_string()],
            Value::Object(map) => map.keys().map(|k| format!(".{k}")).collect(),
            _ => Vec::new(),
        })
        .unique()
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({"a": {"b": [10, 20, 30]}})
    }

    fn run(expr: &str, data: &Value) -> Vec<Value> {
        query(data, expr).unwrap().into_iter().cloned().collect()
    }

    #[test]
    fn root_expressions() {
        let data = sample();
        assert_eq!(run("", &data), vec![data.clone()]);
        assert_eq!(run("$", &data), vec![data.clone()]);
        assert_eq!(run("  $ ", &data), vec![data.clone()]);
    }

    #[test]
    fn tokenizes_every_form() {
        let q = compile("$.a..b.*[*][2][-1][1:3][:2][2:]['x y'][\"z\"][bare]").unwrap();
        assert_eq!(
            q.tokens(),
            &[
                QueryToken::Key("a".into()),
                QueryToken::Recursive("b".into()),
                QueryToken::Wildcard,
                QueryToken::Wildcard,
                QueryToken::Index(2),
                QueryToken::Index(-1),
                QueryToken::Slice {
                    start: Some(1),
                    end: Some(3),
                },
                QueryToken::Slice {
                    start: None,
                    end: Some(2),
                },
                QueryToken::Slice {
                    start: Some(2),
                    end: None,
                },
                QueryToken::Key("x y".into()),
                QueryToken::Key("z".into()),
                QueryToken::Key("bare".into()),
            ]
        );
    }

    #[test]
    fn bare_leading_word_is_a_key() {
        let q = compile("a.b").unwrap();
        assert_eq!(
            q.tokens(),
            &[QueryToken::Key("a".into()), QueryToken::Key("b".into())]
        );
        assert_eq!(run("a.b[0]", &sample()), vec![json!(10)]);
    }

    #[test]
    fn basic_examples() {
        let data = sample();
        assert_eq!(run("$.a.b[1]", &data), vec![json!(20)]);
        assert_eq!(run("$.a.b[*]", &data), vec![json!(10), json!(20), json!(30)]);
        assert_eq!(run("$..b", &data), vec![json!([10, 20, 30])]);
        assert_eq!(run("$.a.b[1:3]", &data), vec![json!(20), json!(30)]);
        assert!(run("$.x", &data).is_empty());
    }

    #[test]
    fn negative_and_out_of_range_indices() {
        let data = sample();
        assert_eq!(run("$.a.b[-1]", &data), vec![json!(30)]);
        assert_eq!(run("$.a.b[-3]", &data), vec![json!(10)]);
        assert!(run("$.a.b[-4]", &data).is_empty());
        assert!(run("$.a.b[3]", &data).is_empty());
        assert!(run("$.a[0]", &data).is_empty());
    }

    #[test]
    fn slices_follow_js_semantics() {
        let data = json!([1, 2, 3, 4]);
        assert_eq!(run("$[:2]", &data), vec![json!(1), json!(2)]);
        assert_eq!(run("$[2:]", &data), vec![json!(3), json!(4)]);
        assert_eq!(run("$[-2:]", &data), vec![json!(3), json!(4)]);
        assert_eq!(run("$[1:-1]", &data), vec![json!(2), json!(3)]);
        assert_eq!(run("$[0:100]", &data).len(), 4);
        assert!(run("$[3:1]", &data).is_empty());
        assert!(run("$[:]", &json!({"a": 1})).is_empty());
    }

    #[test]
    fn wildcard_over_object_keeps_key_order() {
        let data = json!({"z": 1, "a": 2, "m": 3});
        assert_eq!(run("$.*", &data), vec![json!(1), json!(2), json!(3)]);
        assert!(run("$.z.*", &data).is_empty());
    }

    #[test]
    fn recursive_descent_is_preorder_and_keeps_duplicates() {
        let data = json!({
            "id": 1,
            "children": [
                {"id": 2, "children": [{"id": 3}]},
                {"id": 4}
            ]
        });
        assert_eq!(
            run("$..id", &data),
            vec![json!(1), json!(2), json!(3), json!(4)]
        );
        let nested = json!({"k": {"k": 1}});
        assert_eq!(run("$..k", &nested), vec![json!({"k": 1}), json!(1)]);
    }

    #[test]
    fn quoted_keys_may_contain_brackets_and_dots() {
        let data = json!({"a.b": {"c]": 5}});
        assert_eq!(run("$['a.b'][\"c]\"]", &data), vec![json!(5)]);
    }

    #[test]
    fn malformed_expressions_name_the_fragment() {
        assert_eq!(
            compile("$.a[1"),
            Err(QueryError::UnterminatedBracket("[1".into()))
        );
        assert_eq!(
            compile("$['abc"),
            Err(QueryError::UnterminatedQuote("'abc".into()))
        );
        assert_eq!(compile("$.a[]"), Err(QueryError::EmptyBrackets("[]".into())));
        assert_eq!(
            compile("$.a[1:x]"),
            Err(QueryError::BadSliceBound("x".into()))
        );
        assert_eq!(
            compile("$.a[1:2:3]"),
            Err(QueryError::SliceComponents("[1:2:3]".into()))
        );
        assert_eq!(
            compile("$['a'b]"),
            Err(QueryError::TrailingText("['a'b]".into()))
        );
    }

    #[test]
    fn suggestions_list_children_of_parent() {
        let data = json!({"user": {"name": "x", "tags": ["a"]}, "items": [1]});
        assert_eq!(suggestions(&data, "$.us", 20), vec![".user", ".items"]);
        assert_eq!(suggestions(&data, "$.user.n", 20), vec![".name", ".tags"]);
        assert_eq!(suggestions(&data, "$.items[", 20), vec!["[0]", "[*]"]);
        assert_eq!(suggestions(&data, "$.us", 1), vec![".user"]);
        assert!(suggestions(&data, "$.a[1.b", 20).is_empty());
    }
}
