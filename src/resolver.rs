//! Maps a character offset in raw JSON text to the structural path of the value
//! under that offset.
//!
//! The text is scanned once, left to right, with a small state machine: a
//! string-literal flag, a stack of open containers and the path accumulated so
//! far. No parse tree is built and malformed input never fails; the result is
//! whatever path the scan had accumulated when it reached the offset. This is
//! meant for cursor/status display, not validation.

use serde_json::Value;
use tracing::debug;

use crate::path::{PathKey, StructuralPath};

#[derive(Debug)]
enum FrameKind {
    Object {
        expect_key: bool,
        pending_key: Option<String>,
    },
    Array {
        /// Index of the element currently being scanned.
        count: usize,
    },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Whether opening this container pushed a component onto the path.
    owns_segment: bool,
}

#[derive(Debug, Default)]
struct Scan {
    path: Vec<PathKey>,
    stack: Vec<Frame>,
    in_string: bool,
    escaped: bool,
    literal_start: usize,
}

impl Scan {
    fn open(&mut self, kind: FrameKind) {
        let owns_segment = match self.stack.last_mut() {
            Some(Frame {
                kind: FrameKind::Array { count },
                ..
            }) => {
                self.path.push(PathKey::Index(*count));
                true
            }
            Some(Frame {
                kind: FrameKind::Object { pending_key, .. },
                ..
            }) => match pending_key.take() {
                Some(key) => {
                    self.path.push(PathKey::Key(key));
                    true
                }
                None => false,
            },
            None => false,
        };
        self.stack.push(Frame { kind, owns_segment });
    }

    fn close(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if frame.owns_segment {
                self.path.pop();
            }
        }
    }

    fn comma(&mut self) {
        match self.stack.last_mut() {
            Some(Frame {
                kind: FrameKind::Array { count },
                ..
            }) => *count += 1,
            Some(Frame {
                kind:
                    FrameKind::Object {
                        expect_key,
                        pending_key,
                    },
                ..
            }) => {
                *expect_key = true;
                *pending_key = None;
            }
            None => {}
        }
    }

    /// `literal` includes both quotes.
    fn close_string(&mut self, literal: &str) {
        self.in_string = false;
        if let Some(Frame {
            kind:
                FrameKind::Object {
                    expect_key,
                    pending_key,
                },
            ..
        }) = self.stack.last_mut()
        {
            if *expect_key {
                *pending_key = Some(decode_literal(literal));
                *expect_key = false;
            }
        }
    }

    fn finish(mut self) -> StructuralPath {
        match self.stack.last() {
            Some(Frame {
                kind: FrameKind::Array { count },
                ..
            }) => self.path.push(PathKey::Index(*count)),
            Some(Frame {
                kind:
                    FrameKind::Object {
                        pending_key: Some(key),
                        ..
                    },
                ..
            }) => self.path.push(PathKey::Key(key.clone())),
            _ => {}
        }
        StructuralPath::from(self.path)
    }
}

/// Unescape a string literal; keep the raw text between the quotes if it is
/// not a valid JSON string.
fn decode_literal(literal: &str) -> String {
    match serde_json::from_str::<Value>(literal) {
        Ok(Value::String(s)) => s,
        _ => literal[1..literal.len() - 1].to_string(),
    }
}

/// Structural path of the value enclosing `offset` (counted in chars).
///
/// An offset at or past the end points at the last character; empty text
/// resolves to the root path. A string literal the offset falls inside is
/// scanned to its closing quote before stopping, so a cursor on a key
/// resolves to that key. A quote preceded by an odd run of backslashes is
/// treated as escaped.
pub fn resolve(text: &str, offset: usize) -> StructuralPath {
    let len = text.chars().count();
    if len == 0 {
        return StructuralPath::root();
    }
    let target = offset.min(len - 1);
    let mut scan = Scan::default();

    for (pos, (byte, c)) in text.char_indices().enumerate() {
        if scan.in_string {
            if scan.escaped {
                scan.escaped = false;
                continue;
            }
            match c {
                '\\' => scan.escaped = true,
                '"' => {
                    scan.close_string(&text[scan.literal_start..=byte]);
                    if pos >= target {
                        break;
                    }
                }
                _ => {}
            }
            continue;
        }

        if pos >= target {
            break;
        }
        match c {
            '"' => {
                scan.in_string = true;
                scan.literal_start = byte;
            }
            '{' => scan.open(FrameKind::Object {
                expect_key: true,
                pending_key: None,
            }),
            '[' => scan.open(FrameKind::Array { count: 0 }),
            '}' | ']' => scan.close(),
            ',' => scan.comma(),
            _ => {}
        }
    }

    let path = scan.finish();
    debug!(offset, target, path = %path, "resolved offset");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_text_and_root_brace() {
        assert_eq!(resolve("", 0), path![]);
        assert_eq!(resolve("", 10), path![]);
        assert_eq!(resolve("{}", 0), path![]);
    }

    #[test]
    fn offset_inside_a_value() {
        assert_eq!(resolve(r#"{"a":1}"#, 5), path!["a"]);
    }

    #[test]
    fn offset_on_array_elements() {
        let text = r#"{"a":[1,2,3]}"#;
        assert_eq!(resolve(text, 6), path!["a", 0usize]);
        assert_eq!(resolve(text, 8), path!["a", 1usize]);
        assert_eq!(resolve(text, 10), path!["a", 2usize]);
        // Spaced form: offset 11 is the comma right after the `2`.
        assert_eq!(resolve(r#"{"a": [1, 2, 3]}"#, 11), path!["a", 1usize]);
    }

    #[test]
    fn offset_on_a_key_completes_the_key() {
        assert_eq!(resolve(r#"{"alpha":1}"#, 2), path!["alpha"]);
    }

    #[test]
    fn offset_inside_a_string_value() {
        assert_eq!(resolve(r#"{"a":"xyz"}"#, 7), path!["a"]);
    }

    #[test]
    fn nested_containers() {
        let text = r#"{"a":{"b":{"c":[true,{"d":null}]}}}"#;
        let at = text.find("null").unwrap();
        assert_eq!(resolve(text, at), path!["a", "b", "c", 1usize, "d"]);
    }

    #[test]
    fn closed_containers_release_their_segment() {
        let text = r#"{"a":{"b":1},"c":2}"#;
        // The comma after the inner object.
        assert_eq!(resolve(text, 12), path![]);
        let at = text.rfind('2').unwrap();
        assert_eq!(resolve(text, at), path!["c"]);
    }

    #[test]
    fn strings_inside_arrays_are_not_keys() {
        let text = r#"{"list":[{}, "s", {"k":0}], "z":1}"#;
        let at = text.find("0}").unwrap();
        assert_eq!(resolve(text, at), path!["list", 2usize, "k"]);
        let at = text.rfind('1').unwrap();
        assert_eq!(resolve(text, at), path!["z"]);
    }

    #[test]
    fn escaped_quotes_and_backslash_runs() {
        let text = r#"{"say \"hi\"":[0,1]}"#;
        let at = text.rfind('1').unwrap();
        assert_eq!(resolve(text, at), path!["say \"hi\"", 1usize]);

        // Key is `a\`; the closing quote follows an even backslash run.
        let text = r#"{"a\\":{"b":1}}"#;
        let at = text.rfind('1').unwrap();
        assert_eq!(resolve(text, at), path!["a\\", "b"]);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let text = r#"{"é":[1,2]}"#;
        assert_eq!(resolve(text, 8), path!["é", 1usize]);
    }

    #[test]
    fn offset_past_end_clamps_to_last_char() {
        assert_eq!(resolve("[1,2", 99), path![1usize]);
        assert_eq!(resolve("[[0,[5", 99), path![0usize, 1usize, 0usize]);
    }

    #[test]
    fn malformed_input_is_best_effort() {
        assert_eq!(resolve("}}]]", 3), path![]);
        assert_eq!(resolve(r#"{"a":[1, "#, 8), path!["a", 1usize]);
    }

    #[test]
    fn deterministic() {
        let text = r#"{"a":[{"b":[1,2]}]}"#;
        let at = text.rfind('2').unwrap();
        assert_eq!(resolve(text, at), resolve(text, at));
    }
}
