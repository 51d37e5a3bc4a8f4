// src/parser.rs
//! Character scanner shared by the query tokenizer.

use crate::errors::QueryError;

pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    /// Source text from `start` up to the current position.
    pub fn fragment_from(&self, start: usize) -> &'a str {
        &self.s[start..self.i]
    }

    /// Source text from `start` to the end of input.
    pub fn tail_from(&self, start: usize) -> &'a str {
        &self.s[start..]
    }

    /// Reads an unquoted key: everything up to the next `.` or `[`.
    pub fn read_key(&mut self) -> &'a str {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '.' || c == '[' {
                break;
            }
            self.i += c.len_utf8();
        }
        &self.s[start..self.i]
    }

    pub fn parse_quoted_string(&mut self) -> Result<String, QueryError> {
        let start = self.i;
        let quote = self
            .peek_char()
            .ok_or_else(|| QueryError::UnterminatedQuote(self.tail_from(start).into()))?;
        if quote != '\'' && quote != '"' {
            return Err(QueryError::UnterminatedQuote(self.tail_from(start).into()));
        }
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(QueryError::UnterminatedQuote(self.tail_from(start).into()))
    }

    /// Text up to (not including) `end`, leaving the cursor on `end`.
    /// `None` when `end` never occurs; the cursor is then left untouched.
    pub fn capture_until(&mut self, end: char) -> Option<&'a str> {
        let rest = &self.s[self.i..];
        let len = rest.find(end)?;
        self.i += len;
        Some(&rest[..len])
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_key_stops_at_dot_and_bracket() {
        let mut p = Parser::new("name.rest");
        assert_eq!(p.read_key(), "name");
        assert!(p.consume_char('.'));
        assert_eq!(p.read_key(), "rest");
        assert!(p.eof());

        let mut p = Parser::new("héllo[0]");
        assert_eq!(p.read_key(), "héllo");
        assert_eq!(p.peek_char(), Some('['));
    }

    #[test]
    fn quoted_string_handles_escapes_and_brackets() {
        let mut p = Parser::new(r#"'a]\'b'tail"#);
        assert_eq!(p.parse_quoted_string().unwrap(), "a]'b");
        assert_eq!(p.tail_from(p.pos()), "tail");
    }

    #[test]
    fn unterminated_quote_reports_fragment() {
        let mut p = Parser::new("\"abc");
        assert_eq!(
            p.parse_quoted_string(),
            Err(QueryError::UnterminatedQuote("\"abc".into()))
        );
    }

    #[test]
    fn capture_until_missing_terminator() {
        let mut p = Parser::new("1:2");
        assert_eq!(p.capture_until(']'), None);
        assert_eq!(p.pos(), 0);
        let mut p = Parser::new("1:2]x");
        assert_eq!(p.capture_until(']'), Some("1:2"));
        assert!(p.consume_char(']'));
    }
}
