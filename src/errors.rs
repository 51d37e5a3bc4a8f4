use thiserror::Error;

/// Malformed query expression. Every variant carries the offending fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unterminated bracket at `{0}`")]
    UnterminatedBracket(String),

    #[error("unterminated quoted key at `{0}`")]
    UnterminatedQuote(String),

    #[error("empty brackets at `{0}`")]
    EmptyBrackets(String),

    #[error("bad slice bound `{0}`")]
    BadSliceBound(String),

    #[error("slice has too many components: `{0}`")]
    SliceComponents(String),

    #[error("unexpected text after quoted key: `{0}`")]
    TrailingText(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// Input text is not valid JSON.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Writing a value back out as JSON text failed.
    #[error("serialize error: {0}")]
    Serialize(serde_json::Error),

    #[error("invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("invalid pointer: {0}")]
    Pointer(String),

    /// A structural path that does not address a node.
    #[error("no node at path {0}")]
    Path(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
