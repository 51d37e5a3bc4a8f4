//! Core of a JSON editing workbench: cursor-offset to path resolution,
//! JSONPath-subset queries, structural diffs, table projection and path
//! codecs.
//!
//! Everything here is a pure function of its inputs. Callers (editor panes,
//! compare views, the `jwb` CLI) pass document text and get fresh values back.

pub mod errors;
pub mod context;
pub mod path;
pub mod resolver;
pub mod diff;
pub mod query;
pub mod document;
pub mod tree;
pub mod table;
pub mod engine;
mod parser;

pub use context::Options;
pub use diff::{compare, DiffEntry, DiffKind};
pub use engine::{
    compare_texts, first, or_default, path_at, query_text, unique, PathDisplay, Workbench,
};
pub use errors::{Error, QueryError, Result};
pub use path::{parse_pointer, to_accessor, to_pointer, PathKey, StructuralPath};
pub use query::{compile, evaluate, Query, QueryToken};
pub use resolver::resolve;
pub use table::{project, Table};
