//! Spreadsheet projection of an array of records.
//!
//! A table is built from the root array, or from the first member of a root
//! object that holds a non-empty array. Columns are the keys seen across all
//! object rows. An array without any object rows gets a single `Value` column.

use itertools::Itertools;
use serde_json::Value;

/// Column header used when no row is an object.
pub const VALUE_COLUMN: &str = "Value";

const MAX_STRING_CELL: usize = 50;

/// One table cell. A row without the column's key is `Missing`, which is not
/// the same as a present `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Value(Value),
    Missing,
}

impl Cell {
    /// Short display text: strings quoted and cut at 50 chars, containers as
    /// `Array[n]` / `Object{n}`, a missing cell as `-`.
    pub fn display(&self) -> String {
        match self {
            Cell::Missing => "-".to_string(),
            Cell::Value(Value::String(s)) if s.chars().count() > MAX_STRING_CELL => {
                let head: String = s.chars().take(MAX_STRING_CELL).collect();
                format!("\"{head}...\"")
            }
            Cell::Value(Value::String(s)) => format!("\"{s}\""),
            Cell::Value(Value::Array(arr)) => format!("Array[{}]", arr.len()),
            Cell::Value(Value::Object(map)) => format!("Object{{{}}}", map.len()),
            Cell::Value(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Position of the element in the source array.
    pub index: usize,
    /// One cell per column, in column order.
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Member name the array was taken from, when the root is an object.
    pub title: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Plain-text rendering: optional title line, then a `#` column and one
    /// column per key, padded to the widest cell.
    pub fn render(&self) -> String {
        let header: Vec<String> = std::iter::once("#".to_string())
            .chain(self.columns.iter().cloned())
            .collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(row.index.to_string())
                    .chain(row.cells.iter().map(Cell::display))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|col| {
                std::iter::once(&header)
                    .chain(&body)
                    .map(|line| line[col].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(body.len() + 2);
        if let Some(title) = &self.title {
            lines.push(title.clone());
        }
        for line in std::iter::once(&header).chain(&body) {
            let padded = line
                .iter()
                .zip(&widths)
                .map(|(text, &w)| format!("{text:<w$}"))
                .join("  ");
            lines.push(padded.trim_end().to_string());
        }
        lines.join("\n")
    }
}

/// Table view of `root`, or `None` when there is nothing to tabulate: a
/// scalar, an empty array, or an object with no non-empty array member.
pub fn project(root: &Value) -> Option<Table> {
    match root {
        Value::Array(items) if !items.is_empty() => Some(tabulate(items, None)),
        Value::Object(map) => map
            .iter()
            .find_map(|(key, v)| match v {
                Value::Array(items) if !items.is_empty() => Some((key, items)),
                _ => None,
            })
            .map(|(key, items)| tabulate(items, Some(key.clone()))),
        _ => None,
    }
}

fn tabulate(items: &[Value], title: Option<String>) -> Table {
    let columns: Vec<String> = items
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|map| map.keys())
        .unique()
        .cloned()
        .collect();

    if columns.is_empty() {
        let rows = items
            .iter()
            .enumerate()
            .map(|(index, v)| Row {
                index,
                cells: vec![Cell::Value(v.clone())],
            })
            .collect();
        return Table {
            title,
            columns: vec![VALUE_COLUMN.to_string()],
            rows,
        };
    }

    let rows = items
        .iter()
        .enumerate()
        .map(|(index, item)| Row {
            index,
            cells: columns
                .iter()
                .map(|key| match item.get(key.as_str()) {
                    Some(v) => Cell::Value(v.clone()),
                    None => Cell::Missing,
                })
                .collect(),
        })
        .collect();
    Table {
        title,
        columns,
        rows,
    }
}
