use serde::Deserialize;
use serde_json::Value;

use crate::errors::Result;

/// Workbench options. Every field has a default, so a config file only needs
/// the fields it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Spaces per level when pretty printing.
    pub indent: usize,
    /// Sort object keys when pretty printing.
    pub sort_keys: bool,
    /// Maximum number of completion candidates.
    pub suggestion_limit: usize,
    /// Substituted for an empty query result.
    pub default: Option<Value>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent: 2,
            sort_keys: false,
            suggestion_limit: 20,
            default: None,
        }
    }
}

impl Options {
    /// Parse options from JSON text, e.g. the contents of a config file.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn partial_config_keeps_defaults() {
        let o = Options::from_json(r#"{"indent": 4, "default": []}"#).unwrap();
        assert_eq!(
            o,
            Options {
                indent: 4,
                default: Some(json!([])),
                ..Options::default()
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Options::from_json(r#"{"indnet": 4}"#).is_err());
    }
}
