use serde::{Deserialize, Serialize};

/// Options for [`parse_with_options`](crate::parse_with_options).
///
/// Field names serialize as camelCase and every field has a default, so a
/// partial JSON or YAML config fills in the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Record `DUPLICATE_KEY` for repeated scalar keys in one map.
    pub unique_keys: bool,

    /// Cross-check the source with a conforming YAML parser when
    /// composition itself found no error.
    pub validate: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            unique_keys: true,
            validate: true,
        }
    }
}

/// Options for [`Document::to_string_with`](crate::Document::to_string_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToStringOptions {
    /// Spaces per nesting level.
    pub indent: usize,

    /// Indent block sequences that are map values by one level.
    pub indent_seq: bool,

    /// Printed for a document without contents.
    pub null_str: String,

    /// Flow collections longer than this go one entry per line.
    pub line_width: usize,

    /// `[ a, b ]` rather than `[a, b]`.
    pub flow_collection_padding: bool,
}

impl Default for ToStringOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            indent_seq: true,
            null_str: "null".to_string(),
            line_width: 80,
            flow_collection_padding: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let options: ToStringOptions =
            serde_json::from_str(r#"{"indentSeq": false, "nullStr": "~"}"#).expect("parse");
        assert!(!options.indent_seq);
        assert_eq!(options.null_str, "~");
        assert_eq!(options.indent, 2);
        assert_eq!(options.line_width, 80);
    }

    #[test]
    fn parse_options_round_trip_as_camel_case() {
        let json = serde_json::to_value(ParseOptions::default()).expect("serialize");
        assert_eq!(json, serde_json::json!({"uniqueKeys": true, "validate": true}));
    }
}
