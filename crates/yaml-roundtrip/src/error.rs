use core::fmt;
use core::ops::Range;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The kind of a recorded parse diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// A node sits at an indentation its parent does not allow.
    BadIndent,
    /// A tab character used where only spaces may indent.
    TabAsIndent,
    /// An unterminated quoted scalar or flow collection.
    MissingChar,
    /// A block scalar header with unknown or repeated indicators.
    BadBlockScalarHeader,
    /// A token that cannot start or continue the current construct.
    UnexpectedToken,
    /// A map entry whose key is not followed by `:`.
    ImplicitKeyWithoutValue,
    /// Two entries of one map share the same scalar key.
    DuplicateKey,
    /// `parse` was handed a stream holding more than one document.
    MultipleDocs,
    /// `?` explicit keys are not composed.
    UnsupportedExplicitKey,
    /// An unknown or malformed `%` directive.
    BadDirective,
    /// Reported by the conforming-parser cross-check.
    Syntax,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadIndent => "BAD_INDENT",
            Self::TabAsIndent => "TAB_AS_INDENT",
            Self::MissingChar => "MISSING_CHAR",
            Self::BadBlockScalarHeader => "BAD_BLOCK_SCALAR_HEADER",
            Self::UnexpectedToken => "UNEXPECTED_TOKEN",
            Self::ImplicitKeyWithoutValue => "IMPLICIT_KEY_WITHOUT_VALUE",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::MultipleDocs => "MULTIPLE_DOCS",
            Self::UnsupportedExplicitKey => "UNSUPPORTED_EXPLICIT_KEY",
            Self::BadDirective => "BAD_DIRECTIVE",
            Self::Syntax => "SYNTAX",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal diagnostic recorded while tokenizing or composing.
///
/// Stored on [`Document::errors`](crate::Document::errors) or
/// [`Document::warnings`](crate::Document::warnings); composition always
/// carries on past it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{code}: {message}")]
#[diagnostic(code(yaml_roundtrip::parse))]
pub struct YamlError {
    pub code: ErrorCode,
    pub message: String,
    #[label("here")]
    pub span: SourceSpan,
}

impl YamlError {
    pub(crate) fn new(code: ErrorCode, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span: (span.start, span.end.saturating_sub(span.start)).into(),
        }
    }

    /// Byte range of the offending source text.
    pub fn range(&self) -> Range<usize> {
        self.span.offset()..self.span.offset() + self.span.len()
    }
}

/// Misuse of the mutable tree API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// `Pair::set_comment_before` (or `set_space_before`) on a pair whose key
    /// is a raw value rather than a node.
    #[error(
        "Pair::{accessor} is an alias for the key node's own {accessor}; to set it, the key must be a Node (found a raw {found} value)"
    )]
    InvalidKeyKind {
        accessor: &'static str,
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_round_trips_through_source_span() {
        let err = YamlError::new(ErrorCode::BadIndent, 4..9, "bad");
        assert_eq!(err.range(), 4..9);
        assert_eq!(err.to_string(), "BAD_INDENT: bad");
    }

    #[test]
    fn invalid_key_kind_mentions_alias() {
        let err = NodeError::InvalidKeyKind {
            accessor: "comment_before",
            found: "object",
        };
        let msg = err.to_string();
        assert!(msg.contains("alias for the key node"));
        assert!(msg.contains("must be a Node"));
    }
}
