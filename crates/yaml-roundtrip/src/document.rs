use core::fmt;
use core::ops::Range;

use serde_json::Value;

use crate::compose::compose_documents;
use crate::cst::Cst;
use crate::error::{ErrorCode, YamlError};
use crate::node::Node;
use crate::options::{ParseOptions, ToStringOptions};
use crate::{stringify, validate};

/// One YAML document: its root node plus the comments and markers around it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Comment lines before the contents (and before any directives).
    pub comment_before: Option<String>,
    /// Comment lines after all contents.
    pub comment: Option<String>,
    /// A blank line precedes [`Document::comment`].
    pub space_before_comment: bool,
    /// `%` directive lines, verbatim.
    pub directives: Vec<String>,
    /// Print `---` even without directives.
    pub directives_end_marker: bool,
    /// Print `...` after the contents.
    pub document_end_marker: bool,
    /// The root node; `None` for an empty document.
    pub contents: Option<Node>,
    /// Print `\r\n` line breaks. Parsing sets it when the first line break
    /// of the source is one.
    pub crlf: bool,
    pub errors: Vec<YamlError>,
    pub warnings: Vec<YamlError>,
    pub(crate) range: Range<usize>,
}

impl Document {
    pub fn new(contents: impl Into<Node>) -> Self {
        Self {
            contents: Some(contents.into()),
            ..Self::default()
        }
    }

    /// Wrap an external value in the node form used by the tree.
    pub fn create_node(value: &Value) -> Node {
        Node::from_value(value)
    }

    #[tracing::instrument(skip_all, fields(indent = options.indent))]
    pub fn to_string_with(&self, options: &ToStringOptions) -> String {
        stringify::document(self, options)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify::document(self, &ToStringOptions::default()))
    }
}

/// Parse the first document of `source` with default options.
pub fn parse(source: &str) -> Document {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse the first document of `source`. Problems are recorded on
/// [`Document::errors`] and [`Document::warnings`]; this never fails.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Document {
    let cst = Cst::parse(source);
    let mut docs = compose_documents(&cst, options).into_iter();
    let mut doc = docs.next().unwrap_or_default();
    if let Some(next) = docs.next() {
        let at = next.range.start;
        doc.errors.push(YamlError::new(
            ErrorCode::MultipleDocs,
            at..at,
            "Source contains multiple documents; use parse_all_documents to read them all",
        ));
    }
    if options.validate
        && doc.errors.is_empty()
        && let Some(err) = validate::check(source)
    {
        doc.errors.push(err);
    }
    doc
}

/// Parse every document of a `---`/`...` separated stream.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse_all_documents(source: &str, options: &ParseOptions) -> Vec<Document> {
    let cst = Cst::parse(source);
    let mut docs = compose_documents(&cst, options);
    if options.validate
        && docs.iter().all(|doc| doc.errors.is_empty())
        && let Some(err) = validate::check(source)
    {
        let offset = err.range().start;
        let owner = docs
            .iter()
            .rposition(|doc| doc.range.start <= offset)
            .unwrap_or(0);
        if let Some(doc) = docs.get_mut(owner) {
            doc.errors.push(err);
        }
    }
    tracing::debug!(documents = docs.len(), "parsed stream");
    docs
}
