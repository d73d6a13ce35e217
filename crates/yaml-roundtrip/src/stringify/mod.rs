//! Printing a document tree back to YAML text.
//!
//! Every writer appends whole lines to a shared `String`. A node keeps its
//! parsed source where it has one, so an unedited tree prints back the text
//! it came from; comment placement and blank lines are re-derived from the
//! annotations on each node.

mod block;
mod flow;
mod scalar;

use alloc::borrow::Cow;

use crate::document::Document;
use crate::node::{Item, Node, NodeMeta, Scalar};
use crate::options::ToStringOptions;

use self::block::{format_block_collection, indicator_comment};
use self::scalar::{format_inline, pre_comment};

pub(crate) fn document(doc: &Document, options: &ToStringOptions) -> String {
    let mut out = String::new();
    if let Some(comment) = &doc.comment_before {
        comment_lines(&mut out, comment, 0);
    }
    for directive in &doc.directives {
        out.push_str(directive);
        out.push('\n');
    }
    if doc.directives_end_marker || !doc.directives.is_empty() {
        out.push_str("---\n");
    }

    match &doc.contents {
        Some(node) => format_root(node, &mut out, options),
        None => {
            out.push_str(&options.null_str);
            out.push('\n');
        }
    }

    if doc.document_end_marker {
        out.push_str("...");
        match doc.comment.as_deref() {
            Some(comment) if !comment.contains('\n') => {
                out.push_str(" #");
                out.push_str(comment);
                out.push('\n');
            }
            Some(comment) => {
                out.push('\n');
                comment_lines(&mut out, comment, 0);
            }
            None => out.push('\n'),
        }
    } else if let Some(comment) = &doc.comment {
        let after_keep = doc.contents.as_ref().is_some_and(Node::ends_with_keep_block);
        if doc.space_before_comment && !after_keep {
            blank_line(&mut out);
        }
        comment_lines(&mut out, comment, 0);
    }
    if doc.crlf {
        out = out.replace('\n', "\r\n");
    }
    out
}

fn format_root(node: &Node, out: &mut String, options: &ToStringOptions) {
    let meta = node.meta();
    if meta.space_before {
        blank_line(out);
    }
    if let Some(comment) = &meta.comment_before {
        comment_lines(out, comment, 0);
    }
    if node.is_block_collection() {
        if let Some(comment) = indicator_comment(node) {
            comment_lines(out, comment, 0);
        }
        format_block_collection(node, out, 0, options, false);
        return;
    }
    // An empty root would print as an empty line.
    let null;
    let node = match node {
        Node::Scalar(s) if s.is_null() && props(meta).is_empty() => {
            let mut text = Scalar::new(options.null_str.clone());
            text.meta = meta.clone();
            null = Node::Scalar(text);
            &null
        }
        _ => node,
    };
    if let Some(comment) = pre_comment(node) {
        comment_lines(out, comment, 0);
    }
    format_inline(node, out, 0, options, "", true);
}

pub(super) fn push_indent(out: &mut String, indent: usize) {
    out.extend(core::iter::repeat_n(' ', indent));
}

/// One blank line, unless the output is empty or already ends with one.
pub(super) fn blank_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

/// A stored comment block, one `#` line per stored line.
pub(super) fn comment_lines(out: &mut String, comment: &str, indent: usize) {
    for line in comment.split('\n') {
        push_indent(out, indent);
        out.push('#');
        out.push_str(line);
        out.push('\n');
    }
}

/// Anchor and tag as printed before a node, or the empty string.
pub(super) fn props(meta: &NodeMeta) -> String {
    let mut parts = Vec::new();
    if let Some(anchor) = &meta.anchor {
        parts.push(format!("&{anchor}"));
    }
    if let Some(tag) = &meta.tag {
        parts.push(tag.clone());
    }
    parts.join(" ")
}

/// A pair member as a node, converting raw values on the fly.
pub(super) fn item_node(item: &Item) -> Cow<'_, Node> {
    match item {
        Item::Node(node) => Cow::Borrowed(node),
        Item::Value(value) => Cow::Owned(Node::from_value(value)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::document::parse;
    use crate::node::{Node, Scalar};
    use crate::options::ToStringOptions;
    use crate::scalar::ScalarStyle;

    fn round_trip(src: &str) {
        assert_eq!(parse(src).to_string(), src);
    }

    #[test]
    fn unedited_documents_print_back_verbatim() {
        round_trip("a: 1\nb:\n  - x\n  - 'y'\n");
        round_trip("# lead\n\n# about a\na: 1 # one\n\nb: 2\n");
        round_trip("seq:\n  - a: 1\n    b: 2\n    # end of first\n\n  - c\n");
        round_trip("text: |\n  line one\n  line two\nnext: >-\n  folded\n  text\n");
        round_trip("%YAML 1.2\n---\nkey: value\n... # done\n");
        round_trip("anchored: &a !tag value\nref: *a\n");
    }

    #[test]
    fn blank_runs_collapse_to_one() {
        let doc = parse("a: 1\n\n\n\nb: 2\n");
        assert_eq!(doc.to_string(), "a: 1\n\nb: 2\n");
    }

    #[test]
    fn leading_and_trailing_blank_lines_vanish() {
        let doc = parse("\n\nvalue\n\n\n");
        assert_eq!(doc.to_string(), "value\n");
    }

    #[test]
    fn multi_line_comment_on_block_scalar_joins_into_header() {
        let mut doc = parse(">\nstring\n");
        let contents = doc.contents.as_mut().expect("contents");
        contents.set_comment(Some("comment\nlines".into()));
        assert_eq!(doc.to_string(), "> #comment lines\nstring\n");
    }

    #[test]
    fn multi_line_comment_on_plain_scalar_prints_above() {
        let mut doc = parse("key: value\n");
        let map = doc.contents.as_mut().and_then(Node::as_map_mut).expect("map");
        map.get_mut("key")
            .expect("value")
            .set_comment(Some(" a\n b".into()));
        assert_eq!(doc.to_string(), "# a\n# b\nkey: value\n");
    }

    #[test]
    fn multi_line_comment_on_quoted_scalar_prints_below() {
        let mut doc = parse("- \"q\"\n- x\n");
        let seq = doc.contents.as_mut().and_then(Node::as_seq_mut).expect("seq");
        seq.items[0].set_comment(Some(" a\n b".into()));
        assert_eq!(doc.to_string(), "- \"q\"\n# a\n# b\n- x\n");
    }

    #[test]
    fn empty_document_prints_null_str() {
        let doc = parse("# only a comment\n");
        assert_eq!(doc.to_string(), "# only a comment\nnull\n");
        let options = ToStringOptions {
            null_str: "~".into(),
            ..ToStringOptions::default()
        };
        assert_eq!(parse("").to_string_with(&options), "~\n");
    }

    #[test]
    fn edited_scalars_are_re_encoded() {
        let mut doc = parse("a: plain\nb: 'single'\n");
        let map = doc.contents.as_mut().and_then(Node::as_map_mut).expect("map");
        map.get_mut("a")
            .and_then(Node::as_scalar_mut)
            .expect("a")
            .set_value("needs: quoting");
        map.get_mut("b")
            .and_then(Node::as_scalar_mut)
            .expect("b")
            .set_value("it's");
        map.set("c", Scalar::with_style("two\nlines\n", ScalarStyle::Literal));
        assert_eq!(
            doc.to_string(),
            "a: \"needs: quoting\"\nb: 'it''s'\nc: |\n  two\n  lines\n"
        );
    }

    #[test]
    fn indent_options_apply_to_new_nodes() {
        let mut doc = parse("root: {}\n");
        let map = doc.contents.as_mut().and_then(Node::as_map_mut).expect("map");
        map.set(
            "root",
            crate::Document::create_node(&serde_json::json!({"list": ["a", "b"]})),
        );
        let options = ToStringOptions {
            indent: 4,
            indent_seq: false,
            ..ToStringOptions::default()
        };
        assert_eq!(
            doc.to_string_with(&options),
            "root:\n    list:\n    - a\n    - b\n"
        );
    }
}
