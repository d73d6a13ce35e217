//! Block maps and sequences.

use super::flow::format_flow;
use super::scalar::{format_inline, pre_comment, single_line};
use super::{blank_line, comment_lines, item_node, props, push_indent};
use crate::node::{Map, Node, Pair, Scalar, Seq};
use crate::options::ToStringOptions;

/// Whether a pair's value is printed on the line after its key.
fn value_on_next_line(pair: &Pair, value: &Node) -> bool {
    pair.comment().is_some() || value.comment_before().is_some() || value.space_before()
}

/// An empty plain value with nothing else to print on its line.
fn is_bare_null(node: &Node) -> bool {
    matches!(node, Node::Scalar(s) if s.is_null())
        && props(node.meta()).is_empty()
}

/// Whether anything is printed above the first entry of a block
/// collection, which rules out starting it on a `- ` line.
fn first_entry_has_lead(node: &Node) -> bool {
    match node {
        Node::Map(map) => map.items.first().is_some_and(|pair| {
            let pre = pair.value.as_ref().map(item_node).is_some_and(|value| {
                !value_on_next_line(pair, &value) && pre_comment(&value).is_some()
            });
            pair.space_before() || pair.comment_before().is_some() || pre
        }),
        Node::Seq(seq) => seq.items.first().is_some_and(|item| {
            item.space_before() || item.comment_before().is_some() || pre_comment(item).is_some()
        }),
        Node::Scalar(_) => false,
    }
}

/// A source line kept as a key without a value when it could not be
/// composed.
fn verbatim_entry(pair: &Pair) -> Option<&Node> {
    pair.key_node()
        .filter(|key| pair.value.is_none() && key.as_scalar().is_some_and(Scalar::is_verbatim))
}

/// A kept source line, printed at the column it was written at.
fn format_verbatim(
    node: &Node,
    out: &mut String,
    space_before: bool,
    indent: usize,
    options: &ToStringOptions,
) {
    if space_before {
        blank_line(out);
    }
    if let Some(comment) = node.comment_before() {
        comment_lines(out, comment, indent);
    }
    if let Some(comment) = pre_comment(node) {
        comment_lines(out, comment, indent);
    }
    format_inline(node, out, 0, options, "", true);
}

/// The comment printed after a `-` that opens a block collection.
pub(super) fn indicator_comment(node: &Node) -> Option<&str> {
    match node {
        Node::Map(map) => map.indicator_comment.as_deref(),
        Node::Seq(seq) => seq.indicator_comment.as_deref(),
        Node::Scalar(_) => None,
    }
}

/// Print a block map or sequence whose entries sit at `indent`. With
/// `inline_first`, the first entry continues a line already started.
pub(super) fn format_block_collection(
    node: &Node,
    out: &mut String,
    indent: usize,
    options: &ToStringOptions,
    inline_first: bool,
) {
    match node {
        Node::Map(map) => format_block_map(map, out, indent, options, inline_first),
        Node::Seq(seq) => format_block_seq(seq, out, indent, options, inline_first),
        Node::Scalar(_) => format_inline(node, out, indent, options, "", false),
    }
}

/// The collection-end comment, after the last entry.
fn end_comment(
    out: &mut String,
    comment: Option<&str>,
    space_before: bool,
    indent: usize,
    last_ends_keep: bool,
) {
    if let Some(comment) = comment {
        if space_before && !last_ends_keep {
            blank_line(out);
        }
        comment_lines(out, comment, indent);
    }
}

fn format_block_map(
    map: &Map,
    out: &mut String,
    indent: usize,
    options: &ToStringOptions,
    inline_first: bool,
) {
    for (i, pair) in map.items.iter().enumerate() {
        if let Some(raw) = verbatim_entry(pair) {
            format_verbatim(raw, out, map.space_before_at(i), indent, options);
            continue;
        }
        let value = pair.value.as_ref().map(item_node);
        if !(inline_first && i == 0) {
            if map.space_before_at(i) {
                blank_line(out);
            }
            if let Some(comment) = pair.comment_before() {
                comment_lines(out, comment, indent);
            }
            if let Some(value) = value.as_deref()
                && !value_on_next_line(pair, value)
                && let Some(comment) = pre_comment(value)
            {
                comment_lines(out, comment, indent);
            }
            push_indent(out, indent);
        }
        format_pair(pair, value.as_deref(), out, indent, options);
    }
    let last_ends_keep = map
        .items
        .last()
        .and_then(Pair::value_node)
        .is_some_and(Node::ends_with_keep_block);
    end_comment(
        out,
        map.meta.comment.as_deref(),
        map.space_before_comment,
        indent,
        last_ends_keep,
    );
}

/// A key comment after `key:`; extra lines go below at `indent`.
fn key_comment(out: &mut String, comment: Option<&str>, indent: usize) {
    let Some(comment) = comment else {
        out.push('\n');
        return;
    };
    let (first, rest) = comment
        .split_once('\n')
        .map_or((comment, None), |(first, rest)| (first, Some(rest)));
    out.push_str(" #");
    out.push_str(first);
    out.push('\n');
    if let Some(rest) = rest {
        comment_lines(out, rest, indent);
    }
}

fn format_key(pair: &Pair, out: &mut String, indent: usize, options: &ToStringOptions) {
    let Some(key) = pair.key.as_ref().map(item_node) else {
        return;
    };
    let props = props(key.meta());
    let text = match &*key {
        Node::Scalar(s) => single_line(s, false),
        Node::Map(_) | Node::Seq(_) => format_flow(&key, indent, options, true),
    };
    out.push_str(&props);
    if !props.is_empty() && !text.is_empty() {
        out.push(' ');
    }
    out.push_str(&text);
}

fn format_pair(
    pair: &Pair,
    value: Option<&Node>,
    out: &mut String,
    indent: usize,
    options: &ToStringOptions,
) {
    format_key(pair, out, indent, options);
    out.push(':');
    let child = indent + options.indent;
    match value {
        None => key_comment(out, pair.comment(), child),
        Some(value) if is_bare_null(value) => {
            let comments: Vec<&str> = pair.comment().into_iter().chain(value.comment()).collect();
            let joined = comments.join("\n");
            key_comment(out, (!joined.is_empty()).then_some(joined.as_str()), child);
            if let Some(comment) = value.comment_before() {
                comment_lines(out, comment, child);
            }
        }
        Some(value) if value.is_block_collection() => {
            let props = props(value.meta());
            if !props.is_empty() {
                out.push(' ');
                out.push_str(&props);
            }
            let nested = match value {
                Node::Seq(_) if !options.indent_seq => indent,
                _ => child,
            };
            let comments: Vec<&str> = pair
                .comment()
                .into_iter()
                .chain(indicator_comment(value))
                .collect();
            let joined = comments.join("\n");
            key_comment(out, (!joined.is_empty()).then_some(joined.as_str()), nested);
            if value.space_before() {
                blank_line(out);
            }
            if let Some(comment) = value.comment_before() {
                comment_lines(out, comment, nested);
            }
            format_block_collection(value, out, nested, options, false);
        }
        Some(value) if value_on_next_line(pair, value) => {
            key_comment(out, pair.comment(), child);
            if value.space_before() {
                blank_line(out);
            }
            if let Some(comment) = value.comment_before() {
                comment_lines(out, comment, child);
            }
            if let Some(comment) = pre_comment(value) {
                comment_lines(out, comment, child);
            }
            push_indent(out, child);
            format_inline(value, out, child, options, "", false);
        }
        Some(value) => format_inline(value, out, indent, options, " ", false),
    }
}

fn format_block_seq(
    seq: &Seq,
    out: &mut String,
    indent: usize,
    options: &ToStringOptions,
    inline_first: bool,
) {
    for (i, item) in seq.items.iter().enumerate() {
        if item.as_scalar().is_some_and(Scalar::is_verbatim) {
            format_verbatim(item, out, seq.space_before_at(i), indent, options);
            continue;
        }
        if !(inline_first && i == 0) {
            if seq.space_before_at(i) {
                blank_line(out);
            }
            if let Some(comment) = item.comment_before() {
                comment_lines(out, comment, indent);
            }
            if let Some(comment) = pre_comment(item) {
                comment_lines(out, comment, indent);
            }
            push_indent(out, indent);
        }
        out.push('-');
        let nested = indent + 2;
        if item.is_block_collection() {
            let props = props(item.meta());
            let opening = indicator_comment(item);
            if props.is_empty() && opening.is_none() && !first_entry_has_lead(item) {
                out.push(' ');
                format_block_collection(item, out, nested, options, true);
            } else {
                if !props.is_empty() {
                    out.push(' ');
                    out.push_str(&props);
                }
                key_comment(out, opening, nested);
                format_block_collection(item, out, nested, options, false);
            }
        } else if is_bare_null(item) && item.comment().is_none() {
            out.push('\n');
        } else {
            format_inline(item, out, indent, options, " ", false);
        }
    }
    let last_ends_keep = seq.items.last().is_some_and(Node::ends_with_keep_block);
    end_comment(
        out,
        seq.meta.comment.as_deref(),
        seq.space_before_comment,
        indent,
        last_ends_keep,
    );
}
