//! Scalars and other single-line-capable values in block context.

use super::flow::format_flow;
use super::{comment_lines, props, push_indent};
use crate::node::{Node, Scalar, ScalarSource};
use crate::options::ToStringOptions;
use crate::scalar::{self, ScalarStyle};

/// `value` on one line in `style`, falling back to double quotes.
fn encode_inline(value: &str, style: ScalarStyle, in_flow: bool) -> String {
    match style {
        ScalarStyle::Plain => scalar::encode_plain(value, in_flow)
            .unwrap_or_else(|| scalar::encode_double_quoted(value)),
        ScalarStyle::SingleQuoted => scalar::encode_single_quoted(value)
            .unwrap_or_else(|| scalar::encode_double_quoted(value)),
        _ => scalar::encode_double_quoted(value),
    }
}

/// Whether `s` comes out as plain text, where a trailing comment could be
/// mistaken for more of the scalar.
fn prints_plain(s: &Scalar) -> bool {
    s.style() == ScalarStyle::Plain
        && (s.source.is_some() || s.is_null() || scalar::encode_plain(s.value(), false).is_some())
}

/// A multi-line trailing comment that has to be printed above the line
/// holding the value.
pub(super) fn pre_comment(node: &Node) -> Option<&str> {
    match node {
        Node::Scalar(s) if prints_plain(s) => s.meta.comment.as_deref().filter(|c| c.contains('\n')),
        _ => None,
    }
}

/// A scalar on a single line, for keys and flow entries.
pub(super) fn single_line(s: &Scalar, in_flow: bool) -> String {
    if s.is_null() {
        return String::new();
    }
    match &s.source {
        Some(ScalarSource::Inline(lines)) if lines.len() == 1 => lines[0].clone(),
        Some(ScalarSource::Verbatim(text)) => text.clone(),
        _ if s.style().is_block() => scalar::encode_double_quoted(s.value()),
        _ => encode_inline(s.value(), s.style(), in_flow),
    }
}

/// A plain or quoted scalar in block context; continuation lines of its
/// source are indented to `cont_indent`.
fn block_context_text(s: &Scalar, cont_indent: usize) -> String {
    if s.is_null() {
        return String::new();
    }
    let lines = match &s.source {
        Some(ScalarSource::Inline(lines)) => lines,
        Some(ScalarSource::Verbatim(text)) => return text.clone(),
        _ => return encode_inline(s.value(), s.style(), false),
    };
    let mut text = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            text.push('\n');
            if !line.is_empty() {
                push_indent(&mut text, cont_indent);
            }
        }
        text.push_str(line);
    }
    text
}

/// Header and body of a `|` or `>` scalar. The header goes on the current
/// line; the body is indented one step past `line_indent`, or sits at
/// column zero for a root scalar.
fn format_block_scalar(
    s: &Scalar,
    out: &mut String,
    line_indent: usize,
    options: &ToStringOptions,
    root: bool,
) {
    let (style, lines) = match &s.source {
        Some(ScalarSource::Block(lines)) => (s.style(), lines.clone()),
        _ => match scalar::encode_block(s.value(), s.style() == ScalarStyle::Folded) {
            Some(lines) => (s.style(), lines),
            None => (
                ScalarStyle::Literal,
                scalar::encode_block(s.value(), false).unwrap_or_default(),
            ),
        },
    };
    let step = options.indent.clamp(1, 9);
    let leading_space = lines
        .iter()
        .find(|l| !l.is_empty())
        .is_some_and(|l| l.starts_with(' '));
    let (body_indent, digit) = match (root, leading_space) {
        (true, false) => (0, None),
        (true, true) => (step, Some(step)),
        (false, leading) => (line_indent + step, leading.then_some(step)),
    };

    out.push(if style == ScalarStyle::Folded { '>' } else { '|' });
    if let Some(digit) = digit {
        out.push_str(&digit.to_string());
    }
    out.push_str(s.chomping().indicator());
    if let Some(comment) = &s.meta.comment {
        out.push_str(" #");
        out.push_str(&comment.split('\n').collect::<Vec<_>>().join(" "));
    }
    out.push('\n');
    for line in &lines {
        if !line.is_empty() {
            push_indent(out, body_indent);
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Write a scalar, flow collection or empty collection that starts on the
/// current line, then finish the line and any comment lines after it.
///
/// `lead` separates non-empty output from what is already on the line.
pub(super) fn format_inline(
    node: &Node,
    out: &mut String,
    line_indent: usize,
    options: &ToStringOptions,
    lead: &str,
    root: bool,
) {
    let meta = node.meta();
    let props = props(meta);
    if !props.is_empty() {
        out.push_str(lead);
        out.push_str(&props);
    }
    let sep = if props.is_empty() { lead } else { " " };
    let cont_indent = if root { line_indent } else { line_indent + options.indent };

    let (text, inline_comment_ok) = match node {
        Node::Scalar(s) if s.style().is_block() => {
            out.push_str(sep);
            format_block_scalar(s, out, line_indent, options, root);
            return;
        }
        Node::Scalar(s) => (block_context_text(s, cont_indent), prints_plain(s)),
        Node::Map(_) | Node::Seq(_) => (format_flow(node, line_indent, options, !root), false),
    };
    if !text.is_empty() {
        out.push_str(sep);
        out.push_str(&text);
    }
    match meta.comment.as_deref() {
        Some(comment) if !comment.contains('\n') => {
            out.push_str(" #");
            out.push_str(comment);
            out.push('\n');
        }
        // Plain scalars had theirs printed above the line.
        Some(_) if inline_comment_ok => out.push('\n'),
        Some(comment) => {
            out.push('\n');
            comment_lines(out, comment, line_indent);
        }
        None => out.push('\n'),
    }
}
