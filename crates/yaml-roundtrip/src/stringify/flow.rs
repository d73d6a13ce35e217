//! `[...]` and `{...}` collections.

use super::scalar::single_line;
use super::{blank_line, comment_lines, item_node, props, push_indent};
use crate::node::{Item, Node, NodeMeta};
use crate::options::ToStringOptions;

/// One printed entry and the annotations that decide its layout.
struct FlowEntry<'a> {
    text: String,
    comment_before: Option<&'a str>,
    space_before: bool,
    comment: Option<String>,
}

impl FlowEntry<'_> {
    fn needs_own_line(&self) -> bool {
        self.comment_before.is_some()
            || self.space_before
            || self.comment.is_some()
            || self.text.contains('\n')
    }
}

/// A node as a flow entry: props, then a single-line scalar or a nested
/// flow collection.
fn entry_text(node: &Node, indent: usize, options: &ToStringOptions) -> String {
    let props = props(node.meta());
    let body = match node {
        Node::Scalar(s) => single_line(s, true),
        Node::Map(_) | Node::Seq(_) => format_flow(node, indent, options, false),
    };
    match (props.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => props,
        (false, false) => format!("{props} {body}"),
    }
}

fn entries<'a>(node: &'a Node, indent: usize, options: &ToStringOptions) -> Vec<FlowEntry<'a>> {
    let lead = |meta: &'a NodeMeta| (meta.comment_before.as_deref(), meta.space_before);
    match node {
        Node::Seq(seq) => seq
            .items
            .iter()
            .map(|item| {
                let (comment_before, space_before) = lead(item.meta());
                FlowEntry {
                    text: entry_text(item, indent, options),
                    comment_before,
                    space_before,
                    comment: item.comment().map(str::to_string),
                }
            })
            .collect(),
        Node::Map(map) => map
            .items
            .iter()
            .map(|pair| {
                let (comment_before, space_before) = pair
                    .key
                    .as_ref()
                    .and_then(Item::as_node)
                    .map_or((None, false), |k| lead(k.meta()));
                let key = pair.key.as_ref().map(item_node);
                let key_text = key
                    .as_deref()
                    .map(|k| entry_text(k, indent, options))
                    .unwrap_or_default();
                let value = pair.value.as_ref().map(item_node);
                let text = match value.as_deref() {
                    None => key_text,
                    Some(Node::Scalar(s)) if s.is_null() && props(&s.meta).is_empty() => {
                        format!("{key_text}:")
                    }
                    Some(v) => format!("{key_text}: {}", entry_text(v, indent, options)),
                };
                let comment = match value.as_deref() {
                    Some(v) => v.comment().map(str::to_string),
                    None => key.as_deref().and_then(Node::comment).map(str::to_string),
                };
                FlowEntry {
                    text,
                    comment_before,
                    space_before,
                    comment,
                }
            })
            .collect(),
        Node::Scalar(_) => Vec::new(),
    }
}

/// A flow collection starting on a line indented to `line_indent`. The
/// result has no trailing line break; the collection's own comment is left
/// to the caller.
///
/// Inside a block collection every continuation line, the closing bracket
/// included, must sit deeper than the block's own indentation, so with
/// `in_block` the bracket lines up with the entries.
pub(super) fn format_flow(
    node: &Node,
    line_indent: usize,
    options: &ToStringOptions,
    in_block: bool,
) -> String {
    let (open, close) = match node {
        Node::Map(_) => ('{', '}'),
        _ => ('[', ']'),
    };
    let entry_indent = line_indent + options.indent;
    let entries = entries(node, entry_indent, options);
    if entries.is_empty() {
        return format!("{open}{close}");
    }

    let pad = if options.flow_collection_padding { " " } else { "" };
    let joined = entries
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let single = format!("{open}{pad}{joined}{pad}{close}");
    if !entries.iter().any(FlowEntry::needs_own_line)
        && line_indent + single.len() <= options.line_width
    {
        return single;
    }

    let mut out = String::new();
    out.push(open);
    out.push('\n');
    for entry in &entries {
        if entry.space_before {
            blank_line(&mut out);
        }
        if let Some(comment) = entry.comment_before {
            comment_lines(&mut out, comment, entry_indent);
        }
        push_indent(&mut out, entry_indent);
        out.push_str(&entry.text);
        out.push(',');
        match entry.comment.as_deref() {
            Some(comment) => {
                let (first, rest) = comment
                    .split_once('\n')
                    .map_or((comment, None), |(first, rest)| (first, Some(rest)));
                out.push_str(" #");
                out.push_str(first);
                out.push('\n');
                if let Some(rest) = rest {
                    comment_lines(&mut out, rest, entry_indent);
                }
            }
            None => out.push('\n'),
        }
    }
    push_indent(&mut out, if in_block { entry_indent } else { line_indent });
    out.push(close);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::node::{Map, Pair, Scalar, Seq};

    fn seq(items: &[&str]) -> Node {
        let mut seq = Seq::new();
        seq.flow = true;
        for item in items {
            seq.push(Scalar::new(*item));
        }
        seq.into()
    }

    #[test]
    fn short_collections_stay_on_one_line() {
        let options = ToStringOptions::default();
        assert_eq!(format_flow(&seq(&["a", "b"]), 0, &options, false), "[a, b]");
        let padded = ToStringOptions {
            flow_collection_padding: true,
            ..ToStringOptions::default()
        };
        assert_eq!(format_flow(&seq(&["a", "b"]), 0, &padded, false), "[ a, b ]");
        assert_eq!(format_flow(&seq(&[]), 0, &padded, false), "[]");
    }

    #[test]
    fn long_collections_break_per_entry() {
        let options = ToStringOptions {
            line_width: 10,
            ..ToStringOptions::default()
        };
        let node = seq(&["alpha", "beta", "gamma"]);
        assert_eq!(
            format_flow(&node, 2, &options, false),
            "[\n    alpha,\n    beta,\n    gamma,\n  ]"
        );
        assert_eq!(
            format_flow(&node, 2, &options, true),
            "[\n    alpha,\n    beta,\n    gamma,\n    ]"
        );
    }

    #[test]
    fn commented_entry_forces_line_breaks() {
        let mut node = seq(&["a", "b"]);
        if let Some(seq) = node.as_seq_mut() {
            seq.items[0].set_comment(Some(" first".into()));
        }
        assert_eq!(
            format_flow(&node, 0, &ToStringOptions::default(), false),
            "[\n  a, # first\n  b,\n]"
        );
    }

    #[test]
    fn map_entries_with_empty_values() {
        let map = Map {
            items: vec![
                Pair {
                    key: Some(Scalar::new("a").into()),
                    value: None,
                },
                Pair::new(Scalar::new("b"), Scalar::null()),
                Pair::new(Scalar::new("c"), Scalar::new("x, y")),
            ],
            flow: true,
            ..Map::default()
        };
        assert_eq!(
            format_flow(&map.into(), 0, &ToStringOptions::default(), false),
            "{a, b:, c: \"x, y\"}"
        );
    }
}
