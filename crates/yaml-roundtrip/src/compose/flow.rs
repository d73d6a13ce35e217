//! Flow context: `[...]` and `{...}` collections.

use core::mem;

use super::block::{Parent, lead_into, pair_tail};
use super::pending::{self, Pending};
use super::{Composer, is_boundary};
use crate::cst::TokenKind;
use crate::error::ErrorCode;
use crate::node::{Item, Map, Node, NodeMeta, Pair, Scalar, Seq};

/// One entry between the brackets, before it is placed into a seq or map.
enum Entry {
    Node(Node),
    Pair(Pair),
}

impl Entry {
    /// Where comments above the entry go.
    fn lead_meta(&mut self) -> Option<&mut NodeMeta> {
        match self {
            Self::Node(node) => Some(node.meta_mut()),
            Self::Pair(pair) => pair.key.as_mut().and_then(Item::as_node_mut).map(Node::meta_mut),
        }
    }

    /// Where a comment after the entry goes.
    fn tail_meta(&mut self) -> Option<&mut NodeMeta> {
        match self {
            Self::Node(node) => Some(node.meta_mut()),
            Self::Pair(pair) => pair_tail(pair),
        }
    }
}

fn is_close(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::FlowSeqEnd | TokenKind::FlowMapEnd)
}

impl Composer<'_, '_> {
    pub(super) fn flow_collection(&mut self) -> Node {
        let Some(open) = self.bump() else {
            return Node::Scalar(Scalar::null());
        };
        let is_map = open.kind == TokenKind::FlowMapStart;
        let (close, close_char) = if is_map {
            (TokenKind::FlowMapEnd, '}')
        } else {
            (TokenKind::FlowSeqEnd, ']')
        };
        let mut entries: Vec<Entry> = Vec::new();
        let mut pending = Pending::default();
        let mut comment = None;

        loop {
            while let Some(tok) = self.peek().cloned() {
                match tok.kind {
                    TokenKind::Comment if !tok.line_start => {
                        let text = self.comment_text(&tok);
                        match entries.last_mut().and_then(Entry::tail_meta) {
                            Some(meta) => pending::append_comment(&mut meta.comment, vec![text]),
                            None => pending.push_comment(text, tok.col),
                        }
                    }
                    TokenKind::Comment => pending.push_comment(self.comment_text(&tok), tok.col),
                    TokenKind::BlankLine => pending.push_blank(),
                    _ => break,
                }
                self.pos += 1;
            }
            let Some(tok) = self.peek().cloned() else {
                self.error(
                    ErrorCode::MissingChar,
                    open.span.clone(),
                    &format!("Missing closing {close_char}"),
                );
                break;
            };
            match tok.kind {
                kind if kind == close => {
                    self.bump();
                    break;
                }
                kind if is_boundary(kind) => {
                    self.error(
                        ErrorCode::MissingChar,
                        open.span.clone(),
                        &format!("Missing closing {close_char}"),
                    );
                    break;
                }
                TokenKind::FlowSeqEnd | TokenKind::FlowMapEnd => {
                    self.error(
                        ErrorCode::UnexpectedToken,
                        tok.span.clone(),
                        &format!("Expected {close_char} to close this flow collection"),
                    );
                    self.bump();
                }
                TokenKind::Comma => {
                    self.error(
                        ErrorCode::UnexpectedToken,
                        tok.span.clone(),
                        "Flow collection entries cannot be empty",
                    );
                    self.bump();
                }
                _ => {
                    let mut entry = self.flow_entry(is_map);
                    if let Some(meta) = entry.lead_meta() {
                        lead_into(meta, mem::take(&mut pending));
                    }
                    entries.push(entry);
                    match self.peek().cloned() {
                        Some(t) if t.kind == TokenKind::Comma => {
                            self.bump();
                        }
                        Some(t)
                            if !t.kind.is_trivia() && !is_boundary(t.kind) && !is_close(t.kind) =>
                        {
                            self.error(
                                ErrorCode::UnexpectedToken,
                                t.span,
                                "Flow collection entries must be separated by commas",
                            );
                        }
                        _ => {}
                    }
                }
            }
        }

        let (lines, _) = pending.into_leading();
        match entries.last_mut().and_then(Entry::tail_meta) {
            Some(meta) => pending::append_comment(&mut meta.comment, lines),
            None => pending::append_comment(&mut comment, lines),
        }
        let range = Some(open.span.start..self.last_end);
        if is_map {
            let items = entries
                .into_iter()
                .map(|entry| match entry {
                    Entry::Pair(pair) => pair,
                    Entry::Node(node) => Pair {
                        key: Some(node.into()),
                        value: None,
                    },
                })
                .collect();
            Node::Map(Map {
                items,
                flow: true,
                meta: NodeMeta {
                    comment,
                    range,
                    ..NodeMeta::default()
                },
                ..Map::default()
            })
        } else {
            let items = entries
                .into_iter()
                .map(|entry| match entry {
                    Entry::Node(node) => node,
                    Entry::Pair(pair) => Node::Map(Map {
                        items: vec![pair],
                        flow: true,
                        ..Map::default()
                    }),
                })
                .collect();
            Node::Seq(Seq {
                items,
                flow: true,
                meta: NodeMeta {
                    comment,
                    range,
                    ..NodeMeta::default()
                },
                ..Seq::default()
            })
        }
    }

    fn flow_entry(&mut self, in_map: bool) -> Entry {
        if let Some(tok) = self.peek().filter(|t| t.kind == TokenKind::ExplicitKey).cloned() {
            self.error(
                ErrorCode::UnsupportedExplicitKey,
                tok.span,
                "Explicit ? keys are not supported; composing as an implicit key",
            );
            self.bump();
        }
        let key = if self.peek().is_some_and(|t| t.kind == TokenKind::MapValue) {
            Node::Scalar(Scalar::null())
        } else {
            self.flow_item()
        };
        if !self.peek().is_some_and(|t| t.kind == TokenKind::MapValue) {
            return if in_map {
                Entry::Pair(Pair {
                    key: Some(key.into()),
                    value: None,
                })
            } else {
                Entry::Node(key)
            };
        }
        self.bump();
        let lead = self.gather();
        let mut value = match self.peek().map(|t| t.kind) {
            None | Some(TokenKind::Comma | TokenKind::FlowSeqEnd | TokenKind::FlowMapEnd) => {
                Node::Scalar(Scalar::null())
            }
            Some(_) => self.flow_item(),
        };
        lead_into(value.meta_mut(), lead);
        Entry::Pair(Pair::new(key, value))
    }

    fn flow_item(&mut self) -> Node {
        let props = self.take_props();
        let lead = self.gather();
        let mut node = match self.peek().cloned() {
            Some(tok) if matches!(tok.kind, TokenKind::FlowSeqStart | TokenKind::FlowMapStart) => {
                self.flow_collection()
            }
            Some(tok) if tok.kind.is_scalar() => Node::Scalar(self.flow_scalar(Some(Parent::Flow))),
            Some(tok)
                if !matches!(
                    tok.kind,
                    TokenKind::Comma
                        | TokenKind::MapValue
                        | TokenKind::FlowSeqEnd
                        | TokenKind::FlowMapEnd
                ) && !is_boundary(tok.kind) =>
            {
                self.error(
                    ErrorCode::UnexpectedToken,
                    tok.span,
                    "Block syntax is not allowed inside a flow collection",
                );
                self.bump();
                Node::Scalar(Scalar::null())
            }
            _ => Node::Scalar(Scalar::null()),
        };
        lead_into(node.meta_mut(), lead);
        props.apply(node.meta_mut());
        node
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::cst::Cst;
    use crate::document::Document;
    use crate::error::ErrorCode;
    use crate::node::{Node, Scalar};
    use crate::options::ParseOptions;

    fn one(src: &str) -> Document {
        let cst = Cst::parse(src);
        super::super::compose_documents(&cst, &ParseOptions::default()).remove(0)
    }

    fn texts(node: &Node) -> Vec<&str> {
        node.as_seq()
            .expect("seq")
            .items
            .iter()
            .map(|n| n.as_scalar().map_or("<collection>", Scalar::value))
            .collect()
    }

    #[test]
    fn flow_seq_entries_and_comments() {
        let doc = one("[a, # one\n  b]\n");
        let root = doc.contents.as_ref().expect("root");
        assert_eq!(texts(root), vec!["a", "b"]);
        let seq = root.as_seq().expect("seq");
        assert!(seq.flow);
        assert_eq!(seq.items[0].comment(), Some(" one"));
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn flow_map_null_values() {
        let doc = one("{a, b: , c: 1}\n");
        let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        assert!(map.flow);
        assert_eq!(map.items.len(), 3);
        assert!(map.items[0].value.is_none());
        let b = map.get("b").and_then(Node::as_scalar).expect("b");
        assert!(b.is_null());
        assert_eq!(map.get("c").and_then(Node::as_scalar).map(Scalar::value), Some("1"));
    }

    #[test]
    fn pair_in_flow_seq_is_single_pair_map() {
        let doc = one("[a: 1, b]\n");
        let seq = doc.contents.as_ref().and_then(Node::as_seq).expect("seq");
        let map = seq.items[0].as_map().expect("map");
        assert!(map.flow);
        assert_eq!(map.items.len(), 1);
        assert_eq!(seq.items[1].as_scalar().map(Scalar::value), Some("b"));
    }

    #[test]
    fn unterminated_flow_seq_is_reported() {
        let doc = one("[a, b\n");
        assert!(doc.errors.iter().any(|e| e.code == ErrorCode::MissingChar));
        assert_eq!(texts(doc.contents.as_ref().expect("root")), vec!["a", "b"]);
    }

    #[test]
    fn missing_comma_is_reported() {
        let doc = one("[a, [b] c]\n");
        assert!(
            doc.errors
                .iter()
                .any(|e| e.code == ErrorCode::UnexpectedToken && e.message.contains("commas"))
        );
    }

    #[test]
    fn nested_flow_in_block_map() {
        let doc = one("k: {x: [1, 2]} # tail\n");
        let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        let inner = map.get("k").and_then(Node::as_map).expect("inner");
        assert_eq!(inner.meta.comment.as_deref(), Some(" tail"));
        assert_eq!(texts(inner.get("x").expect("x")), vec!["1", "2"]);
    }
}
