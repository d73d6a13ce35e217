//! Block context: indentation-scoped maps and sequences, and the scalars
//! found inside them.

use core::mem;

use super::pending::{self, Pending, join};
use super::{Composer, Tok, is_boundary, is_comment_or_blank};
use crate::cst::TokenKind;
use crate::error::ErrorCode;
use crate::node::{Item, Map, Node, NodeMeta, Pair, Scalar, ScalarSource, Seq};
use crate::scalar::{self, Chomping, ScalarStyle};

/// What contains the node being composed, deciding which later lines still
/// belong to it.
#[derive(Debug, Clone, Copy)]
pub(super) enum Parent {
    Root,
    /// Value of a block map whose keys sit at this column.
    Map(usize),
    /// Item of a block sequence whose `-` sits at this column.
    Seq(usize),
    Flow,
}

impl Parent {
    /// Whether a node starting with `tok` on a later line belongs here.
    fn admits(self, tok: &Tok) -> bool {
        if is_boundary(tok.kind) {
            return false;
        }
        match self {
            Self::Root | Self::Flow => true,
            Self::Map(indent) => {
                tok.col > indent || (tok.col == indent && tok.kind == TokenKind::SeqItem)
            }
            Self::Seq(indent) => tok.col > indent,
        }
    }

    /// Whether a plain scalar may continue onto the line starting with `tok`.
    fn continues(self, tok: &Tok) -> bool {
        match self {
            Self::Root | Self::Flow => !is_boundary(tok.kind),
            Self::Map(indent) | Self::Seq(indent) => tok.col > indent,
        }
    }
}

/// Anchor and tag read ahead of a node.
#[derive(Debug, Default)]
pub(super) struct Props {
    anchor: Option<String>,
    tag: Option<String>,
    line: Option<usize>,
}

impl Props {
    fn merge(&mut self, other: Self) {
        if other.anchor.is_some() {
            self.anchor = other.anchor;
        }
        if other.tag.is_some() {
            self.tag = other.tag;
        }
        self.line = other.line.or(self.line);
    }

    pub(super) fn apply(self, meta: &mut NodeMeta) {
        if self.anchor.is_some() {
            meta.anchor = self.anchor;
        }
        if self.tag.is_some() {
            meta.tag = self.tag;
        }
    }
}

/// Fold a leading run into a node's own `comment_before` and `space_before`.
pub(super) fn lead_into(meta: &mut NodeMeta, lead: Pending) {
    let (lines, blank) = lead.into_leading();
    pending::append_comment(&mut meta.comment_before, lines);
    meta.space_before |= blank;
}

/// Where a comment trailing a pair is stored: the value, or the key when
/// there is no value node.
pub(super) fn pair_tail(pair: &mut Pair) -> Option<&mut NodeMeta> {
    if pair.value_node().is_some() {
        pair.value_node_mut().map(Node::meta_mut)
    } else {
        pair.key.as_mut().and_then(Item::as_node_mut).map(Node::meta_mut)
    }
}

/// Store the comment after a `-` on the collection it opens.
fn set_indicator_comment(node: &mut Node, text: String) {
    match node {
        Node::Map(map) => map.indicator_comment = Some(text),
        Node::Seq(seq) => seq.indicator_comment = Some(text),
        Node::Scalar(s) => pending::prepend_comment(&mut s.meta.comment_before, vec![text]),
    }
}

fn claim_end(
    pending: &mut Pending,
    indent: usize,
    next_col: Option<usize>,
    comment: &mut Option<String>,
    space: &mut bool,
) {
    if let Some((blank, lines)) = pending.claim(indent, next_col) {
        tracing::trace!(indent, lines = lines.len(), "collection-end comment");
        if comment.is_none() {
            *space = blank;
        }
        pending::append_comment(comment, lines);
    }
}

impl Composer<'_, '_> {
    pub(super) fn take_props(&mut self) -> Props {
        let mut props = Props::default();
        while let Some(tok) = self
            .peek()
            .filter(|t| matches!(t.kind, TokenKind::Anchor | TokenKind::Tag))
            .cloned()
        {
            self.bump();
            let text = self.text(&tok);
            if tok.kind == TokenKind::Anchor {
                props.anchor = Some(text.strip_prefix('&').unwrap_or(text).to_string());
            } else {
                props.tag = Some(text.to_string());
            }
            props.line = Some(tok.line);
        }
        props
    }

    /// Compose the block node ahead. `lead` is the trivia already consumed
    /// in front of it; the returned run is trivia consumed after it that the
    /// node did not keep.
    pub(super) fn block_node(&mut self, parent: Parent, mut lead: Pending) -> (Node, Pending) {
        let props = self.take_props();
        if let Some(line) = props.line {
            if let Some((text, col)) = self.trailing_comment() {
                lead.push_comment(text, col);
            }
            let same_line = self
                .peek()
                .is_some_and(|t| t.line == line && !is_comment_or_blank(t.kind));
            if !same_line {
                lead.append(self.gather());
                if !self.peek().is_some_and(|t| parent.admits(t)) {
                    let mut node = Node::Scalar(Scalar::null());
                    props.apply(node.meta_mut());
                    return (node, lead);
                }
            }
        }
        lead.append(self.gather());
        self.block_content(parent, lead, props)
    }

    fn block_content(&mut self, parent: Parent, lead: Pending, mut props: Props) -> (Node, Pending) {
        let Some(tok) = self.peek().cloned() else {
            let mut node = Node::Scalar(Scalar::null());
            props.apply(node.meta_mut());
            return (node, lead);
        };
        let claim = !matches!(parent, Parent::Root);
        let (mut node, rest) = match tok.kind {
            TokenKind::SeqItem => {
                let (seq, rest) = self.block_seq(tok.col, lead, claim);
                (Node::Seq(seq), rest)
            }
            TokenKind::ExplicitKey | TokenKind::MapValue => {
                let (map, rest) = self.block_map(tok.col, lead, claim, Props::default());
                (Node::Map(map), rest)
            }
            _ if self.implicit_key_at(self.pos) => {
                // `&a key: v` anchors the key, not the map
                let key_props = if props.line == Some(tok.line) {
                    mem::take(&mut props)
                } else {
                    Props::default()
                };
                let (map, rest) = self.block_map(tok.col, lead, claim, key_props);
                (Node::Map(map), rest)
            }
            TokenKind::BlockHeader => {
                let mut scalar = self.block_scalar();
                lead_into(&mut scalar.meta, lead);
                (Node::Scalar(scalar), Pending::default())
            }
            TokenKind::FlowSeqStart | TokenKind::FlowMapStart => {
                let mut node = self.flow_collection();
                lead_into(node.meta_mut(), lead);
                if let Some((text, _)) = self.trailing_comment() {
                    pending::append_comment(&mut node.meta_mut().comment, vec![text]);
                }
                (node, Pending::default())
            }
            kind if kind.is_scalar() => {
                let mut scalar = self.flow_scalar(Some(parent));
                lead_into(&mut scalar.meta, lead);
                scalar.meta.comment = self.trailing_comment().map(|(text, _)| text);
                (Node::Scalar(scalar), Pending::default())
            }
            _ => {
                self.error(
                    ErrorCode::UnexpectedToken,
                    tok.span.clone(),
                    "Unexpected token where a block node should start",
                );
                self.bump();
                (Node::Scalar(Scalar::null()), lead)
            }
        };
        props.apply(node.meta_mut());
        (node, rest)
    }

    pub(super) fn block_map(
        &mut self,
        indent: usize,
        lead: Pending,
        claim: bool,
        mut key_props: Props,
    ) -> (Map, Pending) {
        let start = self.peek().map_or(self.last_end, |t| t.span.start);
        let mut map = Map::new();
        let split = lead.split_siblings();
        map.meta.comment_before = join(split.detached);
        let mut before = split.adjacent;
        let mut space = split.blank;
        loop {
            let (mut pair, mut pending) = self.block_pair(indent, mem::take(&mut key_props));
            if let Some(key) = pair.key.as_mut().and_then(Item::as_node_mut) {
                let meta = key.meta_mut();
                pending::prepend_comment(&mut meta.comment_before, mem::take(&mut before));
                meta.space_before |= space;
            }
            self.check_duplicate(&map.items, &pair);
            map.items.push(pair);

            let next = loop {
                pending.append(self.gather());
                match self.peek() {
                    Some(t) if t.kind == TokenKind::SeqItem && t.col > indent => {
                        let span = t.span.clone();
                        self.error(
                            ErrorCode::BadIndent,
                            span,
                            "A sequence cannot start here inside a map",
                        );
                        let prev = map.items.last_mut().and_then(pair_tail);
                        let raw = self.stray_node(mem::take(&mut pending), prev);
                        map.items.push(Pair {
                            key: Some(raw.into()),
                            value: None,
                        });
                    }
                    other => break other.cloned(),
                }
            };
            match next {
                Some(tok)
                    if !is_boundary(tok.kind)
                        && tok.col >= indent
                        && tok.kind != TokenKind::SeqItem =>
                {
                    if tok.col > indent {
                        self.error(
                            ErrorCode::BadIndent,
                            tok.span.clone(),
                            "All map keys must be at the same indentation",
                        );
                    }
                    let split = pending.split_siblings();
                    if let Some(tail) = map.items.last_mut().and_then(pair_tail) {
                        pending::append_comment(&mut tail.comment, split.detached);
                    }
                    before = split.adjacent;
                    space = split.blank;
                }
                next => {
                    if claim {
                        claim_end(
                            &mut pending,
                            indent,
                            next.map(|t| t.col),
                            &mut map.meta.comment,
                            &mut map.space_before_comment,
                        );
                    }
                    map.meta.range = Some(start..self.last_end);
                    return (map, pending);
                }
            }
        }
    }

    fn key_node(&mut self) -> Node {
        let props = self.take_props();
        let mut node = match self.peek().map(|t| t.kind) {
            Some(TokenKind::FlowSeqStart | TokenKind::FlowMapStart) => self.flow_collection(),
            Some(kind) if kind.is_scalar() => Node::Scalar(self.flow_scalar(None)),
            Some(TokenKind::MapValue) | None => Node::Scalar(Scalar::null()),
            Some(_) => {
                if let Some(tok) = self.bump() {
                    self.error(ErrorCode::UnexpectedToken, tok.span, "Expected a map key");
                }
                Node::Scalar(Scalar::null())
            }
        };
        props.apply(node.meta_mut());
        node
    }

    fn block_pair(&mut self, indent: usize, mut props: Props) -> (Pair, Pending) {
        props.merge(self.take_props());
        let Some(first) = self.peek().cloned() else {
            return (Pair::new(Scalar::null(), Scalar::null()), Pending::default());
        };
        let mut key = match first.kind {
            TokenKind::MapValue => Node::Scalar(Scalar::null()),
            TokenKind::ExplicitKey => {
                self.error(
                    ErrorCode::UnsupportedExplicitKey,
                    first.span.clone(),
                    "Explicit ? keys are not supported; composing as an implicit key",
                );
                self.bump();
                self.key_node()
            }
            _ => self.key_node(),
        };
        props.apply(key.meta_mut());

        let loose = matches!(first.kind, TokenKind::MapValue | TokenKind::ExplicitKey);
        let colon = match self.peek().cloned() {
            Some(t) if t.kind == TokenKind::MapValue && (loose || !t.line_start) => {
                self.bump();
                t
            }
            _ => {
                let span = key.range().unwrap_or_else(|| first.span.clone());
                self.error(
                    ErrorCode::ImplicitKeyWithoutValue,
                    span,
                    "Implicit map keys need to be followed by map values",
                );
                return (Pair::new(key, Scalar::null()), Pending::default());
            }
        };

        if let Some(tok) = self
            .peek()
            .filter(|t| t.line == colon.line && !is_comment_or_blank(t.kind))
            .cloned()
        {
            let props_ahead = matches!(tok.kind, TokenKind::Anchor | TokenKind::Tag);
            if tok.kind == TokenKind::SeqItem || (!props_ahead && self.implicit_key_at(self.pos))
            {
                self.error(
                    ErrorCode::UnexpectedToken,
                    tok.span.clone(),
                    "Block collections cannot start on the line of their key",
                );
            }
            let (value, rest) = self.block_node(Parent::Map(indent), Pending::default());
            return (Pair::new(key, value), rest);
        }

        if let Some((text, _)) = self.trailing_comment() {
            tracing::trace!(line = colon.line, "key comment");
            pending::append_comment(&mut key.meta_mut().comment, vec![text]);
        }
        let mut pending = self.gather();
        if self.peek().is_some_and(|t| Parent::Map(indent).admits(t)) {
            let (value, rest) = self.block_node(Parent::Map(indent), pending);
            return (Pair::new(key, value), rest);
        }
        let mut value = Scalar::null();
        value.meta.comment_before = join(pending.take_indented(indent));
        (Pair::new(key, value), pending)
    }

    /// Keep the line ahead as a verbatim node. Comments in `lead` before
    /// its last blank line close `prev`; the rest lead the new node.
    pub(super) fn stray_node(&mut self, lead: Pending, prev: Option<&mut NodeMeta>) -> Node {
        let split = lead.split_siblings();
        let mut before = split.adjacent;
        match prev {
            Some(prev) => pending::append_comment(&mut prev.comment, split.detached),
            None => {
                let mut lines = split.detached;
                lines.append(&mut before);
                before = lines;
            }
        }
        let range = self.stray_line();
        let mut raw = self.verbatim(range);
        raw.meta.comment_before = join(before);
        raw.meta.space_before = split.blank;
        tracing::trace!(range = ?raw.meta.range, "kept stray line verbatim");
        Node::Scalar(raw)
    }

    pub(super) fn check_duplicate(&mut self, items: &[Pair], pair: &Pair) {
        if !self.unique_keys {
            return;
        }
        let Some(Node::Scalar(key)) = pair.key_node() else {
            return;
        };
        if key.is_null() {
            return;
        }
        let duplicate = items.iter().any(|p| {
            matches!(p.key_node(), Some(Node::Scalar(k)) if k.value() == key.value())
        });
        if duplicate {
            let span = key.meta.range.clone().unwrap_or_default();
            self.error(ErrorCode::DuplicateKey, span, "Map keys must be unique");
        }
    }

    pub(super) fn block_seq(&mut self, indent: usize, lead: Pending, claim: bool) -> (Seq, Pending) {
        let start = self.peek().map_or(self.last_end, |t| t.span.start);
        let mut seq = Seq::new();
        let split = lead.split_siblings();
        seq.meta.comment_before = join(split.detached);
        let mut before = split.adjacent;
        let mut space = split.blank;
        while let Some(dash) = self.bump() {
            let mut item_lead = Pending::default();
            let mut indicator = None;
            if let Some((text, col)) = self.trailing_comment() {
                if self.collection_below(indent) {
                    indicator = Some(text);
                } else {
                    item_lead.push_comment(text, col);
                }
            }
            let same_line = item_lead.is_empty()
                && indicator.is_none()
                && self
                    .peek()
                    .is_some_and(|t| t.line == dash.line && !is_comment_or_blank(t.kind));
            let (mut node, mut pending) = if same_line {
                self.block_node(Parent::Seq(indent), item_lead)
            } else {
                item_lead.append(self.gather());
                if self.peek().is_some_and(|t| Parent::Seq(indent).admits(t)) {
                    self.block_node(Parent::Seq(indent), item_lead)
                } else {
                    (Node::Scalar(Scalar::null()), item_lead)
                }
            };
            if let Some(text) = indicator {
                set_indicator_comment(&mut node, text);
            }
            let meta = node.meta_mut();
            pending::prepend_comment(&mut meta.comment_before, mem::take(&mut before));
            meta.space_before |= space;
            seq.items.push(node);

            let next = loop {
                pending.append(self.gather());
                match self.peek() {
                    Some(t) if !is_boundary(t.kind) && t.col > indent => {
                        let span = t.span.clone();
                        self.error(
                            ErrorCode::BadIndent,
                            span,
                            "All sequence items must be at the same indentation",
                        );
                        let prev = seq.items.last_mut().map(Node::meta_mut);
                        let raw = self.stray_node(mem::take(&mut pending), prev);
                        seq.items.push(raw);
                    }
                    other => break other.cloned(),
                }
            };
            match next {
                Some(tok) if tok.kind == TokenKind::SeqItem && tok.col == indent => {
                    let split = pending.split_siblings();
                    if let Some(last) = seq.items.last_mut() {
                        pending::append_comment(&mut last.meta_mut().comment, split.detached);
                    }
                    before = split.adjacent;
                    space = split.blank;
                }
                next => {
                    if claim {
                        claim_end(
                            &mut pending,
                            indent,
                            next.map(|t| t.col),
                            &mut seq.meta.comment,
                            &mut seq.space_before_comment,
                        );
                    }
                    seq.meta.range = Some(start..self.last_end);
                    return (seq, pending);
                }
            }
        }
        seq.meta.range = Some(start..self.last_end);
        (seq, Pending::default())
    }

    /// Whether a block map or sequence starts on the line right after a
    /// `-` at `indent`, with nothing in between.
    fn collection_below(&self, indent: usize) -> bool {
        self.peek().is_some_and(|t| {
            t.line_start
                && Parent::Seq(indent).admits(t)
                && !matches!(t.kind, TokenKind::Anchor | TokenKind::Tag)
                && (matches!(
                    t.kind,
                    TokenKind::SeqItem | TokenKind::ExplicitKey | TokenKind::MapValue
                ) || self.implicit_key_at(self.pos))
        })
    }

    /// A plain, quoted or alias scalar. Plain scalars continue onto later
    /// lines admitted by `continuation`.
    pub(super) fn flow_scalar(&mut self, continuation: Option<Parent>) -> Scalar {
        let Some(tok) = self.bump() else {
            return Scalar::null();
        };
        let text = self.text(&tok);
        match tok.kind {
            TokenKind::Plain => {
                let mut lines = vec![text.to_string()];
                let mut end = tok.span.end;
                while let Some(parent) = continuation {
                    let mut at = self.pos;
                    let mut blanks = 0;
                    while self
                        .toks
                        .get(at)
                        .is_some_and(|t| t.kind == TokenKind::BlankLine)
                    {
                        at += 1;
                        blanks += 1;
                    }
                    let Some(next) = self.toks.get(at) else { break };
                    if next.kind != TokenKind::Plain
                        || !next.line_start
                        || !parent.continues(next)
                        || self.implicit_key_at(at)
                    {
                        break;
                    }
                    let line = self.text(next).to_string();
                    end = next.span.end;
                    lines.extend(core::iter::repeat_n(String::new(), blanks));
                    lines.push(line);
                    self.pos = at + 1;
                    self.last_end = end;
                }
                let value = scalar::decode_plain(&lines.join("\n"));
                Scalar::parsed(
                    value,
                    ScalarStyle::Plain,
                    Chomping::Clip,
                    ScalarSource::Inline(lines),
                    tok.span.start..end,
                )
            }
            TokenKind::SingleQuoted | TokenKind::DoubleQuoted => {
                let text = &text.replace("\r\n", "\n");
                let (value, style) = if tok.kind == TokenKind::SingleQuoted {
                    (scalar::decode_single_quoted(text), ScalarStyle::SingleQuoted)
                } else {
                    (scalar::decode_double_quoted(text), ScalarStyle::DoubleQuoted)
                };
                let lines = text
                    .split('\n')
                    .enumerate()
                    .map(|(i, line)| if i == 0 { line } else { line.trim_start() }.to_string())
                    .collect();
                Scalar::parsed(value, style, Chomping::Clip, ScalarSource::Inline(lines), tok.span)
            }
            _ => Scalar::parsed(
                text.to_string(),
                ScalarStyle::Plain,
                Chomping::Clip,
                ScalarSource::Inline(vec![text.to_string()]),
                tok.span,
            ),
        }
    }

    fn block_scalar(&mut self) -> Scalar {
        let Some(header) = self.bump() else {
            return Scalar::null();
        };
        let text = self.text(&header);
        let folded = text.starts_with('>');
        let chomping = Chomping::from_header(text);
        let comment = self.trailing_comment().map(|(text, _)| text);
        let mut end = header.span.end;
        let lines = match self.peek().cloned() {
            Some(Tok {
                kind: TokenKind::BlockBody { indent },
                span,
                ..
            }) => {
                self.bump();
                end = span.end;
                scalar::block_lines(&self.cst.source()[span], indent)
            }
            _ => Vec::new(),
        };
        let style = if folded {
            ScalarStyle::Folded
        } else {
            ScalarStyle::Literal
        };
        let value = scalar::decode_block(&lines, folded, chomping);
        let mut scalar = Scalar::parsed(
            value,
            style,
            chomping,
            ScalarSource::Block(lines),
            header.span.start..end,
        );
        scalar.meta.comment = comment;
        scalar
    }
}
