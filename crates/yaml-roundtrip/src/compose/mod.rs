//! Tree composition and comment attachment.
//!
//! The composer walks the significant tokens of a [`Cst`] by recursive
//! descent. Comments and blank lines met between two structural positions
//! collect in a [`Pending`] run; whichever construct decides what comes next
//! (a sibling, a dedent, the end of the document) also decides who owns the
//! run.

mod block;
mod flow;
mod pending;

use core::mem;
use core::ops::Range;

use crate::cst::{Cst, TokenKind};
use crate::document::Document;
use crate::error::{ErrorCode, YamlError};
use crate::node::{Node, Pair, Scalar};
use crate::options::ParseOptions;

use self::block::{Parent, Props, lead_into, pair_tail};
use self::pending::{Pending, join};

/// A non-whitespace token with its position.
#[derive(Debug, Clone)]
struct Tok {
    kind: TokenKind,
    span: Range<usize>,
    line: usize,
    col: usize,
    /// Only indentation precedes the token on its line.
    line_start: bool,
}

fn is_boundary(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::DirectivesEnd | TokenKind::DocumentEnd | TokenKind::Directive
    )
}

fn is_comment_or_blank(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Comment | TokenKind::BlankLine)
}

struct Composer<'c, 's> {
    cst: &'c Cst<'s>,
    toks: Vec<Tok>,
    pos: usize,
    /// End offset of the last consumed content token.
    last_end: usize,
    unique_keys: bool,
    errors: Vec<YamlError>,
    warnings: Vec<YamlError>,
    /// Trivia after a `...` marker, handed to the next document.
    carry: Pending,
}

/// Compose every document of `cst`. Always yields at least one document.
pub(crate) fn compose_documents(cst: &Cst<'_>, options: &ParseOptions) -> Vec<Document> {
    let mut composer = Composer::new(cst, options);
    let mut docs = Vec::new();
    loop {
        let doc = composer.document();
        tracing::debug!(
            range = ?doc.range,
            errors = doc.errors.len(),
            warnings = doc.warnings.len(),
            "composed document"
        );
        docs.push(doc);
        if composer.peek_sig().is_none() {
            break;
        }
    }
    let source = cst.source();
    let crlf = source
        .find('\n')
        .is_some_and(|at| source[..at].ends_with('\r'));
    for doc in &mut docs {
        doc.crlf = crlf;
    }
    for err in cst.errors() {
        let offset = err.range().start;
        let owner = docs
            .iter()
            .rposition(|doc| doc.range.start <= offset)
            .unwrap_or(0);
        docs[owner].errors.push(err.clone());
    }
    docs
}

impl<'c, 's> Composer<'c, 's> {
    fn new(cst: &'c Cst<'s>, options: &ParseOptions) -> Self {
        let toks = cst
            .tokens()
            .iter()
            .filter(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Indent | TokenKind::Space | TokenKind::Newline
                )
            })
            .map(|t| Tok {
                kind: t.kind,
                span: t.span.clone(),
                line: cst.line_of(t.span.start),
                col: cst.col_of(t.span.start),
                line_start: cst.starts_line(t.span.start),
            })
            .collect();
        Self {
            cst,
            toks,
            pos: 0,
            last_end: 0,
            unique_keys: options.unique_keys,
            errors: Vec::new(),
            warnings: Vec::new(),
            carry: Pending::default(),
        }
    }

    fn text(&self, tok: &Tok) -> &'s str {
        &self.cst.source()[tok.span.clone()]
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    /// Index of the next token that is not a comment or blank line.
    fn sig_index(&self) -> usize {
        let mut at = self.pos;
        while self.toks.get(at).is_some_and(|t| is_comment_or_blank(t.kind)) {
            at += 1;
        }
        at
    }

    fn peek_sig(&self) -> Option<&Tok> {
        self.toks.get(self.sig_index())
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned()?;
        self.pos += 1;
        if !is_comment_or_blank(tok.kind) {
            self.last_end = tok.span.end;
        }
        Some(tok)
    }

    fn error(&mut self, code: ErrorCode, span: Range<usize>, message: &str) {
        tracing::debug!(%code, ?span, message, "composition error");
        self.errors.push(YamlError::new(code, span, message));
    }

    fn warn(&mut self, code: ErrorCode, span: Range<usize>, message: &str) {
        tracing::debug!(%code, ?span, message, "composition warning");
        self.warnings.push(YamlError::new(code, span, message));
    }

    fn comment_text(&self, tok: &Tok) -> String {
        let text = self.text(tok);
        text.strip_prefix('#').unwrap_or(text).to_string()
    }

    /// Consume the comments and blank lines ahead.
    fn gather(&mut self) -> Pending {
        let mut pending = Pending::default();
        while let Some(tok) = self.peek().cloned() {
            match tok.kind {
                TokenKind::Comment => pending.push_comment(self.comment_text(&tok), tok.col),
                TokenKind::BlankLine => pending.push_blank(),
                _ => break,
            }
            self.pos += 1;
        }
        pending
    }

    /// A comment sharing its line with the token just consumed.
    fn trailing_comment(&mut self) -> Option<(String, usize)> {
        let tok = self.peek().filter(|t| t.kind == TokenKind::Comment && !t.line_start)?;
        let tok = tok.clone();
        self.pos += 1;
        tracing::trace!(line = tok.line, "trailing comment");
        Some((self.comment_text(&tok), tok.col))
    }

    /// Consume the line of the next significant token, with whatever a
    /// multi-line token on it drags along, and return its source range
    /// without the line break.
    fn stray_line(&mut self) -> Range<usize> {
        self.pos = self.sig_index();
        let Some(first) = self.peek().cloned() else {
            return self.last_end..self.last_end;
        };
        let start = if first.line_start {
            first.span.start - first.col
        } else {
            first.span.start
        };
        let mut last_line = first.line;
        let mut end = first.span.end;
        while let Some(tok) = self.peek().filter(|t| t.line <= last_line).cloned() {
            self.bump();
            end = end.max(tok.span.end);
            let last_byte = tok.span.end.saturating_sub(1).max(tok.span.start);
            last_line = last_line.max(self.cst.line_of(last_byte));
        }
        let source = self.cst.source();
        let line_end = source[end..].find('\n').map_or(source.len(), |at| end + at);
        start..start + source[start..line_end].trim_end().len()
    }

    /// Source text in `range` as a scalar that prints back as written.
    fn verbatim(&self, range: Range<usize>) -> Scalar {
        let text = self.cst.source()[range.clone()].replace("\r\n", "\n");
        Scalar::verbatim(&text, range)
    }

    /// Whether an implicit mapping key starts at token `at`: props, then a
    /// scalar or flow collection, then `:` on the line the key ends on.
    fn implicit_key_at(&self, mut at: usize) -> bool {
        while self
            .toks
            .get(at)
            .is_some_and(|t| matches!(t.kind, TokenKind::Anchor | TokenKind::Tag))
        {
            at += 1;
        }
        let Some(first) = self.toks.get(at) else {
            return false;
        };
        match first.kind {
            kind if kind.is_scalar() => at += 1,
            TokenKind::FlowSeqStart | TokenKind::FlowMapStart => {
                let mut depth = 0usize;
                loop {
                    let Some(tok) = self.toks.get(at) else {
                        return false;
                    };
                    at += 1;
                    match tok.kind {
                        TokenKind::FlowSeqStart | TokenKind::FlowMapStart => depth += 1,
                        TokenKind::FlowSeqEnd | TokenKind::FlowMapEnd => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => return false,
        }
        let key_end = self.toks[at - 1].span.end;
        self.toks.get(at).is_some_and(|t| {
            t.kind == TokenKind::MapValue && t.line == self.cst.line_of(key_end)
        })
    }

    /// Whether the document root ahead is a block map or sequence.
    fn block_collection_ahead(&self) -> bool {
        let mut at = self.sig_index();
        while self
            .toks
            .get(at)
            .is_some_and(|t| matches!(t.kind, TokenKind::Anchor | TokenKind::Tag))
        {
            at += 1;
        }
        while self.toks.get(at).is_some_and(|t| is_comment_or_blank(t.kind)) {
            at += 1;
        }
        match self.toks.get(at).map(|t| t.kind) {
            Some(TokenKind::SeqItem | TokenKind::ExplicitKey | TokenKind::MapValue) => true,
            Some(_) => self.implicit_key_at(at),
            None => false,
        }
    }

    fn content_ahead(&self) -> bool {
        self.peek_sig().is_some_and(|t| !is_boundary(t.kind))
    }

    #[allow(clippy::too_many_lines)]
    fn document(&mut self) -> Document {
        let mut doc = Document::default();
        let start = self.peek_sig().map_or(self.cst.source().len(), |t| t.span.start);
        let mut pending = mem::take(&mut self.carry);
        pending.append(self.gather());

        while let Some(tok) = self
            .peek_sig()
            .filter(|t| t.kind == TokenKind::Directive)
            .cloned()
        {
            self.pos = self.sig_index();
            self.bump();
            self.directive(&mut doc, &tok);
            pending.append(self.gather());
        }

        let explicit_start = self
            .peek_sig()
            .is_some_and(|t| t.kind == TokenKind::DirectivesEnd);
        if !explicit_start && !doc.directives.is_empty() {
            let at = self.peek_sig().map_or(start..start, |t| t.span.clone());
            self.error(
                ErrorCode::BadDirective,
                at,
                "Directives must be followed by a --- marker",
            );
        }

        if explicit_start || !doc.directives.is_empty() {
            // Everything before `---` belongs to the document itself.
            let (lines, _) = pending.into_leading();
            doc.comment_before = join(lines);
            if explicit_start {
                self.pos = self.sig_index();
                self.bump();
                doc.directives_end_marker = true;
            }
            let lead = self.gather();
            let (contents, rest) = self.root(lead);
            doc.contents = contents;
            pending = rest;
        } else {
            pending.drop_leading_blanks();
            let split = pending.split_siblings();
            if self.content_ahead() {
                if self.block_collection_ahead() {
                    doc.comment_before = join(split.detached);
                    let (node, rest) = self.root(Pending::from_comments(split.adjacent, 0));
                    doc.contents = node;
                    pending = rest;
                } else {
                    let (node, rest) = self.root(Pending::default());
                    doc.contents = node;
                    pending = rest;
                    if split.detached.is_empty() {
                        doc.comment_before = join(split.adjacent);
                    } else {
                        doc.comment_before = join(split.detached);
                        if let Some(node) = doc.contents.as_mut() {
                            pending::prepend_comment(
                                &mut node.meta_mut().comment_before,
                                split.adjacent,
                            );
                        }
                    }
                }
                if let Some(node) = doc.contents.as_mut() {
                    node.meta_mut().space_before |= split.blank;
                }
            } else {
                let mut lines = split.detached;
                lines.extend(split.adjacent);
                doc.comment_before = join(lines);
                pending = Pending::default();
            }
        }

        pending.append(self.gather());
        loop {
            let Some(tok) = self.peek_sig().cloned() else {
                break;
            };
            match tok.kind {
                TokenKind::DocumentEnd => {
                    self.pos = self.sig_index();
                    self.bump();
                    doc.document_end_marker = true;
                    if let Some((text, col)) = self.trailing_comment() {
                        pending.push_comment(text, col);
                    }
                    let after = self.gather();
                    if self.peek().is_some() {
                        self.carry = after;
                    } else {
                        pending.append(after);
                    }
                    break;
                }
                TokenKind::DirectivesEnd | TokenKind::Directive => break,
                _ => {
                    pending = self.recover(&mut doc.contents, mem::take(&mut pending), &tok);
                    pending.append(self.gather());
                }
            }
        }

        let (lines, blank) = pending.into_trailing();
        doc.comment = join(lines);
        doc.space_before_comment = blank && doc.comment.is_some();
        doc.range = start..self.last_end.max(start);
        doc.errors = mem::take(&mut self.errors);
        doc.warnings = mem::take(&mut self.warnings);
        doc
    }

    /// Go on after content that the root node did not take. Entries that
    /// fit the root collection join it; anything else is kept line by line
    /// as verbatim text so that it still prints.
    fn recover(&mut self, root: &mut Option<Node>, lead: Pending, tok: &Tok) -> Pending {
        let fits = match root.as_ref() {
            Some(Node::Map(map)) => {
                !map.flow && tok.kind != TokenKind::SeqItem && self.block_collection_ahead()
            }
            Some(Node::Seq(seq)) => !seq.flow && tok.kind == TokenKind::SeqItem,
            _ => false,
        };
        if fits {
            let root_col = root
                .as_ref()
                .and_then(Node::range)
                .map(|range| self.cst.col_of(range.start));
            if root_col.is_some_and(|col| col != tok.col) {
                self.error(
                    ErrorCode::BadIndent,
                    tok.span.clone(),
                    "Entries of the document root must be at the same indentation",
                );
            }
            return self.rejoin_root(root, lead, tok.col);
        }
        self.error(
            ErrorCode::UnexpectedToken,
            tok.span.clone(),
            "Unexpected content after the document root",
        );
        match root {
            Some(Node::Map(map)) if !map.flow => {
                let prev = map.items.last_mut().and_then(pair_tail);
                let raw = self.stray_node(lead, prev);
                map.items.push(Pair {
                    key: Some(raw.into()),
                    value: None,
                });
            }
            Some(Node::Seq(seq)) if !seq.flow => {
                let prev = seq.items.last_mut().map(Node::meta_mut);
                let raw = self.stray_node(lead, prev);
                seq.items.push(raw);
            }
            _ => self.grow_root(root, lead),
        }
        Pending::default()
    }

    /// Compose more entries at `col` into the root block collection.
    fn rejoin_root(&mut self, root: &mut Option<Node>, lead: Pending, col: usize) -> Pending {
        match root {
            Some(Node::Map(map)) => {
                let (more, rest) = self.block_map(col, lead, false, Props::default());
                if let Some(tail) = map.items.last_mut().and_then(pair_tail) {
                    pending::append_comment(
                        &mut tail.comment,
                        more.meta.comment_before.into_iter().collect(),
                    );
                }
                let known = map.items.len();
                for pair in more.items {
                    self.check_duplicate(&map.items[..known], &pair);
                    map.items.push(pair);
                }
                map.meta.range = map.meta.range.take().map(|r| r.start..self.last_end);
                rest
            }
            Some(Node::Seq(seq)) => {
                let (more, rest) = self.block_seq(col, lead, false);
                if let Some(last) = seq.items.last_mut() {
                    pending::append_comment(
                        &mut last.meta_mut().comment,
                        more.meta.comment_before.into_iter().collect(),
                    );
                }
                seq.items.extend(more.items);
                seq.meta.range = seq.meta.range.take().map(|r| r.start..self.last_end);
                rest
            }
            _ => lead,
        }
    }

    /// A scalar or flow root grows into a verbatim scalar that reaches to
    /// the end of the stray line.
    fn grow_root(&mut self, root: &mut Option<Node>, lead: Pending) {
        let line = self.stray_line();
        let old = root.take();
        let start = old
            .as_ref()
            .and_then(Node::range)
            .map_or(line.start, |range| range.start);
        let mut raw = self.verbatim(start..line.end);
        if let Some(old) = &old {
            let meta = old.meta();
            raw.meta.comment_before.clone_from(&meta.comment_before);
            raw.meta.space_before = meta.space_before;
            raw.meta.anchor.clone_from(&meta.anchor);
            raw.meta.tag.clone_from(&meta.tag);
        }
        // Comments between a composed root and the stray line are part of
        // the text already.
        if old.as_ref().and_then(Node::range).is_none() {
            lead_into(&mut raw.meta, lead);
        }
        *root = Some(Node::Scalar(raw));
    }

    fn root(&mut self, lead: Pending) -> (Option<Node>, Pending) {
        if !self.content_ahead() {
            return (None, lead);
        }
        let (node, rest) = self.block_node(Parent::Root, lead);
        (Some(node), rest)
    }

    fn directive(&mut self, doc: &mut Document, tok: &Tok) {
        let text = self.text(tok);
        let fields: Vec<&str> = text.split_whitespace().collect();
        match fields.as_slice() {
            ["%YAML", "1.2"] | ["%TAG", _, _] => {}
            ["%YAML", "1.1"] => self.warn(
                ErrorCode::BadDirective,
                tok.span.clone(),
                "YAML 1.1 document is composed with YAML 1.2 rules",
            ),
            ["%YAML", ..] => self.error(
                ErrorCode::BadDirective,
                tok.span.clone(),
                "%YAML takes a single 1.x version",
            ),
            ["%TAG", ..] => self.error(
                ErrorCode::BadDirective,
                tok.span.clone(),
                "%TAG takes a handle and a prefix",
            ),
            _ => self.warn(
                ErrorCode::BadDirective,
                tok.span.clone(),
                "Unknown directive is ignored",
            ),
        }
        doc.directives.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::node::Scalar;

    fn compose(src: &str) -> Vec<Document> {
        let cst = Cst::parse(src);
        compose_documents(&cst, &ParseOptions::default())
    }

    fn one(src: &str) -> Document {
        compose(src).remove(0)
    }

    fn scalar(node: Option<&Node>) -> &str {
        node.and_then(Node::as_scalar).map_or("<none>", Scalar::value)
    }

    #[test]
    fn plain_scalar_comments() {
        let doc = one("#c0\nvalue #c1\n#c2");
        assert_eq!(doc.comment_before.as_deref(), Some("c0"));
        let contents = doc.contents.as_ref().expect("contents");
        assert_eq!(scalar(Some(contents)), "value");
        assert_eq!(contents.comment(), Some("c1"));
        assert_eq!(doc.comment.as_deref(), Some("c2"));
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn seq_entry_comments() {
        let doc = one("#c0\n- value 1\n#c1\n\n- value 2\n\n#c2\n");
        let seq = doc.contents.as_ref().and_then(Node::as_seq).expect("seq");
        assert_eq!(seq.items[0].comment_before(), Some("c0"));
        assert_eq!(scalar(seq.get(0)), "value 1");
        assert_eq!(seq.items[0].comment(), Some("c1"));
        assert_eq!(scalar(seq.get(1)), "value 2");
        assert!(seq.items[1].space_before());
        assert_eq!(seq.items[1].comment(), None);
        assert_eq!(doc.comment.as_deref(), Some("c2"));
        assert!(doc.space_before_comment);
        assert_eq!(doc.comment_before, None);
    }

    #[test]
    fn map_in_seq_end_comments() {
        let doc = one("- a: 1\n  b: 2\n  #c4\n  c: 3\n#c5\n");
        let seq = doc.contents.as_ref().and_then(Node::as_seq).expect("seq");
        let map = seq.items[0].as_map().expect("map");
        assert_eq!(map.items.len(), 3);
        assert_eq!(map.items[2].comment_before(), Some("c4"));
        assert_eq!(seq.items[0].comment_before(), None);
        assert_eq!(map.meta.comment, None);
        assert_eq!(doc.comment.as_deref(), Some("c5"));
    }

    #[test]
    fn nested_collection_claims_indented_end_comment() {
        let doc = one("a:\n  b: 1\n  # end of a\n# top\nc: 2\n");
        let root = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        let inner = root.get("a").and_then(Node::as_map).expect("inner");
        assert_eq!(inner.meta.comment.as_deref(), Some(" end of a"));
        assert_eq!(root.items[1].comment_before(), Some(" top"));
    }

    #[test]
    fn root_collection_never_claims() {
        let doc = one("a: 1\n# end\n");
        let root = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        assert_eq!(root.meta.comment, None);
        assert_eq!(doc.comment.as_deref(), Some(" end"));
    }

    #[test]
    fn detached_prelude_comment() {
        let doc = one("# head\n\n# key doc\nkey: v\n");
        assert_eq!(doc.comment_before.as_deref(), Some(" head"));
        let root = doc.contents.as_ref().expect("root");
        assert!(root.space_before());
        let map = root.as_map().expect("map");
        assert_eq!(map.items[0].comment_before(), Some(" key doc"));
    }

    #[test]
    fn directives_and_markers() {
        let doc = one("# lead\n%YAML 1.2\n---\nvalue\n... # done\n");
        assert_eq!(doc.comment_before.as_deref(), Some(" lead"));
        assert_eq!(doc.directives, vec!["%YAML 1.2"]);
        assert!(doc.directives_end_marker);
        assert!(doc.document_end_marker);
        assert_eq!(doc.comment.as_deref(), Some(" done"));
    }

    #[test]
    fn yaml_1_1_directive_warns() {
        let doc = one("%YAML 1.1\n---\na\n");
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].code, ErrorCode::BadDirective);
        assert!(doc.errors.is_empty());
    }

    #[test]
    fn multiple_documents() {
        let docs = compose("a: 1\n---\nb: 2\n...\n# after\n");
        assert_eq!(docs.len(), 2);
        assert!(docs[1].directives_end_marker);
        assert_eq!(docs[1].comment.as_deref(), Some(" after"));
    }

    #[test]
    fn empty_value_takes_indented_comments() {
        let doc = one("key:\n  # nothing yet\nnext: 1\n");
        let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        let empty = map.get("key").expect("value");
        assert_eq!(scalar(Some(empty)), "");
        assert_eq!(empty.comment_before(), Some(" nothing yet"));
    }

    #[test]
    fn colon_line_comment_goes_to_key() {
        let doc = one("key: # about key\n  a: 1\n");
        let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        assert_eq!(map.items[0].comment(), Some(" about key"));
        assert!(map.get("key").and_then(Node::as_map).is_some());
    }

    #[test]
    fn duplicate_keys_are_recorded() {
        let doc = one("a: 1\na: 2\n");
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(doc.errors[0].code, ErrorCode::DuplicateKey);
    }

    #[test]
    fn bad_indentation_is_recorded_not_fatal() {
        let doc = one("a: 1\n   b: 2\nc: 3\n");
        assert!(doc.errors.iter().any(|e| e.code == ErrorCode::BadIndent));
        let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        assert_eq!(scalar(map.get("c")), "3");
    }

    #[test]
    fn stray_line_is_kept_and_the_root_goes_on() {
        let doc = one("a: 1\n# about b\n- b\nc: 2\n");
        assert_eq!(doc.errors.len(), 1);
        let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        assert_eq!(map.items.len(), 3);
        let raw = map.items[1].key_node().and_then(Node::as_scalar).expect("raw");
        assert!(raw.is_verbatim());
        assert_eq!(raw.value(), "- b");
        assert_eq!(raw.meta.comment_before.as_deref(), Some(" about b"));
        assert_eq!(scalar(map.get("c")), "2");
    }

    #[test]
    fn shifted_root_entries_rejoin_with_an_indent_error() {
        let doc = one("- a\nx\n  - b\n");
        let codes: Vec<ErrorCode> = doc.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::UnexpectedToken, ErrorCode::BadIndent]);
        let seq = doc.contents.as_ref().and_then(Node::as_seq).expect("seq");
        assert_eq!(seq.items.len(), 3);
        assert_eq!(scalar(seq.get(2)), "b");
    }

    #[test]
    fn scalar_root_grows_over_stray_lines() {
        let doc = one("# lead\nx # note\ny: 1\n");
        let root = doc.contents.as_ref().and_then(Node::as_scalar).expect("scalar");
        assert!(root.is_verbatim());
        assert_eq!(root.value(), "x # note\ny: 1");
        assert_eq!(root.meta.comment, None);
        assert_eq!(doc.comment_before.as_deref(), Some(" lead"));
    }

    #[test]
    fn keep_block_eats_blank_lines() {
        let doc = one("a: |+\n  x\n\nb: 1\n");
        let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
        assert_eq!(scalar(map.get("a")), "x\n\n");
        assert!(!map.items[1].space_before());
    }
}
