//! Lossless tokenizer.
//!
//! Every byte of the input lands in exactly one [`Token`]: indentation,
//! inline whitespace, line breaks, blank lines and comments included.
//! Concatenating the token texts in order reproduces the source. The
//! tokenizer knows nothing about document structure beyond flow bracket
//! depth and block scalar extents; it never fails, recording problems in
//! [`Cst::errors`] instead.

use core::fmt;
use core::ops::Range;

use crate::error::{ErrorCode, YamlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Leading whitespace of a non-blank line.
    Indent,
    /// Whitespace between tokens on a line.
    Space,
    Newline,
    /// A whitespace-only line, including its line break.
    BlankLine,
    /// `#` through end of line.
    Comment,
    /// `---`
    DirectivesEnd,
    /// `...`
    DocumentEnd,
    /// A `%` directive line, without any trailing comment.
    Directive,
    /// Block sequence `-` indicator.
    SeqItem,
    /// `?` indicator.
    ExplicitKey,
    /// `:` mapping value indicator.
    MapValue,
    FlowSeqStart,
    FlowSeqEnd,
    FlowMapStart,
    FlowMapEnd,
    Comma,
    Anchor,
    Tag,
    Alias,
    /// One line worth of plain scalar text; continuation lines are separate tokens.
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// `|` or `>` plus indentation/chomping indicators.
    BlockHeader,
    /// All lines belonging to a block scalar, including their line breaks,
    /// with the column its content is indented to.
    BlockBody { indent: usize },
}

impl TokenKind {
    /// Tokens that never carry content: whitespace, line breaks, blanks and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Indent | Self::Space | Self::Newline | Self::BlankLine | Self::Comment
        )
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Plain | Self::SingleQuoted | Self::DoubleQuoted | Self::Alias
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// A tokenized source text.
pub struct Cst<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    line_starts: Vec<usize>,
    errors: Vec<YamlError>,
}

impl<'a> Cst<'a> {
    #[tracing::instrument(skip_all, fields(len = source.len()))]
    pub fn parse(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        let mut lexer = Lexer::new(source);
        lexer.run();
        tracing::trace!(tokens = lexer.tokens.len(), "tokenized");
        Self {
            source,
            tokens: lexer.tokens,
            line_starts,
            errors: lexer.errors,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn errors(&self) -> &[YamlError] {
        &self.errors
    }

    pub fn text(&self, token: &Token) -> &'a str {
        &self.source[token.span.clone()]
    }

    /// Zero-based line holding `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// Zero-based byte column of `offset` within its line.
    pub fn col_of(&self, offset: usize) -> usize {
        offset - self.line_starts[self.line_of(offset)]
    }

    /// Whether only whitespace precedes `offset` on its line.
    pub fn starts_line(&self, offset: usize) -> bool {
        let start = self.line_starts[self.line_of(offset)];
        self.source.as_bytes()[start..offset]
            .iter()
            .all(|&b| b == b' ' || b == b'\t')
    }
}

impl fmt::Display for Cst<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str(self.text(token))?;
        }
        Ok(())
    }
}

/// What a block scalar header tells the next line about its body.
struct PendingBody {
    min_indent: usize,
    explicit_indent: Option<usize>,
    keep: bool,
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    errors: Vec<YamlError>,
    flow_depth: usize,
    block_body: Option<PendingBody>,
}

fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r'
}

fn is_flow_indicator(b: u8) -> bool {
    matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            flow_depth: 0,
            block_body: None,
        }
    }

    fn push(&mut self, kind: TokenKind, end: usize) {
        if end > self.pos {
            self.tokens.push(Token {
                kind,
                span: self.pos..end,
            });
            self.pos = end;
        }
    }

    fn error(&mut self, code: ErrorCode, span: Range<usize>, message: &str) {
        tracing::debug!(%code, ?span, message, "tokenizer error");
        self.errors.push(YamlError::new(code, span, message));
    }

    fn peek_at(&self, at: usize) -> Option<u8> {
        self.bytes.get(at).copied()
    }

    fn line_end(&self, from: usize) -> usize {
        self.src[from..]
            .find('\n')
            .map_or(self.src.len(), |i| from + i)
    }

    /// End of the line starting at `from`, past its line break.
    fn line_end_inclusive(&self, from: usize) -> usize {
        let end = self.line_end(from);
        if end < self.src.len() { end + 1 } else { end }
    }

    /// `#` opens a comment only at a line start or after whitespace.
    fn after_whitespace(&self) -> bool {
        self.pos
            .checked_sub(1)
            .is_none_or(|prev| matches!(self.bytes[prev], b' ' | b'\t' | b'\r' | b'\n'))
    }

    fn ws_or_end(&self, at: usize) -> bool {
        self.peek_at(at).is_none_or(|b| is_ws(b) || b == b'\n')
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            if let Some(body) = self.block_body.take() {
                self.lex_block_body(&body);
                continue;
            }
            self.lex_line();
        }
    }

    fn lex_line(&mut self) {
        let start = self.pos;
        let eol = self.line_end(start);
        if self.src[start..eol].bytes().all(is_ws) {
            let end = self.line_end_inclusive(start);
            self.push(TokenKind::BlankLine, end);
            return;
        }

        let indent_end = start
            + self.src[start..eol]
                .bytes()
                .take_while(|&b| b == b' ' || b == b'\t')
                .count();
        if self.flow_depth == 0 && self.bytes[start..indent_end].contains(&b'\t') {
            self.error(
                ErrorCode::TabAsIndent,
                start..indent_end,
                "Tabs are not allowed as indentation",
            );
        }
        self.push(TokenKind::Indent, indent_end);

        if self.pos == start && self.flow_depth == 0 {
            self.lex_line_start_markers(eol);
        }
        self.lex_inline();
        if self.peek_at(self.pos) == Some(b'\n') {
            self.push(TokenKind::Newline, self.pos + 1);
        }
    }

    /// Document markers and directives, recognised only at column zero.
    fn lex_line_start_markers(&mut self, eol: usize) {
        let line = &self.src[self.pos..eol];
        for (marker, kind) in [
            ("---", TokenKind::DirectivesEnd),
            ("...", TokenKind::DocumentEnd),
        ] {
            if line.starts_with(marker) && self.ws_or_end(self.pos + 3) {
                self.push(kind, self.pos + 3);
                return;
            }
        }
        if line.starts_with('%') {
            let body_end = line.find(" #").map_or(line.trim_end().len(), |i| {
                line[..i].trim_end().len()
            });
            self.push(TokenKind::Directive, self.pos + body_end);
        }
    }

    /// Tokens up to (not including) the next line break. Multi-line quoted
    /// scalars move the cursor onto later lines.
    fn lex_inline(&mut self) {
        while let Some(b) = self.peek_at(self.pos) {
            if b == b'\n' {
                return;
            }
            let next = self.peek_at(self.pos + 1);
            match b {
                b' ' | b'\t' | b'\r' => {
                    let end = self.pos
                        + self.src[self.pos..]
                            .bytes()
                            .take_while(|&c| is_ws(c))
                            .count();
                    self.push(TokenKind::Space, end);
                }
                b'#' if self.after_whitespace() => {
                    let end = self.line_end(self.pos);
                    let end = if self.bytes[end - 1] == b'\r' { end - 1 } else { end };
                    self.push(TokenKind::Comment, end);
                }
                b'-' if self.flow_depth == 0 && self.ws_or_end(self.pos + 1) => {
                    self.push(TokenKind::SeqItem, self.pos + 1);
                }
                b'?' if self.ws_or_end(self.pos + 1) => {
                    self.push(TokenKind::ExplicitKey, self.pos + 1);
                }
                b':' if self.is_map_value_indicator(next) => {
                    self.push(TokenKind::MapValue, self.pos + 1);
                }
                b'[' => {
                    self.flow_depth += 1;
                    self.push(TokenKind::FlowSeqStart, self.pos + 1);
                }
                b'{' => {
                    self.flow_depth += 1;
                    self.push(TokenKind::FlowMapStart, self.pos + 1);
                }
                b']' | b'}' => {
                    if self.flow_depth == 0 {
                        self.error(
                            ErrorCode::UnexpectedToken,
                            self.pos..self.pos + 1,
                            "Unexpected flow collection end",
                        );
                    }
                    self.flow_depth = self.flow_depth.saturating_sub(1);
                    let kind = if b == b']' {
                        TokenKind::FlowSeqEnd
                    } else {
                        TokenKind::FlowMapEnd
                    };
                    self.push(kind, self.pos + 1);
                }
                b',' if self.flow_depth > 0 => self.push(TokenKind::Comma, self.pos + 1),
                b'&' => self.lex_property(TokenKind::Anchor),
                b'*' => self.lex_property(TokenKind::Alias),
                b'!' => self.lex_property(TokenKind::Tag),
                b'\'' => self.lex_single_quoted(),
                b'"' => self.lex_double_quoted(),
                b'|' | b'>' if self.flow_depth == 0 => self.lex_block_header(),
                b'@' | b'`' => {
                    self.error(
                        ErrorCode::UnexpectedToken,
                        self.pos..self.pos + 1,
                        "Plain scalars cannot start with a reserved character",
                    );
                    self.lex_plain();
                }
                _ => self.lex_plain(),
            }
        }
    }

    fn is_map_value_indicator(&self, next: Option<u8>) -> bool {
        let spaced = next.is_none_or(|c| is_ws(c) || c == b'\n');
        if spaced || (self.flow_depth > 0 && next.is_some_and(is_flow_indicator)) {
            return true;
        }
        // JSON-like keys may be followed directly by `:`
        self.flow_depth > 0
            && self.tokens.last().is_some_and(|t| {
                t.span.end == self.pos
                    && matches!(
                        t.kind,
                        TokenKind::SingleQuoted
                            | TokenKind::DoubleQuoted
                            | TokenKind::FlowSeqEnd
                            | TokenKind::FlowMapEnd
                    )
            })
    }

    fn lex_property(&mut self, kind: TokenKind) {
        let mut end = self.pos + 1;
        while let Some(b) = self.peek_at(end) {
            if is_ws(b) || b == b'\n' || (self.flow_depth > 0 && is_flow_indicator(b)) {
                break;
            }
            if kind != TokenKind::Tag && is_flow_indicator(b) {
                break;
            }
            end += 1;
        }
        self.push(kind, end);
    }

    fn lex_plain(&mut self) {
        let eol = self.line_end(self.pos);
        let mut end = self.pos + 1;
        while end < eol {
            let b = self.bytes[end];
            if b == b':' {
                let next = self.peek_at(end + 1);
                if next.is_none_or(|c| is_ws(c) || c == b'\n')
                    || (self.flow_depth > 0 && next.is_some_and(is_flow_indicator))
                {
                    break;
                }
            }
            if b == b'#' && is_ws(self.bytes[end - 1]) {
                break;
            }
            if self.flow_depth > 0 && is_flow_indicator(b) {
                break;
            }
            end += 1;
        }
        while end > self.pos + 1 && is_ws(self.bytes[end - 1]) {
            end -= 1;
        }
        self.push(TokenKind::Plain, end);
    }

    /// Where a quoted scalar that runs into the end of input stops: its
    /// trailing whitespace and line breaks are left to the line tokens.
    fn unterminated_end(&self, end: usize) -> usize {
        let body = &self.bytes[self.pos + 1..end];
        let kept = body
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |at| at + 1);
        self.pos + 1 + kept
    }

    fn lex_single_quoted(&mut self) {
        let mut end = self.pos + 1;
        loop {
            match self.peek_at(end) {
                None => {
                    end = self.unterminated_end(end);
                    self.error(
                        ErrorCode::MissingChar,
                        self.pos..end,
                        "Missing closing 'quote",
                    );
                    break;
                }
                Some(b'\'') if self.peek_at(end + 1) == Some(b'\'') => end += 2,
                Some(b'\'') => {
                    end += 1;
                    break;
                }
                Some(_) => end += 1,
            }
        }
        self.push(TokenKind::SingleQuoted, end);
    }

    fn lex_double_quoted(&mut self) {
        let mut end = self.pos + 1;
        loop {
            match self.peek_at(end) {
                None => {
                    end = self.unterminated_end(end);
                    self.error(
                        ErrorCode::MissingChar,
                        self.pos..end,
                        "Missing closing \"quote",
                    );
                    break;
                }
                Some(b'\\') => end = (end + 2).min(self.bytes.len()),
                Some(b'"') => {
                    end += 1;
                    break;
                }
                Some(_) => end += 1,
            }
        }
        self.push(TokenKind::DoubleQuoted, end);
    }

    fn lex_block_header(&mut self) {
        let start = self.pos;
        let mut end = start + 1;
        let mut chomp = None;
        let mut digit = None;
        let mut valid = true;
        while let Some(b) = self.peek_at(end) {
            match b {
                b'+' | b'-' => {
                    valid &= chomp.is_none();
                    chomp = Some(b);
                }
                b'1'..=b'9' => {
                    valid &= digit.is_none();
                    digit = Some(usize::from(b - b'0'));
                }
                b'0' => valid = false,
                _ => break,
            }
            end += 1;
        }
        if !valid || !self.ws_or_end(end) {
            self.error(
                ErrorCode::BadBlockScalarHeader,
                start..end,
                "Block scalar header takes at most one chomping and one indentation indicator",
            );
        }

        let line_start = self.src[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_indent = self.src[line_start..start]
            .bytes()
            .take_while(|&b| b == b' ')
            .count();
        // `None` at the root, or after only properties or `---`.
        let parent = self.owner_column(line_start);
        let min_indent = match parent {
            Some(col) => col + 1,
            None => line_indent,
        };
        self.block_body = Some(PendingBody {
            min_indent,
            explicit_indent: digit.map(|d| parent.map_or(d, |col| col + d)),
            keep: chomp == Some(b'+'),
        });
        self.push(TokenKind::BlockHeader, end);
    }

    /// Column of the collection that owns a block scalar header on the line
    /// starting at `line_start`: the innermost `-` entry, or the key column
    /// of the map whose `:` or `?` precedes the header.
    fn owner_column(&self, line_start: usize) -> Option<usize> {
        let first = self
            .tokens
            .iter()
            .rposition(|t| t.span.start < line_start)
            .map_or(0, |i| i + 1);
        let line = &self.tokens[first..];
        let owner = line.iter().rposition(|t| {
            matches!(
                t.kind,
                TokenKind::SeqItem | TokenKind::MapValue | TokenKind::ExplicitKey
            )
        })?;
        let col = |t: &Token| t.span.start - line_start;
        if line[owner].kind == TokenKind::SeqItem {
            return Some(col(&line[owner]));
        }
        // The map starts at the first token after the last `-` before the owner.
        let after_dash = line[..owner]
            .iter()
            .rposition(|t| t.kind == TokenKind::SeqItem)
            .map_or(0, |i| i + 1);
        let key = line[after_dash..owner]
            .iter()
            .find(|t| !matches!(t.kind, TokenKind::Indent | TokenKind::Space));
        Some(key.map_or(col(&line[owner]), col))
    }

    fn lex_block_body(&mut self, body: &PendingBody) {
        let indent_of = |line: &str| line.bytes().take_while(|&b| b == b' ').count();
        let is_blank = |line: &str| line.bytes().all(is_ws);

        let content_indent = body.explicit_indent.or_else(|| {
            let mut at = self.pos;
            while at < self.src.len() {
                let line = &self.src[at..self.line_end(at)];
                if !is_blank(line) {
                    let indent = indent_of(line);
                    return (indent >= body.min_indent).then_some(indent);
                }
                at = self.line_end_inclusive(at);
            }
            None
        });

        let mut at = self.pos;
        let mut content_end = self.pos;
        let mut blank_end = self.pos;
        while at < self.src.len() {
            let next = self.line_end_inclusive(at);
            let line = &self.src[at..self.line_end(at)];
            if is_blank(line) {
                blank_end = next;
            } else {
                let Some(indent) = content_indent else { break };
                let is_marker = indent == 0
                    && (line.starts_with("---") || line.starts_with("..."))
                    && self.ws_or_end(at + 3);
                if indent_of(line) < indent || is_marker {
                    break;
                }
                content_end = next;
                blank_end = next;
            }
            at = next;
        }
        let end = if body.keep { blank_end } else { content_end };
        let indent = content_indent.unwrap_or(body.min_indent);
        self.push(TokenKind::BlockBody { indent }, end);
    }
}
