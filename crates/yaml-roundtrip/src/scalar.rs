//! Scalar text decoding and encoding.
//!
//! Decoding turns the source of a plain, quoted or block scalar into its
//! string content. Encoding goes the other way for scalars whose source was
//! discarded by an edit. Neither resolves types: `1`, `true` and `~` are
//! just text here.

/// Presentation style of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// `|`
    Literal,
    /// `>`
    Folded,
}

impl ScalarStyle {
    pub fn is_block(self) -> bool {
        matches!(self, Self::Literal | Self::Folded)
    }

    pub fn is_quoted(self) -> bool {
        matches!(self, Self::SingleQuoted | Self::DoubleQuoted)
    }
}

/// Trailing line break policy of a block scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chomping {
    /// `-`
    Strip,
    #[default]
    Clip,
    /// `+`
    Keep,
}

impl Chomping {
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Strip => "-",
            Self::Clip => "",
            Self::Keep => "+",
        }
    }

    pub(crate) fn from_header(header: &str) -> Self {
        if header.contains('+') {
            Self::Keep
        } else if header.contains('-') {
            Self::Strip
        } else {
            Self::Clip
        }
    }

    /// The chomping needed to reproduce `value`'s trailing line breaks.
    pub(crate) fn for_value(value: &str) -> Self {
        let core = value.trim_end_matches('\n');
        match value.len() - core.len() {
            0 => Self::Strip,
            _ if core.is_empty() => Self::Keep,
            1 => Self::Clip,
            _ => Self::Keep,
        }
    }
}

/// Join the lines of a multi-line flow scalar: a single break becomes a
/// space, `n` empty lines become `n` newlines. Whitespace around breaks is
/// dropped.
fn fold_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    let mut breaks = 0;
    let last = lines.len().saturating_sub(1);
    for (i, raw) in lines.iter().enumerate() {
        let line = match i {
            0 if last == 0 => raw,
            0 => raw.trim_end(),
            _ if i == last => raw.trim_start(),
            _ => raw.trim(),
        };
        if i == 0 {
            out.push_str(line);
            continue;
        }
        if line.is_empty() && i != last {
            breaks += 1;
            continue;
        }
        if breaks == 0 {
            out.push(' ');
        } else {
            out.extend(core::iter::repeat_n('\n', breaks));
        }
        out.push_str(line);
        breaks = 0;
    }
    out
}

pub(crate) fn decode_plain(source: &str) -> String {
    let lines: Vec<&str> = source.split('\n').map(str::trim).collect();
    fold_lines(&lines)
}

fn strip_quotes(source: &str, quote: char) -> &str {
    let inner = source.strip_prefix(quote).unwrap_or(source);
    if !inner.is_empty() && inner.ends_with(quote) {
        &inner[..inner.len() - 1]
    } else {
        inner
    }
}

pub(crate) fn decode_single_quoted(source: &str) -> String {
    let inner = strip_quotes(source, '\'');
    let lines: Vec<&str> = inner.split('\n').collect();
    fold_lines(&lines).replace("''", "'")
}

pub(crate) fn decode_double_quoted(source: &str) -> String {
    let inner = strip_quotes(source, '"');
    let lines: Vec<&str> = inner.split('\n').collect();
    let mut joined = String::new();
    let mut group: Vec<&str> = Vec::new();
    let mut after_escape = false;
    for (i, line) in lines.iter().enumerate() {
        let line = if after_escape { line.trim_start() } else { line };
        after_escape = false;
        let trimmed = line.trim_end();
        let escapes = trimmed.len() - trimmed.trim_end_matches('\\').len();
        // An odd run of backslashes before a break escapes it: no folding space.
        if i + 1 < lines.len() && escapes % 2 == 1 {
            group.push(&trimmed[..trimmed.len() - 1]);
            joined.push_str(&fold_lines(&group));
            group.clear();
            after_escape = true;
            continue;
        }
        group.push(line);
    }
    joined.push_str(&fold_lines(&group));
    unescape(&joined)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        let simple = match esc {
            '0' => Some('\0'),
            'a' => Some('\u{7}'),
            'b' => Some('\u{8}'),
            't' | '\t' => Some('\t'),
            'n' => Some('\n'),
            'v' => Some('\u{b}'),
            'f' => Some('\u{c}'),
            'r' => Some('\r'),
            'e' => Some('\u{1b}'),
            ' ' => Some(' '),
            '"' => Some('"'),
            '/' => Some('/'),
            '\\' => Some('\\'),
            'N' => Some('\u{85}'),
            '_' => Some('\u{a0}'),
            'L' => Some('\u{2028}'),
            'P' => Some('\u{2029}'),
            _ => None,
        };
        if let Some(ch) = simple {
            out.push(ch);
            continue;
        }
        let width = match esc {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => 0,
        };
        let digits: String = chars.clone().take(width).collect();
        match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
            Some(ch) if width > 0 && digits.len() == width => {
                out.push(ch);
                for _ in 0..width {
                    chars.next();
                }
            }
            _ => {
                out.push('\\');
                out.push(esc);
            }
        }
    }
    out
}

/// Body lines of a block scalar with the content indentation removed.
pub(crate) fn block_lines(body: &str, indent: usize) -> Vec<String> {
    let body = body.strip_suffix('\n').unwrap_or(body);
    if body.is_empty() {
        return Vec::new();
    }
    body.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let strip = line.bytes().take(indent).take_while(|&b| b == b' ').count();
            if strip == line.len() {
                String::new()
            } else {
                line[strip..].to_string()
            }
        })
        .collect()
}

/// The string content of a block scalar given its de-indented lines.
pub(crate) fn decode_block(lines: &[String], folded: bool, chomping: Chomping) -> String {
    let content_len = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    let (content, trailing) = lines.split_at(content_len);

    let mut out = if folded {
        fold_block(content)
    } else {
        content.join("\n")
    };
    match chomping {
        Chomping::Strip => {}
        Chomping::Clip => {
            if !content.is_empty() {
                out.push('\n');
            }
        }
        Chomping::Keep => {
            if !content.is_empty() {
                out.push('\n');
            }
            out.extend(core::iter::repeat_n('\n', trailing.len()));
        }
    }
    out
}

fn fold_block(lines: &[String]) -> String {
    let mut out = String::new();
    let mut prev_more: Option<bool> = None;
    let mut empties = 0;
    for line in lines {
        if line.is_empty() {
            empties += 1;
            continue;
        }
        let more = line.starts_with([' ', '\t']);
        match prev_more {
            None => out.extend(core::iter::repeat_n('\n', empties)),
            Some(false) if !more && empties == 0 => out.push(' '),
            Some(false) if !more => out.extend(core::iter::repeat_n('\n', empties)),
            Some(_) => out.extend(core::iter::repeat_n('\n', empties + 1)),
        }
        out.push_str(line);
        prev_more = Some(more);
        empties = 0;
    }
    out
}

/// Values that a schema would read as something other than a string.
pub(crate) fn looks_like_non_string(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "~" | "null" | "true" | "false" | "yes" | "no" | "on" | "off" | ".inf" | "-.inf" | ".nan"
    ) || value.parse::<f64>().is_ok()
}

/// `value` as plain text, when it would read back unchanged.
pub(crate) fn encode_plain(value: &str, in_flow: bool) -> Option<String> {
    let first = value.chars().next()?;
    let second = value.chars().nth(1);
    let bad_start = match first {
        '-' | '?' | ':' => second.is_none_or(char::is_whitespace),
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
        | '@' | '`' => true,
        c => c.is_whitespace(),
    };
    let unsafe_inside = value.contains('\n')
        || value.contains(": ")
        || value.contains(" #")
        || value.contains('\t')
        || value.ends_with(':')
        || value.ends_with(char::is_whitespace)
        || (in_flow && value.contains([',', '[', ']', '{', '}']));
    (!bad_start && !unsafe_inside).then(|| value.to_string())
}

pub(crate) fn encode_single_quoted(value: &str) -> Option<String> {
    if value.contains('\n') || value.chars().any(char::is_control) {
        return None;
    }
    Some(format!("'{}'", value.replace('\'', "''")))
}

pub(crate) fn encode_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let code = u32::from(c);
                if code <= 0xff {
                    out.push_str(&format!("\\x{code:02x}"));
                } else {
                    out.push_str(&format!("\\u{code:04x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Body lines (without indentation) that make a block scalar decode to
/// `value`, or `None` when the folded form cannot express it.
pub(crate) fn encode_block(value: &str, folded: bool) -> Option<Vec<String>> {
    let core = value.trim_end_matches('\n');
    let trailing = value.len() - core.len();
    let mut lines: Vec<String> = Vec::new();
    if !core.is_empty() {
        let parts: Vec<&str> = core.split('\n').collect();
        if folded {
            if parts.iter().any(|p| p.starts_with([' ', '\t']) || p.is_empty()) {
                return None;
            }
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                lines.push((*part).to_string());
            }
        } else {
            lines.extend(parts.iter().map(|p| (*p).to_string()));
        }
    }
    if trailing > 1 {
        let extra = if core.is_empty() { trailing } else { trailing - 1 };
        lines.extend(core::iter::repeat_n(String::new(), extra));
    }
    Some(lines)
}
