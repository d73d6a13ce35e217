//! The editable document tree.
//!
//! A [`Node`] is a closed set of variants sharing [`NodeMeta`]: the comment
//! and blank-line annotations the composer attached, plus anchor, tag and
//! the cached source range. [`Pair`] is not a node; its comment accessors
//! forward to the key node.

use core::ops::Range;

use serde_json::Value;

use crate::error::NodeError;
use crate::scalar::{self, Chomping, ScalarStyle};

/// Annotations shared by every node kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMeta {
    /// Comment lines above the node, joined with `\n`, without their `#`.
    pub comment_before: Option<String>,
    /// Comment trailing the node: on its line, or after a collection's last item.
    pub comment: Option<String>,
    /// A blank line separates this node from what precedes it.
    pub space_before: bool,
    /// Anchor name, without the `&`.
    pub anchor: Option<String>,
    /// Tag as written, including its `!`.
    pub tag: Option<String>,
    pub(crate) range: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    Map(Map),
    Seq(Seq),
}

impl Node {
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Self::Scalar(s) => &s.meta,
            Self::Map(m) => &m.meta,
            Self::Seq(s) => &s.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            Self::Scalar(s) => &mut s.meta,
            Self::Map(m) => &mut m.meta,
            Self::Seq(s) => &mut s.meta,
        }
    }

    pub fn comment_before(&self) -> Option<&str> {
        self.meta().comment_before.as_deref()
    }

    pub fn set_comment_before(&mut self, comment: Option<String>) {
        self.meta_mut().comment_before = comment;
    }

    pub fn comment(&self) -> Option<&str> {
        self.meta().comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.meta_mut().comment = comment;
    }

    pub fn space_before(&self) -> bool {
        self.meta().space_before
    }

    pub fn set_space_before(&mut self, space: bool) {
        self.meta_mut().space_before = space;
    }

    /// Source byte range this node was composed from. Cleared by edits that
    /// change a scalar's value or style.
    pub fn range(&self) -> Option<Range<usize>> {
        self.meta().range.clone()
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Self::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Seq> {
        match self {
            Self::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Wrap an external value into the minimal node form: block collections
    /// and plain scalars, double-quoting strings that would not read back as
    /// the same plain text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::new("null")),
            Value::Bool(b) => Self::Scalar(Scalar::new(b.to_string())),
            Value::Number(n) => Self::Scalar(Scalar::new(n.to_string())),
            Value::String(s) => Self::Scalar(Scalar::from_string(s)),
            Value::Array(items) => Self::Seq(Seq {
                items: items.iter().map(Self::from_value).collect(),
                ..Seq::default()
            }),
            Value::Object(entries) => Self::Map(Map {
                items: entries
                    .iter()
                    .map(|(k, v)| Pair::new(Scalar::from_string(k), Self::from_value(v)))
                    .collect(),
                ..Map::default()
            }),
        }
    }

    pub(crate) fn is_block_collection(&self) -> bool {
        match self {
            Self::Map(m) => !m.flow && !m.items.is_empty(),
            Self::Seq(s) => !s.flow && !s.items.is_empty(),
            Self::Scalar(_) => false,
        }
    }

    /// Whether the last thing printed for this node is the body of a `+`
    /// block scalar, whose trailing blank lines are content.
    pub(crate) fn ends_with_keep_block(&self) -> bool {
        if self.meta().comment.is_some() {
            return matches!(self, Self::Scalar(s) if s.is_keep_block());
        }
        match self {
            Self::Scalar(s) => s.is_keep_block(),
            Self::Map(m) if !m.flow => m
                .items
                .last()
                .and_then(Pair::value_node)
                .is_some_and(Self::ends_with_keep_block),
            Self::Seq(s) if !s.flow => s.items.last().is_some_and(Self::ends_with_keep_block),
            Self::Map(_) | Self::Seq(_) => false,
        }
    }
}

impl From<Scalar> for Node {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Map> for Node {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<Seq> for Node {
    fn from(seq: Seq) -> Self {
        Self::Seq(seq)
    }
}

/// The source text a parsed scalar is re-emitted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScalarSource {
    /// Plain, quoted or alias text: the first line as written, later lines
    /// with their indentation removed.
    Inline(Vec<String>),
    /// Block scalar body lines with the content indentation removed.
    Block(Vec<String>),
    /// Source lines that could not be composed, printed back as written.
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scalar {
    value: String,
    style: ScalarStyle,
    chomping: Chomping,
    pub(crate) source: Option<ScalarSource>,
    pub meta: NodeMeta,
}

impl Scalar {
    /// A plain scalar. Use [`Scalar::with_style`] for text that needs quoting.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// The empty plain scalar, as composed for `key:` or a bare `-`.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn with_style(value: impl Into<String>, style: ScalarStyle) -> Self {
        let mut scalar = Self::new(value);
        scalar.set_style(style);
        scalar
    }

    fn from_string(value: &str) -> Self {
        let style = if value.contains('\n') && !value.chars().any(|c| c != '\n' && c.is_control()) {
            ScalarStyle::Literal
        } else if scalar::looks_like_non_string(value)
            || scalar::encode_plain(value, false).is_none()
        {
            ScalarStyle::DoubleQuoted
        } else {
            ScalarStyle::Plain
        };
        Self::with_style(value, style)
    }

    pub(crate) fn parsed(
        value: String,
        style: ScalarStyle,
        chomping: Chomping,
        source: ScalarSource,
        range: Range<usize>,
    ) -> Self {
        Self {
            value,
            style,
            chomping,
            source: Some(source),
            meta: NodeMeta {
                range: Some(range),
                ..NodeMeta::default()
            },
        }
    }

    /// Source text kept as written where composition could not go on.
    pub(crate) fn verbatim(text: &str, range: Range<usize>) -> Self {
        Self::parsed(
            text.to_string(),
            ScalarStyle::Plain,
            Chomping::Clip,
            ScalarSource::Verbatim(text.to_string()),
            range,
        )
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn style(&self) -> ScalarStyle {
        self.style
    }

    /// Trailing line break handling; only meaningful for block styles.
    pub fn chomping(&self) -> Chomping {
        self.chomping
    }

    /// Replace the content. The scalar is re-encoded in its current style
    /// when printed.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.chomping = Chomping::for_value(&self.value);
        self.source = None;
        self.meta.range = None;
    }

    pub fn set_style(&mut self, style: ScalarStyle) {
        self.style = style;
        self.chomping = Chomping::for_value(&self.value);
        self.source = None;
        self.meta.range = None;
    }

    /// Empty plain text, printed as nothing at all.
    pub fn is_null(&self) -> bool {
        self.value.is_empty() && self.style == ScalarStyle::Plain && self.source.is_none()
    }

    /// Recovered source text, printed without indicators or indentation.
    pub fn is_verbatim(&self) -> bool {
        matches!(self.source, Some(ScalarSource::Verbatim(_)))
    }

    pub(crate) fn is_keep_block(&self) -> bool {
        self.style.is_block() && self.chomping == Chomping::Keep
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Map {
    pub items: Vec<Pair>,
    /// Written as `{ ... }`.
    pub flow: bool,
    /// A blank line precedes the collection-end comment.
    pub space_before_comment: bool,
    /// Comment after the `-` that opens this map as a sequence item.
    pub indicator_comment: Option<String>,
    pub meta: NodeMeta,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|pair| pair.key_matches(key))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key)
            .and_then(|i| self.items[i].value_node())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        let i = self.position(key)?;
        self.items[i].value_node_mut()
    }

    /// Replace the value of `key`, or append a new pair.
    pub fn set(&mut self, key: &str, value: impl Into<Node>) {
        let value = Item::Node(value.into());
        match self.position(key) {
            Some(i) => self.items[i].value = Some(value),
            None => self
                .items
                .push(Pair::new(Scalar::from_string(key), value)),
        }
    }

    pub fn delete(&mut self, key: &str) -> Option<Pair> {
        self.position(key).map(|i| self.items.remove(i))
    }

    /// The `space_before` flag of item `index` as printed: always false
    /// after a value ending in a keep-chomped block scalar.
    pub fn space_before_at(&self, index: usize) -> bool {
        let Some(pair) = self.items.get(index) else {
            return false;
        };
        let after_keep = index
            .checked_sub(1)
            .and_then(|prev| self.items[prev].value_node())
            .is_some_and(Node::ends_with_keep_block);
        pair.space_before() && !after_keep
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Seq {
    pub items: Vec<Node>,
    /// Written as `[ ... ]`.
    pub flow: bool,
    /// A blank line precedes the collection-end comment.
    pub space_before_comment: bool,
    /// See [`Map::indicator_comment`].
    pub indicator_comment: Option<String>,
    pub meta: NodeMeta,
}

impl Seq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.items.push(node.into());
    }

    /// See [`Map::space_before_at`].
    pub fn space_before_at(&self, index: usize) -> bool {
        let Some(node) = self.items.get(index) else {
            return false;
        };
        let after_keep = index
            .checked_sub(1)
            .is_some_and(|prev| self.items[prev].ends_with_keep_block());
        node.space_before() && !after_keep
    }
}

/// A pair member: a tree node, or an external value inserted as-is and
/// converted only when printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Node(Node),
    Value(Value),
}

impl Item {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Value(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Value(_) => None,
        }
    }
}

impl From<Node> for Item {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Scalar> for Item {
    fn from(scalar: Scalar) -> Self {
        Self::Node(Node::Scalar(scalar))
    }
}

impl From<Map> for Item {
    fn from(map: Map) -> Self {
        Self::Node(Node::Map(map))
    }
}

impl From<Seq> for Item {
    fn from(seq: Seq) -> Self {
        Self::Node(Node::Seq(seq))
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A map entry. Its comment and blank-line accessors are views onto the key
/// node; the pair itself stores none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pair {
    pub key: Option<Item>,
    pub value: Option<Item>,
}

impl Pair {
    pub fn new(key: impl Into<Item>, value: impl Into<Item>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }

    pub fn key_node(&self) -> Option<&Node> {
        self.key.as_ref().and_then(Item::as_node)
    }

    pub fn value_node(&self) -> Option<&Node> {
        self.value.as_ref().and_then(Item::as_node)
    }

    pub fn value_node_mut(&mut self) -> Option<&mut Node> {
        self.value.as_mut().and_then(Item::as_node_mut)
    }

    fn key_matches(&self, key: &str) -> bool {
        match &self.key {
            Some(Item::Node(Node::Scalar(s))) => s.value() == key,
            Some(Item::Value(Value::String(s))) => s == key,
            _ => false,
        }
    }

    /// The key node for a write, materializing an empty scalar for a
    /// missing key.
    fn key_for_write(&mut self, accessor: &'static str) -> Result<&mut Node, NodeError> {
        match self
            .key
            .get_or_insert_with(|| Item::Node(Node::Scalar(Scalar::null())))
        {
            Item::Node(node) => Ok(node),
            Item::Value(value) => Err(NodeError::InvalidKeyKind {
                accessor,
                found: value_kind(value),
            }),
        }
    }

    pub fn comment_before(&self) -> Option<&str> {
        self.key_node().and_then(Node::comment_before)
    }

    pub fn set_comment_before(&mut self, comment: Option<String>) -> Result<(), NodeError> {
        self.key_for_write("comment_before")?
            .set_comment_before(comment);
        Ok(())
    }

    pub fn comment(&self) -> Option<&str> {
        self.key_node().and_then(Node::comment)
    }

    pub fn set_comment(&mut self, comment: Option<String>) -> Result<(), NodeError> {
        self.key_for_write("comment")?.set_comment(comment);
        Ok(())
    }

    pub fn space_before(&self) -> bool {
        self.key_node().is_some_and(Node::space_before)
    }

    pub fn set_space_before(&mut self, space: bool) -> Result<(), NodeError> {
        self.key_for_write("space_before")?.set_space_before(space);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pair_comment_before_materializes_null_key() {
        let mut pair = Pair {
            key: None,
            value: Some(Scalar::new("v").into()),
        };
        pair.set_comment_before(Some("c".into())).expect("node key");
        let key = pair.key_node().expect("key");
        assert_eq!(key.comment_before(), Some("c"));
        assert!(key.as_scalar().is_some_and(Scalar::is_null));
        assert_eq!(pair.comment_before(), Some("c"));
    }

    #[test]
    fn pair_comment_before_rejects_raw_key() {
        let mut pair = Pair::new(json!({"a": 1}), Scalar::new("v"));
        let err = pair
            .set_comment_before(Some("c".into()))
            .expect_err("raw key");
        assert_eq!(
            err,
            NodeError::InvalidKeyKind {
                accessor: "comment_before",
                found: "object",
            }
        );
        assert!(pair.comment_before().is_none());
    }

    #[test]
    fn set_value_clears_source_and_range() {
        let mut scalar = Scalar::parsed(
            "a".into(),
            ScalarStyle::Plain,
            Chomping::Clip,
            ScalarSource::Inline(vec!["a".into()]),
            0..1,
        );
        scalar.set_value("b\n");
        assert_eq!(scalar.value(), "b\n");
        assert!(scalar.source.is_none());
        assert!(scalar.meta.range.is_none());
        assert_eq!(scalar.chomping(), Chomping::Clip);
    }

    #[test]
    fn from_value_quotes_ambiguous_strings() {
        let node = Node::from_value(&json!({"a": "true", "b": "text", "c": [1, null]}));
        let map = node.as_map().expect("map");
        let style = |key| {
            map.get(key)
                .and_then(Node::as_scalar)
                .map(Scalar::style)
        };
        assert_eq!(style("a"), Some(ScalarStyle::DoubleQuoted));
        assert_eq!(style("b"), Some(ScalarStyle::Plain));
        let seq = map.get("c").and_then(Node::as_seq).expect("seq");
        assert_eq!(seq.items.len(), 2);
    }

    #[test]
    fn map_editing() {
        let mut map = Map::new();
        map.set("a", Scalar::new("1"));
        map.set("b", Scalar::new("2"));
        map.set("a", Scalar::new("3"));
        assert_eq!(map.items.len(), 2);
        assert_eq!(
            map.get("a").and_then(Node::as_scalar).map(Scalar::value),
            Some("3")
        );
        assert!(map.delete("b").is_some());
        assert!(map.get("b").is_none());
    }

    #[test]
    fn keep_block_suppresses_following_space() {
        let mut keep = Scalar::with_style("x\n\n", ScalarStyle::Literal);
        assert_eq!(keep.chomping(), Chomping::Keep);
        keep.meta.space_before = false;
        let mut next = Scalar::new("y");
        next.meta.space_before = true;
        let seq = Seq {
            items: vec![keep.into(), next.into()],
            ..Seq::default()
        };
        assert!(seq.items[1].space_before());
        assert!(!seq.space_before_at(1));
    }
}
