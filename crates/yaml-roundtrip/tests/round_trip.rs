use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use serde_json::json;
use yaml_roundtrip::{
    Document, ErrorCode, Item, Node, NodeError, Pair, ParseOptions, Scalar, ToStringOptions, parse,
    parse_all_documents,
};

fn fixtures() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
        .expect("tests/fixtures must exist")
        .map(|entry| entry.expect("readable entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
        .collect();
    paths.sort();
    paths
}

fn print_stream(source: &str) -> String {
    parse_all_documents(source, &ParseOptions::default())
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn fixtures_print_back_verbatim() {
    let paths = fixtures();
    assert!(!paths.is_empty(), "no fixtures found");
    for path in paths {
        let source = fs::read_to_string(&path).expect("readable fixture");
        let docs = parse_all_documents(&source, &ParseOptions::default());
        for doc in &docs {
            assert!(
                doc.errors.is_empty(),
                "{}: unexpected errors {:?}",
                path.display(),
                doc.errors
            );
        }
        let printed: String = docs.iter().map(ToString::to_string).collect();
        assert_eq!(printed, source, "{}", path.display());
    }
}

#[test]
fn printing_reaches_a_fixed_point() {
    let inputs = [
        "#c0\n- value 1\n#c1\n\n- value 2\n\n#c2\n",
        "\n\n# lead\n\n\nkey:   value   # spaced\n\n\n\nother: 1\n\n",
        "a:\n- x\n- y\nb: 2\n",
        "list: [a, b] # tail\n",
        "text: >\n  folded\n  lines\n\n\n",
    ];
    for input in inputs {
        let once = print_stream(input);
        let twice = print_stream(&once);
        assert_eq!(twice, once, "input: {input:?}");
    }
}

#[test]
fn plain_scalar_comments() {
    let doc = parse("#c0\nvalue #c1\n#c2");
    assert_eq!(doc.comment_before.as_deref(), Some("c0"));
    assert_eq!(doc.comment.as_deref(), Some("c2"));
    let contents = doc.contents.as_ref().and_then(Node::as_scalar).expect("scalar");
    assert_eq!(contents.value(), "value");
    assert_eq!(contents.meta.comment.as_deref(), Some("c1"));
    insta::assert_snapshot!(doc.to_string(), @r"
#c0
value #c1
#c2
");
}

#[test]
fn seq_entry_comments_settle_on_their_items() {
    let doc = parse("#c0\n- value 1\n#c1\n\n- value 2\n\n#c2\n");
    insta::assert_snapshot!(doc.to_string(), @r"
#c0
- value 1 #c1

- value 2

#c2
");
}

#[test]
fn map_in_seq_comment_before_next_key() {
    let source = "- a: 1\n  b: 2\n  #c4\n  c: 3\n#c5\n";
    let doc = parse(source);
    let seq = doc.contents.as_ref().and_then(Node::as_seq).expect("seq");
    let map = seq.items[0].as_map().expect("map");
    assert_eq!(map.items[2].comment_before(), Some("c4"));
    assert_eq!(doc.comment.as_deref(), Some("c5"));
    assert_eq!(doc.to_string(), source);
}

#[test]
fn comment_on_block_scalar_joins_into_header() {
    let mut doc = parse(">\nstring\n");
    doc.contents
        .as_mut()
        .expect("contents")
        .set_comment(Some("comment\nlines".into()));
    assert_eq!(doc.to_string(), "> #comment lines\nstring\n");
}

#[test]
fn keep_chomped_scalar_ignores_sibling_space_before() {
    let source = "a: |+\n  x\n\nb: 1\n";
    let mut doc = parse(source);
    let map = doc.contents.as_mut().and_then(Node::as_map_mut).expect("map");
    map.items[1].set_space_before(true).expect("node key");
    assert_eq!(doc.to_string(), source);

    let mut doc = parse("- |+\n  x\n\n- y\n");
    let seq = doc.contents.as_mut().and_then(Node::as_seq_mut).expect("seq");
    seq.items[1].set_space_before(true);
    assert_eq!(doc.to_string(), "- |+\n  x\n\n- y\n");
}

#[test]
fn blank_runs_between_siblings_collapse() {
    let doc = parse("- a\n\n\n\n- b\n\n\n# end\n");
    insta::assert_snapshot!(doc.to_string(), @r"
- a

- b

# end
");
}

#[test]
fn pair_comment_before_writes_through_to_key() {
    let mut doc = parse("a: 1\n");
    let map = doc.contents.as_mut().and_then(Node::as_map_mut).expect("map");
    map.items.push(Pair {
        key: None,
        value: Some(Scalar::new("2").into()),
    });
    map.items[1]
        .set_comment_before(Some(" keyless".into()))
        .expect("null key materializes");
    assert!(map.items[1].key_node().is_some());
    assert_eq!(doc.to_string(), "a: 1\n# keyless\n: 2\n");
}

#[test]
fn pair_with_raw_value_key_rejects_comment_writes() {
    let mut pair = Pair::new(Item::Value(json!("k")), Scalar::new("v"));
    let err = pair
        .set_comment_before(Some("c".into()))
        .expect_err("raw key");
    assert_eq!(
        err,
        NodeError::InvalidKeyKind {
            accessor: "comment_before",
            found: "string",
        }
    );
    assert!(err.to_string().contains("alias for the key node"));
    assert_eq!(pair.comment_before(), None);
}

#[test]
fn edits_keep_surrounding_comments() {
    let mut doc = parse("# settings\nlevel: 1 # current\n\n# limits\nmax: 10\n");
    let map = doc.contents.as_mut().and_then(Node::as_map_mut).expect("map");
    map.get_mut("level")
        .and_then(Node::as_scalar_mut)
        .expect("level")
        .set_value("2");
    map.delete("max");
    map.set("min", Document::create_node(&json!(0)));
    map.items[1].set_space_before(true).expect("node key");
    insta::assert_snapshot!(doc.to_string(), @r"
# settings
level: 2 # current

min: 0
");
}

#[test]
fn indent_seq_option_reflows_sequences_under_keys() {
    let doc = parse("a:\n  - x\n  - y\n");
    let options = ToStringOptions {
        indent_seq: false,
        ..ToStringOptions::default()
    };
    assert_eq!(doc.to_string_with(&options), "a:\n- x\n- y\n");
}

#[test]
fn errors_are_recorded_and_output_still_produced() {
    let doc = parse("a: [1, 2\nb: 3\n");
    assert!(
        doc.errors
            .iter()
            .any(|e| matches!(e.code, ErrorCode::MissingChar | ErrorCode::UnexpectedToken))
    );
    assert!(!doc.to_string().is_empty());
}

#[test]
fn multiple_documents_need_parse_all_documents() {
    let source = "a: 1\n---\nb: 2\n";
    let doc = parse(source);
    assert_eq!(doc.errors.len(), 1);
    assert_eq!(doc.errors[0].code, ErrorCode::MultipleDocs);
    assert_eq!(print_stream(source), source);
}

#[test]
fn content_after_a_stray_line_is_kept() {
    let source = "a: 1\n- b\nc: 2\n";
    let doc = parse(source);
    assert_eq!(doc.errors.len(), 1);
    assert_eq!(doc.errors[0].code, ErrorCode::UnexpectedToken);
    let map = doc.contents.as_ref().and_then(Node::as_map).expect("map");
    assert_eq!(map.get("c").and_then(Node::as_scalar).map(Scalar::value), Some("2"));
    assert_eq!(doc.to_string(), source);

    for source in [
        "- a\nb: 1\n- c\n",
        "x\ny: 1\n",
        "a: 1\n  - b\nc: 2\n",
        "- a\n  - b\n",
    ] {
        let doc = parse(source);
        assert!(!doc.errors.is_empty(), "{source:?}");
        assert_eq!(doc.to_string(), source);
    }
}

#[test]
fn malformed_input_prints_to_a_fixed_point() {
    let inputs = [
        "- 'x\n",
        "\"2\n",
        "'|\n",
        "a: 'open\n\n",
        "a: 1\n- b\nc: 2\n",
        "}a #d",
        "}\r\n",
        "x\ny: 1\n",
    ];
    for input in inputs {
        let doc = parse(input);
        assert!(!doc.errors.is_empty(), "{input:?}");
        let once = doc.to_string();
        assert!(
            once.ends_with('\n') && !once.ends_with("\n\n"),
            "{input:?} printed {once:?}"
        );
        assert_eq!(parse(&once).to_string(), once, "input: {input:?}");
    }
}

#[test]
fn empty_root_after_an_error_prints_null_str() {
    let doc = parse("}\n");
    assert!(!doc.errors.is_empty());
    assert_eq!(doc.to_string(), "null\n");
    let options = ToStringOptions {
        null_str: "~".into(),
        ..ToStringOptions::default()
    };
    assert_eq!(doc.to_string_with(&options), "~\n");
}

#[test]
fn trailing_comment_blocks_share_one_comment() {
    let doc = parse("a: 1\n\n# t1\n\n# t2\n");
    assert_eq!(doc.comment.as_deref(), Some(" t1\n t2"));
    assert!(doc.space_before_comment);
    let once = doc.to_string();
    assert_eq!(once, "a: 1\n\n# t1\n# t2\n");
    assert_eq!(parse(&once).to_string(), once);
}

#[test]
fn comment_after_a_dash_stays_on_its_line() {
    for source in [
        "- # c\n  a: 1\n  b: 2\n",
        "- # c\n  - x\n",
        "-\n  # c\n  a: 1\n",
    ] {
        assert_eq!(parse(source).to_string(), source);
    }
    let doc = parse("- # c\n  a: 1\n");
    let seq = doc.contents.as_ref().and_then(Node::as_seq).expect("seq");
    let map = seq.items[0].as_map().expect("map");
    assert_eq!(map.indicator_comment.as_deref(), Some(" c"));
    assert_eq!(map.items[0].comment_before(), None);
}

#[test]
fn crlf_line_breaks_are_kept() {
    let source = "# head\r\na: 1 # one\r\n\r\nlist:\r\n  - 'x\r\n    y'\r\ntext: |\r\n  body\r\n";
    let doc = parse(source);
    assert!(doc.errors.is_empty(), "{:?}", doc.errors);
    assert!(doc.crlf);
    let list = doc
        .contents
        .as_ref()
        .and_then(Node::as_map)
        .and_then(|map| map.get("list"))
        .and_then(Node::as_seq)
        .expect("list");
    assert_eq!(list.items[0].as_scalar().map(Scalar::value), Some("x y"));
    assert_eq!(doc.to_string(), source);
}
