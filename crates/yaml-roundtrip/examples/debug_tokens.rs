//! Dump the token stream, the composed tree and the printed text for a few
//! inputs. Set `YAML_ROUNDTRIP_LOG=trace` to see comment attachment.

use tracing_subscriber::prelude::*;
use yaml_roundtrip::cst::Cst;
use yaml_roundtrip::parse;

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("YAML_ROUNDTRIP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let inputs = [
        ("plain", "#c0\nvalue #c1\n#c2"),
        ("seq", "#c0\n- value 1\n#c1\n\n- value 2\n\n#c2\n"),
        ("map-in-seq", "- a: 1\n  b: 2\n  #c4\n  c: 3\n#c5\n"),
        ("end-comment", "a:\n  b: 1\n  # end of a\n# top\nc: 2\n"),
        ("keep", "a: |+\n  x\n\nb: 1\n"),
        ("flow", "k: [a, # one\n  b]\n"),
        ("stray", "a: 1\n- b\nc: 2\n"),
    ];
    for (name, input) in inputs {
        println!("=== {name} ===");
        println!("input: {input:?}");
        let cst = Cst::parse(input);
        for token in cst.tokens() {
            println!("  {:?} {:?} {:?}", token.kind, token.span, cst.text(token));
        }
        let doc = parse(input);
        println!("{doc:#?}");
        println!("output: {:?}", doc.to_string());
        println!();
    }
}
