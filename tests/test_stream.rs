use treebank::parser::ByteParser;
use treebank::treebank::{DEFAULT_CAPACITY, TreeStream, TreebankParser};

const SAMPLE: &str = "tests/fixtures/wsj_sample.mrg";

fn many_trees(n: usize) -> String {
    (0..n).map(|i| format!("( (S (NP (NN w{i})) (VP (VBZ runs))) )\n")).collect()
}

#[test]
fn test_stream_file() {
    let mut stream = TreeStream::open(SAMPLE).unwrap();
    let indices: Vec<usize> = stream.by_ref().map(|tree| tree.index()).collect();

    assert_eq!(indices, vec![0, 1, 3]);
    let summary = stream.finish();
    assert_eq!(summary.parsed, 3);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_stream_preserves_order_with_small_queue() {
    let input = many_trees(200);
    let stream = TreeStream::spawn(TreebankParser::new("many"), ByteParser::for_str(&input), 1);

    let words: Vec<String> = stream.map(|tree| tree.words()[0].to_string()).collect();
    assert_eq!(words.len(), 200);
    assert_eq!(words[0], "w0");
    assert_eq!(words[199], "w199");
}

#[test]
fn test_early_close_stops_worker() {
    let input = many_trees(1000);
    let mut stream = TreeStream::spawn(TreebankParser::new("many"), ByteParser::for_str(&input), 4);

    let first: Vec<_> = stream.by_ref().take(3).collect();
    assert_eq!(first.len(), 3);

    stream.close();
    assert!(!stream.is_running());
    assert!(stream.next().is_none());
}

#[test]
fn test_drop_mid_stream() {
    let input = many_trees(500);
    let mut stream = TreeStream::spawn(
        TreebankParser::new("many"),
        ByteParser::for_str(&input),
        DEFAULT_CAPACITY,
    );
    assert!(stream.next().is_some());
    drop(stream);
}

#[test]
fn test_missing_file() {
    assert!(TreeStream::open("tests/fixtures/nope.mrg").is_err());
}
