//! End-to-end algebraic properties through the engine facade

use setops_core::source::FsReader;
use setops_core::{
    Engine, EngineConfig, Format, InputSource, OperandId, ParseErrorKind, SetOpsError,
};
use std::collections::BTreeSet;

fn engine() -> Engine {
    Engine::new(
        EngineConfig::builder()
            .sort(true)
            .output_format(Format::Comma)
            .build()
            .unwrap(),
    )
}

fn run(a: &str, b: &str, c: &str, expression: &str) -> BTreeSet<String> {
    let sources = [
        InputSource::inline(OperandId::A, a),
        InputSource::inline(OperandId::B, b),
        InputSource::inline(OperandId::C, c),
    ];
    let outcome = engine().run(&sources, Some(expression), &FsReader).unwrap();
    outcome
        .text
        .split(',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Operand triples covering disjoint, overlapping, nested and empty sets
const CASES: &[(&str, &str, &str)] = &[
    ("1,2,3", "2", "3"),
    ("1,2,3", "2,3", "3"),
    ("AAPL,MSFT,GOOG", "MSFT,NVDA", "GOOG,TSLA,AAPL"),
    ("X,Y", "", "Z"),
    ("", "P,Q", "Q,R"),
    ("a,b,c,d", "a,b,c,d", "e"),
];

#[test]
fn difference_is_disjoint_from_subtrahend() {
    for (a, b, c) in CASES {
        assert!(run(a, b, c, "(A-B)&B").is_empty(), "case {a:?} {b:?}");
    }
}

#[test]
fn difference_plus_intersection_restores_minuend() {
    for (a, b, c) in CASES {
        assert_eq!(run(a, b, c, "(A-B)+(A&B)"), run(a, b, c, "A"));
    }
}

#[test]
fn symmetric_difference_matches_definition() {
    for (a, b, c) in CASES {
        assert_eq!(run(a, b, c, "A^B"), run(a, b, c, "(A-B)+(B-A)"));
    }
}

#[test]
fn union_and_intersection_are_associative() {
    for (a, b, c) in CASES {
        assert_eq!(run(a, b, c, "(A+B)+C"), run(a, b, c, "A+(B+C)"));
        assert_eq!(run(a, b, c, "(A&B)&C"), run(a, b, c, "A&(B&C)"));
    }
}

#[test]
fn difference_chain_folds_left() {
    let expected: BTreeSet<String> = ["1".to_string()].into();
    assert_eq!(run("1,2,3", "2", "3", "A-B-C"), expected);

    let grouped: BTreeSet<String> = ["1".to_string(), "3".to_string()].into();
    assert_eq!(run("1,2,3", "2", "3", "A-(B-C)"), grouped);
}

#[test]
fn intersection_binds_tighter_than_difference() {
    let expected: BTreeSet<String> = ["1".to_string(), "2".to_string()].into();
    assert_eq!(run("1,2,3", "2,3", "3", "A-B&C"), expected);
}

#[test]
fn deduplication_on_input() {
    let outcome = engine()
        .run(
            &[InputSource::inline(OperandId::A, "AAPL,AAPL,MSFT")],
            None,
            &FsReader,
        )
        .unwrap();
    assert_eq!(outcome.count, 2);
    assert_eq!(outcome.text, "AAPL,MSFT");
}

#[test]
fn case_folding_cancels_across_operands() {
    let engine = Engine::new(
        EngineConfig::builder()
            .case_sensitive(false)
            .output_format(Format::Comma)
            .build()
            .unwrap(),
    );
    let outcome = engine
        .run(
            &[
                InputSource::inline(OperandId::A, "Apple,BANANA"),
                InputSource::inline(OperandId::B, "apple"),
            ],
            Some("A-B"),
            &FsReader,
        )
        .unwrap();
    assert_eq!(outcome.text, "BANANA");
}

#[test]
fn unknown_operand_is_an_error() {
    let err = engine()
        .run(
            &[
                InputSource::inline(OperandId::A, "x"),
                InputSource::inline(OperandId::B, "y"),
            ],
            Some("A+D"),
            &FsReader,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SetOpsError::UnknownOperand { letter: 'D', .. }
    ));
}

#[test]
fn unbalanced_parenthesis_points_at_end() {
    let err = engine()
        .run(
            &[
                InputSource::inline(OperandId::A, "x"),
                InputSource::inline(OperandId::B, "y"),
            ],
            Some("(A+B"),
            &FsReader,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SetOpsError::Parse {
            position: 4,
            kind: ParseErrorKind::UnbalancedParen
        }
    ));
}

#[test]
fn conversion_round_trips_with_detection() {
    let engine = engine();
    let input = "TSLA\nAAPL\nMSFT\nAAPL\n";

    for intermediate in [Format::Comma, Format::Json, Format::Columnar] {
        let there = engine
            .convert_text("list", input, None, Some(&intermediate))
            .unwrap();
        let back = engine
            .convert_text("list", &there.text, None, Some(&Format::Columnar))
            .unwrap();
        assert_eq!(back.text, "AAPL\nMSFT\nTSLA\n", "via {intermediate}");
    }
}

fn tokens_of(engine: &Engine, text: &str, format: &Format) -> BTreeSet<String> {
    engine
        .load_text(OperandId::A, "list", text, Some(format))
        .unwrap()
        .set
        .tokens()
        .iter()
        .cloned()
        .collect()
}

/// Lists whose tokens carry commas, quotes and secondary delimiters
const AWKWARD: &[(&str, &str)] = &[
    ("columnar", "TSLA\nAAPL\nBRK,B\nA|B\nSay \"hi\"\nx;y\nAAPL\n"),
    ("comma", "\"Apple, Inc.\",AAPL\nA|B,\"Say \"\"hi\"\"\",x;y\n"),
    ("json", r#"["BRK,B", "AAPL", "A|B", "Say \"hi\"", "x;y", "Apple, Inc."]"#),
];

#[test]
fn conversion_round_trips_every_format_pair() {
    let engine = engine();
    let formats = [Format::Columnar, Format::Comma, Format::Json];

    for (name, text) in AWKWARD {
        let origin: Format = name.parse().unwrap();
        let expected = tokens_of(&engine, text, &origin);
        assert!(expected.len() >= 5, "{name} parsed to {expected:?}");

        for intermediate in &formats {
            let there = engine
                .convert_text(name, text, Some(&origin), Some(intermediate))
                .unwrap();
            assert_eq!(
                tokens_of(&engine, &there.text, intermediate),
                expected,
                "{name} -> {intermediate}"
            );

            let back = engine
                .convert_text(name, &there.text, Some(intermediate), Some(&origin))
                .unwrap();
            assert_eq!(
                tokens_of(&engine, &back.text, &origin),
                expected,
                "{name} -> {intermediate} -> {name}"
            );
        }
    }
}

#[test]
fn quoted_csv_field_stays_one_token() {
    let outcome = engine()
        .convert_text(
            "tickers.csv",
            "\"Apple, Inc.\",AAPL\n",
            Some(&Format::Comma),
            Some(&Format::Json),
        )
        .unwrap();
    assert_eq!(outcome.text, "[\n  \"AAPL\",\n  \"Apple, Inc.\"\n]");
}

#[test]
fn comma_in_json_token_survives_comma_output() {
    let engine = engine();
    let there = engine
        .convert_text("list", r#"["BRK,B", "AAPL"]"#, None, Some(&Format::Comma))
        .unwrap();
    assert_eq!(there.text, "AAPL,\"BRK,B\"");

    let back = engine
        .convert_text("list", &there.text, None, Some(&Format::Json))
        .unwrap();
    assert_eq!(back.text, "[\n  \"AAPL\",\n  \"BRK,B\"\n]");
}
