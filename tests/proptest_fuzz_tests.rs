//! Property-based tests for the Monkey lexer, parser and evaluator
//!
//! These tests use proptest to generate random inputs and verify that:
//! 1. The lexer and parser never panic on arbitrary input
//! 2. Integer arithmetic matches native wrapping arithmetic
//! 3. Evaluating a parsed program is repeatable

use monkey::{parse, Environment, Evaluator, Lexer, Object, TokenKind};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Generate random strings that might break the front-end
fn arbitrary_source_string() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,300}").unwrap()
}

/// Generate token soup that looks like Monkey code
fn monkey_like_string() -> impl Strategy<Value = String> {
    prop::collection::vec(monkey_token(), 0..60).prop_map(|tokens| tokens.join(" "))
}

fn monkey_token() -> impl Strategy<Value = String> {
    prop_oneof![
        // Delimiters
        Just("(".to_string()),
        Just(")".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just(",".to_string()),
        Just(";".to_string()),
        Just(":".to_string()),
        // Keywords
        Just("let".to_string()),
        Just("fn".to_string()),
        Just("if".to_string()),
        Just("else".to_string()),
        Just("return".to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        // Operators
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("=".to_string()),
        Just("==".to_string()),
        Just("!=".to_string()),
        Just("!".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
        // Literals
        (0u64..1000u64).prop_map(|n| n.to_string()),
        (0.0f64..100.0f64).prop_map(|f| format!("{:.2}", f)),
        r#""[a-zA-Z0-9 ]{0,10}""#.prop_map(|s| s),
        // Identifiers
        "[a-z][a-z0-9_]{0,6}".prop_map(|s| s),
        Just("len".to_string()),
    ]
}

/// Generate `N op M` with operands small enough to print as literals
fn integer_operation() -> impl Strategy<Value = (i64, &'static str, i64)> {
    (
        -1_000_000i64..1_000_000i64,
        prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
        -1_000_000i64..1_000_000i64,
    )
}

fn run(source: &str) -> Object {
    let (program, err) = parse(source);
    assert!(err.is_none(), "parse error for {:?}: {:?}", source, err);
    Evaluator::new().eval(&program, &Environment::new())
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn lexer_never_panics_and_ends_with_eof(source in arbitrary_source_string()) {
        let tokens = Lexer::new(&source).scan_tokens();
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn parser_never_panics_on_ascii(source in arbitrary_source_string()) {
        let _ = parse(&source);
    }

    #[test]
    fn evaluating_token_soup_never_panics(source in monkey_like_string()) {
        let (program, err) = parse(&source);
        // Deep recursion is a known limit; only run programs that parsed
        if err.is_none() && !source.contains("fn") {
            let _ = Evaluator::new().eval(&program, &Environment::new());
        }
    }

    #[test]
    fn integer_arithmetic_matches_native((a, op, b) in integer_operation()) {
        let source = format!("{} {} {}", a, op, b);
        let expected = match op {
            "+" => Some(a.wrapping_add(b)),
            "-" => Some(a.wrapping_sub(b)),
            "*" => Some(a.wrapping_mul(b)),
            _ if b == 0 => None,
            _ => Some(a.wrapping_div(b)),
        };

        let result = run(&format!("({}) {} ({})", a, op, b));
        match expected {
            Some(value) => prop_assert_eq!(result, Object::Integer(value), "{}", source),
            None => prop_assert_eq!(result, Object::Error("division by zero".to_string())),
        }
    }

    #[test]
    fn reevaluation_is_idempotent(values in prop::collection::vec(-100i64..100, 0..8)) {
        let literal = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!(
            "let xs = [{}]; let ys = append(xs, len(xs)); [ys[::-1], xs[1:]]",
            literal
        );
        let (program, err) = parse(&source);
        prop_assert!(err.is_none());

        let evaluator = Evaluator::new();
        let first = evaluator.eval(&program, &Environment::new());
        let second = evaluator.eval(&program, &Environment::new());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn negative_indices_mirror_positive(values in prop::collection::vec(-100i64..100, 1..10), offset in 0usize..10) {
        let len = values.len();
        let i = offset % len;
        let literal = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let positive = run(&format!("[{}][{}]", literal, i));
        let negative = run(&format!("[{}][-{}]", literal, len - i));
        prop_assert_eq!(positive, negative);
    }
}
