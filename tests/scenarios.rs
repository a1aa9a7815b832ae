//! End-to-end scenarios through the public processor API

use rstest::rstest;
use vogo::error::{ConfigurationError, ValidationError};
use vogo::{Error, Grammar, GrammarMode, Modality, Processor};

const EMAIL: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b";
const PHONE: &str = r"\b\d{3}-\d{3}-\d{4}\b";

fn contact_processor() -> Processor {
    let grammar = Grammar::new([("email", EMAIL), ("phone", PHONE)], GrammarMode::PatternSet)
        .expect("contact grammar to compile");
    Processor::new(grammar)
}

fn greeting_processor() -> Processor {
    let grammar = Grammar::new(
        [
            ("start", "saludo nombre"),
            ("saludo", r#""hola" | "buenos" "dias""#),
            ("nombre", "WORD"),
        ],
        GrammarMode::StructuredParse,
    )
    .expect("greeting grammar to compile");
    Processor::new(grammar)
}

#[test]
fn test_contact_details_are_extracted() {
    let result = contact_processor()
        .process(
            "Contact me at john@example.com or call 555-123-4567",
            Modality::Text,
        )
        .unwrap();

    assert_eq!(result.matches().len(), 2);
    assert_eq!(
        result.matches_for("email").unwrap().matches(),
        &["john@example.com"]
    );
    assert_eq!(
        result.matches_for("phone").unwrap().matches(),
        &["555-123-4567"]
    );
    assert_eq!(result.stats().match_count, 2);
    assert!(result.contains_token("Contact"));
}

#[test]
fn test_text_without_matches() {
    let result = contact_processor()
        .process("Hello world! No patterns here.", Modality::Text)
        .unwrap();

    assert!(result.matches().is_empty());
    assert_eq!(result.stats().match_count, 0);
    assert_eq!(result.stats().token_count, result.tokens().len());
}

#[test]
fn test_gesture_sequence() {
    let result = contact_processor()
        .process(
            vec!["arriba", "abajo", "izquierda", "derecha"],
            Modality::Gestures,
        )
        .unwrap();

    assert_eq!(result.normalized_text(), "arriba abajo izquierda derecha");
    assert_eq!(result.stats().token_count, 4);
    assert_eq!(result.stats().unique_token_count, 4);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn test_empty_text_is_rejected(#[case] text: &str) {
    let err = contact_processor().process(text, Modality::Text).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::EmptyInput {
            modality: Modality::Text
        })
    ));
}

#[test]
fn test_structured_parse_accepts_greeting() {
    let result = greeting_processor()
        .process("hola mundo", Modality::Text)
        .unwrap();

    let names: Vec<&str> = result.matches().iter().map(|m| m.rule_name()).collect();
    assert_eq!(names, vec!["start", "saludo", "nombre"]);
    for record in result.matches() {
        assert_eq!(record.matches(), &["hola mundo"]);
    }
    assert_eq!(result.stats().match_count, 3);
}

#[test]
fn test_structured_parse_rejection_is_not_an_error() {
    let result = greeting_processor().process("###", Modality::Text).unwrap();
    assert!(result.matches().is_empty());
    assert_eq!(result.stats().match_count, 0);
    assert_eq!(result.tokens(), &["#", "#", "#"]);
    assert_eq!(result.stats().unique_token_count, 1);
}

#[test]
fn test_keyword_flow() {
    let grammar = Grammar::with_mode_name(
        [
            ("email", EMAIL),
            ("url", r"https?://[^\s]+"),
            ("number", r"\b\d+\b"),
        ],
        "regex",
    )
    .unwrap();
    let processor = Processor::new(grammar);
    processor.initialize().unwrap();

    let result = processor
        .process(
            "Write to support@vogo.dev, see https://vogo.dev/docs or dial 42 then 7",
            Modality::Text,
        )
        .unwrap();

    assert_eq!(
        result.matches_for("email").unwrap().matches(),
        &["support@vogo.dev"]
    );
    assert_eq!(
        result.matches_for("url").unwrap().matches(),
        &["https://vogo.dev/docs"]
    );
    assert_eq!(result.matches_for("number").unwrap().matches(), &["42", "7"]);
    assert_eq!(result.stats().match_count, 4);
}

#[test]
fn test_pattern_rules_ignore_case() {
    let grammar = Grammar::new([("keyword", "test|example")], GrammarMode::PatternSet).unwrap();
    let result = Processor::new(grammar)
        .process("TEST or Example", Modality::Text)
        .unwrap();
    assert_eq!(
        result.matches_for("keyword").unwrap().matches(),
        &["TEST", "Example"]
    );
}

#[test]
fn test_unknown_modality_tag() {
    let err = contact_processor()
        .process_tagged("hello", "smell")
        .unwrap_err();
    match err {
        Error::Configuration(ConfigurationError::UnsupportedModality { tag, supported }) => {
            assert_eq!(tag, "smell");
            assert_eq!(supported, vec!["text", "voice", "gestures", "image", "video"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_grammar_errors() {
    let empty: [(&str, &str); 0] = [];
    assert!(matches!(
        Grammar::with_mode_name(empty, "nonsense"),
        Err(Error::Validation(ValidationError::EmptyRules))
    ));
    assert!(matches!(
        Grammar::with_mode_name([("a", "x")], "nonsense"),
        Err(Error::Configuration(ConfigurationError::InvalidMode { .. }))
    ));
    assert!(matches!(
        Grammar::new([("broken", "(unclosed")], GrammarMode::PatternSet),
        Err(Error::Validation(ValidationError::InvalidPattern { .. }))
    ));
    assert!(matches!(
        Grammar::new([("start", "missing")], GrammarMode::StructuredParse),
        Err(Error::Validation(ValidationError::InvalidGrammar { .. }))
    ));
}

#[test]
fn test_grammar_from_yaml() {
    let grammar = Grammar::from_yaml_str(
        r#"
mode: cfg
rules:
  start: 'command NUMBER "seconds"'
  command: '"start" | "stop"'
"#,
    )
    .unwrap();
    assert_eq!(grammar.mode(), GrammarMode::StructuredParse);

    let result = Processor::new(grammar)
        .process("start 10 seconds", Modality::Voice)
        .unwrap();
    assert_eq!(result.matches().len(), 2);
    assert_eq!(result.matches()[0].matches(), &["start 10 seconds"]);
}

#[test]
fn test_structured_parse_long_right_recursive_input() {
    let grammar = Grammar::new(
        [("list", "item list | item"), ("item", "WORD")],
        GrammarMode::StructuredParse,
    )
    .unwrap();
    let processor = Processor::new(grammar);
    let text = vec!["a"; 12_000].join(" ");

    let result = processor.process(text.as_str(), Modality::Text).unwrap();
    assert_eq!(result.stats().token_count, 12_000);
    assert_eq!(result.matches().len(), 2);
    assert_eq!(result.matches()[0].matches(), &[text.clone()]);

    let rejected = processor
        .process(format!("{} 42", text), Modality::Text)
        .unwrap();
    assert!(rejected.matches().is_empty());
}
