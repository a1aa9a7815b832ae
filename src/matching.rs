//! Matching engine
//!
//! [`match_grammar`] turns normalized text into match records, dispatching on the
//! grammar's compiled artifact:
//!
//!     PatternSet:
//!         Rules are searched in declaration order. A rule with hits yields one record
//!         listing every occurrence; a rule without hits yields nothing.
//!
//!     StructuredParse:
//!         The whole text is parsed once. On success every declared rule yields one
//!         record whose single match is the full text. On failure there are no records
//!         and no error: text that does not fit the grammar is an ordinary outcome.

use crate::grammar::{CompiledGrammar, Grammar};
use crate::result::MatchRecord;
use tracing::{debug, trace};

pub use crate::grammar::pattern::count_occurrences;

/// Match `text` against `grammar`.
///
/// Pure: the same text and grammar always produce the same records.
pub fn match_grammar(text: &str, grammar: &Grammar) -> Vec<MatchRecord> {
    let records: Vec<MatchRecord> = match grammar.compiled() {
        CompiledGrammar::PatternSet(patterns) => patterns
            .iter()
            .filter_map(|pattern| {
                let found = pattern.find_all(text);
                trace!(rule = pattern.name(), hits = found.len(), "pattern searched");
                MatchRecord::new(pattern.name(), found)
            })
            .collect(),
        CompiledGrammar::StructuredParse(parser) => {
            if parser.accepts(text) {
                parser
                    .rule_names()
                    .iter()
                    .filter_map(|name| MatchRecord::new(name.as_str(), vec![text.to_string()]))
                    .collect()
            } else {
                trace!(start = parser.start(), "input not accepted by grammar");
                Vec::new()
            }
        }
    };

    debug!(mode = %grammar.mode(), records = records.len(), "matched grammar");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarMode;

    fn pattern_grammar() -> Grammar {
        Grammar::new(
            [
                ("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b"),
                ("phone", r"\b\d{3}-\d{3}-\d{4}\b"),
            ],
            GrammarMode::PatternSet,
        )
        .unwrap()
    }

    fn structured_grammar() -> Grammar {
        Grammar::new(
            [
                ("start", "saludo nombre"),
                ("saludo", r#""hola" | "hi""#),
                ("nombre", "WORD"),
            ],
            GrammarMode::StructuredParse,
        )
        .unwrap()
    }

    #[test]
    fn test_pattern_records_follow_rule_order() {
        let records = match_grammar("call 555-123-4567 or mail a@b.io", &pattern_grammar());
        let names: Vec<&str> = records.iter().map(MatchRecord::rule_name).collect();
        assert_eq!(names, vec!["email", "phone"]);
    }

    #[test]
    fn test_rules_without_hits_are_omitted() {
        let records = match_grammar("mail a@b.io", &pattern_grammar());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rule_name(), "email");
    }

    #[test]
    fn test_empty_text() {
        assert!(match_grammar("", &pattern_grammar()).is_empty());
        assert!(match_grammar("", &structured_grammar()).is_empty());
    }

    #[test]
    fn test_structured_success_yields_record_per_rule() {
        let records = match_grammar("hola mundo", &structured_grammar());
        assert_eq!(records.len(), 3);
        for (record, name) in records.iter().zip(["start", "saludo", "nombre"]) {
            assert_eq!(record.rule_name(), name);
            assert_eq!(record.matches(), &["hola mundo"]);
        }
    }

    #[test]
    fn test_structured_failure_is_empty() {
        assert!(match_grammar("###", &structured_grammar()).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let grammar = pattern_grammar();
        let text = "a@b.io a@b.io 555-123-4567";
        assert_eq!(match_grammar(text, &grammar), match_grammar(text, &grammar));
    }
}
