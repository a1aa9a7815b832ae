//! Structured-parse compilation and recognition
//!
//! All rule productions are compiled together into one [`StructuredParser`]. The first
//! rule is the start symbol. Recognition answers a single question: does the start
//! symbol derive the entire input?
//!
//! ## Compilation
//!
//! Production trees are lowered to plain alternatives (flat symbol sequences). Nested
//! choices, optionals and bounded repetitions become helper rules; unbounded repetition
//! becomes a left-recursive helper (`tail: tail body | <empty>`).
//!
//! ## Recognition
//!
//! An Earley chart recognizer over byte offsets. Set `k` holds the items
//! `(rule, alternative, dot, origin)` alive after `k` bytes. Sets are filled in order,
//! with no recursion on the call stack, so input length is bounded only by memory.
//!
//!     - Rules that derive the empty string are advanced over at prediction time
//!       (Aycock and Horspool), so completion never has to revisit a set.
//!     - Deterministic right-recursive chains are collapsed to their topmost item
//!       (Leo), keeping right recursion linear instead of quadratic.
//!
//! With whitespace skipping enabled (the default), whitespace before every terminal and at
//! the end of the input is ignored. The built-in `WS` terminal is the exception: it is
//! matched where it stands, so `"a" WS "b"` requires whitespace between `a` and `b`.

use super::production::{parse_production, Term};
use crate::error::ValidationError;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Terminals available without declaring them.
const BUILTIN_TERMINALS: &[(&str, &str)] = &[
    ("WORD", r"\p{L}+"),
    ("LETTER", r"\p{L}"),
    ("DIGIT", r"[0-9]"),
    ("INT", r"[0-9]+"),
    ("DECIMAL", r"[0-9]+\.[0-9]*|\.[0-9]+"),
    (
        "NUMBER",
        r"(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][+-]?[0-9]+)?",
    ),
    ("ESCAPED_STRING", r#""(?:[^"\\]|\\.)*""#),
    ("WS", r"\s+"),
];

/// Built-in terminal matched without skipping whitespace first
const WHITESPACE_TERMINAL: &str = "WS";

const REGEX_FLAGS: &str = "imsx";

/// Lowered grammar symbol
#[derive(Debug, Clone)]
enum Symbol {
    Rule(usize),
    Literal(String),
    /// Anchored at the start of the remaining input
    Pattern(Regex),
    /// Like `Pattern`, but never preceded by whitespace skipping
    RawPattern(Regex),
}

type Alternative = Vec<Symbol>;

/// A compiled structured-parse grammar.
#[derive(Debug, Clone)]
pub struct StructuredParser {
    names: Vec<String>,
    /// Declared rules first (same indices as `names`), then helper rules
    rules: Vec<Vec<Alternative>>,
    nullable: Vec<bool>,
    /// Helper rule `accept: <start>`
    accept: usize,
    skip_whitespace: bool,
}

impl StructuredParser {
    /// Compile an ordered list of `(name, production)` pairs.
    ///
    /// The first rule becomes the start symbol. Any syntax error, unknown name or bad
    /// regex terminal fails with [`ValidationError::InvalidGrammar`].
    pub fn compile<'a, I>(rules: I, skip_whitespace: bool) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut names = Vec::new();
        let mut terms = Vec::new();
        for (name, body) in rules {
            let term = parse_production(name, body).map_err(invalid)?;
            names.push(name.to_string());
            terms.push(term);
        }

        if names.is_empty() {
            return Err(ValidationError::EmptyRules);
        }

        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut lowering = Lowering {
            index: &index,
            rules: vec![Vec::new(); names.len()],
        };
        for (i, (name, term)) in names.iter().zip(&terms).enumerate() {
            let alternatives = lowering.alternatives(name, term).map_err(invalid)?;
            lowering.rules[i] = alternatives;
        }
        let accept = lowering.add(vec![vec![Symbol::Rule(0)]]);
        let rules = lowering.rules;
        let nullable = nullable_rules(&rules);

        Ok(Self {
            names,
            rules,
            nullable,
            accept,
            skip_whitespace,
        })
    }

    /// Name of the start rule
    pub fn start(&self) -> &str {
        &self.names[0]
    }

    /// Declared rule names, in declaration order
    pub fn rule_names(&self) -> &[String] {
        &self.names
    }

    /// Whether whitespace between terminals is ignored
    pub fn skips_whitespace(&self) -> bool {
        self.skip_whitespace
    }

    /// Whether the start rule derives all of `text`.
    pub fn accepts(&self, text: &str) -> bool {
        Recognizer::new(self, text).run()
    }
}

fn invalid(message: String) -> ValidationError {
    ValidationError::InvalidGrammar { message }
}

fn anchored(rule: &str, source: &str, flags: &str) -> Result<Regex, String> {
    if let Some(flag) = flags.chars().find(|c| !REGEX_FLAGS.contains(*c)) {
        return Err(format!("rule '{}': unknown regex flag '{}'", rule, flag));
    }
    let pattern = if flags.is_empty() {
        format!(r"\A(?:{})", source)
    } else {
        format!(r"\A(?{}:{})", flags, source)
    };
    Regex::new(&pattern).map_err(|e| format!("rule '{}': {}", rule, e))
}

/// Name resolution and flattening of production trees
struct Lowering<'a> {
    index: &'a HashMap<&'a str, usize>,
    rules: Vec<Vec<Alternative>>,
}

impl Lowering<'_> {
    fn add(&mut self, alternatives: Vec<Alternative>) -> usize {
        self.rules.push(alternatives);
        self.rules.len() - 1
    }

    fn alternatives(&mut self, rule: &str, term: &Term) -> Result<Vec<Alternative>, String> {
        match term {
            Term::Choice(items) => items
                .iter()
                .map(|item| self.sequence(rule, item))
                .collect(),
            other => Ok(vec![self.sequence(rule, other)?]),
        }
    }

    fn sequence(&mut self, rule: &str, term: &Term) -> Result<Alternative, String> {
        let mut out = Vec::new();
        self.push(rule, term, &mut out)?;
        Ok(out)
    }

    fn push(&mut self, rule: &str, term: &Term, out: &mut Alternative) -> Result<(), String> {
        match term {
            Term::Symbol(name) => out.push(self.symbol(rule, name)?),
            Term::Literal {
                text,
                insensitive: false,
            } => out.push(Symbol::Literal(text.clone())),
            Term::Literal {
                text,
                insensitive: true,
            } => out.push(Symbol::Pattern(anchored(rule, &regex::escape(text), "i")?)),
            Term::Pattern { source, flags } => {
                out.push(Symbol::Pattern(anchored(rule, source, flags)?))
            }
            Term::Sequence(items) => {
                for item in items {
                    self.push(rule, item, out)?;
                }
            }
            Term::Choice(_) => {
                let alternatives = self.alternatives(rule, term)?;
                out.push(Symbol::Rule(self.add(alternatives)));
            }
            Term::Repeat { term, min, max } => {
                let body = self.sequence(rule, term)?;
                match max {
                    Some(max) => {
                        let alternatives = (*min..=*max).map(|n| repeated(&body, n)).collect();
                        out.push(Symbol::Rule(self.add(alternatives)));
                    }
                    None => {
                        out.extend(repeated(&body, *min));
                        let tail = self.add(Vec::new());
                        let mut more = vec![Symbol::Rule(tail)];
                        more.extend(body);
                        self.rules[tail] = vec![Vec::new(), more];
                        out.push(Symbol::Rule(tail));
                    }
                }
            }
        }
        Ok(())
    }

    fn symbol(&self, rule: &str, name: &str) -> Result<Symbol, String> {
        if let Some(&i) = self.index.get(name) {
            return Ok(Symbol::Rule(i));
        }
        match BUILTIN_TERMINALS.iter().find(|(n, _)| *n == name) {
            Some((n, source)) if *n == WHITESPACE_TERMINAL => {
                Ok(Symbol::RawPattern(anchored(rule, source, "")?))
            }
            Some((_, source)) => Ok(Symbol::Pattern(anchored(rule, source, "")?)),
            None => Err(format!(
                "rule '{}': reference to undeclared rule '{}'",
                rule, name
            )),
        }
    }
}

fn repeated(body: &[Symbol], times: usize) -> Alternative {
    body.iter().cloned().cycle().take(body.len() * times).collect()
}

/// Rules that derive the empty string. Terminals never match empty.
fn nullable_rules(rules: &[Vec<Alternative>]) -> Vec<bool> {
    let mut nullable = vec![false; rules.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for (i, alternatives) in rules.iter().enumerate() {
            if nullable[i] {
                continue;
            }
            let derives_empty = alternatives.iter().any(|alternative| {
                alternative
                    .iter()
                    .all(|symbol| matches!(symbol, Symbol::Rule(r) if nullable[*r]))
            });
            if derives_empty {
                nullable[i] = true;
                changed = true;
            }
        }
    }
    nullable
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Item {
    rule: usize,
    alt: usize,
    dot: usize,
    origin: usize,
}

impl Item {
    fn advance(self) -> Self {
        Self {
            dot: self.dot + 1,
            ..self
        }
    }
}

#[derive(Debug, Default)]
struct EarleySet {
    items: Vec<Item>,
    seen: HashSet<Item>,
    /// Items whose next symbol is each rule; filled when the set is sealed
    waiting: HashMap<usize, Vec<Item>>,
    /// Topmost completion of a deterministic chain, per awaited rule
    leo: HashMap<usize, Item>,
}

impl EarleySet {
    fn add(&mut self, item: Item) {
        if self.seen.insert(item) {
            self.items.push(item);
        }
    }
}

/// One recognition run over a single input
struct Recognizer<'g, 't> {
    parser: &'g StructuredParser,
    text: &'t str,
    sets: Vec<EarleySet>,
}

impl<'g, 't> Recognizer<'g, 't> {
    fn new(parser: &'g StructuredParser, text: &'t str) -> Self {
        let mut sets = Vec::new();
        sets.resize_with(text.len() + 1, EarleySet::default);
        Self { parser, text, sets }
    }

    fn run(mut self) -> bool {
        let parser = self.parser;
        let start = Item {
            rule: parser.accept,
            alt: 0,
            dot: 0,
            origin: 0,
        };
        self.sets[0].add(start);

        for pos in 0..self.sets.len() {
            let mut i = 0;
            while i < self.sets[pos].items.len() {
                let item = self.sets[pos].items[i];
                i += 1;
                match self.next_symbol(item) {
                    None => self.complete(item, pos),
                    Some(Symbol::Rule(rule)) => {
                        for alt in 0..parser.rules[*rule].len() {
                            self.sets[pos].add(Item {
                                rule: *rule,
                                alt,
                                dot: 0,
                                origin: pos,
                            });
                        }
                        if parser.nullable[*rule] {
                            self.sets[pos].add(item.advance());
                        }
                    }
                    Some(terminal) => {
                        if let Some(end) = self.scan(terminal, pos) {
                            self.sets[end].add(item.advance());
                        }
                    }
                }
            }
            self.seal(pos);
        }

        let done = start.advance();
        self.sets
            .iter()
            .enumerate()
            .any(|(pos, set)| set.seen.contains(&done) && self.skip(pos) == self.text.len())
    }

    fn next_symbol(&self, item: Item) -> Option<&'g Symbol> {
        let parser: &'g StructuredParser = self.parser;
        parser.rules[item.rule][item.alt].get(item.dot)
    }

    fn waits_on(&self, item: Item, rule: usize) -> bool {
        matches!(self.next_symbol(item), Some(Symbol::Rule(r)) if *r == rule)
    }

    fn complete(&mut self, item: Item, pos: usize) {
        let origin = item.origin;
        let advanced: Vec<Item> = if origin == pos {
            // the set is still growing, so it has no index yet
            self.sets[pos]
                .items
                .iter()
                .filter(|w| self.waits_on(**w, item.rule))
                .map(|w| w.advance())
                .collect()
        } else if let Some(&top) = self.sets[origin].leo.get(&item.rule) {
            vec![top]
        } else {
            self.sets[origin]
                .waiting
                .get(&item.rule)
                .map(|waiting| waiting.iter().map(|w| w.advance()).collect())
                .unwrap_or_default()
        };

        for next in advanced {
            self.sets[pos].add(next);
        }
    }

    /// Index a finished set for completions arriving from later positions.
    fn seal(&mut self, pos: usize) {
        let parser = self.parser;
        let mut waiting: HashMap<usize, Vec<Item>> = HashMap::new();
        for &item in &self.sets[pos].items {
            if let Some(Symbol::Rule(rule)) = self.next_symbol(item) {
                waiting.entry(*rule).or_default().push(item);
            }
        }

        let mut leo = HashMap::new();
        for (&rule, items) in &waiting {
            if let [item] = items.as_slice() {
                if item.dot + 1 == parser.rules[item.rule][item.alt].len() {
                    let above = if item.origin < pos {
                        self.sets[item.origin].leo.get(&item.rule).copied()
                    } else {
                        None
                    };
                    leo.insert(rule, above.unwrap_or(item.advance()));
                }
            }
        }

        let set = &mut self.sets[pos];
        set.waiting = waiting;
        set.leo = leo;
    }

    fn skip(&self, pos: usize) -> usize {
        if !self.parser.skip_whitespace {
            return pos;
        }
        let rest = &self.text[pos..];
        pos + (rest.len() - rest.trim_start().len())
    }

    /// End offset of `terminal` matched at `pos`, if it matches.
    fn scan(&self, terminal: &Symbol, pos: usize) -> Option<usize> {
        match terminal {
            Symbol::Literal(literal) => {
                let start = self.skip(pos);
                self.text[start..]
                    .starts_with(literal.as_str())
                    .then_some(start + literal.len())
            }
            Symbol::Pattern(regex) => self.find(regex, self.skip(pos)),
            Symbol::RawPattern(regex) => self.find(regex, pos),
            Symbol::Rule(_) => None,
        }
    }

    fn find(&self, regex: &Regex, start: usize) -> Option<usize> {
        regex
            .find(&self.text[start..])
            .filter(|m| m.end() > 0)
            .map(|m| start + m.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rules: &[(&str, &str)]) -> StructuredParser {
        StructuredParser::compile(rules.iter().copied(), true).unwrap()
    }

    fn compile_err(rules: &[(&str, &str)]) -> String {
        match StructuredParser::compile(rules.iter().copied(), true) {
            Err(ValidationError::InvalidGrammar { message }) => message,
            other => panic!("expected InvalidGrammar, got {other:?}"),
        }
    }

    #[test]
    fn test_word_sequence() {
        let parser = compile(&[("start", "WORD+"), ("WORD", "/[a-zA-Z]+/")]);
        assert_eq!(parser.start(), "start");
        assert!(parser.accepts("hola mundo"));
        assert!(parser.accepts("  hola  "));
        assert!(!parser.accepts("###"));
        assert!(!parser.accepts(""));
    }

    #[test]
    fn test_greeting_grammar() {
        let parser = compile(&[
            ("start", "saludo nombre"),
            ("saludo", r#""hola" | "hi""#),
            ("nombre", "WORD"),
        ]);
        assert!(parser.accepts("hola mundo"));
        assert!(parser.accepts("hi there"));
        assert!(!parser.accepts("hello world"));
        assert!(!parser.accepts("hola"));
    }

    #[test]
    fn test_builtin_terminals() {
        let parser = compile(&[("start", "WORD INT")]);
        assert!(parser.accepts("room 101"));
        assert!(!parser.accepts("room one"));
    }

    #[test]
    fn test_declared_rule_shadows_builtin() {
        let parser = compile(&[("start", "WORD"), ("WORD", r#""only""#)]);
        assert!(parser.accepts("only"));
        assert!(!parser.accepts("other"));
    }

    #[test]
    fn test_case_insensitive_literal() {
        let parser = compile(&[("start", r#""hola"i WORD"#)]);
        assert!(parser.accepts("HOLA mundo"));
        let strict = compile(&[("start", r#""hola" WORD"#)]);
        assert!(!strict.accepts("HOLA mundo"));
    }

    #[test]
    fn test_left_recursion() {
        let parser = compile(&[("sum", r#"sum "+" INT | INT"#)]);
        assert!(parser.accepts("1"));
        assert!(parser.accepts("1 + 2 + 3"));
        assert!(!parser.accepts("1 +"));
    }

    #[test]
    fn test_right_recursion_and_nesting() {
        let parser = compile(&[
            ("list", r#""[" [items] "]""#),
            ("items", r#"value ("," value)*"#),
            ("value", "INT | list"),
        ]);
        assert!(parser.accepts("[]"));
        assert!(parser.accepts("[1, [2, 3], []]"));
        assert!(!parser.accepts("[1, 2"));
    }

    #[test]
    fn test_ambiguous_grammar() {
        let parser = compile(&[("start", "a a"), ("a", r#""x" | "x" "x""#)]);
        assert!(parser.accepts("x x"));
        assert!(parser.accepts("x x x"));
        assert!(parser.accepts("x x x x"));
        assert!(!parser.accepts("x x x x x"));
    }

    #[test]
    fn test_nullable_repetition_terminates() {
        let parser = compile(&[("start", r#"(a)* "end""#), ("a", r#""x"?"#)]);
        assert!(parser.accepts("end"));
        assert!(parser.accepts("x x end"));
    }

    #[test]
    fn test_whitespace_is_significant_when_not_skipped() {
        let parser = StructuredParser::compile([("start", r#""a" "b""#)], false).unwrap();
        assert!(parser.accepts("ab"));
        assert!(!parser.accepts("a b"));

        let spaced = StructuredParser::compile([("start", r#""a" WS "b""#)], false).unwrap();
        assert!(spaced.accepts("a   b"));
    }

    #[test]
    fn test_ws_terminal_with_skipping() {
        let parser = compile(&[("start", r#""a" WS "b""#)]);
        assert!(parser.accepts("a b"));
        assert!(parser.accepts("a \t b "));
        assert!(!parser.accepts("ab"));
    }

    #[test]
    fn test_bounded_repetition_and_optional() {
        let parser = compile(&[("start", r#""<" ["x"] ("y" | "z")+ ">""#)]);
        assert!(parser.accepts("< y >"));
        assert!(parser.accepts("< x z y z >"));
        assert!(!parser.accepts("< x >"));
        assert!(!parser.accepts("< x x y >"));
    }

    #[test]
    fn test_long_right_recursive_input() {
        let parser = compile(&[("list", "item list | item"), ("item", "WORD")]);
        let text = vec!["a"; 20_000].join(" ");
        assert!(parser.accepts(&text));
        assert!(!parser.accepts(&format!("{} 1", text)));
    }

    #[test]
    fn test_long_left_recursive_input() {
        let parser = compile(&[("sum", r#"sum "+" INT | INT"#)]);
        let text = vec!["7"; 5_000].join(" + ");
        assert!(parser.accepts(&text));
        assert!(!parser.accepts(&format!("{} +", text)));
    }

    #[test]
    fn test_helper_rules_stay_internal() {
        let parser = compile(&[("start", r#"("a" | "b")* c"#), ("c", r#""c"?"#)]);
        assert_eq!(parser.rule_names(), &["start", "c"]);
        assert!(parser.accepts(""));
        assert!(parser.accepts("a b a c"));
    }

    #[test]
    fn test_undeclared_reference() {
        let message = compile_err(&[("start", "greeting name")]);
        assert!(message.contains("undeclared rule 'greeting'"), "{message}");
    }

    #[test]
    fn test_bad_regex_terminal() {
        let message = compile_err(&[("start", "/[a-z/")]);
        assert!(message.starts_with("rule 'start':"), "{message}");
    }

    #[test]
    fn test_unknown_flag() {
        let message = compile_err(&[("start", "/a/q")]);
        assert!(message.contains("unknown regex flag 'q'"), "{message}");
    }

    #[test]
    fn test_syntax_error_reports_rule() {
        let message = compile_err(&[("start", "a"), ("a", "(b")]);
        assert!(message.starts_with("rule 'a':"), "{message}");
    }
}
